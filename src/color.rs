use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantArray};

/// Robot and goal colours. The lowercase name is the wire form.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Display, EnumString, VariantArray, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Blue.
    Blue,
    /// Drawn as `s` so it does not clash with green.
    Grey,
}

impl Color {
    /// Single character used when drawing a board; goals print it lowercase and robots uppercase.
    pub fn symbol(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Yellow => 'y',
            Self::Blue => 'b',
            // "g" is taken
            Self::Grey => 's',
        }
    }
}
