//! Game settings read from TOML.
//!
//! Every key is optional. A missing file or a missing key falls back to the defaults below, which match the standard game's five second windows.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ── Public Config Struct ──

/// Everything a round needs to know that does not come from the board.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameConfig {
    /// Think and move windows.
    pub timers: TimerConfig,
    /// Actor settings.
    pub round: RoundConfig,
    /// Hint search settings.
    pub solver: SolverConfig,
}

/// Lengths of the two windows of a goal.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimerConfig {
    /// Time between the first claim and the close of claims.
    pub think_timeout: Duration,
    /// Time the best claimant has to submit moves.
    pub move_timeout: Duration,
}

/// How a round talks to its callers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RoundConfig {
    /// How long a caller waits for the round to answer before giving up with [`RoundError::Timeout`](crate::RoundError::Timeout).
    pub reply_timeout: Duration,
    /// Capacity of the command and event channels; at least 1.
    pub channel_capacity: usize,
    /// Fixed seed for robot placement and goal order; random when absent.
    pub seed: Option<u64>,
}

/// Limits of the hint search.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SolverConfig {
    /// Longest route searched, in slides.
    pub max_depth: usize,
}

/// Failure to read or parse a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or has mistyped keys.
    #[error("config file parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timers: TomlTimers,
    #[serde(default)]
    round: TomlRound,
    #[serde(default)]
    solver: TomlSolver,
}

#[derive(Deserialize, Debug)]
struct TomlTimers {
    #[serde(default = "default_think_timeout")]
    think_timeout_ms: u64,
    #[serde(default = "default_move_timeout")]
    move_timeout_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRound {
    #[serde(default = "default_reply_timeout")]
    reply_timeout_ms: u64,
    #[serde(default = "default_channel_capacity")]
    channel_capacity: usize,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlSolver {
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

// ── Defaults ──

fn default_think_timeout() -> u64 { 5_000 }
fn default_move_timeout() -> u64 { 5_000 }
fn default_reply_timeout() -> u64 { 2_000 }
fn default_channel_capacity() -> usize { 64 }
fn default_max_depth() -> usize { 12 }

impl Default for TomlTimers {
    fn default() -> Self {
        TomlTimers {
            think_timeout_ms: default_think_timeout(),
            move_timeout_ms: default_move_timeout(),
        }
    }
}

impl Default for TomlRound {
    fn default() -> Self {
        TomlRound {
            reply_timeout_ms: default_reply_timeout(),
            channel_capacity: default_channel_capacity(),
            seed: None,
        }
    }
}

impl Default for TomlSolver {
    fn default() -> Self {
        TomlSolver {
            max_depth: default_max_depth(),
        }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(toml_cfg: TomlConfig) -> Self {
        GameConfig {
            timers: TimerConfig {
                think_timeout: Duration::from_millis(toml_cfg.timers.think_timeout_ms),
                move_timeout: Duration::from_millis(toml_cfg.timers.move_timeout_ms),
            },
            round: RoundConfig {
                reply_timeout: Duration::from_millis(toml_cfg.round.reply_timeout_ms),
                // a zero-capacity mpsc channel panics on creation
                channel_capacity: toml_cfg.round.channel_capacity.max(1),
                seed: toml_cfg.round.seed,
            },
            solver: SolverConfig {
                max_depth: toml_cfg.solver.max_depth,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<TomlConfig>(text)?.into())
    }

    /// Load the config at `path`, or the defaults if no file exists there.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }
}
