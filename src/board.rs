use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::Array2;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::builder::{BoardError, BuilderInvalidReason};
use crate::cell::Walls;
use crate::color::Color;
use crate::location::{Coord, Location};
use crate::step::Step;
use crate::tile::Goal;

/// Where one robot stands.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RobotPosition {
    /// Colour of the robot.
    pub robot: Color,
    /// Cell it stands on.
    pub position: Location,
}

impl RobotPosition {
    /// Place `robot` at `position`.
    pub fn new(robot: Color, position: Location) -> Self {
        Self { robot, position }
    }
}

/// One slide: `robot` travels in a straight line and must come to rest exactly on `to`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Colour of the robot to slide.
    pub robot: Color,
    /// The cell it must stop on.
    pub to: Location,
}

impl Move {
    /// Slide `robot` so that it stops on `to`.
    pub fn new(robot: Color, to: Location) -> Self {
        Self { robot, to }
    }
}

/// The cell of `robot` among `positions`, if it is in play.
pub(crate) fn position_of(positions: &[RobotPosition], robot: Color) -> Option<Location> {
    positions.iter().find(|placed| placed.robot == robot).map(|placed| placed.position)
}

/// An immutable square board: the wall grid, every goal printed on it and the colours of the robots that play on it.
///
/// A board never owns robot positions.
/// Every rule takes the current positions as an argument and hands back new ones, so a single board can be shared between rounds and the [`Solver`](crate::Solver) without locking.
///
/// [`Board`]s are either assembled from tiles by a [`BoardBuilder`](crate::BoardBuilder) or supplied whole through [`Board::from_parts`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    pub(crate) cells: Array2<Walls>,
    pub(crate) goals: Vec<Goal>,
    pub(crate) robot_colors: Vec<Color>,
}

impl Board {
    pub(crate) fn new(cells: Array2<Walls>, goals: Vec<Goal>, robot_colors: Vec<Color>) -> Self {
        Self { cells, goals, robot_colors }
    }

    /// Validate and wrap a board described by raw wall masks, one inner `Vec` per row.
    ///
    /// Collects every problem found rather than stopping at the first.
    pub fn from_parts(cells: Vec<Vec<u8>>, goals: Vec<Goal>, robot_colors: Vec<Color>) -> Result<Self, BoardError> {
        let mut invalid_reasons = Vec::new();
        let size = cells.len();

        if size == 0 {
            invalid_reasons.push(BuilderInvalidReason::EmptyGrid);
        } else if cells.iter().any(|row| row.len() != size) {
            invalid_reasons.push(BuilderInvalidReason::NotSquare);
        }

        for (row, values) in cells.iter().enumerate() {
            for (column, value) in values.iter().enumerate() {
                if Walls::new(*value).is_none() {
                    invalid_reasons.push(BuilderInvalidReason::WallOutOfRange { location: Location(row, column), value: *value });
                }
            }
        }

        invalid_reasons.extend(goals.iter()
            .filter(|goal| goal.number >= size * size)
            .map(|goal| BuilderInvalidReason::GoalOutOfBounds(*goal)));
        invalid_reasons.extend(robot_colors.iter()
            .duplicates()
            .map(|color| BuilderInvalidReason::DuplicateRobot(*color)));
        invalid_reasons.extend(goals.iter()
            .map(|goal| goal.color)
            .unique()
            .filter(|color| !robot_colors.contains(color))
            .map(BuilderInvalidReason::MissingRobot));

        if !invalid_reasons.is_empty() {
            return Err(BoardError::Configuration(invalid_reasons));
        }

        let cells = Array2::from_shape_fn((size, size), |(row, column)| Walls::from_bits_truncate(cells[row][column]));
        Ok(Self::new(cells, goals, robot_colors))
    }

    /// Length of one side.
    pub fn size(&self) -> Coord {
        self.cells.nrows()
    }

    /// Wall masks, indexed `[row, column]`.
    pub fn cells(&self) -> &Array2<Walls> {
        &self.cells
    }

    /// Every goal, numbered in the board's frame.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// One robot plays per colour listed here.
    pub fn robot_colors(&self) -> &[Color] {
        &self.robot_colors
    }

    /// The walls of the cell at `location`, or [`None`] off the board.
    pub fn walls_at(&self, location: Location) -> Option<Walls> {
        self.cells.get(location.as_index()).copied()
    }

    /// Every cell a robot may stand on, in row-major order.
    pub fn open_locations(&self) -> Vec<Location> {
        self.cells.indexed_iter()
            .filter(|(_, walls)| !walls.is_enclosed())
            .map(|(index, _)| Location::from(index))
            .collect_vec()
    }

    /// One robot of every colour, each on its own uniformly chosen open cell.
    pub fn random_open_positions<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<RobotPosition>, BoardError> {
        let open = self.open_locations();
        let robots = self.robot_colors.len();
        if open.len() < robots {
            return Err(BoardError::InsufficientSpace { open: open.len(), robots });
        }

        Ok(index::sample(rng, open.len(), robots).into_iter()
            .zip(&self.robot_colors)
            .map(|(picked, robot)| RobotPosition::new(*robot, open[picked]))
            .collect_vec())
    }

    /// Any goal of this board, uniformly.
    pub fn random_goal<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Goal> {
        self.random_goal_excluding(&[], rng)
    }

    /// A uniformly chosen goal that is not in `used`.
    ///
    /// [`None`] means every goal has been played, which ends a game.
    pub fn random_goal_excluding<R: Rng + ?Sized>(&self, used: &[Goal], rng: &mut R) -> Option<Goal> {
        self.goals.iter()
            .filter(|goal| !used.contains(goal))
            .copied()
            .collect_vec()
            .choose(rng)
            .copied()
    }

    /// Can a robot cross the edge on the `step` side of `from`?
    /// The edge is blocked if either cell draws a wall on it or if it is the border of the board.
    fn can_cross(&self, from: Location, step: Step) -> Option<Location> {
        let to = step.attempt_from(from);
        let here = self.walls_at(from)?;
        let there = self.walls_at(to)?;
        (!here.has(step) && !there.has(step.invert())).then_some(to)
    }

    /// The cell `robot` comes to rest on when it slides in direction `step`.
    ///
    /// The robot keeps going until a wall, the border or another robot stops it, so the result equals the start when it cannot move at all.
    /// Returns [`None`] if `robot` is not among `positions`.
    pub fn slide(&self, positions: &[RobotPosition], robot: Color, step: Step) -> Option<Location> {
        let mut current = position_of(positions, robot)?;
        while let Some(next) = self.can_cross(current, step) {
            if positions.iter().any(|placed| placed.position == next) {
                break;
            }
            current = next;
        }
        Some(current)
    }

    /// Is `mv` a legal slide from `positions`?
    ///
    /// The robot must exist, `to` must lie on the same row or the same column, and `to` must be exactly where the slide in that direction stops.
    /// Diagonal targets, targets short of the stopping point and targets past a wall or robot are all illegal.
    pub fn is_valid_move(&self, mv: &Move, positions: &[RobotPosition]) -> bool {
        let Some(from) = position_of(positions, mv.robot) else {
            return false;
        };
        let Some(step) = Step::between(from, mv.to) else {
            return false;
        };

        self.slide(positions, mv.robot, step) == Some(mv.to)
    }

    /// Play `moves` in order.
    ///
    /// Returns the new positions, or [`None`] as soon as one move is illegal; the input is never modified.
    pub fn apply_moves(&self, moves: &[Move], positions: &[RobotPosition]) -> Option<Vec<RobotPosition>> {
        moves.iter().try_fold(positions.to_vec(), |mut current, mv| {
            if !self.is_valid_move(mv, &current) {
                return None;
            }
            current.iter_mut().find(|placed| placed.robot == mv.robot)?.position = mv.to;
            Some(current)
        })
    }

    /// Does the robot of the goal's colour stand on the goal cell?
    pub fn is_solved(&self, positions: &[RobotPosition], goal: &Goal) -> bool {
        position_of(positions, goal.color) == Some(goal.location(self.size()))
    }

    /// Check a submitted solution: all `moves` must be legal and must end with the goal reached.
    ///
    /// On success returns the positions after the last move.
    pub fn solve(&self, positions: &[RobotPosition], goal: &Goal, moves: &[Move]) -> Option<Vec<RobotPosition>> {
        self.apply_moves(moves, positions)
            .filter(|after| self.is_solved(after, goal))
    }

    /// Draw the board as ASCII art with the robots at `positions`.
    ///
    /// Walls are `|` and `---`, enclosed cells `###`, goals their lowercase [`symbol`](Color::symbol) and robots the uppercase one.
    pub fn render(&self, positions: &[RobotPosition]) -> String {
        let size = self.size();
        let mut out = String::new();

        let blocked = |location: Location, step: Step| {
            let here = self.walls_at(location).is_some_and(|walls| walls.has(step));
            let there = self.walls_at(step.attempt_from(location)).map_or(true, |walls| walls.has(step.invert()));
            here || there
        };

        for row in 0..=size {
            for column in 0..size {
                let below = Location(row, column);
                let wall = if row == size {
                    true
                } else {
                    blocked(below, Step::Up)
                };
                out.push('+');
                out.push_str(if wall { "---" } else { "   " });
            }
            out.push_str("+\n");

            if row == size {
                break;
            }

            for column in 0..size {
                let location = Location(row, column);
                out.push(if blocked(location, Step::Left) { '|' } else { ' ' });

                let robot = positions.iter().find(|placed| placed.position == location);
                let goal = self.goals.iter().find(|goal| goal.location(size) == location);
                match (robot, goal) {
                    _ if self.walls_at(location).is_some_and(Walls::is_enclosed) => out.push_str("###"),
                    (Some(placed), _) => out.push_str(&format!(" {} ", placed.robot.symbol().to_ascii_uppercase())),
                    (None, Some(goal)) => out.push_str(&format!(" {} ", goal.color.symbol())),
                    (None, None) => out.push_str(" . "),
                }
            }
            out.push_str("|\n");
        }

        out
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(&[]))
    }
}
