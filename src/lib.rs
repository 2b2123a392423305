#![warn(missing_docs)]

//! # `ricochet`
//!
//! The engine of a real-time multiplayer sliding-robot race: robots slide across a walled grid until something stops them, and players compete to name, then prove, the shortest route that brings one robot onto a goal.
//!
//! Begin with a [`TileCatalog`] and assemble a board from four of its tiles with [`BoardBuilder::generate`], or supply a finished one through [`Board::from_parts`].
//! The [`Board`] holds every rule of the game and never owns robot positions, so one board serves many rounds and the [`Solver`] at once.
//! A game on a board is a [`Round`](round::Round); [`spawn`] runs one in its own task and hands out a [`RoundHandle`] for players' claims and moves.
//!
//! # Rules
//! Each cell stores its walls as a 4-bit mask: 1 is the wall above, 2 the wall to the right, 4 below and 8 to the left.
//! A cell valued 15 is walled in on all sides and never holds a robot.
//!
//! A move names a robot and the cell it will stop on.
//! The robot slides in a straight line and keeps going until the next edge is walled off on either side, the board ends, or another robot is in the way.
//! The move is legal only if that stopping cell is exactly the one named.
//!
//! # A game
//! For each goal:
//! 1. Claims are open. A player claims to know a route of some length, and only claims strictly shorter than the best so far are accepted.
//! The first accepted claim starts the think timer.
//! 2. When it runs out, claims close and only the best claimant may submit a route, no longer than claimed, before the move timer runs out.
//! 3. A valid route moves the robots and wins the goal. Either way the game moves on to a goal not yet played, until none are left.
//!
//! Every phase change issues a new [`TimerToken`](round::TimerToken); a timer that fires with an outdated token does nothing.

pub use actor::{spawn, RoundError, RoundHandle};
pub use board::{Board, Move, RobotPosition};
pub use builder::{BoardBuilder, BoardError, BuilderInvalidReason};
pub use catalog::TileCatalog;
pub use cell::Walls;
pub use color::Color;
pub use config::{ConfigError, GameConfig};
pub use location::Location;
pub use solver::{Solver, SolverFailure};
pub use step::Step;
pub use tile::{Goal, Slot, Tile, TileKind};
pub use wire::{BoardData, GameData, RoundEvent};

mod tests;
pub mod actor;
pub(crate) mod board;
pub mod builder;
pub(crate) mod catalog;
pub(crate) mod cell;
pub(crate) mod color;
pub mod config;
pub(crate) mod location;
pub mod round;
pub mod solver;
pub(crate) mod step;
pub(crate) mod tile;
pub mod wire;
