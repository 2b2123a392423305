//! Shortest routes for hints.

use log::trace;
use strum::VariantArray;
use thiserror::Error;

use crate::board::{position_of, Board, Move, RobotPosition};
use crate::cell::Walls;
use crate::color::Color;
use crate::location::Location;
use crate::step::Step;
use crate::tile::Goal;

/// Reasons a [`Solver`] may fail.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum SolverFailure {
    /// The goal's robot is not in play, or the goal sits on a cell no robot can stand on.
    #[error("the goal cannot be reached")]
    Unsolvable,
    /// Every route up to `max_depth` slides was searched without success.
    #[error("no solution within {max_depth} moves")]
    DepthExceeded {
        /// The depth limit in force.
        max_depth: usize,
    },
}

/// Finds a shortest sequence of slides that puts the goal's robot on the goal.
///
/// Search is iterative deepening: depth 0, 1, 2 and so on, each pass exploring exactly that many slides, so the first route found is minimal.
/// Two prunes keep it tractable without losing minimality:
/// 1. A robot never slides straight back the way it just came. Sliding back stops at the cell a single slide in that direction would have reached, so the pair is never part of a shortest route.
/// 2. Each slide changes one coordinate, so a branch is cut once the goal robot differs from the goal in more coordinates than there are slides left.
///
/// On the final slide only the goal robot moves.
///
/// The solver is advisory: submitted routes are checked by [`Board::solve`], never by this.
pub struct Solver<'a> {
    board: &'a Board,
    max_depth: usize,
}

/// Deepest search [`Solver::from`] will attempt.
pub const DEFAULT_MAX_DEPTH: usize = 12;

impl<'a> From<&'a Board> for Solver<'a> {
    fn from(board: &'a Board) -> Self {
        Self { board, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl<'a> Solver<'a> {
    /// Stop searching after routes of `max_depth` slides.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Search for a shortest route to `goal` from `positions`.
    ///
    /// Returns an empty route if the goal is already reached.
    pub fn solve(&self, positions: &[RobotPosition], goal: &Goal) -> Result<Vec<Move>, SolverFailure> {
        let target = goal.location(self.board.size());
        if position_of(positions, goal.color).is_none() || self.board.walls_at(target).map_or(true, Walls::is_enclosed) {
            return Err(SolverFailure::Unsolvable);
        }

        let mut current = positions.to_vec();
        let mut route = Vec::new();
        for depth in 0..=self.max_depth {
            trace!("searching routes of {depth} moves");
            if self.search(&mut current, goal, target, depth, None, &mut route) {
                return Ok(route);
            }
        }

        Err(SolverFailure::DepthExceeded { max_depth: self.max_depth })
    }

    /// Depth-first search for a route of exactly `remaining` more slides.
    /// `positions` and `route` are restored before returning `false`.
    fn search(
        &self,
        positions: &mut [RobotPosition],
        goal: &Goal,
        target: Location,
        remaining: usize,
        last: Option<(Color, Step)>,
        route: &mut Vec<Move>,
    ) -> bool {
        if remaining == 0 {
            return self.board.is_solved(positions, goal);
        }

        match position_of(positions, goal.color) {
            Some(at) if at.axis_distance(target) <= remaining => {}
            _ => return false,
        }

        for index in 0..positions.len() {
            let robot = positions[index].robot;
            if remaining == 1 && robot != goal.color {
                continue;
            }

            for step in Step::VARIANTS {
                if last == Some((robot, step.invert())) {
                    continue;
                }

                let from = positions[index].position;
                let Some(to) = self.board.slide(positions, robot, *step) else {
                    continue;
                };
                if to == from {
                    continue;
                }

                positions[index].position = to;
                route.push(Move::new(robot, to));
                if self.search(positions, goal, target, remaining - 1, Some((robot, *step)), route) {
                    return true;
                }
                route.pop();
                positions[index].position = from;
            }
        }

        false
    }
}
