//! The state machine of one game: claims, move submissions and the two timers, with no I/O.
//!
//! Every operation returns a [`Transition`]: the events to broadcast and at most one timer to schedule.
//! Scheduling is up to the caller (see [`actor`](crate::actor)); a timer only has to hand back its [`TimerToken`] when it fires.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::board::{Board, Move, RobotPosition};
use crate::builder::BoardError;
use crate::config::TimerConfig;
use crate::tile::Goal;
use crate::wire::{GameData, RoundEvent};

/// Identifies a player across rounds; assigned by whoever authenticates players.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// Someone taking part in a round.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Player {
    /// Stable identity, used to check who may submit moves.
    pub id: PlayerId,
    /// Shown to other players in broadcasts.
    pub name: String,
}

impl Player {
    /// A player with the given id and display name.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id: PlayerId(id), name: name.into() }
    }
}

/// Where a round is in the life of its current goal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Not started yet.
    Idle,
    /// Claims are taken for the current goal.
    OpenForSolution,
    /// Only the claim holder may act, by submitting moves.
    OpenForMoves,
    /// Every goal has been played.
    Finished,
}

/// The best claim so far for the current goal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claim {
    /// Player with the best claim.
    pub holder: Player,
    /// Length of the route claimed.
    pub nr_moves: usize,
}

/// Identifies the goal and phase a timer was scheduled for.
///
/// Each phase change issues a fresh token, so a timer carrying an older one is stale and does nothing when it fires.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TimerToken(u64);

impl TimerToken {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// The two timers of a goal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TimerKind {
    /// Closes claims.
    Think,
    /// Closes move submission.
    Move,
}

/// A request to call [`Round::fire`] with `kind` and `token` once `after` has passed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Timer {
    /// Which window the timer closes.
    pub kind: TimerKind,
    /// Must match [`Round::token`] when the timer fires.
    pub token: TimerToken,
    /// Delay from scheduling.
    pub after: Duration,
}

/// The observable effect of one operation. Empty when the operation was rejected.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Transition {
    /// Broadcast in order.
    pub events: Vec<RoundEvent>,
    /// At most one timer per operation.
    pub timer: Option<Timer>,
}

impl Transition {
    /// Whether the operation was rejected.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.timer.is_none()
    }
}

/// A copy of a round's state for late joiners and hints.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundSnapshot {
    /// Board, positions and goal.
    pub game: GameData,
    /// Current phase.
    pub phase: Phase,
    /// The best claim for the current goal.
    pub claim: Option<Claim>,
    /// Goals already won or forfeited, oldest first.
    pub completed_goals: Vec<Goal>,
}

/// One game on one board: goal after goal until every goal has been played.
///
/// Positions and goals are re-randomized against the same immutable [`Board`].
/// Rejected claims and submissions are ordinary outcomes of players racing each other; they leave the round untouched and return an empty [`Transition`].
pub struct Round {
    board: Arc<Board>,
    positions: Vec<RobotPosition>,
    completed_goals: Vec<Goal>,
    current_goal: Option<Goal>,
    phase: Phase,
    claim: Option<Claim>,
    token: TimerToken,
    deadline: Option<Instant>,
    timers: TimerConfig,
    rng: ChaCha8Rng,
}

impl Round {
    /// A round on `board`; it stays [`Idle`](Phase::Idle) until [`start`](Self::start)ed.
    pub fn new(board: Arc<Board>, timers: TimerConfig, rng: ChaCha8Rng) -> Self {
        Self {
            board,
            positions: Vec::new(),
            completed_goals: Vec::new(),
            current_goal: None,
            phase: Phase::Idle,
            claim: None,
            token: TimerToken::default(),
            deadline: None,
            timers,
            rng,
        }
    }

    /// Place the robots, pick the first goal and open claims.
    ///
    /// Starting again restarts the game on the same board; timers of the previous game go stale.
    pub fn start(&mut self) -> Result<Transition, BoardError> {
        let positions = self.board.random_open_positions(&mut self.rng)?;
        Ok(self.begin(positions))
    }

    /// Swap in a new board and [`start`](Self::start) on it.
    ///
    /// If the robots do not fit on `board`, the round keeps its old board and state.
    pub fn reset(&mut self, board: Arc<Board>) -> Result<Transition, BoardError> {
        let positions = board.random_open_positions(&mut self.rng)?;
        self.board = board;
        Ok(self.begin(positions))
    }

    fn begin(&mut self, positions: Vec<RobotPosition>) -> Transition {
        self.positions = positions;
        self.completed_goals.clear();
        self.claim = None;
        self.deadline = None;
        self.token = self.token.next();
        self.current_goal = self.board.random_goal(&mut self.rng);

        let mut transition = Transition::default();
        transition.events.push(RoundEvent::StartNewGame(self.game_data()));
        match self.current_goal {
            Some(goal) => {
                self.phase = Phase::OpenForSolution;
                info!("game started, first goal is {} at {}", goal.color, goal.number);
            }
            None => {
                self.phase = Phase::Finished;
                transition.events.push(RoundEvent::GameFinished);
                info!("game started on a board without goals");
            }
        }

        transition
    }

    /// Claim a route of `nr_moves` slides to the current goal.
    ///
    /// Accepted while claims are open and the claim is strictly shorter than the best so far.
    /// The first accepted claim for a goal starts the think timer; later improvements do not restart it.
    pub fn claim_solution(&mut self, player: Player, nr_moves: usize, now: Instant) -> Transition {
        if self.phase != Phase::OpenForSolution {
            trace!("claim by {} while {:?}", player.name, self.phase);
            return Transition::default();
        }
        if let Some(best) = &self.claim {
            if nr_moves >= best.nr_moves {
                trace!("claim of {nr_moves} by {} does not beat {}", player.name, best.nr_moves);
                return Transition::default();
            }
        }

        let mut transition = Transition::default();
        let deadline = match self.deadline {
            Some(deadline) => deadline,
            None => {
                transition.timer = Some(Timer { kind: TimerKind::Think, token: self.token, after: self.timers.think_timeout });
                let deadline = now + self.timers.think_timeout;
                self.deadline = Some(deadline);
                deadline
            }
        };

        debug!("{} claims {nr_moves} moves", player.name);
        transition.events.push(RoundEvent::SolutionIn {
            seconds_left: deadline.saturating_duration_since(now).as_secs(),
            current_winner: player.name.clone(),
            current_winner_id: player.id,
            current_nr_moves: nr_moves,
        });
        self.claim = Some(Claim { holder: player, nr_moves });

        transition
    }

    /// Submit the route behind the best claim.
    ///
    /// Accepted only from the claim holder, only once claims are closed, only with no more moves than claimed and only if [`Board::solve`] accepts the route.
    /// Success moves the robots, cancels the move timer and advances to the next goal.
    pub fn submit_moves(&mut self, player: PlayerId, moves: Vec<Move>) -> Transition {
        if self.phase != Phase::OpenForMoves {
            trace!("moves from {player:?} while {:?}", self.phase);
            return Transition::default();
        }
        let (Some(claim), Some(goal)) = (&self.claim, self.current_goal) else {
            return Transition::default();
        };
        if claim.holder.id != player {
            trace!("moves from {player:?}, but {:?} holds the claim", claim.holder.id);
            return Transition::default();
        }
        if moves.len() > claim.nr_moves {
            trace!("{} submitted {} moves after claiming {}", claim.holder.name, moves.len(), claim.nr_moves);
            return Transition::default();
        }
        let Some(after) = self.board.solve(&self.positions, &goal, &moves) else {
            trace!("{} submitted a route that does not solve the goal", claim.holder.name);
            return Transition::default();
        };

        info!("{} reached {} at {} in {} moves", claim.holder.name, goal.color, goal.number, moves.len());
        let mut transition = Transition::default();
        transition.events.push(RoundEvent::GoalWonBy {
            winner: claim.holder.name.clone(),
            moves,
            robot_positions: after.clone(),
        });
        self.positions = after;
        self.advance(&mut transition);

        transition
    }

    /// A timer scheduled by an earlier [`Transition`] has run out.
    ///
    /// Does nothing unless `token` is still the live token and the round is in the phase the timer closes.
    pub fn fire(&mut self, kind: TimerKind, token: TimerToken, now: Instant) -> Transition {
        if token != self.token {
            trace!("stale {kind:?} timer");
            return Transition::default();
        }

        let mut transition = Transition::default();
        match (kind, self.phase) {
            (TimerKind::Think, Phase::OpenForSolution) => {
                // the think timer is only scheduled by an accepted claim
                let Some(claim) = &self.claim else {
                    return transition;
                };
                self.phase = Phase::OpenForMoves;
                self.token = self.token.next();
                self.deadline = Some(now + self.timers.move_timeout);
                debug!("claims closed, {} has to move", claim.holder.name);

                transition.events.push(RoundEvent::ClosedForSolutions {
                    seconds_left: self.timers.move_timeout.as_secs(),
                    current_winner: claim.holder.name.clone(),
                    current_winner_id: claim.holder.id,
                });
                transition.timer = Some(Timer { kind: TimerKind::Move, token: self.token, after: self.timers.move_timeout });
            }
            (TimerKind::Move, Phase::OpenForMoves) => {
                debug!("no valid moves in time, goal forfeited");
                transition.events.push(RoundEvent::ClosedForMoves);
                self.advance(&mut transition);
            }
            _ => trace!("{kind:?} timer fired while {:?}", self.phase),
        }

        transition
    }

    /// Retire the current goal and open the next, or finish the game when none are left.
    fn advance(&mut self, transition: &mut Transition) {
        if let Some(goal) = self.current_goal.take() {
            self.completed_goals.push(goal);
        }
        self.claim = None;
        self.deadline = None;
        self.token = self.token.next();

        match self.board.random_goal_excluding(&self.completed_goals, &mut self.rng) {
            Some(goal) => {
                self.current_goal = Some(goal);
                self.phase = Phase::OpenForSolution;
                debug!("next goal is {} at {}", goal.color, goal.number);
                transition.events.push(RoundEvent::NewGoal { goal, robot_positions: self.positions.clone() });
            }
            None => {
                self.phase = Phase::Finished;
                info!("game finished after {} goals", self.completed_goals.len());
                transition.events.push(RoundEvent::GameFinished);
            }
        }
    }

    /// The board this game is played on.
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Where the robots stand now.
    pub fn positions(&self) -> &[RobotPosition] {
        &self.positions
    }

    /// Goals already played, oldest first.
    pub fn completed_goals(&self) -> &[Goal] {
        &self.completed_goals
    }

    /// [`None`] before the start and after the last goal.
    pub fn current_goal(&self) -> Option<Goal> {
        self.current_goal
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The best claim for the current goal, if any.
    pub fn claim(&self) -> Option<&Claim> {
        self.claim.as_ref()
    }

    /// The token a timer scheduled now would have to carry.
    pub fn token(&self) -> TimerToken {
        self.token
    }

    /// The board and live positions in wire form.
    pub fn game_data(&self) -> GameData {
        GameData::new(&self.board, &self.positions, self.current_goal)
    }

    /// Copy out everything a late joiner needs.
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            game: self.game_data(),
            phase: self.phase,
            claim: self.claim.clone(),
            completed_goals: self.completed_goals.clone(),
        }
    }

    /// Put the robots and goal in a known state with claims open.
    #[cfg(test)]
    pub(crate) fn arrange(&mut self, positions: Vec<RobotPosition>, goal: Goal) {
        self.positions = positions;
        self.current_goal = Some(goal);
        self.phase = Phase::OpenForSolution;
        self.claim = None;
        self.deadline = None;
        self.token = self.token.next();
    }
}
