//! Runs a [`Round`] as a task that owns it.
//!
//! Claims, submissions and timer firings are messages on one ordered channel, handled strictly one at a time.
//! Broadcasts go out on a [`broadcast`] channel in the same order, and a timer is a sleeping task that posts [`Command::Fire`] back to the round.
//! A superseded timer still posts; [`Round::fire`] discards it by its token.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{sleep, timeout, Instant};

use crate::board::{Board, Move, RobotPosition};
use crate::builder::BoardError;
use crate::config::GameConfig;
use crate::round::{Player, PlayerId, Round, RoundSnapshot, Timer, TimerKind, TimerToken, Transition};
use crate::solver::{Solver, SolverFailure};
use crate::tile::Goal;
use crate::wire::RoundEvent;

/// Failures talking to a running round.
#[derive(Debug, Error)]
pub enum RoundError {
    /// The round did not answer within the configured reply timeout.
    ///
    /// The command may still have been queued and applied; a retried claim can then come back `Ok(false)` against the caller's own earlier claim.
    #[error("round did not answer in time")]
    Timeout,
    /// The round task has stopped.
    #[error("round has shut down")]
    Closed,
    /// The new board cannot host a game.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// The hint search gave up.
    #[error(transparent)]
    Solver(#[from] SolverFailure),
}

/// What the hint path needs, copied out of the round.
struct Puzzle {
    board: Arc<Board>,
    positions: Vec<RobotPosition>,
    goal: Option<Goal>,
}

enum Command {
    Claim { player: Player, nr_moves: usize, reply: oneshot::Sender<bool> },
    Submit { player: PlayerId, moves: Vec<Move>, reply: oneshot::Sender<bool> },
    Fire { kind: TimerKind, token: TimerToken },
    Snapshot { reply: oneshot::Sender<RoundSnapshot> },
    Puzzle { reply: oneshot::Sender<Puzzle> },
    NewGame { board: Arc<Board>, reply: oneshot::Sender<Result<(), BoardError>> },
}

/// Cloneable access to one running round.
///
/// The round task stops once every handle is dropped.
#[derive(Clone)]
pub struct RoundHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<RoundEvent>,
    reply_timeout: Duration,
    solver_max_depth: usize,
}

/// Start a game on `board` in a new task.
///
/// Must be called from within a Tokio runtime. The returned receiver already holds the game's
/// [`StartNewGame`](RoundEvent::StartNewGame) event.
pub fn spawn(board: Arc<Board>, config: &GameConfig) -> Result<(RoundHandle, broadcast::Receiver<RoundEvent>), RoundError> {
    let rng = match config.round.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut round = Round::new(board, config.timers, rng);

    let (events, receiver) = broadcast::channel(config.round.channel_capacity);
    let (commands, inbox) = mpsc::channel(config.round.channel_capacity);
    let actor = RoundActor { timers: commands.downgrade(), inbox, events: events.clone() };

    let started = round.start()?;
    actor.publish(started);
    tokio::spawn(actor.run(round));

    let handle = RoundHandle {
        commands,
        events,
        reply_timeout: config.round.reply_timeout,
        solver_max_depth: config.solver.max_depth,
    };
    Ok((handle, receiver))
}

impl RoundHandle {
    /// A new receiver of every event broadcast from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }

    /// Send a command and wait for its answer, giving up after the reply timeout.
    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, RoundError> {
        let (reply, answer) = oneshot::channel();
        let exchange = async {
            self.commands.send(command(reply)).await.map_err(|_| RoundError::Closed)?;
            answer.await.map_err(|_| RoundError::Closed)
        };

        timeout(self.reply_timeout, exchange).await.map_err(|_| RoundError::Timeout)?
    }

    /// Claim a route of `nr_moves` slides. `Ok(false)` means the claim was not accepted.
    pub async fn claim_solution(&self, player: Player, nr_moves: usize) -> Result<bool, RoundError> {
        self.request(|reply| Command::Claim { player, nr_moves, reply }).await
    }

    /// Submit the route behind the best claim. `Ok(false)` means it was not accepted.
    pub async fn submit_moves(&self, player: PlayerId, moves: Vec<Move>) -> Result<bool, RoundError> {
        self.request(|reply| Command::Submit { player, moves, reply }).await
    }

    /// The round's current state, for players joining late.
    pub async fn snapshot(&self) -> Result<RoundSnapshot, RoundError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Throw away the current game and start over on `board`.
    pub async fn new_game(&self, board: Arc<Board>) -> Result<(), RoundError> {
        Ok(self.request(|reply| Command::NewGame { board, reply }).await??)
    }

    /// Ask the [`Solver`] for a shortest route to the current goal.
    ///
    /// The search runs on a blocking thread against a copy of the positions, so the round keeps taking commands meanwhile.
    pub async fn generate_solution(&self) -> Result<Vec<Move>, RoundError> {
        let Puzzle { board, positions, goal } = self.request(|reply| Command::Puzzle { reply }).await?;
        let goal = goal.ok_or(SolverFailure::Unsolvable)?;
        let max_depth = self.solver_max_depth;

        let route = tokio::task::spawn_blocking(move || {
            Solver::from(board.as_ref()).with_max_depth(max_depth).solve(&positions, &goal)
        }).await.map_err(|_| RoundError::Closed)??;
        Ok(route)
    }
}

struct RoundActor {
    inbox: mpsc::Receiver<Command>,
    // weak, so pending timers do not keep a round alive after its last handle is gone
    timers: mpsc::WeakSender<Command>,
    events: broadcast::Sender<RoundEvent>,
}

impl RoundActor {
    async fn run(mut self, mut round: Round) {
        while let Some(command) = self.inbox.recv().await {
            self.handle(&mut round, command);
        }
        debug!("round stopped");
    }

    fn handle(&self, round: &mut Round, command: Command) {
        match command {
            Command::Claim { player, nr_moves, reply } => {
                let transition = round.claim_solution(player, nr_moves, Instant::now());
                let accepted = !transition.is_empty();
                self.publish(transition);
                let _ = reply.send(accepted);
            }
            Command::Submit { player, moves, reply } => {
                let transition = round.submit_moves(player, moves);
                let accepted = !transition.is_empty();
                self.publish(transition);
                let _ = reply.send(accepted);
            }
            Command::Fire { kind, token } => {
                let transition = round.fire(kind, token, Instant::now());
                self.publish(transition);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(round.snapshot());
            }
            Command::Puzzle { reply } => {
                let _ = reply.send(Puzzle {
                    board: Arc::clone(round.board()),
                    positions: round.positions().to_vec(),
                    goal: round.current_goal(),
                });
            }
            Command::NewGame { board, reply } => {
                let result = round.reset(board).map(|transition| self.publish(transition));
                let _ = reply.send(result);
            }
        }
    }

    fn publish(&self, transition: Transition) {
        for event in transition.events {
            // fails only when nobody is listening
            if self.events.send(event).is_err() {
                trace!("event dropped, no subscribers");
            }
        }
        if let Some(timer) = transition.timer {
            self.schedule(timer);
        }
    }

    fn schedule(&self, timer: Timer) {
        let commands = self.timers.clone();
        tokio::spawn(async move {
            sleep(timer.after).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::Fire { kind: timer.kind, token: timer.token }).await;
            }
        });
    }
}
