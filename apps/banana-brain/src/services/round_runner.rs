//! Async driver for [`RoundMachine`].
//!
//! Turns countdown ticks, feedback delays, puzzle fetches and player input
//! into [`RoundEvent`]s, and carries out the effects the machine returns.
//! The loop owns every timer and the in-flight fetch, so ending, quitting,
//! cancelling or dropping the input channel releases all of them.

use std::future::pending;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    parse_guess, EndReason, Puzzle, RoundConfig, RoundEffect, RoundEvent, RoundMachine,
    RoundState,
};
use crate::error::AppError;
use crate::repos::PuzzleSource;
use crate::services::timers::{Countdown, Delay};

type PuzzleFetch = BoxFuture<'static, Result<Puzzle, AppError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    /// Raw text from the answer box; parsed by the runner.
    Answer(String),
    Retry,
    Quit,
}

/// How a round left the runner. Only `Completed` carries a score to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Completed { score: u32, reason: EndReason },
    Abandoned,
}

/// What the playing screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub state: RoundState,
    /// Inline message for rejected input.
    pub notice: Option<String>,
    /// Most recent level reached, while its banner is up.
    pub level_up: Option<u32>,
    /// Points a correct answer is worth in this round.
    pub score_unit: u32,
}

impl RoundView {
    fn new(machine: &RoundMachine) -> Self {
        Self {
            state: machine.state().clone(),
            notice: None,
            level_up: None,
            score_unit: machine.config().policy.score_unit,
        }
    }
}

/// Handles to a round running on its own task.
pub struct RoundHandle {
    pub input: mpsc::Sender<PlayerInput>,
    pub view: watch::Receiver<RoundView>,
    pub cancel: CancellationToken,
    pub task: JoinHandle<RoundOutcome>,
}

pub struct RoundRunner {
    puzzles: Arc<dyn PuzzleSource>,
    config: RoundConfig,
}

impl RoundRunner {
    pub fn new(puzzles: Arc<dyn PuzzleSource>, config: RoundConfig) -> Self {
        Self { puzzles, config }
    }

    pub fn spawn(self) -> RoundHandle {
        let (input_tx, input_rx) = mpsc::channel(16);
        let (machine, _) = RoundMachine::start(self.config.clone());
        let (view_tx, view_rx) = watch::channel(RoundView::new(&machine));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(input_rx, view_tx, cancel.clone()));
        RoundHandle {
            input: input_tx,
            view: view_rx,
            cancel,
            task,
        }
    }

    /// Play one round to the end. Returns once, with the score reported by
    /// the machine or `Abandoned` when the player quit.
    pub async fn run(
        self,
        mut input: mpsc::Receiver<PlayerInput>,
        view: watch::Sender<RoundView>,
        cancel: CancellationToken,
    ) -> RoundOutcome {
        let (mut machine, effects) = RoundMachine::start(self.config.clone());
        let mut countdown = Countdown::default();
        let mut delay = Delay::default();
        let mut fetch: Option<PuzzleFetch> = None;
        let mut outcome = RoundOutcome::Abandoned;
        let mut shown = RoundView::new(&machine);

        self.carry_out(effects, &mut countdown, &mut delay, &mut fetch, &mut shown, &mut outcome);
        view.send_replace(shown.clone());

        while !machine.is_ended() {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => RoundEvent::Quit,
                msg = input.recv() => match msg {
                    Some(PlayerInput::Answer(raw)) => match parse_guess(&raw) {
                        Ok(digit) => RoundEvent::Answer(digit),
                        Err(e) => {
                            shown.notice = Some(AppError::from(e).user_message());
                            view.send_replace(shown.clone());
                            continue;
                        }
                    },
                    Some(PlayerInput::Retry) => RoundEvent::RetryFetch,
                    Some(PlayerInput::Quit) | None => RoundEvent::Quit,
                },
                result = next_fetch(&mut fetch) => match result {
                    Ok(puzzle) => RoundEvent::PuzzleLoaded(puzzle),
                    Err(e) => {
                        warn!(code = %e.code(), error = %e, "Puzzle fetch failed");
                        RoundEvent::PuzzleFailed(e.user_message())
                    }
                },
                _ = delay.elapsed() => RoundEvent::FeedbackElapsed,
                _ = countdown.tick() => RoundEvent::Tick,
            };

            if !matches!(event, RoundEvent::Tick) {
                debug!(?event, phase = ?machine.phase(), "Round event");
            }
            shown.notice = None;
            let effects = machine.apply(event);
            self.carry_out(effects, &mut countdown, &mut delay, &mut fetch, &mut shown, &mut outcome);
            shown.state = machine.state().clone();
            view.send_replace(shown.clone());
        }

        match outcome {
            RoundOutcome::Completed { score, reason } => {
                info!(score, ?reason, tier = %self.config.tier, "Round finished");
            }
            RoundOutcome::Abandoned => info!(tier = %self.config.tier, "Round abandoned"),
        }
        outcome
    }

    fn carry_out(
        &self,
        effects: Vec<RoundEffect>,
        countdown: &mut Countdown,
        delay: &mut Delay,
        fetch: &mut Option<PuzzleFetch>,
        shown: &mut RoundView,
        outcome: &mut RoundOutcome,
    ) {
        for effect in effects {
            match effect {
                RoundEffect::FetchPuzzle => {
                    let source = Arc::clone(&self.puzzles);
                    *fetch = Some(async move { source.fetch_puzzle().await }.boxed());
                    shown.level_up = None;
                }
                RoundEffect::StartCountdown => countdown.start(),
                RoundEffect::StopCountdown => countdown.stop(),
                RoundEffect::ScheduleAdvance(after) => delay.schedule(after),
                RoundEffect::LevelUp { level } => {
                    info!(level, "Level up");
                    shown.level_up = Some(level);
                }
                RoundEffect::ReportFinalScore { score, reason } => {
                    *outcome = RoundOutcome::Completed { score, reason };
                }
            }
        }
    }
}

/// Resolves with the in-flight fetch, then clears it. Idle when none is running.
async fn next_fetch(fetch: &mut Option<PuzzleFetch>) -> Result<Puzzle, AppError> {
    match fetch.as_mut() {
        Some(pending_fetch) => {
            let result = pending_fetch.await;
            *fetch = None;
            result
        }
        None => pending().await,
    }
}
