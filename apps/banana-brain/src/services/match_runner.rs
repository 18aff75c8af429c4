//! Async driver for the card-matching board.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{BoardPhase, Card, MatchBoard, MatchEffect, RoundConfig};
use crate::error::AppError;
use crate::services::round_runner::RoundOutcome;
use crate::services::timers::{Countdown, Delay};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardInput {
    /// Zero-based card position.
    Flip(usize),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub cards: Vec<Card>,
    pub score: u32,
    pub time_remaining: u32,
    pub phase: BoardPhase,
    pub matched_pairs: usize,
    pub pair_count: usize,
    pub notice: Option<String>,
}

impl BoardView {
    fn of(board: &MatchBoard) -> Self {
        Self {
            cards: board.cards().to_vec(),
            score: board.final_score().unwrap_or(board.score()),
            time_remaining: board.time_remaining(),
            phase: board.phase(),
            matched_pairs: board.matched_pairs(),
            pair_count: board.pair_count(),
            notice: None,
        }
    }
}

pub struct BoardHandle {
    pub input: mpsc::Sender<BoardInput>,
    pub view: watch::Receiver<BoardView>,
    pub cancel: CancellationToken,
    pub task: JoinHandle<RoundOutcome>,
}

pub struct MatchRunner {
    board: MatchBoard,
    start_effects: Vec<MatchEffect>,
}

impl MatchRunner {
    /// Deal the board now; `seed` fixes the layout.
    pub fn new(config: RoundConfig, seed: Option<u64>) -> Result<Self, AppError> {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let (board, start_effects) = MatchBoard::start(config, &mut rng)?;
        Ok(Self {
            board,
            start_effects,
        })
    }

    /// Play a prepared board.
    pub fn with_board(board: MatchBoard) -> Self {
        Self {
            board,
            start_effects: vec![MatchEffect::StartCountdown],
        }
    }

    pub fn spawn(self) -> BoardHandle {
        let (input_tx, input_rx) = mpsc::channel(16);
        let (view_tx, view_rx) = watch::channel(BoardView::of(&self.board));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(input_rx, view_tx, cancel.clone()));
        BoardHandle {
            input: input_tx,
            view: view_rx,
            cancel,
            task,
        }
    }

    pub async fn run(
        self,
        mut input: mpsc::Receiver<BoardInput>,
        view: watch::Sender<BoardView>,
        cancel: CancellationToken,
    ) -> RoundOutcome {
        let Self {
            mut board,
            start_effects,
        } = self;
        let mut countdown = Countdown::default();
        let mut resolve = Delay::default();
        let mut outcome = RoundOutcome::Abandoned;

        carry_out(start_effects, &mut countdown, &mut resolve, &mut outcome);
        view.send_replace(BoardView::of(&board));

        while board.phase() != BoardPhase::Ended {
            let mut notice = None;
            let effects = tokio::select! {
                biased;
                _ = cancel.cancelled() => board.quit(),
                msg = input.recv() => match msg {
                    Some(BoardInput::Flip(index)) => match board.flip(index) {
                        Ok(effects) => effects,
                        Err(rejection) => {
                            debug!(index, %rejection, "Flip rejected");
                            notice = Some(rejection.to_string());
                            Vec::new()
                        }
                    },
                    Some(BoardInput::Quit) | None => board.quit(),
                },
                _ = resolve.elapsed() => board.resolve(),
                _ = countdown.tick() => board.tick(),
            };
            carry_out(effects, &mut countdown, &mut resolve, &mut outcome);

            let mut shown = BoardView::of(&board);
            shown.notice = notice;
            view.send_replace(shown);
        }

        match outcome {
            RoundOutcome::Completed { score, reason } => {
                info!(score, ?reason, "Board finished");
            }
            RoundOutcome::Abandoned => info!("Board abandoned"),
        }
        outcome
    }
}

fn carry_out(
    effects: Vec<MatchEffect>,
    countdown: &mut Countdown,
    resolve: &mut Delay,
    outcome: &mut RoundOutcome,
) {
    for effect in effects {
        match effect {
            MatchEffect::StartCountdown => countdown.start(),
            MatchEffect::StopCountdown => countdown.stop(),
            MatchEffect::ScheduleResolve(after) => resolve.schedule(after),
            MatchEffect::ReportFinalScore { score, reason } => {
                *outcome = RoundOutcome::Completed { score, reason };
            }
        }
    }
}
