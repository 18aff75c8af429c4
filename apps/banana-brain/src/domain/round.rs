//! Timed puzzle round: a pure transition function over explicit events.
//!
//! Timers and network fetches live outside this module. The runner turns
//! them into [`RoundEvent`]s and carries out the [`RoundEffect`]s returned
//! by [`RoundMachine::apply`]. Every event is checked against the current
//! phase, so a duplicate or late delivery (a tick after the round ended, a
//! second "feedback elapsed") is a no-op.

use std::time::Duration;

use tracing::debug;

use crate::domain::latch::Latch;
use crate::domain::policy::{RoundConfig, TimeoutPolicy};
use crate::domain::puzzle::Puzzle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the puzzle source.
    Loading,
    /// Puzzle on screen, countdown running.
    AwaitingAnswer,
    FeedbackCorrect,
    FeedbackIncorrect,
    /// Terminal. Nothing mutates after this.
    Ended,
}

/// Why the round reached [`Phase::Ended`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Timeout,
    LivesExhausted,
    BoardCleared,
    /// Player left early; no score is reported.
    Quit,
}

/// What the last turn's feedback screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    PuzzleLoaded(Puzzle),
    PuzzleFailed(String),
    RetryFetch,
    Answer(u8),
    Tick,
    FeedbackElapsed,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEffect {
    FetchPuzzle,
    /// Arm the countdown for a fresh turn.
    StartCountdown,
    StopCountdown,
    /// Deliver `FeedbackElapsed` after the delay.
    ScheduleAdvance(Duration),
    /// Display-only milestone.
    LevelUp { level: u32 },
    ReportFinalScore { score: u32, reason: EndReason },
}

/// Observable state of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    pub phase: Phase,
    pub score: u32,
    pub lives_remaining: Option<u8>,
    pub time_remaining: u32,
    pub current_puzzle: Option<Puzzle>,
    pub correct_answers: u32,
    pub level: u32,
    pub last_feedback: Option<Feedback>,
    /// Set while a failed fetch waits for a retry.
    pub fetch_error: Option<String>,
    pub end_reason: Option<EndReason>,
}

#[derive(Debug, Clone)]
pub struct RoundMachine {
    config: RoundConfig,
    state: RoundState,
    fetch_in_flight: bool,
    reported: Latch,
}

impl RoundMachine {
    /// Fresh round: score 0, lives at the policy default, first fetch requested.
    pub fn start(config: RoundConfig) -> (Self, Vec<RoundEffect>) {
        let state = RoundState {
            phase: Phase::Loading,
            score: 0,
            lives_remaining: config.policy.lives,
            time_remaining: config.seconds_per_turn,
            current_puzzle: None,
            correct_answers: 0,
            level: 1,
            last_feedback: None,
            fetch_error: None,
            end_reason: None,
        };
        debug!(tier = %config.tier, lives = ?state.lives_remaining, "Round started");
        let machine = Self {
            config,
            state,
            fetch_in_flight: true,
            reported: Latch::new(),
        };
        (machine, vec![RoundEffect::FetchPuzzle])
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_ended(&self) -> bool {
        self.state.phase == Phase::Ended
    }

    pub fn apply(&mut self, event: RoundEvent) -> Vec<RoundEffect> {
        if self.is_ended() {
            return Vec::new();
        }
        match event {
            RoundEvent::PuzzleLoaded(puzzle) => self.on_puzzle_loaded(puzzle),
            RoundEvent::PuzzleFailed(message) => self.on_puzzle_failed(message),
            RoundEvent::RetryFetch => self.on_retry(),
            RoundEvent::Answer(candidate) => self.submit_answer(candidate),
            RoundEvent::Tick => self.tick(),
            RoundEvent::FeedbackElapsed => self.on_feedback_elapsed(),
            RoundEvent::Quit => self.quit(),
        }
    }

    /// Compare `candidate` with the current solution. Ignored outside
    /// [`Phase::AwaitingAnswer`].
    pub fn submit_answer(&mut self, candidate: u8) -> Vec<RoundEffect> {
        if self.state.phase != Phase::AwaitingAnswer {
            return Vec::new();
        }
        let Some(solved) = self
            .state
            .current_puzzle
            .as_ref()
            .map(|p| p.is_solved_by(candidate))
        else {
            return Vec::new();
        };

        let policy = self.config.policy.clone();
        let mut effects = vec![RoundEffect::StopCountdown];

        if solved {
            self.state.score += policy.score_unit;
            self.state.correct_answers += 1;
            self.state.phase = Phase::FeedbackCorrect;
            self.state.last_feedback = Some(Feedback::Correct);
            if let Some(every) = policy.level_up_every {
                if self.state.correct_answers % every == 0 {
                    self.state.level = self.state.correct_answers / every + 1;
                    effects.push(RoundEffect::LevelUp {
                        level: self.state.level,
                    });
                }
            }
            effects.push(RoundEffect::ScheduleAdvance(policy.correct_delay));
            debug!(score = self.state.score, "Transition: -> FeedbackCorrect");
        } else {
            self.lose_life();
            self.state.phase = Phase::FeedbackIncorrect;
            self.state.last_feedback = Some(Feedback::Incorrect);
            effects.push(RoundEffect::ScheduleAdvance(policy.incorrect_delay));
            debug!(lives = ?self.state.lives_remaining, "Transition: -> FeedbackIncorrect");
        }
        effects
    }

    /// One countdown interval. Only counts while an answer is awaited.
    pub fn tick(&mut self) -> Vec<RoundEffect> {
        if self.state.phase != Phase::AwaitingAnswer {
            return Vec::new();
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        if self.state.time_remaining > 0 {
            return Vec::new();
        }

        let timeout = self.config.policy.timeout;
        match timeout {
            TimeoutPolicy::EndRound => self.end(EndReason::Timeout),
            TimeoutPolicy::ConsumeLife => {
                self.lose_life();
                self.state.phase = Phase::FeedbackIncorrect;
                self.state.last_feedback = Some(Feedback::TimedOut);
                debug!(lives = ?self.state.lives_remaining, "Turn timed out");
                vec![
                    RoundEffect::StopCountdown,
                    RoundEffect::ScheduleAdvance(self.config.policy.incorrect_delay),
                ]
            }
        }
    }

    /// Move to [`Phase::Ended`]. Idempotent: the final score is reported on
    /// the first call only, whichever terminal trigger got there first.
    pub fn end(&mut self, reason: EndReason) -> Vec<RoundEffect> {
        if self.is_ended() {
            return Vec::new();
        }
        self.state.phase = Phase::Ended;
        self.state.end_reason = Some(reason);
        self.fetch_in_flight = false;
        debug!(score = self.state.score, ?reason, "Transition: -> Ended");

        let mut effects = vec![RoundEffect::StopCountdown];
        if reason != EndReason::Quit && self.reported.fire() {
            effects.push(RoundEffect::ReportFinalScore {
                score: self.state.score,
                reason,
            });
        }
        effects
    }

    /// End without a report.
    pub fn quit(&mut self) -> Vec<RoundEffect> {
        self.reported.fire();
        self.end(EndReason::Quit)
    }

    fn on_puzzle_loaded(&mut self, puzzle: Puzzle) -> Vec<RoundEffect> {
        if self.state.phase != Phase::Loading || !self.fetch_in_flight {
            return Vec::new();
        }
        self.fetch_in_flight = false;
        self.state.current_puzzle = Some(puzzle);
        self.state.fetch_error = None;
        self.state.time_remaining = self.config.seconds_per_turn;
        self.state.phase = Phase::AwaitingAnswer;
        debug!("Transition: -> AwaitingAnswer");
        vec![RoundEffect::StartCountdown]
    }

    fn on_puzzle_failed(&mut self, message: String) -> Vec<RoundEffect> {
        if self.state.phase != Phase::Loading || !self.fetch_in_flight {
            return Vec::new();
        }
        self.fetch_in_flight = false;
        self.state.fetch_error = Some(message);
        Vec::new()
    }

    fn on_retry(&mut self) -> Vec<RoundEffect> {
        if self.state.phase != Phase::Loading
            || self.fetch_in_flight
            || self.state.fetch_error.is_none()
        {
            return Vec::new();
        }
        self.fetch_in_flight = true;
        self.state.fetch_error = None;
        vec![RoundEffect::FetchPuzzle]
    }

    fn on_feedback_elapsed(&mut self) -> Vec<RoundEffect> {
        if !matches!(
            self.state.phase,
            Phase::FeedbackCorrect | Phase::FeedbackIncorrect
        ) {
            return Vec::new();
        }
        if self.state.lives_remaining == Some(0) {
            return self.end(EndReason::LivesExhausted);
        }
        self.state.current_puzzle = None;
        self.state.phase = Phase::Loading;
        self.fetch_in_flight = true;
        debug!("Transition: -> Loading");
        vec![RoundEffect::FetchPuzzle]
    }

    fn lose_life(&mut self) {
        if let Some(lives) = self.state.lives_remaining.as_mut() {
            *lives = lives.saturating_sub(1);
        }
    }
}
