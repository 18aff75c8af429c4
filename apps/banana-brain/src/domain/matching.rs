//! Card-matching board with a two-card flip buffer.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::domain::deck::{build_deck, Card};
use crate::domain::latch::Latch;
use crate::domain::policy::RoundConfig;
use crate::domain::round::EndReason;
use crate::errors::domain::{DomainError, ValidationKind};

/// Cards that may be face-up and unresolved at once.
pub const FLIP_BUFFER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    /// Accepting flips, countdown running.
    Active,
    /// Two cards face-up; waiting out the resolve delay. Countdown paused.
    Resolving,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipRejection {
    BoardEnded,
    /// Two unresolved cards are already face-up.
    BufferFull,
    OutOfRange,
    AlreadyMatched,
    AlreadyFlipped,
}

impl fmt::Display for FlipRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FlipRejection::BoardEnded => "the board is finished",
            FlipRejection::BufferFull => "two cards are already face-up",
            FlipRejection::OutOfRange => "no card at that position",
            FlipRejection::AlreadyMatched => "that card is already matched",
            FlipRejection::AlreadyFlipped => "that card is already face-up",
        };
        f.write_str(msg)
    }
}

impl From<FlipRejection> for DomainError {
    fn from(r: FlipRejection) -> Self {
        DomainError::validation(ValidationKind::InvalidCard, r.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairResult {
    Match,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEffect {
    StartCountdown,
    StopCountdown,
    /// Deliver `resolve` after the delay.
    ScheduleResolve(Duration),
    ReportFinalScore { score: u32, reason: EndReason },
}

#[derive(Debug, Clone)]
pub struct MatchBoard {
    config: RoundConfig,
    cards: Vec<Card>,
    face_up: Vec<usize>,
    pending: Option<PairResult>,
    score: u32,
    time_remaining: u32,
    phase: BoardPhase,
    end_reason: Option<EndReason>,
    final_score: Option<u32>,
    reported: Latch,
}

impl MatchBoard {
    /// Deal a shuffled board sized for the config's tier and start the clock.
    pub fn start<R: Rng>(
        config: RoundConfig,
        rng: &mut R,
    ) -> Result<(Self, Vec<MatchEffect>), DomainError> {
        let cards = build_deck(config.tier.pair_count(), rng)?;
        Ok((Self::with_cards(config, cards), vec![MatchEffect::StartCountdown]))
    }

    /// Board over a caller-supplied layout.
    pub fn with_cards(config: RoundConfig, cards: Vec<Card>) -> Self {
        let time_remaining = config.seconds_per_turn;
        Self {
            config,
            cards,
            face_up: Vec::with_capacity(FLIP_BUFFER),
            pending: None,
            score: 0,
            time_remaining,
            phase: BoardPhase::Active,
            end_reason: None,
            final_score: None,
            reported: Latch::new(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn pending(&self) -> Option<PairResult> {
        self.pending
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Score including the time bonus, once the board has ended.
    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.is_matched).count() / 2
    }

    pub fn all_matched(&self) -> bool {
        self.cards.iter().all(|c| c.is_matched)
    }

    pub fn flip(&mut self, index: usize) -> Result<Vec<MatchEffect>, FlipRejection> {
        if self.phase == BoardPhase::Ended {
            return Err(FlipRejection::BoardEnded);
        }
        if self.face_up.len() >= FLIP_BUFFER || self.phase == BoardPhase::Resolving {
            return Err(FlipRejection::BufferFull);
        }
        let card = self.cards.get(index).ok_or(FlipRejection::OutOfRange)?;
        if card.is_matched {
            return Err(FlipRejection::AlreadyMatched);
        }
        if card.is_flipped {
            return Err(FlipRejection::AlreadyFlipped);
        }

        self.cards[index].is_flipped = true;
        self.face_up.push(index);
        if self.face_up.len() < FLIP_BUFFER {
            return Ok(Vec::new());
        }

        let (a, b) = (self.face_up[0], self.face_up[1]);
        self.phase = BoardPhase::Resolving;
        let delay = if self.cards[a].icon == self.cards[b].icon {
            self.cards[a].is_matched = true;
            self.cards[b].is_matched = true;
            self.score += self.config.policy.score_unit;
            self.pending = Some(PairResult::Match);
            debug!(score = self.score, "Pair matched");
            self.config.policy.correct_delay
        } else {
            self.pending = Some(PairResult::Mismatch);
            self.config.policy.incorrect_delay
        };
        Ok(vec![
            MatchEffect::StopCountdown,
            MatchEffect::ScheduleResolve(delay),
        ])
    }

    /// Settle the face-up pair after the display delay. A cleared board ends
    /// here with the remaining seconds added as a bonus.
    pub fn resolve(&mut self) -> Vec<MatchEffect> {
        if self.phase != BoardPhase::Resolving {
            return Vec::new();
        }
        if self.pending == Some(PairResult::Mismatch) {
            for &i in &self.face_up {
                self.cards[i].is_flipped = false;
            }
        }
        self.face_up.clear();
        self.pending = None;

        if self.all_matched() {
            return self.end(EndReason::BoardCleared);
        }
        self.phase = BoardPhase::Active;
        vec![MatchEffect::StartCountdown]
    }

    pub fn tick(&mut self) -> Vec<MatchEffect> {
        if self.phase != BoardPhase::Active {
            return Vec::new();
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            return self.end(EndReason::Timeout);
        }
        Vec::new()
    }

    /// Idempotent; the final score is reported once.
    pub fn end(&mut self, reason: EndReason) -> Vec<MatchEffect> {
        if self.phase == BoardPhase::Ended {
            return Vec::new();
        }
        self.phase = BoardPhase::Ended;
        self.end_reason = Some(reason);
        let final_score = match reason {
            EndReason::BoardCleared => self.score + self.time_remaining,
            _ => self.score,
        };
        self.final_score = Some(final_score);
        debug!(final_score, ?reason, "Board ended");

        let mut effects = vec![MatchEffect::StopCountdown];
        if reason != EndReason::Quit && self.reported.fire() {
            effects.push(MatchEffect::ReportFinalScore {
                score: final_score,
                reason,
            });
        }
        effects
    }

    pub fn quit(&mut self) -> Vec<MatchEffect> {
        self.reported.fire();
        self.end(EndReason::Quit)
    }
}
