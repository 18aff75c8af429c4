//! Round rules, collapsed from the separate game screens into one policy.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::tier::DifficultyTier;
use crate::errors::domain::{DomainError, ValidationKind};

/// What the countdown reaching zero does to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// The round ends at once and the current score is reported.
    EndRound,
    /// A life is lost and a fresh puzzle is fetched, as for a wrong answer.
    ConsumeLife,
}

/// Tunable rules for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPolicy {
    pub timeout: TimeoutPolicy,
    /// Starting lives. `None` means the variant does not track lives.
    pub lives: Option<u8>,
    /// Points for each correct answer.
    pub score_unit: u32,
    /// Cosmetic level-up every N correct answers.
    pub level_up_every: Option<u32>,
    /// How long "correct" feedback stays up before the next puzzle.
    pub correct_delay: Duration,
    /// How long "incorrect" / "time up" feedback stays up.
    pub incorrect_delay: Duration,
}

impl RoundPolicy {
    pub const MAX_LIVES: u8 = 9;

    /// Reject combinations the machine cannot play.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.score_unit == 0 {
            return Err(DomainError::validation(
                ValidationKind::InvalidPolicy,
                "score_unit must be positive",
            ));
        }
        match self.lives {
            Some(0) => {
                return Err(DomainError::validation(
                    ValidationKind::InvalidPolicy,
                    "a lives variant must start with at least one life",
                ))
            }
            Some(n) if n > Self::MAX_LIVES => {
                return Err(DomainError::validation(
                    ValidationKind::InvalidPolicy,
                    format!("lives must be at most {}", Self::MAX_LIVES),
                ))
            }
            _ => {}
        }
        if self.timeout == TimeoutPolicy::ConsumeLife && self.lives.is_none() {
            return Err(DomainError::validation(
                ValidationKind::InvalidPolicy,
                "ConsumeLife timeout needs a lives variant",
            ));
        }
        if self.level_up_every == Some(0) {
            return Err(DomainError::validation(
                ValidationKind::InvalidPolicy,
                "level_up_every must be positive",
            ));
        }
        Ok(())
    }
}

/// Named game modes. Each one fixes its timeout consequence explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Numeric guess with three lives; a timeout costs a life.
    #[default]
    PuzzleGuess,
    /// Numeric guess without lives; a timeout ends the round.
    PuzzleSprint,
    /// Card matching against a whole-board countdown; a timeout ends the round.
    CardMatch,
}

impl GameMode {
    pub fn policy(self) -> RoundPolicy {
        match self {
            GameMode::PuzzleGuess => RoundPolicy {
                timeout: TimeoutPolicy::ConsumeLife,
                lives: Some(3),
                score_unit: 10,
                level_up_every: Some(5),
                correct_delay: Duration::from_millis(1500),
                incorrect_delay: Duration::from_millis(1500),
            },
            GameMode::PuzzleSprint => RoundPolicy {
                timeout: TimeoutPolicy::EndRound,
                lives: None,
                score_unit: 10,
                level_up_every: Some(5),
                correct_delay: Duration::from_millis(1500),
                incorrect_delay: Duration::from_millis(1500),
            },
            GameMode::CardMatch => RoundPolicy {
                timeout: TimeoutPolicy::EndRound,
                lives: None,
                score_unit: 10,
                level_up_every: None,
                correct_delay: Duration::from_millis(800),
                incorrect_delay: Duration::from_millis(1200),
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            GameMode::PuzzleGuess => "guess",
            GameMode::PuzzleSprint => "sprint",
            GameMode::CardMatch => "match",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guess" => Ok(GameMode::PuzzleGuess),
            "sprint" => Ok(GameMode::PuzzleSprint),
            "match" | "cards" => Ok(GameMode::CardMatch),
            other => Err(DomainError::validation(
                ValidationKind::Other("GAME_MODE".into()),
                format!("Unknown game mode '{other}'"),
            )),
        }
    }
}

/// Everything a round needs, fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundConfig {
    pub tier: DifficultyTier,
    pub seconds_per_turn: u32,
    pub policy: RoundPolicy,
}

impl RoundConfig {
    pub fn new(tier: DifficultyTier, policy: RoundPolicy) -> Result<Self, DomainError> {
        policy.validate()?;
        Ok(Self {
            tier,
            seconds_per_turn: tier.seconds_per_turn(),
            policy,
        })
    }

    pub fn for_mode(tier: DifficultyTier, mode: GameMode) -> Self {
        Self {
            tier,
            seconds_per_turn: tier.seconds_per_turn(),
            policy: mode.policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for mode in [GameMode::PuzzleGuess, GameMode::PuzzleSprint, GameMode::CardMatch] {
            assert!(mode.policy().validate().is_ok(), "{mode} preset invalid");
        }
    }

    #[test]
    fn consume_life_without_lives_is_rejected() {
        let policy = RoundPolicy {
            lives: None,
            ..GameMode::PuzzleGuess.policy()
        };
        assert!(RoundConfig::new(DifficultyTier::Easy, policy).is_err());
    }

    #[test]
    fn zero_lives_and_zero_unit_are_rejected() {
        let base = GameMode::PuzzleGuess.policy();
        let zero_lives = RoundPolicy {
            lives: Some(0),
            ..base.clone()
        };
        assert!(zero_lives.validate().is_err());
        let zero_unit = RoundPolicy {
            score_unit: 0,
            ..base
        };
        assert!(zero_unit.validate().is_err());
    }

    #[test]
    fn config_takes_seconds_from_tier() {
        let config = RoundConfig::for_mode(DifficultyTier::Hard, GameMode::PuzzleSprint);
        assert_eq!(config.seconds_per_turn, 10);
        assert_eq!(config.policy.timeout, TimeoutPolicy::EndRound);
    }
}
