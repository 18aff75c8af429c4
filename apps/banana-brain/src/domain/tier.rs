use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Difficulty level. Fixes the per-turn time budget and the board size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
    ];

    /// Seconds on the countdown for one turn (or one board).
    pub const fn seconds_per_turn(self) -> u32 {
        match self {
            DifficultyTier::Easy => 30,
            DifficultyTier::Medium => 20,
            DifficultyTier::Hard => 10,
        }
    }

    /// Card pairs on the matching board.
    pub const fn pair_count(self) -> usize {
        match self {
            DifficultyTier::Hard => 6,
            DifficultyTier::Easy | DifficultyTier::Medium => 8,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Learn the game",
            DifficultyTier::Medium => "Balanced challenge",
            DifficultyTier::Hard => "Expert mode",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" | "1" => Ok(DifficultyTier::Easy),
            "medium" | "m" | "2" => Ok(DifficultyTier::Medium),
            "hard" | "h" | "3" => Ok(DifficultyTier::Hard),
            other => Err(DomainError::validation(
                ValidationKind::InvalidTier,
                format!("Unknown difficulty '{other}'"),
            )),
        }
    }
}
