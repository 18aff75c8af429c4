use crate::domain::{DifficultyTier, GameMode, RoundConfig};

/// Rows shown on the leaderboard unless overridden.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Player-facing knobs with built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    pub mode: GameMode,
    pub leaderboard_limit: usize,
    /// Seeds the card shuffle; `None` draws from the OS.
    pub shuffle_seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            shuffle_seed: None,
        }
    }
}

impl GameSettings {
    pub fn round_config(&self, tier: DifficultyTier) -> RoundConfig {
        RoundConfig::for_mode(tier, self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_guess_mode_top_ten() {
        let s = GameSettings::default();
        assert_eq!(s.mode, GameMode::PuzzleGuess);
        assert_eq!(s.leaderboard_limit, 10);
        assert_eq!(s.round_config(DifficultyTier::Medium).seconds_per_turn, 20);
    }
}
