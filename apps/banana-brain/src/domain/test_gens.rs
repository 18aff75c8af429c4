// Proptest generators for domain types.

use proptest::prelude::*;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::leaderboard::LeaderboardEntry;
use crate::domain::policy::GameMode;
use crate::domain::round::RoundEvent;
use crate::domain::tier::DifficultyTier;
use crate::domain::Puzzle;

pub fn tier() -> impl Strategy<Value = DifficultyTier> {
    prop_oneof![
        Just(DifficultyTier::Easy),
        Just(DifficultyTier::Medium),
        Just(DifficultyTier::Hard),
    ]
}

/// Puzzle-driven modes only; the card board has its own machine.
pub fn puzzle_mode() -> impl Strategy<Value = GameMode> {
    prop_oneof![Just(GameMode::PuzzleGuess), Just(GameMode::PuzzleSprint)]
}

pub fn puzzle() -> impl Strategy<Value = Puzzle> {
    (0u8..=9).prop_map(|solution| Puzzle {
        image_ref: format!("https://puzzles.test/{solution}.png"),
        solution,
    })
}

/// Any event the runner could deliver, including ones that are out of
/// place for the current phase. Quit is rare so most streams play on.
pub fn round_event() -> impl Strategy<Value = RoundEvent> {
    prop_oneof![
        1 => Just(RoundEvent::Quit),
        4 => puzzle().prop_map(RoundEvent::PuzzleLoaded),
        1 => Just(RoundEvent::PuzzleFailed("network".into())),
        1 => Just(RoundEvent::RetryFetch),
        4 => (0u8..=9).prop_map(RoundEvent::Answer),
        6 => Just(RoundEvent::Tick),
        3 => Just(RoundEvent::FeedbackElapsed),
    ]
}

/// Entries across all tiers; timestamps in a one-year window so ties on
/// score are common and ties on time occur.
pub fn entries() -> impl Strategy<Value = Vec<LeaderboardEntry>> {
    prop::collection::vec((0u32..=20, 0i64..=365, tier()), 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (score, day, tier))| LeaderboardEntry {
                id: Uuid::from_u128(i as u128 + 1),
                player_label: format!("player{i}@banana.test"),
                score: score * 10,
                tier,
                submitted_at: OffsetDateTime::UNIX_EPOCH + time::Duration::days(19_000 + day),
            })
            .collect()
    })
}
