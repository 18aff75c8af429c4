//! Domain layer: pure game rules, no I/O.

pub mod deck;
pub mod latch;
pub mod leaderboard;
pub mod matching;
pub mod policy;
pub mod puzzle;
pub mod round;
pub mod tier;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_props_leaderboard;
#[cfg(test)]
mod tests_props_round;
#[cfg(test)]
mod tests_props_shuffle;

pub use deck::{build_deck, shuffle, Card, Icon};
pub use latch::Latch;
pub use leaderboard::{is_latest_submission, rank_entries, LeaderboardEntry, NewScore};
pub use matching::{BoardPhase, FlipRejection, MatchBoard, MatchEffect, PairResult};
pub use policy::{GameMode, RoundConfig, RoundPolicy, TimeoutPolicy};
pub use puzzle::{parse_guess, puzzle_from_json, Puzzle};
pub use round::{EndReason, Feedback, Phase, RoundEffect, RoundEvent, RoundMachine, RoundState};
pub use tier::DifficultyTier;
