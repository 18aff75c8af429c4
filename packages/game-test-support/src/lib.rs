//! Shared helpers for Banana Brain integration tests.
//!
//! Provides the one-time test subscriber and generators for unique player
//! labels so leaderboard assertions never collide across tests.

pub mod logging;
pub mod unique_helpers;

pub use unique_helpers::{unique_label, unique_player_email};
