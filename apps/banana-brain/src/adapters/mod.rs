//! Adapters for external dependencies.

pub mod auth_rest;
pub mod http;
pub mod memory;
pub mod puzzle_http;
pub mod scores_rest;

pub use auth_rest::GoTrueAuth;
pub use memory::{InMemoryAuth, InMemoryScoreStore, OfflinePuzzleSource, ScriptedPuzzleSource};
pub use puzzle_http::BananaApiClient;
pub use scores_rest::RestScoreStore;
