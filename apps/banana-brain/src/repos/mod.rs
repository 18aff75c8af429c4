//! Seams to the external services. Adapters in `crate::adapters` implement these.

pub mod auth;
pub mod puzzles;
pub mod scores;

pub use auth::AuthService;
pub use puzzles::PuzzleSource;
pub use scores::ScoreStore;
