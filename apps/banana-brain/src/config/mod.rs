pub mod backend;
pub mod game;

pub use backend::{BackendConfig, DEFAULT_PUZZLE_API_URL};
pub use game::GameSettings;
