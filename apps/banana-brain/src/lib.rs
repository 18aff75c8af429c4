#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod logging;
pub mod repos;
pub mod services;
pub mod state;
pub mod telemetry;

#[cfg(test)]
pub mod test_bootstrap;

pub use config::{BackendConfig, GameSettings};
pub use error::AppError;
pub use errors::ErrorCode;
pub use services::SessionOrchestrator;
pub use state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
