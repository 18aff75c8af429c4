//! Banana Brain in the terminal.
//!
//! Environment variables (see `BackendConfig`):
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: score store and auth (not needed with `--offline`)
//! - `PUZZLE_API_URL`, `BANANA_HTTP_TIMEOUT_SECS`, `AUTH_REDIRECT_URL`

mod terminal;

use banana_brain::config::{BackendConfig, GameSettings};
use banana_brain::domain::{DifficultyTier, GameMode};
use banana_brain::state::AppState;
use banana_brain::telemetry;
use clap::{Parser, ValueEnum};
use tracing::error;

#[derive(Parser)]
#[command(name = "banana-brain")]
#[command(about = "Timed banana puzzles with a shared leaderboard")]
struct Args {
    /// Play without network: generated puzzles, in-memory scores and accounts
    #[arg(long)]
    offline: bool,

    /// Starting difficulty
    #[arg(long, default_value = "easy")]
    tier: TierArg,

    /// Game variant
    #[arg(long, default_value = "guess")]
    mode: ModeArg,

    /// Seed for offline puzzles and the card shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Rows shown on the leaderboard
    #[arg(long, default_value = "10")]
    leaderboard_limit: usize,

    /// Access token from a password-recovery link
    #[arg(long)]
    recovery_token: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TierArg {
    Easy,
    Medium,
    Hard,
}

impl From<TierArg> for DifficultyTier {
    fn from(t: TierArg) -> Self {
        match t {
            TierArg::Easy => DifficultyTier::Easy,
            TierArg::Medium => DifficultyTier::Medium,
            TierArg::Hard => DifficultyTier::Hard,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Guess,
    Sprint,
    Match,
}

impl From<ModeArg> for GameMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Guess => GameMode::PuzzleGuess,
            ModeArg::Sprint => GameMode::PuzzleSprint,
            ModeArg::Match => GameMode::CardMatch,
        }
    }
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    let args = Args::parse();

    let settings = GameSettings {
        mode: args.mode.into(),
        leaderboard_limit: args.leaderboard_limit.max(1),
        shuffle_seed: args.seed,
    };

    let built = BackendConfig::from_env(args.offline)
        .and_then(|config| AppState::from_config(&config, settings));
    let app = match built {
        Ok(app) => app,
        Err(e) => {
            error!(code = %e.code(), error = %e, "Startup failed");
            eprintln!("❌ {e}");
            eprintln!("   Set SUPABASE_URL and SUPABASE_ANON_KEY, or pass --offline.");
            std::process::exit(1);
        }
    };

    terminal::run(app, args.tier.into(), args.recovery_token).await;
}
