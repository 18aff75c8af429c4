use std::sync::Arc;

use tracing::info;

use crate::adapters::http::build_client;
use crate::adapters::{
    BananaApiClient, GoTrueAuth, InMemoryAuth, InMemoryScoreStore, OfflinePuzzleSource,
    RestScoreStore,
};
use crate::config::{BackendConfig, GameSettings};
use crate::error::AppError;
use crate::repos::{AuthService, PuzzleSource, ScoreStore};

/// Shared clients, built once at startup and handed to the services.
#[derive(Clone)]
pub struct AppState {
    pub puzzles: Arc<dyn PuzzleSource>,
    pub scores: Arc<dyn ScoreStore>,
    pub auth: Arc<dyn AuthService>,
    pub settings: GameSettings,
}

impl AppState {
    pub fn new(
        puzzles: Arc<dyn PuzzleSource>,
        scores: Arc<dyn ScoreStore>,
        auth: Arc<dyn AuthService>,
        settings: GameSettings,
    ) -> Self {
        Self {
            puzzles,
            scores,
            auth,
            settings,
        }
    }

    /// Live clients when the managed services are configured. Without them
    /// (`--offline`) nothing touches the network.
    pub fn from_config(config: &BackendConfig, settings: GameSettings) -> Result<Self, AppError> {
        let Some(supabase) = &config.supabase else {
            info!("Offline: generated puzzles, scores and accounts stay in memory");
            return Ok(Self::offline(settings));
        };

        let client = build_client(config.http_timeout)?;
        let puzzles: Arc<dyn PuzzleSource> =
            Arc::new(BananaApiClient::new(client.clone(), config.puzzle_api_url.clone()));
        let auth = Arc::new(GoTrueAuth::new(
            client.clone(),
            supabase,
            config.auth_redirect_url.clone(),
        ));
        let scores = Arc::new(RestScoreStore::new(client, supabase, auth.subscribe()));
        info!(url = %supabase.url, "Using managed score and auth services");
        Ok(Self::new(puzzles, scores, auth, settings))
    }

    fn offline(settings: GameSettings) -> Self {
        Self::new(
            Arc::new(OfflinePuzzleSource::new(settings.shuffle_seed)),
            Arc::new(InMemoryScoreStore::new()),
            Arc::new(InMemoryAuth::default()),
            settings,
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
