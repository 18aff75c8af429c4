use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::domain::{puzzle_from_json, Puzzle};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::PuzzleSource;

/// Client for the public banana puzzle API.
pub struct BananaApiClient {
    client: Client,
    url: String,
}

impl BananaApiClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

fn unavailable(detail: String) -> AppError {
    AppError::upstream(ErrorCode::PuzzleUnavailable, detail)
}

#[async_trait]
impl PuzzleSource for BananaApiClient {
    async fn fetch_puzzle(&self) -> Result<Puzzle, AppError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("out", "json"), ("base64", "no")])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Puzzle request failed");
                unavailable(format!("Puzzle request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Puzzle API returned an error status");
            return Err(unavailable(format!("API request failed: {status}")));
        }

        let body: Value = response.json().await.map_err(|e| {
            warn!(error = %e, "Puzzle body is not JSON");
            AppError::upstream(ErrorCode::PuzzleMalformed, format!("Invalid API response: {e}"))
        })?;

        puzzle_from_json(&body).map_err(|e| {
            warn!(error = %e, "Invalid API response format");
            AppError::from(e)
        })
    }
}
