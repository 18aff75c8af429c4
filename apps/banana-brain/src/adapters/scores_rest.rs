//! PostgREST-style `leaderboard` table.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::adapters::http::{endpoint, failure_message};
use crate::auth::AuthState;
use crate::config::backend::SupabaseConfig;
use crate::domain::{rank_entries, DifficultyTier, LeaderboardEntry, NewScore};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::ScoreStore;

const TABLE: &str = "rest/v1/leaderboard";

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    player_name: &'a str,
    score: u32,
    difficulty: DifficultyTier,
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    id: Uuid,
    player_name: String,
    score: u32,
    difficulty: DifficultyTier,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<ScoreRow> for LeaderboardEntry {
    fn from(row: ScoreRow) -> Self {
        Self {
            id: row.id,
            player_label: row.player_name,
            score: row.score,
            tier: row.difficulty,
            submitted_at: row.created_at,
        }
    }
}

pub struct RestScoreStore {
    client: Client,
    base_url: String,
    anon_key: String,
    auth: watch::Receiver<AuthState>,
}

impl RestScoreStore {
    /// Requests carry the player's access token when signed in, the anon key otherwise.
    pub fn new(client: Client, config: &SupabaseConfig, auth: watch::Receiver<AuthState>) -> Self {
        Self {
            client,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            auth,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = match self.auth.borrow().session() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        };
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

#[async_trait]
impl ScoreStore for RestScoreStore {
    async fn insert(&self, score: NewScore) -> Result<(), AppError> {
        let submit_failed =
            |detail: String| AppError::upstream(ErrorCode::ScoreSubmitFailed, detail);

        let row = InsertRow {
            player_name: &score.player_label,
            score: score.score,
            difficulty: score.tier,
        };
        let response = self
            .authorized(self.client.post(endpoint(&self.base_url, TABLE)))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| submit_failed(format!("Failed to submit score: {e}")))?;

        if !response.status().is_success() {
            let reason = failure_message(response).await;
            warn!(reason = %reason, "Score insert rejected");
            return Err(submit_failed(format!("Failed to submit score: {reason}")));
        }
        debug!(score = score.score, tier = %score.tier, "Score submitted");
        Ok(())
    }

    async fn top_scores(
        &self,
        tier: DifficultyTier,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let unavailable =
            |detail: String| AppError::upstream(ErrorCode::LeaderboardUnavailable, detail);

        let response = self
            .authorized(self.client.get(endpoint(&self.base_url, TABLE)))
            .query(&[
                ("select", "*".to_string()),
                ("difficulty", format!("eq.{tier}")),
                ("order", "score.desc,created_at.asc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to load leaderboard: {e}")))?;

        if !response.status().is_success() {
            let reason = failure_message(response).await;
            return Err(unavailable(format!("Failed to load leaderboard: {reason}")));
        }

        let rows: Vec<ScoreRow> = response
            .json()
            .await
            .map_err(|e| unavailable(format!("Unreadable leaderboard rows: {e}")))?;

        let mut entries: Vec<LeaderboardEntry> = rows
            .into_iter()
            .map(LeaderboardEntry::from)
            .filter(|e| e.tier == tier)
            .collect();
        rank_entries(&mut entries);
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::adapters::http::build_client;
    use crate::auth::Session;

    fn store(server: &MockServer, auth: watch::Receiver<AuthState>) -> RestScoreStore {
        let config = SupabaseConfig {
            url: server.uri(),
            anon_key: "anon".into(),
        };
        RestScoreStore::new(build_client(Duration::from_secs(2)).unwrap(), &config, auth)
    }

    #[tokio::test]
    async fn insert_posts_row_with_player_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/leaderboard"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer player-token"))
            .and(body_json(json!({
                "player_name": "kim@banana.test",
                "score": 70,
                "difficulty": "hard"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let (_tx, rx) = watch::channel(AuthState::SignedIn(Session {
            user_id: Uuid::nil(),
            email: "kim@banana.test".into(),
            access_token: "player-token".into(),
            expires_at: None,
        }));
        store(&server, rx)
            .insert(NewScore {
                player_label: "kim@banana.test".into(),
                score: 70,
                tier: DifficultyTier::Hard,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_insert_is_submit_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "message": "permission denied for table leaderboard" })),
            )
            .mount(&server)
            .await;

        let (_tx, rx) = watch::channel(AuthState::SignedOut);
        let err = store(&server, rx)
            .insert(NewScore {
                player_label: "kim@banana.test".into(),
                score: 10,
                tier: DifficultyTier::Easy,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScoreSubmitFailed);
        assert!(err.detail().contains("permission denied"));
    }

    #[tokio::test]
    async fn top_scores_queries_tier_and_parses_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/leaderboard"))
            .and(query_param("difficulty", "eq.medium"))
            .and(query_param("order", "score.desc,created_at.asc"))
            .and(query_param("limit", "10"))
            .and(header("authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "6f1c1a2e-5d0b-4c1e-9a57-3a8f5e0c9b11",
                    "player_name": "a@banana.test",
                    "score": 40,
                    "difficulty": "medium",
                    "created_at": "2024-06-01T10:00:00.123456+00:00"
                },
                {
                    "id": "0b8f0a52-3c55-4e0f-8d7a-2d9e1f4b6c22",
                    "player_name": "b@banana.test",
                    "score": 60,
                    "difficulty": "medium",
                    "created_at": "2024-06-02T10:00:00+00:00"
                }
            ])))
            .mount(&server)
            .await;

        let (_tx, rx) = watch::channel(AuthState::SignedOut);
        let rows = store(&server, rx)
            .top_scores(DifficultyTier::Medium, 10)
            .await
            .unwrap();
        let labels: Vec<_> = rows.iter().map(|e| e.player_label.as_str()).collect();
        assert_eq!(labels, ["b@banana.test", "a@banana.test"]);
    }

    #[tokio::test]
    async fn server_error_is_leaderboard_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (_tx, rx) = watch::channel(AuthState::SignedOut);
        let err = store(&server, rx)
            .top_scores(DifficultyTier::Easy, 10)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::LeaderboardUnavailable);
        assert!(err.is_retryable());
    }
}
