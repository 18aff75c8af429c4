//! GoTrue-style auth endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::http::{endpoint, failure_message};
use crate::auth::{AuthState, Credentials, Session, SignUpOutcome};
use crate::config::backend::SupabaseConfig;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::Redacted;
use crate::repos::AuthService;

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserBody,
}

/// Sign-up answers with a token body when auto-confirm is on and with the
/// bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(TokenBody),
    PendingUser(serde::de::IgnoredAny),
}

pub struct GoTrueAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    redirect_url: Option<String>,
    state: watch::Sender<AuthState>,
}

impl GoTrueAuth {
    pub fn new(client: Client, config: &SupabaseConfig, redirect_url: Option<String>) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            client,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            redirect_url,
            state,
        }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }

    fn session_from(body: TokenBody, fallback_email: &str) -> Session {
        Session {
            user_id: body.user.id,
            email: body
                .user
                .email
                .unwrap_or_else(|| fallback_email.to_string()),
            access_token: body.access_token,
            expires_at: body
                .expires_in
                .map(|secs| OffsetDateTime::now_utc() + time::Duration::seconds(secs)),
        }
    }

    fn current_token(&self) -> Result<String, AppError> {
        self.current()
            .session()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| AppError::unauthorized(ErrorCode::SessionMissing, "Auth session missing!"))
    }
}

fn auth_failed(detail: impl Into<String>) -> AppError {
    AppError::unauthorized(ErrorCode::AuthFailed, detail)
}

#[async_trait]
impl AuthService for GoTrueAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AppError> {
        let response = self
            .client
            .post(self.url("auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(|e| auth_failed(format!("Auth service unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(auth_failed(failure_message(response).await));
        }
        let body: SignUpBody = response
            .json()
            .await
            .map_err(|e| auth_failed(format!("Unexpected sign-up response: {e}")))?;

        info!(email = %Redacted(credentials.email()), "Player signed up");
        match body {
            SignUpBody::Session(token) => {
                let session = Self::session_from(token, credentials.email());
                self.state.send_replace(AuthState::SignedIn(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpBody::PendingUser(_) => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AppError> {
        let response = self
            .client
            .post(self.url("auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant {
                email: credentials.email(),
                password: credentials.password(),
            })
            .send()
            .await
            .map_err(|e| auth_failed(format!("Auth service unreachable: {e}")))?;

        if !response.status().is_success() {
            let reason = failure_message(response).await;
            warn!(email = %Redacted(credentials.email()), reason = %reason, "Sign-in rejected");
            return Err(auth_failed(reason));
        }
        let body: TokenBody = response
            .json()
            .await
            .map_err(|e| auth_failed(format!("Unexpected sign-in response: {e}")))?;

        let session = Self::session_from(body, credentials.email());
        info!(email = %Redacted(&session.email), "Player signed in");
        self.state.send_replace(AuthState::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        // The local session goes regardless of what the server says.
        if let Ok(token) = self.current_token() {
            let result = self
                .client
                .post(self.url("auth/v1/logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(token)
                .send()
                .await;
            match result {
                Ok(r) if r.status().is_success() => {}
                Ok(r) => warn!(status = r.status().as_u16(), "Logout rejected"),
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), AppError> {
        let mut request = self
            .client
            .post(self.url("auth/v1/recover"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email }));
        if let Some(redirect) = &self.redirect_url {
            request = request.query(&[("redirect_to", redirect)]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| auth_failed(format!("Auth service unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(auth_failed(failure_message(response).await));
        }
        info!(email = %Redacted(email), "Recovery email requested");
        Ok(())
    }

    async fn recover_session(&self, access_token: &str) -> Result<Session, AppError> {
        let response = self
            .client
            .get(self.url("auth/v1/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| auth_failed(format!("Auth service unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(auth_failed(failure_message(response).await));
        }
        let user: UserBody = response
            .json()
            .await
            .map_err(|e| auth_failed(format!("Unexpected user response: {e}")))?;

        let session = Session {
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            access_token: access_token.to_string(),
            expires_at: None,
        };
        self.state
            .send_replace(AuthState::PasswordRecovery(session.clone()));
        Ok(session)
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AppError> {
        let token = self.current_token()?;
        let response = self
            .client
            .put(self.url("auth/v1/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| auth_failed(format!("Auth service unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(auth_failed(failure_message(response).await));
        }

        let current = self.current();
        if let AuthState::PasswordRecovery(session) = current {
            self.state.send_replace(AuthState::SignedIn(session));
        }
        Ok(())
    }

    fn current(&self) -> AuthState {
        let now = OffsetDateTime::now_utc();
        if self.state.send_if_modified(|s| s.expire_if_stale(now)) {
            info!("Access token expired; signed out");
        }
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
