//! In-process adapters for `--offline` play and for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{AuthState, Credentials, Session, SignUpOutcome};
use crate::domain::puzzle::MAX_SOLUTION;
use crate::domain::{rank_entries, DifficultyTier, LeaderboardEntry, NewScore, Puzzle};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::Redacted;
use crate::repos::{AuthService, PuzzleSource, ScoreStore};

/// Text puzzles whose answer is a single digit. Stands in for the image API
/// when there is no network.
pub struct OfflinePuzzleSource {
    rng: Mutex<StdRng>,
}

impl OfflinePuzzleSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl PuzzleSource for OfflinePuzzleSource {
    async fn fetch_puzzle(&self) -> Result<Puzzle, AppError> {
        let (a, b) = {
            let mut rng = self.rng.lock();
            let a = rng.random_range(0..=MAX_SOLUTION);
            let b = rng.random_range(0..=MAX_SOLUTION - a);
            (a, b)
        };
        let bananas = |n: u8| "🍌".repeat(usize::from(n));
        Ok(Puzzle::new(
            format!("{} + {} = ?  ({a} + {b})", bananas(a), bananas(b)),
            a + b,
        )?)
    }
}

/// Replays a fixed script of results, then reports the source as unavailable.
#[derive(Default)]
pub struct ScriptedPuzzleSource {
    script: Mutex<VecDeque<Result<Puzzle, AppError>>>,
    calls: AtomicUsize,
}

impl ScriptedPuzzleSource {
    pub fn new(script: impl IntoIterator<Item = Result<Puzzle, AppError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Puzzles with the given solutions, all succeeding.
    pub fn solutions(solutions: impl IntoIterator<Item = u8>) -> Self {
        Self::new(solutions.into_iter().map(|s| {
            Puzzle::new(format!("scripted://{s}"), s).map_err(AppError::from)
        }))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PuzzleSource for ScriptedPuzzleSource {
    async fn fetch_puzzle(&self) -> Result<Puzzle, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(|| {
            Err(AppError::upstream(
                ErrorCode::PuzzleUnavailable,
                "puzzle script exhausted",
            ))
        })
    }
}

/// Score table held in memory. Can be switched offline to exercise failure paths.
#[derive(Default)]
pub struct InMemoryScoreStore {
    rows: RwLock<Vec<LeaderboardEntry>>,
    unavailable: AtomicBool,
    inserts: AtomicUsize,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<LeaderboardEntry>) -> Self {
        Self {
            rows: RwLock::new(entries),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Successful inserts so far.
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn entries(&self) -> Vec<LeaderboardEntry> {
        self.rows.read().clone()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn insert(&self, score: NewScore) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::upstream(
                ErrorCode::ScoreSubmitFailed,
                "score store offline",
            ));
        }
        let entry = LeaderboardEntry {
            id: Uuid::new_v4(),
            player_label: score.player_label,
            score: score.score,
            tier: score.tier,
            submitted_at: OffsetDateTime::now_utc(),
        };
        debug!(score = entry.score, tier = %entry.tier, "Score stored");
        self.rows.write().push(entry);
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn top_scores(
        &self,
        tier: DifficultyTier,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::upstream(
                ErrorCode::LeaderboardUnavailable,
                "score store offline",
            ));
        }
        let mut rows: Vec<LeaderboardEntry> = self
            .rows
            .read()
            .iter()
            .filter(|e| e.tier == tier)
            .cloned()
            .collect();
        rank_entries(&mut rows);
        rows.truncate(limit);
        Ok(rows)
    }
}

struct Account {
    user_id: Uuid,
    password: String,
    confirmed: bool,
}

/// Accounts kept in memory. Mirrors the provider's messages so the screens
/// behave the same offline.
pub struct InMemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    recovery_tokens: Mutex<HashMap<String, String>>,
    require_confirmation: bool,
    state: watch::Sender<AuthState>,
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new(false)
    }
}

impl InMemoryAuth {
    /// With `require_confirmation`, sign-up leaves the account unusable until
    /// [`InMemoryAuth::confirm`] is called.
    pub fn new(require_confirmation: bool) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            accounts: Mutex::new(HashMap::new()),
            recovery_tokens: Mutex::new(HashMap::new()),
            require_confirmation,
            state,
        }
    }

    pub fn confirm(&self, email: &str) {
        if let Some(account) = self.accounts.lock().get_mut(email) {
            account.confirmed = true;
        }
    }

    /// Recovery token most recently mailed to `email`.
    pub fn recovery_token_for(&self, email: &str) -> Option<String> {
        self.recovery_tokens
            .lock()
            .iter()
            .find(|(_, e)| e.as_str() == email)
            .map(|(token, _)| token.clone())
    }

    /// Drop the session as if it expired server-side.
    pub fn expire_session(&self) {
        self.state.send_replace(AuthState::SignedOut);
    }

    fn session_for(email: &str, user_id: Uuid) -> Session {
        Session {
            user_id,
            email: email.to_string(),
            access_token: format!("offline-{}", Uuid::new_v4().simple()),
            expires_at: Some(OffsetDateTime::now_utc() + time::Duration::hours(1)),
        }
    }
}

fn auth_failed(detail: &str) -> AppError {
    AppError::unauthorized(ErrorCode::AuthFailed, detail)
}

#[async_trait]
impl AuthService for InMemoryAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AppError> {
        let email = credentials.email();
        let user_id = {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(email) {
                return Err(auth_failed("User already registered"));
            }
            let user_id = Uuid::new_v4();
            accounts.insert(
                email.to_string(),
                Account {
                    user_id,
                    password: credentials.password().to_string(),
                    confirmed: !self.require_confirmation,
                },
            );
            user_id
        };
        debug!(email = %Redacted(email), "Account created");

        if self.require_confirmation {
            return Ok(SignUpOutcome::ConfirmationRequired);
        }
        let session = Self::session_for(email, user_id);
        self.state.send_replace(AuthState::SignedIn(session.clone()));
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AppError> {
        let user_id = {
            let accounts = self.accounts.lock();
            let account = accounts
                .get(credentials.email())
                .filter(|a| a.password == credentials.password())
                .ok_or_else(|| auth_failed("Invalid login credentials"))?;
            if !account.confirmed {
                return Err(auth_failed("Email not confirmed"));
            }
            account.user_id
        };
        let session = Self::session_for(credentials.email(), user_id);
        self.state.send_replace(AuthState::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), AppError> {
        // Unknown addresses succeed too, so accounts cannot be enumerated.
        if self.accounts.lock().contains_key(email) {
            let token = format!("recovery-{}", Uuid::new_v4().simple());
            self.recovery_tokens
                .lock()
                .insert(token, email.to_string());
        }
        Ok(())
    }

    async fn recover_session(&self, access_token: &str) -> Result<Session, AppError> {
        let email = self
            .recovery_tokens
            .lock()
            .remove(access_token)
            .ok_or_else(|| auth_failed("Email link is invalid or has expired"))?;
        let user_id = self
            .accounts
            .lock()
            .get(&email)
            .map(|a| a.user_id)
            .ok_or_else(|| auth_failed("User not found"))?;
        let session = Self::session_for(&email, user_id);
        self.state
            .send_replace(AuthState::PasswordRecovery(session.clone()));
        Ok(session)
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AppError> {
        let current = self.current();
        let session = current.session().ok_or_else(|| {
            AppError::unauthorized(ErrorCode::SessionMissing, "Auth session missing!")
        })?;
        {
            let mut accounts = self.accounts.lock();
            let account = accounts
                .get_mut(&session.email)
                .ok_or_else(|| auth_failed("User not found"))?;
            if account.password == new_password {
                return Err(auth_failed(
                    "New password should be different from the old password.",
                ));
            }
            account.password = new_password.to_string();
            account.confirmed = true;
        }
        if let AuthState::PasswordRecovery(session) = current {
            self.state.send_replace(AuthState::SignedIn(session));
        }
        Ok(())
    }

    fn current(&self) -> AuthState {
        let now = OffsetDateTime::now_utc();
        if self.state.send_if_modified(|s| s.expire_if_stale(now)) {
            debug!("Offline session expired");
        }
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn creds(email: &str) -> Credentials {
        Credentials::new(email, "banana1").unwrap()
    }

    #[tokio::test]
    async fn offline_puzzles_stay_in_range() {
        let source = OfflinePuzzleSource::new(Some(7));
        for _ in 0..200 {
            let p = source.fetch_puzzle().await.unwrap();
            assert!(p.solution <= MAX_SOLUTION);
        }
    }

    #[tokio::test]
    async fn script_runs_out_as_unavailable() {
        let source = ScriptedPuzzleSource::solutions([3]);
        assert_eq!(source.fetch_puzzle().await.unwrap().solution, 3);
        let err = source.fetch_puzzle().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PuzzleUnavailable);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn store_ranks_and_filters_by_tier() {
        let entry = |label: &str, score, tier, at| LeaderboardEntry {
            id: Uuid::new_v4(),
            player_label: label.to_string(),
            score,
            tier,
            submitted_at: at,
        };
        let store = InMemoryScoreStore::with_entries(vec![
            entry("b", 30, DifficultyTier::Easy, datetime!(2024-05-02 0:00 UTC)),
            entry("a", 30, DifficultyTier::Easy, datetime!(2024-05-01 0:00 UTC)),
            entry("h", 90, DifficultyTier::Hard, datetime!(2024-05-01 0:00 UTC)),
            entry("c", 50, DifficultyTier::Easy, datetime!(2024-05-03 0:00 UTC)),
        ]);
        let top = store.top_scores(DifficultyTier::Easy, 2).await.unwrap();
        let labels: Vec<_> = top.iter().map(|e| e.player_label.as_str()).collect();
        assert_eq!(labels, ["c", "a"]);
    }

    #[tokio::test]
    async fn offline_store_fails_both_ways() {
        let store = InMemoryScoreStore::new();
        store.set_unavailable(true);
        let insert = store
            .insert(NewScore {
                player_label: "x@y.io".into(),
                score: 10,
                tier: DifficultyTier::Easy,
            })
            .await
            .unwrap_err();
        assert_eq!(insert.code(), ErrorCode::ScoreSubmitFailed);
        let fetch = store
            .top_scores(DifficultyTier::Easy, 10)
            .await
            .unwrap_err();
        assert_eq!(fetch.code(), ErrorCode::LeaderboardUnavailable);
        assert_eq!(store.insert_count(), 0);
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_publishes_state() {
        let auth = InMemoryAuth::default();
        let mut rx = auth.subscribe();
        let outcome = auth.sign_up(&creds("kim@banana.test")).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(_)));
        rx.changed().await.unwrap();
        assert!(matches!(&*rx.borrow(), AuthState::SignedIn(_)));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current(), AuthState::SignedOut);

        let err = auth
            .sign_in(&Credentials::new("kim@banana.test", "wrong-pass").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert!(auth.sign_in(&creds("kim@banana.test")).await.is_ok());
    }

    #[tokio::test]
    async fn confirmation_gate_blocks_sign_in() {
        let auth = InMemoryAuth::new(true);
        let outcome = auth.sign_up(&creds("new@banana.test")).await.unwrap();
        assert_eq!(outcome, SignUpOutcome::ConfirmationRequired);
        assert!(auth.sign_in(&creds("new@banana.test")).await.is_err());
        auth.confirm("new@banana.test");
        assert!(auth.sign_in(&creds("new@banana.test")).await.is_ok());
    }

    #[tokio::test]
    async fn recovery_link_allows_password_update() {
        let auth = InMemoryAuth::default();
        auth.sign_up(&creds("kim@banana.test")).await.unwrap();
        auth.sign_out().await.unwrap();
        auth.reset_password("kim@banana.test").await.unwrap();
        let token = auth.recovery_token_for("kim@banana.test").unwrap();

        auth.recover_session(&token).await.unwrap();
        assert!(matches!(auth.current(), AuthState::PasswordRecovery(_)));
        auth.update_password("plantain2").await.unwrap();
        assert!(matches!(auth.current(), AuthState::SignedIn(_)));

        // Token is single use.
        assert!(auth.recover_session(&token).await.is_err());
        auth.sign_out().await.unwrap();
        assert!(auth
            .sign_in(&Credentials::new("kim@banana.test", "plantain2").unwrap())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn update_without_session_is_rejected() {
        let auth = InMemoryAuth::default();
        let err = auth.update_password("whatever1").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionMissing);
    }
}
