//! Screen flow for one player: auth, start, playing, leaderboard.
//!
//! The orchestrator is the only place a finished round turns into a stored
//! score. Each round gets a fresh id; [`SessionOrchestrator::complete_round`]
//! accepts an id once, and only while it is the round being played.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::credentials::validate_password;
use crate::auth::{AuthState, Credentials, SignUpOutcome};
use crate::domain::{DifficultyTier, GameMode, NewScore, RoundConfig};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::Redacted;
use crate::services::leaderboard::LeaderboardViewModel;
use crate::services::round_runner::RoundOutcome;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Start,
    Playing,
    /// Escape pressed mid-round; the round keeps running underneath.
    ConfirmQuit,
    /// Reached through a password-recovery link.
    UpdatePassword,
    Leaderboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Inline message under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn error(prefix: &str, err: &AppError) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: format!("{prefix}: {}", err.user_message()),
        }
    }
}

/// Permission to play one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTicket {
    pub id: Uuid,
    pub mode: GameMode,
    pub config: RoundConfig,
}

pub struct SessionOrchestrator {
    app: AppState,
    auth_rx: watch::Receiver<AuthState>,
    screen: Screen,
    tier: DifficultyTier,
    final_score: u32,
    current_round: Option<Uuid>,
    completed: HashSet<Uuid>,
    latest: Option<NewScore>,
    notice: Option<Notice>,
}

impl SessionOrchestrator {
    pub fn new(app: AppState) -> Self {
        let auth_rx = app.auth.subscribe();
        let mut orchestrator = Self {
            app,
            auth_rx,
            screen: Screen::Auth,
            tier: DifficultyTier::default(),
            final_score: 0,
            current_round: None,
            completed: HashSet::new(),
            latest: None,
            notice: None,
        };
        orchestrator.sync_auth();
        orchestrator
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    /// Receiver the front-end can await to learn about sign-outs and expiry.
    pub fn auth_changes(&self) -> watch::Receiver<AuthState> {
        self.auth_rx.clone()
    }

    pub fn player_label(&self) -> Option<String> {
        self.auth_rx
            .borrow()
            .session()
            .map(|s| s.player_label().to_string())
    }

    /// Follow the auth service. Losing the session from any screen returns
    /// to auth and discards the round in progress.
    pub fn sync_auth(&mut self) -> Screen {
        // Asking the service first lets it retire an expired token.
        self.app.auth.current();
        let state = self.auth_rx.borrow_and_update().clone();
        match state {
            AuthState::SignedOut => {
                if self.screen != Screen::Auth {
                    info!(from = ?self.screen, "Session ended; back to sign-in");
                    self.discard_round();
                    self.reset_menu();
                    self.screen = Screen::Auth;
                }
            }
            AuthState::PasswordRecovery(_) => {
                self.discard_round();
                self.screen = Screen::UpdatePassword;
            }
            AuthState::SignedIn(_) => {
                if matches!(self.screen, Screen::Auth | Screen::UpdatePassword) {
                    self.screen = Screen::Start;
                }
            }
        }
        self.screen
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AppError> {
        self.notice = None;
        let result = match Credentials::new(email, password) {
            Ok(credentials) => self.app.auth.sign_in(&credentials).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            self.notice = Some(Notice::error("Login Error", e));
        }
        self.sync_auth();
        result
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<SignUpOutcome, AppError> {
        self.notice = None;
        let result = match Credentials::new(email, password) {
            Ok(credentials) => self.app.auth.sign_up(&credentials).await,
            Err(e) => Err(e.into()),
        };
        match &result {
            Ok(SignUpOutcome::ConfirmationRequired) => {
                self.notice = Some(Notice::info(
                    "Success! Check your email for a confirmation link to log in.",
                ));
            }
            Ok(SignUpOutcome::SignedIn(_)) => {}
            Err(e) => self.notice = Some(Notice::error("Sign Up Error", e)),
        }
        self.sync_auth();
        result
    }

    pub async fn reset_password(&mut self, email: &str) -> Result<(), AppError> {
        let result = match Credentials::email_only(email) {
            Ok(email) => self.app.auth.reset_password(&email).await,
            Err(e) => Err(e.into()),
        };
        self.notice = Some(match &result {
            Ok(()) => Notice::info("Password recovery email sent. Check your inbox!"),
            Err(e) => Notice::error("Reset Error", e),
        });
        result
    }

    /// Follow a recovery link carrying `access_token`.
    pub async fn open_recovery_link(&mut self, access_token: &str) -> Result<(), AppError> {
        let result = self.app.auth.recover_session(access_token).await.map(|_| ());
        match &result {
            Ok(()) => self.notice = Some(Notice::info("Enter your new password.")),
            Err(e) => self.notice = Some(Notice::error("Reset Error", e)),
        }
        self.sync_auth();
        result
    }

    pub async fn update_password(&mut self, new_password: &str) -> Result<(), AppError> {
        let result = match validate_password(new_password) {
            Ok(()) => self.app.auth.update_password(new_password).await,
            Err(e) => Err(e.into()),
        };
        self.notice = Some(match &result {
            Ok(()) => Notice::info("Password successfully updated!"),
            Err(e) => Notice::error("Update failed", e),
        });
        self.sync_auth();
        result
    }

    pub async fn sign_out(&mut self) -> Result<(), AppError> {
        let result = self.app.auth.sign_out().await;
        if let Err(e) = &result {
            warn!(error = %e, "Sign-out failed");
        }
        self.notice = None;
        self.sync_auth();
        result
    }

    /// Pick the tier on the start screen.
    pub fn select_tier(&mut self, tier: DifficultyTier) {
        if self.screen == Screen::Start {
            self.tier = tier;
        }
    }

    /// Begin a round at the selected tier.
    pub fn start_round(&mut self) -> Result<RoundTicket, AppError> {
        self.sync_auth();
        if !matches!(self.screen, Screen::Start | Screen::Leaderboard) {
            return Err(AppError::invalid(
                ErrorCode::InvalidAction,
                format!("Cannot start a round from {:?}", self.screen),
            ));
        }
        let mode = self.app.settings.mode;
        let ticket = RoundTicket {
            id: Uuid::new_v4(),
            mode,
            config: self.app.settings.round_config(self.tier),
        };
        self.current_round = Some(ticket.id);
        self.final_score = 0;
        self.notice = None;
        self.screen = Screen::Playing;
        info!(round_id = %ticket.id, tier = %self.tier, mode = %mode, "Round started");
        Ok(ticket)
    }

    /// Escape while playing.
    pub fn request_quit(&mut self) {
        if self.screen == Screen::Playing {
            self.screen = Screen::ConfirmQuit;
        }
    }

    pub fn cancel_quit(&mut self) {
        if self.screen == Screen::ConfirmQuit {
            self.screen = Screen::Playing;
        }
    }

    /// Progress is lost; back to the main menu.
    pub fn confirm_quit(&mut self) {
        if self.screen == Screen::ConfirmQuit {
            self.discard_round();
            self.main_menu_inner();
        }
    }

    /// Hand back what the runner returned for `round_id`.
    pub async fn finish_round(
        &mut self,
        round_id: Uuid,
        outcome: RoundOutcome,
    ) -> Option<LeaderboardViewModel> {
        match outcome {
            RoundOutcome::Completed { score, .. } => self.complete_round(round_id, score).await,
            RoundOutcome::Abandoned => {
                if self.current_round == Some(round_id) {
                    self.discard_round();
                    if matches!(self.screen, Screen::Playing | Screen::ConfirmQuit) {
                        self.main_menu_inner();
                    }
                }
                None
            }
        }
    }

    /// Record the final score for `round_id` and move to the leaderboard.
    ///
    /// Submits at most once per round id and only for the current round;
    /// later or stale calls return `None` and change nothing. A failed
    /// submission is logged and the leaderboard is shown anyway.
    pub async fn complete_round(
        &mut self,
        round_id: Uuid,
        score: u32,
    ) -> Option<LeaderboardViewModel> {
        self.sync_auth();
        if self.current_round != Some(round_id) || !self.completed.insert(round_id) {
            warn!(%round_id, "Ignoring completion for a round that is not in play");
            return None;
        }
        self.current_round = None;
        self.final_score = score;

        let label = self.player_label()?;
        let new_score = NewScore {
            player_label: label,
            score,
            tier: self.tier,
        };
        match self.app.scores.insert(new_score.clone()).await {
            Ok(()) => {
                info!(
                    %round_id,
                    score,
                    tier = %self.tier,
                    player = %Redacted(&new_score.player_label),
                    "Score submitted"
                );
                self.latest = Some(new_score);
            }
            Err(e) => {
                warn!(%round_id, code = %e.code(), error = %e, "Score submission failed");
                self.notice = Some(Notice {
                    kind: NoticeKind::Error,
                    text: e.user_message(),
                });
                self.latest = None;
            }
        }

        self.screen = Screen::Leaderboard;
        Some(self.leaderboard())
    }

    /// View model for the leaderboard screen, on the current tier.
    pub fn leaderboard(&self) -> LeaderboardViewModel {
        LeaderboardViewModel::new(
            self.app.scores.clone(),
            self.tier,
            self.app.settings.leaderboard_limit,
            self.latest.clone(),
        )
    }

    /// Same tier, score cleared.
    pub fn play_again(&mut self) -> Result<RoundTicket, AppError> {
        if self.screen != Screen::Leaderboard {
            return Err(AppError::invalid(
                ErrorCode::InvalidAction,
                "Play again is only offered on the leaderboard",
            ));
        }
        self.start_round()
    }

    /// Back to the start screen with tier and score reset.
    pub fn main_menu(&mut self) {
        if matches!(self.screen, Screen::Leaderboard | Screen::Start) {
            self.main_menu_inner();
        }
    }

    fn main_menu_inner(&mut self) {
        self.reset_menu();
        self.screen = Screen::Start;
    }

    fn reset_menu(&mut self) {
        self.tier = DifficultyTier::Easy;
        self.final_score = 0;
    }

    fn discard_round(&mut self) {
        if let Some(id) = self.current_round.take() {
            info!(round_id = %id, "Round discarded");
        }
    }
}
