//! Endpoints and keys for the managed services, read once at startup.

use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_PUZZLE_API_URL: &str = "https://marcconrad.com/uob/banana/api.php";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Where the score store and auth service live.
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED_TOKEN]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// `None` in offline mode.
    pub supabase: Option<SupabaseConfig>,
    pub puzzle_api_url: String,
    pub http_timeout: Duration,
    /// Target of the link in password-recovery emails.
    pub auth_redirect_url: Option<String>,
}

impl BackendConfig {
    /// `SUPABASE_URL` and `SUPABASE_ANON_KEY` are required unless `offline`.
    pub fn from_env(offline: bool) -> Result<Self, AppError> {
        let supabase = if offline {
            None
        } else {
            Some(SupabaseConfig {
                url: trim_base(&must_var("SUPABASE_URL")?),
                anon_key: must_var("SUPABASE_ANON_KEY")?,
            })
        };

        let puzzle_api_url = optional_var("PUZZLE_API_URL")
            .unwrap_or_else(|| DEFAULT_PUZZLE_API_URL.to_string());

        let http_timeout = match optional_var("BANANA_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::config(format!(
                        "BANANA_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                    ))
                })?;
                if secs == 0 {
                    return Err(AppError::config("BANANA_HTTP_TIMEOUT_SECS must be positive"));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            supabase,
            puzzle_api_url,
            http_timeout,
            auth_redirect_url: optional_var("AUTH_REDIRECT_URL"),
        })
    }
}

fn must_var(name: &str) -> Result<String, AppError> {
    optional_var(name)
        .ok_or_else(|| AppError::config(format!("Required environment variable '{name}' is not set")))
}

/// Unset and blank are the same.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
