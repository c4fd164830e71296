//! Supabase project configuration shared by every client consumer.

use std::{env, fmt};

use once_cell::sync::Lazy;
use thiserror::Error;

/// Project endpoint from Supabase Project Settings > API.
pub const DEFAULT_SUPABASE_URL: &str = "https://wawbhunfmbiiudrfuckx.supabase.co";

/// Publishable (client-side) key for [`DEFAULT_SUPABASE_URL`].
pub const DEFAULT_SUPABASE_KEY: &str = "sb_publishable_mMhLpqQzioFhpiIHDPTPwQ_y-dHLQ-7";

static PROJECT_CONFIG: Lazy<SupabaseConfig> =
    Lazy::new(|| SupabaseConfig::new(DEFAULT_SUPABASE_URL, DEFAULT_SUPABASE_KEY));

/// Returns the process-wide project configuration. Built on first access and
/// never mutated afterwards.
pub fn project_config() -> &'static SupabaseConfig {
    &PROJECT_CONFIG
}

/// Endpoint URL plus API key handed verbatim to the client SDK.
#[derive(Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    url: String,
    key: String,
}

impl SupabaseConfig {
    /// Builds a configuration without inspecting either value.
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    /// Loads `SUPABASE_URL` and `SUPABASE_KEY` after hydrating `.env` (if
    /// present). Both variables are required.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            url: get_required_var("SUPABASE_URL")?,
            key: get_required_var("SUPABASE_KEY")?,
        })
    }

    /// Like [`SupabaseConfig::load_from_env`], but each missing variable falls
    /// back to the project constant.
    pub fn load_from_env_or_default() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            url: get_optional_var("SUPABASE_URL")
                .unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string()),
            key: get_optional_var("SUPABASE_KEY")
                .unwrap_or_else(|| DEFAULT_SUPABASE_KEY.to_string()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Opt-in sanity check. The initializer never calls this; malformed
    /// values reach the SDK unless the caller validates first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyValue { field: "url" });
        }
        if self.key.trim().is_empty() {
            return Err(ConfigError::EmptyValue { field: "key" });
        }
        Ok(())
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    get_optional_var(key).ok_or(ConfigError::MissingVar { key })
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("SUPABASE_BOOTSTRAP_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    dotenv_outcome(dotenvy::dotenv())
}

/// A missing `.env` is fine; any other loader failure is surfaced.
fn dotenv_outcome<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ConfigError::Dotenv { source }),
    }
}

/// Errors emitted when `.env` hydration, environment parsing, or explicit
/// validation fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("supabase `{field}` must not be empty")]
    EmptyValue { field: &'static str },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}
