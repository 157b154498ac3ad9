// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading configuration
//! and the chat credential at startup. Nothing here is global: callers hold
//! the returned values and pass them to whoever needs them.

use std::fmt;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{BotConfig, Config};

/// Environment variable that overrides `bot.token_file`.
pub const TOKEN_ENV: &str = "BACKERLINE_TOKEN";

/// Chat platform credential, handed to the transport adapter at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(AppError::config("chat token is empty"));
        }
        Ok(Self { token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if loading fails, then validates.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_or_default(path);
    config.validate()?;
    Ok(config)
}

/// Load and validate configuration with no fallback: a missing or
/// unparsable file is an error.
pub fn load_config_strict(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Resolve the chat credential: environment first, then the configured file.
pub fn load_credentials(bot: &BotConfig) -> Result<Credentials> {
    credentials_from(std::env::var(TOKEN_ENV).ok(), bot)
}

fn credentials_from(env_token: Option<String>, bot: &BotConfig) -> Result<Credentials> {
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        return Credentials::new(token);
    }

    match &bot.token_file {
        Some(path) => {
            let token = std::fs::read_to_string(path).map_err(|e| {
                AppError::config(format!("cannot read token file {}: {e}", path.display()))
            })?;
            Credentials::new(token)
        }
        None => Err(AppError::config(format!(
            "no chat token: set {TOKEN_ENV} or bot.token_file"
        ))),
    }
}
