//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default per-operation storage deadline
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// PEM file holding the Ed25519 private key used to sign identity tokens
    pub token_signing_key_path: String,
    /// PEM file holding the matching Ed25519 public key
    pub token_verifying_key_path: String,
    /// `iss` claim written into and required from identity tokens
    pub token_issuer: String,

    /// Deadline applied to every storage unit of work
    pub storage_timeout_ms: u64,

    /// Runtime configuration
    pub log_format: String,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_timeout_ms = match lookup("STORAGE_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| anyhow::anyhow!("STORAGE_TIMEOUT_MS must be a positive integer"))?,
            None => DEFAULT_STORAGE_TIMEOUT_MS,
        };

        let config = Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),

            token_signing_key_path: lookup("TOKEN_SIGNING_KEY_PATH")
                .ok_or_else(|| anyhow::anyhow!("TOKEN_SIGNING_KEY_PATH is required"))?,
            token_verifying_key_path: lookup("TOKEN_VERIFYING_KEY_PATH")
                .ok_or_else(|| anyhow::anyhow!("TOKEN_VERIFYING_KEY_PATH is required"))?,
            token_issuer: lookup("TOKEN_ISSUER").unwrap_or_else(|| "fellowship".to_string()),

            storage_timeout_ms,

            log_format: lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "fellowship=debug".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}
