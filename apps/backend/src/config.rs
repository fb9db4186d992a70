//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub content_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://skilldrill.db?mode=rwc".to_string(),
            database_max_connections: 5,
            content_dir: PathBuf::from("content"),
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to
    /// defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS must be a number, got {v:?}"))?,
            None => defaults.database_max_connections,
        };
        let port = match lookup("PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("PORT must be a port number, got {v:?}"))?,
            None => defaults.port,
        };
        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS must be a number, got {v:?}"))?,
            ),
            None => defaults.request_timeout,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections,
            content_dir: lookup("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            request_timeout,
        })
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
