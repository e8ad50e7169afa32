use std::env;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

/// Gateway configuration loaded from environment variables.
///
/// Every key is required; there are no defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind the HTTP listener to (`APP_URL`)
    pub app_url: String,
    /// Port to bind the HTTP listener to (`APP_PORT`)
    pub app_port: u16,
    /// Ethereum node JSON-RPC endpoint (`NODE_URL`)
    pub node_url: String,
    /// Whole-request timeout (`API_TIMEOUT`, seconds)
    pub api_timeout: Duration,
    /// Verbose, human-readable logs instead of JSON (`ENABLE_DEBUG`)
    pub enable_debug: bool,
}

impl Config {
    /// Load configuration from environment variables.
    /// Call dotenvy::dotenv() before calling this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{} must be set in environment or .env file", key))
        };

        let app_url = require("APP_URL")?;

        let app_port: u16 = require("APP_PORT")?
            .parse()
            .context("APP_PORT must be a valid u16")?;

        let node_url = require("NODE_URL")?;
        if !(node_url.starts_with("http://") || node_url.starts_with("https://")) {
            bail!("NODE_URL must be an http(s) URL, got {:?}", node_url);
        }

        let timeout_secs: u64 = require("API_TIMEOUT")?
            .parse()
            .context("API_TIMEOUT must be a whole number of seconds")?;
        if timeout_secs == 0 {
            bail!("API_TIMEOUT must be greater than zero");
        }

        let enable_debug = parse_bool(&require("ENABLE_DEBUG")?)
            .context("ENABLE_DEBUG must be a boolean")?;

        Ok(Config {
            app_url,
            app_port,
            node_url,
            api_timeout: Duration::from_secs(timeout_secs),
            enable_debug,
        })
    }

    /// Return the listener address as `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.app_url, self.app_port)
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => bail!("{:?} is not a boolean", other),
    }
}
