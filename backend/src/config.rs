//! Runtime settings.
//!
//! Everything has a development default; deployments override through
//! environment variables.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite:warranties.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Origin the browser frontend is served from, for CORS
    pub allowed_origin: String,
}

impl Settings {
    /// Load settings from the environment, falling back to development
    /// defaults.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("WARRANTY_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = env::var("WARRANTY_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("WARRANTY_BIND_ADDR is not a valid socket address")?;
        let allowed_origin = env::var("WARRANTY_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Self {
            database_url,
            bind_addr,
            allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        // Defaults must always produce a usable configuration
        let settings = Settings::from_env().expect("Default settings should parse");
        assert!(!settings.database_url.is_empty());
        assert!(!settings.allowed_origin.is_empty());
    }
}
