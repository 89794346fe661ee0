//! Configuration module for the BuildHub backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Signing secret for inbound auth-provider webhooks
    pub webhook_secret: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to Tantivy search index directory
    pub index_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("BUILDHUB_API_PSK").ok();
        let webhook_secret = env::var("BUILDHUB_WEBHOOK_SECRET").ok();

        let db_path = env::var("BUILDHUB_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let index_path = env::var("BUILDHUB_INDEX_PATH")
            .unwrap_or_else(|_| "./data/index".to_string())
            .into();

        let bind_addr = env::var("BUILDHUB_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid BUILDHUB_BIND_ADDR format");

        let log_level = env::var("BUILDHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_psk,
            webhook_secret,
            db_path,
            index_path,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("BUILDHUB_API_PSK");
        env::remove_var("BUILDHUB_WEBHOOK_SECRET");
        env::remove_var("BUILDHUB_DB_PATH");
        env::remove_var("BUILDHUB_INDEX_PATH");
        env::remove_var("BUILDHUB_BIND_ADDR");
        env::remove_var("BUILDHUB_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.index_path, PathBuf::from("./data/index"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }
}
