//! Configuration module for the MessMate backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Password accepted for seeded users that never registered one.
pub const DEFAULT_FALLBACK_PASSWORD: &str = "password";

/// Price charged per consumed meal in the monthly summary.
pub const DEFAULT_PRICE_PER_MEAL: u32 = 35;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file backing the key-value store
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Universal password for users without a stored password
    pub fallback_password: String,
    /// Price per consumed meal
    pub price_per_meal: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("MESSMATE_DB_PATH")
            .unwrap_or_else(|_| "./data/messmate.sqlite".to_string())
            .into();

        let bind_addr = env::var("MESSMATE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid MESSMATE_BIND_ADDR format");

        let log_level = env::var("MESSMATE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("MESSMATE_LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let fallback_password = env::var("MESSMATE_FALLBACK_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_FALLBACK_PASSWORD.to_string());

        let price_per_meal = env::var("MESSMATE_PRICE_PER_MEAL")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PRICE_PER_MEAL);

        Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            fallback_password,
            price_per_meal,
        }
    }
}
