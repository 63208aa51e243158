//! Configuration module for the roster backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_LOOKUP_BASE_URL: &str = "https://developer-lostark.game.onstove.com";
const DEFAULT_GRACE_MINUTES: i64 = 120;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;
const MAX_GRACE_MINUTES: i64 = 30 * 24 * 60;
const MAX_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// HMAC secret for admin claims; admin override is off without it
    pub admin_secret: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Game API base URL
    pub lookup_base_url: String,
    /// Game API bearer token
    pub lookup_api_key: Option<String>,
    /// How long after its start a session is kept
    pub expiry_grace: chrono::Duration,
    /// Time between expiry sweeps
    pub sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Malformed or out-of-range values fall back to their defaults; the
    /// returned messages describe each fallback so they can be logged once
    /// tracing is up.
    pub fn from_env() -> (Self, Vec<String>) {
        dotenvy::dotenv().ok();
        let mut reader = EnvReader::default();

        let api_psk = non_empty_var("ROSTER_API_PSK");
        let admin_secret = non_empty_var("ROSTER_ADMIN_SECRET");

        let db_path = env::var("ROSTER_DB_PATH")
            .unwrap_or_else(|_| "./data/roster.sqlite".to_string())
            .into();

        let default_addr = DEFAULT_BIND_ADDR
            .parse()
            .unwrap_or(SocketAddr::from(([127, 0, 0, 1], 8080)));
        let bind_addr = reader.parse("ROSTER_BIND_ADDR", default_addr, |_| true);

        let log_level = env::var("ROSTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let lookup_base_url = env::var("ROSTER_LOOKUP_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LOOKUP_BASE_URL.to_string());
        let lookup_api_key = non_empty_var("ROSTER_LOOKUP_API_KEY");

        let grace_minutes = reader.parse(
            "ROSTER_EXPIRY_GRACE_MINUTES",
            DEFAULT_GRACE_MINUTES,
            |m: &i64| (1..=MAX_GRACE_MINUTES).contains(m),
        );
        let sweep_secs = reader.parse(
            "ROSTER_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
            |s: &u64| (1..=MAX_SWEEP_INTERVAL_SECS).contains(s),
        );

        let config = Self {
            api_psk,
            admin_secret,
            db_path,
            bind_addr,
            log_level,
            lookup_base_url,
            lookup_api_key,
            expiry_grace: chrono::Duration::minutes(grace_minutes),
            sweep_interval: Duration::from_secs(sweep_secs),
        };
        (config, reader.fallbacks)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Reads typed variables, recording every value that had to be replaced.
#[derive(Default)]
struct EnvReader {
    fallbacks: Vec<String>,
}

impl EnvReader {
    fn parse<T>(&mut self, key: &str, default: T, valid: impl Fn(&T) -> bool) -> T
    where
        T: FromStr + Display,
    {
        let Ok(raw) = env::var(key) else {
            return default;
        };
        match raw.trim().parse::<T>() {
            Ok(value) if valid(&value) => value,
            _ => {
                self.fallbacks.push(format!(
                    "Ignoring invalid {}={:?}, using {}",
                    key, raw, default
                ));
                default
            }
        }
    }
}
