//! Runtime configuration
//!
//! Everything is read from the environment once at startup (after `.env` has
//! been loaded by `dotenvy`) and then shared through [`crate::database::AppState`].

use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "data.db";
const DEFAULT_SHORTENER_TIMEOUT_SECS: u64 = 10;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server listens on (`PORT`)
    pub port: u16,

    /// Path of the redb database file (`DATABASE_URL`)
    pub database_path: String,

    /// Shared secret expected in the `Authorization` header of admin requests
    /// (`AUTHORIZATION`). When unset or empty the admin check is skipped.
    pub admin_token: Option<String>,

    pub shortener: ShortenerConfig,
}

/// Settings for the external link shortening provider
#[derive(Debug, Clone)]
pub struct ShortenerConfig {
    /// Provider endpoint, e.g. `https://short.example/api`
    pub base_url: String,

    /// Pre-shared token sent as the `api` query parameter
    pub api_token: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Maximum number of provider requests in flight for one movie write.
    /// `1` shortens links strictly one after another.
    pub concurrency: usize,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            timeout: Duration::from_secs(DEFAULT_SHORTENER_TIMEOUT_SECS),
            concurrency: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: DEFAULT_DATABASE.to_string(),
            admin_token: None,
            shortener: ShortenerConfig::default(),
        }
    }
}

impl Config {
    /// Reads the configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `PORT` - Server port number (default: 8080)
    /// - `DATABASE_URL` - Path to database file (default: "data.db")
    /// - `AUTHORIZATION` - Admin token (default: unset, admin check disabled)
    /// - `SHORTENER_BASE_URL` / `TERABOXLINKS_BASE_URL` - Provider endpoint
    /// - `SHORTENER_API_KEY` / `TERABOXLINKS_API_KEY` - Provider token
    /// - `SHORTENER_TIMEOUT_SECS` - Provider request timeout (default: 10)
    /// - `SHORTENER_CONCURRENCY` - Provider requests in flight (default: 1)
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let database_path = env::var("DATABASE_URL").unwrap_or(defaults.database_path);

        let admin_token = env::var("AUTHORIZATION").ok().filter(|t| !t.is_empty());

        let shortener = ShortenerConfig {
            base_url: first_var(&["SHORTENER_BASE_URL", "TERABOXLINKS_BASE_URL"]).unwrap_or_default(),
            api_token: first_var(&["SHORTENER_API_KEY", "TERABOXLINKS_API_KEY"]).unwrap_or_default(),
            timeout: env::var("SHORTENER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.shortener.timeout),
            concurrency: env::var("SHORTENER_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(defaults.shortener.concurrency)
                .max(1),
        };

        Self {
            port,
            database_path,
            admin_token,
            shortener,
        }
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.is_empty())
}
