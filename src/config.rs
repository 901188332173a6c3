//! Runtime configuration.
//!
//! Every value has a baked-in default; [`AppConfig::from_env`] overrides the
//! defaults from environment variables and silently ignores values that do not
//! parse (a warning is logged instead).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::controller::ControllerConfig;
use crate::error::{CatalogError, Result};

/// Environment variable names understood by [`AppConfig::from_env`].
pub const ENV_KEYS: &[&str] = &[
    "RAWG_API_KEY",
    "RAWG_BASE_URL",
    "TWITCH_CLIENT_ID",
    "TWITCH_CLIENT_SECRET",
    "DB_PATH",
    "PORT",
    "HTTP_TIMEOUT_SECS",
    "LIST_DEBOUNCE_MS",
    "LIST_PAGE_SIZE",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// RAWG API key (sent as the `key` query parameter)
    pub rawg_api_key: String,

    /// RAWG API root
    pub rawg_base_url: String,

    /// Twitch application client id
    pub twitch_client_id: String,

    /// Twitch application client secret
    pub twitch_client_secret: String,

    /// Twitch Helix API root
    pub twitch_base_url: String,

    /// Twitch OAuth token endpoint
    pub twitch_auth_url: String,

    /// SQLite database path (`:memory:` allowed)
    pub db_path: String,

    /// HTTP server port
    pub port: u16,

    /// Upstream request timeout in seconds
    pub http_timeout_secs: u64,

    /// Debounce delay for list search/filter input, in milliseconds
    pub debounce_ms: u64,

    /// Fixed list page size
    pub page_size: u32,

    /// Number of page buttons in the pagination window
    pub window_width: u32,

    /// Pages kept in each controller's cache (0 disables caching)
    pub page_cache_capacity: usize,

    /// Key under which the current list page is persisted
    pub page_storage_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rawg_api_key: String::new(),
            rawg_base_url: "https://api.rawg.io/api".to_string(),
            twitch_client_id: String::new(),
            twitch_client_secret: String::new(),
            twitch_base_url: "https://api.twitch.tv/helix".to_string(),
            twitch_auth_url: "https://id.twitch.tv/oauth2/token".to_string(),
            db_path: "game_catalog.db".to_string(),
            port: 8090,
            http_timeout_secs: 10,
            debounce_ms: 500,
            page_size: 20,
            window_width: 5,
            page_cache_capacity: 32,
            page_storage_key: "game-list.current-page".to_string(),
        }
    }
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        Self::from_map(&vars)
    }

    /// Build configuration from a key/value map, falling back to defaults.
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        Self {
            rawg_api_key: string_or(vars, "RAWG_API_KEY", defaults.rawg_api_key),
            rawg_base_url: string_or(vars, "RAWG_BASE_URL", defaults.rawg_base_url),
            twitch_client_id: string_or(vars, "TWITCH_CLIENT_ID", defaults.twitch_client_id),
            twitch_client_secret: string_or(
                vars,
                "TWITCH_CLIENT_SECRET",
                defaults.twitch_client_secret,
            ),
            db_path: string_or(vars, "DB_PATH", defaults.db_path),
            port: parsed_or(vars, "PORT", defaults.port),
            http_timeout_secs: parsed_or(vars, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            debounce_ms: parsed_or(vars, "LIST_DEBOUNCE_MS", defaults.debounce_ms),
            page_size: parsed_or(vars, "LIST_PAGE_SIZE", defaults.page_size).max(1),
            ..defaults
        }
    }

    /// Reject settings the engine cannot start with
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("RAWG_BASE_URL", &self.rawg_base_url),
            ("twitch_base_url", &self.twitch_base_url),
            ("twitch_auth_url", &self.twitch_auth_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CatalogError::Config(format!("{} is not an http(s) URL: {:?}", name, url)));
            }
        }
        if self.db_path.trim().is_empty() {
            return Err(CatalogError::Config("DB_PATH is empty".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(CatalogError::Config("HTTP_TIMEOUT_SECS must be at least 1".to_string()));
        }
        if self.page_storage_key.trim().is_empty() {
            return Err(CatalogError::Config("page storage key is empty".to_string()));
        }
        Ok(())
    }

    /// Upstream request timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Whether Twitch credentials are present
    pub fn twitch_enabled(&self) -> bool {
        !self.twitch_client_id.is_empty() && !self.twitch_client_secret.is_empty()
    }

    /// Settings for list controllers spawned from this configuration
    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            page_size: self.page_size.max(1),
            window_width: self.window_width.max(1),
            cache_capacity: self.page_cache_capacity,
            page_key: self.page_storage_key.clone(),
        }
    }
}

fn string_or(vars: &HashMap<String, String>, key: &str, default: String) -> String {
    match vars.get(key) {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default,
    }
}

fn parsed_or<T: std::str::FromStr + Copy>(
    vars: &HashMap<String, String>,
    key: &str,
    default: T,
) -> T {
    match vars.get(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable config value");
            default
        }),
        None => default,
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rawg={}, db={}, port={}, debounce={}ms, page_size={}, twitch={}",
            self.rawg_base_url,
            self.db_path,
            self.port,
            self.debounce_ms,
            self.page_size,
            if self.twitch_enabled() { "on" } else { "off" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_unusable_settings() {
        assert!(AppConfig::default().validate().is_ok());

        let config = AppConfig {
            rawg_base_url: "api.rawg.io/api".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));

        let config = AppConfig {
            http_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));

        let config = AppConfig {
            db_path: " ".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.window_width, 5);
        assert_eq!(config.port, 8090);
        assert!(!config.twitch_enabled());
    }

    #[test]
    fn test_from_map_with_values() {
        let mut vars = HashMap::new();
        vars.insert("RAWG_API_KEY".to_string(), "abc123".to_string());
        vars.insert("PORT".to_string(), "9000".to_string());
        vars.insert("LIST_DEBOUNCE_MS".to_string(), "250".to_string());
        vars.insert("TWITCH_CLIENT_ID".to_string(), "id".to_string());
        vars.insert("TWITCH_CLIENT_SECRET".to_string(), "secret".to_string());

        let config = AppConfig::from_map(&vars);
        assert_eq!(config.rawg_api_key, "abc123");
        assert_eq!(config.port, 9000);
        assert_eq!(config.debounce_ms, 250);
        assert!(config.twitch_enabled());
        assert_eq!(config.page_size, 20); // default
    }

    #[test]
    fn test_from_map_unparsable_falls_back() {
        let mut vars = HashMap::new();
        vars.insert("PORT".to_string(), "not-a-port".to_string());
        vars.insert("LIST_PAGE_SIZE".to_string(), "0".to_string());

        let config = AppConfig::from_map(&vars);
        assert_eq!(config.port, 8090);
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_from_map_empty() {
        let config = AppConfig::from_map(&HashMap::new());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_controller_config() {
        let controller = AppConfig::default().controller();
        assert_eq!(controller.debounce, Duration::from_millis(500));
        assert_eq!(controller.page_size, 20);
        assert_eq!(controller.page_key, "game-list.current-page");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: AppConfig = serde_json::from_str(r#"{"page_size": 40}"#).unwrap();
        assert_eq!(config.page_size, 40);
        assert_eq!(config.debounce_ms, 500);
    }
}
