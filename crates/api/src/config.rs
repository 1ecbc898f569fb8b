//! Application configuration loaded from environment variables.

use std::path::PathBuf;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `DB_PATH` — snapshot file location (default: `"db.json"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Unset keys and unparsable ports fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            db_path: lookup("DB_PATH").map_or(defaults.db_path, PathBuf::from),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            db_path: PathBuf::from("db.json"),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("db.json"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_lookup_uses_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.db_path, PathBuf::from("db.json"));
    }

    #[test]
    fn test_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DB_PATH", "/var/lib/seats/db.json"),
            ("RUST_LOG", "debug"),
        ]));
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/seats/db.json"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, 3000);
    }
}
