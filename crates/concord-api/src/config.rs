//! Server configuration from environment variables.

use axum::http::HeaderValue;
use tracing::warn;

use concord_core::defaults;

/// Settings for the HTTP server.
///
/// Pool sizing lives in `concord_db::PoolConfig`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, already validated as header values.
    pub cors_origins: Vec<HeaderValue>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_string(),
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            cors_origins: parse_allowed_origins(defaults::CORS_ORIGIN),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset or unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = Self::default();
        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(base.database_url),
            host: lookup("HOST").unwrap_or(base.host),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.port),
            cors_origins: lookup("CORS_ORIGIN")
                .map(|v| parse_allowed_origins(&v))
                .unwrap_or(base.cors_origins),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(base.max_upload_bytes),
        }
    }

    /// `host:port` for display; `host` may be a name such as `localhost`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated origin list, dropping invalid entries.
///
/// An empty list falls back to the default origin.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    let parsed: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if parsed.is_empty() {
        return vec![HeaderValue::from_static(defaults::CORS_ORIGIN)];
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8081"),
            ("HOST", "localhost"),
            ("MAX_UPLOAD_BYTES", "not-a-number"),
        ]));
        assert_eq!(config.host, "localhost");
        assert_eq!(config.bind_address(), "localhost:8081");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_cors_origin_list() {
        let origins = parse_allowed_origins("https://app.example.com, http://localhost:5173 ,");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "http://localhost:5173");

        let origins = parse_allowed_origins("  ");
        assert_eq!(origins, vec!["http://localhost:3000"]);
    }
}
