//! Configuration types.

use std::net::SocketAddr;

use crate::error::ConfigError;

/// Origins allowed to call the API when `MEALS_CORS_ORIGINS` is unset.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:8081",
    "exp://localhost:8081",
    "http://localhost:19006",
];

const DEFAULT_PORT: u16 = 6000;
const DEFAULT_API_URL: &str = "http://localhost:6000";

/// Backend server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// libSQL database location: a file path or `:memory:`.
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Seed the built-in ingredient catalog when the catalog is empty.
    pub seed_catalog: bool,
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// A missing `MEALS_DATABASE_URL` is an error; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = var("MEALS_DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("MEALS_DATABASE_URL".to_string()))?;

        let port = match var("MEALS_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "MEALS_PORT".to_string(),
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let bind_addr = var("MEALS_BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());

        let cors_origins: Vec<String> = match var("MEALS_CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        let seed_catalog = var("MEALS_SEED_CATALOG")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            bind_addr,
            port,
            cors_origins,
            seed_catalog,
        })
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                key: "MEALS_BIND_ADDR".to_string(),
                message: e.to_string(),
            })
    }
}

/// Client-side configuration: where the backend lives.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        match std::env::var("MEALS_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Join `path` onto the base URL, with or without a leading slash.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_url, path)
        } else {
            format!("{}/{}", self.api_url, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_database_url_is_fatal() {
        let err = ServerConfig::from_vars(vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "MEALS_DATABASE_URL"));

        let err = ServerConfig::from_vars(vars(&[("MEALS_DATABASE_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn defaults_applied() {
        let config = ServerConfig::from_vars(vars(&[("MEALS_DATABASE_URL", ":memory:")])).unwrap();
        assert_eq!(config.database_url, ":memory:");
        assert_eq!(config.port, 6000);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.cors_origins.len(), DEFAULT_CORS_ORIGINS.len());
        assert!(!config.seed_catalog);
        assert_eq!(config.socket_addr().unwrap().port(), 6000);
    }

    #[test]
    fn overrides_parsed() {
        let config = ServerConfig::from_vars(vars(&[
            ("MEALS_DATABASE_URL", "./data/meals.db"),
            ("MEALS_PORT", "7001"),
            ("MEALS_BIND_ADDR", "127.0.0.1"),
            ("MEALS_CORS_ORIGINS", "http://a.test, http://b.test,,"),
            ("MEALS_SEED_CATALOG", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.port, 7001);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(config.seed_catalog);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:7001");
    }

    #[test]
    fn invalid_port_rejected() {
        let err = ServerConfig::from_vars(vars(&[
            ("MEALS_DATABASE_URL", ":memory:"),
            ("MEALS_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MEALS_PORT"));
    }

    #[test]
    fn build_url_handles_slashes() {
        let config = ClientConfig::new("http://localhost:6000/");
        assert_eq!(config.build_url("/api/profile"), "http://localhost:6000/api/profile");
        assert_eq!(config.build_url("api/profile"), "http://localhost:6000/api/profile");
    }
}
