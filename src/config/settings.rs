use std::env;

use axum::http::HeaderValue;
use tracing::error;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo { uri: String, database: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub cors_origin: HeaderValue,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                error!("{} not found in environment variables", key);
                ConfigError::Missing(key)
            })
        };

        let store = match lookup("STORE_BACKEND").as_deref() {
            None | Some("mongo") => StoreBackend::Mongo {
                uri: required("MONGO_URI")?,
                database: required("DATABASE_NAME")?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:8000".into());
        let cors_origin = cors_origin
            .parse::<HeaderValue>()
            .map_err(|_| ConfigError::InvalidCorsOrigin(cors_origin.clone()))?;

        Ok(Self {
            store,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "localhost:9000".into()),
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_mongo_backend() {
        let config = config_from(&[
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("DATABASE_NAME", "polly"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();

        assert_eq!(
            config.store,
            StoreBackend::Mongo {
                uri: "mongodb://localhost:27017".into(),
                database: "polly".into(),
            }
        );
        assert_eq!(config.bind_addr, "localhost:9000");
        assert_eq!(config.cors_origin.to_str().unwrap(), "http://localhost:8000");
    }

    #[test]
    fn memory_backend_needs_no_mongo_settings() {
        let config = config_from(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn missing_values_are_reported_by_name() {
        let err = config_from(&[("JWT_SECRET", "s3cret")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MONGO_URI")));

        let err = config_from(&[("STORE_BACKEND", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = config_from(&[("STORE_BACKEND", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackend(name) if name == "redis"));
    }
}
