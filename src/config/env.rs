//! `Config` assembled from environment variables (loaded from `.env` by the binary).

use crate::config::validator::{assert_bool, assert_enum, assert_number, assert_var};
use crate::error::ConfigError;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Test,
    Production,
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(AppEnv::Development),
            "test" => Ok(AppEnv::Test),
            "production" => Ok(AppEnv::Production),
            _ => Err(ConfigError::Invalid {
                key: "APP_ENV".into(),
                reason: format!("'{}' (expected development, test or production)", s),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: AppEnv,
    pub database_url: String,
    /// Schema used to qualify table names.
    pub db_schema: String,
    pub db_max_connections: u32,
    /// Default and ceiling for list `limit`.
    pub paging_max_limit: i64,
    pub bind_addr: String,
    pub port: u16,
    pub request_body_limit: usize,
    /// Permissive CORS on every route.
    pub cors_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env: AppEnv = assert_enum("APP_ENV", &assert_var(&lookup, "APP_ENV", Some("development"))?)?;

        let database_url = match lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
            Some(url) => url,
            None => {
                let host = assert_var(&lookup, "POSTGRES_HOST", None)?;
                let port: u16 = assert_number("POSTGRES_PORT", &assert_var(&lookup, "POSTGRES_PORT", None)?)?;
                let user = assert_var(&lookup, "POSTGRES_USER", None)?;
                let password = assert_var(&lookup, "POSTGRES_PASSWORD", None)?;
                let db = assert_var(&lookup, "POSTGRES_DB", None)?;
                format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, db)
            }
        };

        let db_schema = assert_var(&lookup, "POSTGRES_SCHEMA", Some("public"))?;
        if db_schema.is_empty() || db_schema.contains('"') {
            return Err(ConfigError::Invalid {
                key: "POSTGRES_SCHEMA".into(),
                reason: "must be a non-empty identifier".into(),
            });
        }

        let paging_max_limit: i64 =
            assert_number("PAGING_MAX_LIMIT", &assert_var(&lookup, "PAGING_MAX_LIMIT", Some("50"))?)?;
        if paging_max_limit < 1 {
            return Err(ConfigError::Invalid {
                key: "PAGING_MAX_LIMIT".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Config {
            app_env,
            database_url,
            db_schema,
            db_max_connections: assert_number(
                "DB_MAX_CONNECTIONS",
                &assert_var(&lookup, "DB_MAX_CONNECTIONS", Some("5"))?,
            )?,
            paging_max_limit,
            bind_addr: assert_var(&lookup, "BIND_ADDR", Some("0.0.0.0"))?,
            port: assert_number("PORT", &assert_var(&lookup, "PORT", Some("3000"))?)?,
            request_body_limit: assert_number(
                "REQUEST_BODY_LIMIT",
                &assert_var(&lookup, "REQUEST_BODY_LIMIT", Some("1048576"))?,
            )?,
            cors_enabled: assert_bool("CORS_IS_ENABLED", &assert_var(&lookup, "CORS_IS_ENABLED", Some("false"))?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn database_url_wins_and_defaults_apply() {
        let cfg = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/catalog")])).unwrap();
        assert_eq!(cfg.database_url, "postgres://localhost/catalog");
        assert_eq!(cfg.db_schema, "public");
        assert_eq!(cfg.paging_max_limit, 50);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.app_env, AppEnv::Development);
        assert!(!cfg.cors_enabled);
    }

    #[test]
    fn cors_flag_must_be_boolean() {
        let url = ("DATABASE_URL", "postgres://localhost/catalog");
        let cfg = Config::from_lookup(lookup_from(&[url, ("CORS_IS_ENABLED", "TRUE")])).unwrap();
        assert!(cfg.cors_enabled);
        let err = Config::from_lookup(lookup_from(&[url, ("CORS_IS_ENABLED", "on")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "CORS_IS_ENABLED"));
    }

    #[test]
    fn url_composed_from_parts() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_PORT", "5432"),
            ("POSTGRES_USER", "svc"),
            ("POSTGRES_PASSWORD", "pw"),
            ("POSTGRES_DB", "catalog"),
            ("POSTGRES_SCHEMA", "products"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url, "postgres://svc:pw@db:5432/catalog");
        assert_eq!(cfg.db_schema, "products");
    }

    #[test]
    fn missing_part_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("POSTGRES_HOST", "db")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(k) if k == "POSTGRES_PORT"));
    }

    #[test]
    fn rejects_zero_paging_limit_and_unknown_env() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("PAGING_MAX_LIMIT", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "PAGING_MAX_LIMIT"));

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("APP_ENV", "staging"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "APP_ENV"));
    }
}
