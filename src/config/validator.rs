//! Environment value assertions used while building [`Config`](super::Config).

use crate::error::ConfigError;
use std::str::FromStr;

/// Read `key` from `lookup` (the process environment in production), falling back to
/// `default` when unset.
pub fn assert_var<F>(lookup: &F, key: &str, default: Option<&str>) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => Ok(v),
        None => default
            .map(String::from)
            .ok_or_else(|| ConfigError::Missing(key.to_string())),
    }
}

/// Parse a number; empty strings are rejected.
pub fn assert_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        reason: format!("'{}' is not a number", value),
    })
}

/// Accepts `true` / `false` in any case.
pub fn assert_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("'{}' is not a boolean", value),
        })
    }
}

/// Parse into an enum through its `FromStr` impl, reporting the key on failure.
pub fn assert_enum<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        reason: format!("could not convert '{}' to enum", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;

    #[test]
    fn default_used_when_unset() {
        let lookup = |k: &str| (k == "SET").then(|| "value".to_string());
        assert_eq!(assert_var(&lookup, "SET", Some("fallback")).unwrap(), "value");
        assert_eq!(assert_var(&lookup, "UNSET", Some("fallback")).unwrap(), "fallback");
        let err = assert_var(&lookup, "UNSET", None).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(k) if k == "UNSET"));
    }

    #[test]
    fn numbers() {
        assert_eq!(assert_number::<u32>("PORT", "3000").unwrap(), 3000);
        assert!(assert_number::<u32>("PORT", "").is_err());
        assert!(assert_number::<u32>("PORT", "abc").is_err());
    }

    #[test]
    fn booleans() {
        assert!(assert_bool("X", "TRUE").unwrap());
        assert!(!assert_bool("X", "false").unwrap());
        assert!(assert_bool("X", "yes").is_err());
    }

    #[test]
    fn enums() {
        assert_eq!(assert_enum::<AppEnv>("APP_ENV", "test").unwrap(), AppEnv::Test);
        assert!(assert_enum::<AppEnv>("APP_ENV", "staging").is_err());
    }
}
