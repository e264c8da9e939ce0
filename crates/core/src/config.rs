//! Helpers for reading typed settings from environment variables.

use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("could not resolve path for {key}: {source}")]
    Path {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Read `key`, falling back to `default` when unset.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse `key`, falling back to `default` when unset.
pub fn parse_env<T: FromStr>(
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Read and parse an optional `key`; unset or empty yields `None`.
pub fn parse_env_opt<T: FromStr>(
    key: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key,
                expected,
                value,
            }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_use_defaults() {
        let port: u16 = parse_env("DECKHAND_TEST_UNSET_PORT", 3000, "u16").unwrap();
        assert_eq!(port, 3000);
        let timeout: Option<u64> = parse_env_opt("DECKHAND_TEST_UNSET_TIMEOUT", "u64").unwrap();
        assert_eq!(timeout, None);
        assert_eq!(env_or("DECKHAND_TEST_UNSET_HOST", "0.0.0.0"), "0.0.0.0");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        std::env::set_var("DECKHAND_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("DECKHAND_TEST_BAD_PORT", 3000, "u16").unwrap_err();
        assert_eq!(
            err.to_string(),
            "DECKHAND_TEST_BAD_PORT must be a valid u16, got \"eighty\""
        );
    }

    #[test]
    fn optional_values_are_parsed() {
        std::env::set_var("DECKHAND_TEST_OPT_SECS", " 90 ");
        let secs: Option<u64> = parse_env_opt("DECKHAND_TEST_OPT_SECS", "u64").unwrap();
        assert_eq!(secs, Some(90));
    }
}
