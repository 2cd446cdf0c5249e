//! Server configuration read from the environment.

use std::collections::HashMap;
use std::time::Duration;

use quiz_core::QuestionCount;
use thiserror::Error;
use uuid::Uuid;

use crate::services::sessions::DEFAULT_IDLE_TIMEOUT;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("AUTH_TOKENS entry '{0}' must look like token=user-uuid")]
    AuthToken(String),
}

/// Runtime settings for the backend
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// PostgreSQL URL; without one the in-memory store is used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Pre-provisioned bearer tokens and the users they resolve to.
    pub auth_tokens: Vec<(String, Uuid)>,
    pub default_question_count: QuestionCount,
    /// Unfinished quiz sessions idle this long are dropped.
    pub session_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            database_max_connections: 10,
            auth_tokens: Vec::new(),
            default_question_count: QuestionCount::default(),
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl Config {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for unset values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => parse(&v, "PORT", "a port number")?,
            None => defaults.port,
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => parse(&v, "DATABASE_MAX_CONNECTIONS", "a positive integer")?,
            None => defaults.database_max_connections,
        };

        let default_question_count = match get("DEFAULT_QUESTION_COUNT") {
            Some(v) => {
                let n: usize = parse(&v, "DEFAULT_QUESTION_COUNT", "an integer in 3..=20")?;
                QuestionCount::new(n).map_err(|_| ConfigError::Invalid {
                    name: "DEFAULT_QUESTION_COUNT",
                    value: v,
                    expected: "an integer in 3..=20",
                })?
            }
            None => defaults.default_question_count,
        };

        let session_idle_timeout = match get("SESSION_IDLE_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 =
                    parse(&v, "SESSION_IDLE_TIMEOUT_SECS", "a positive number of seconds")?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_IDLE_TIMEOUT_SECS",
                        value: v,
                        expected: "a positive number of seconds",
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.session_idle_timeout,
        };

        let auth_tokens = match get("AUTH_TOKENS") {
            Some(v) => parse_auth_tokens(&v)?,
            None => defaults.auth_tokens,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            auth_tokens,
            default_question_count,
            session_idle_timeout,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    value: &str,
    name: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
        expected,
    })
}

/// Parse `token=uuid` pairs separated by commas.
pub fn parse_auth_tokens(raw: &str) -> Result<Vec<(String, Uuid)>, ConfigError> {
    let mut seen = HashMap::new();
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (token, user) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::AuthToken(entry.to_string()))?;
            let token = token.trim();
            let user = user
                .trim()
                .parse::<Uuid>()
                .map_err(|_| ConfigError::AuthToken(entry.to_string()))?;
            if token.is_empty() || seen.insert(token.to_string(), user).is_some() {
                return Err(ConfigError::AuthToken(entry.to_string()));
            }
            Ok((token.to_string(), user))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.default_question_count.get(), 5);
        assert!(config.auth_tokens.is_empty());
        assert_eq!(config.session_idle_timeout, Duration::from_secs(7200));
    }

    #[test]
    fn test_reads_values() {
        let user = Uuid::new_v4();
        let tokens = format!("alpha={}", user);
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/notes"),
            ("DEFAULT_QUESTION_COUNT", "10"),
            ("AUTH_TOKENS", &tokens),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/notes"));
        assert_eq!(config.default_question_count.get(), 10);
        assert_eq!(config.auth_tokens, vec![("alpha".to_string(), user)]);
    }

    #[test]
    fn test_blank_database_url_is_unset() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a port number, got 'http'");
    }

    #[test]
    fn test_question_count_out_of_range() {
        let err = Config::from_lookup(lookup(&[("DEFAULT_QUESTION_COUNT", "50")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DEFAULT_QUESTION_COUNT", .. }));
    }

    #[test]
    fn test_session_idle_timeout() {
        let config = Config::from_lookup(lookup(&[("SESSION_IDLE_TIMEOUT_SECS", "900")])).unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(900));

        let err = Config::from_lookup(lookup(&[("SESSION_IDLE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SESSION_IDLE_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn test_parse_auth_tokens() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let parsed = parse_auth_tokens(&format!(" one={} , two={},", a, b)).unwrap();
        assert_eq!(parsed, vec![("one".to_string(), a), ("two".to_string(), b)]);
    }

    #[test]
    fn test_parse_auth_tokens_rejects_bad_entries() {
        assert!(parse_auth_tokens("missing-separator").is_err());
        assert!(parse_auth_tokens("tok=not-a-uuid").is_err());
        let dup = format!("tok={},tok={}", Uuid::new_v4(), Uuid::new_v4());
        assert!(parse_auth_tokens(&dup).is_err());
    }
}
