//! Process settings read from the environment.

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/petshop";
pub const DEFAULT_SCHEMA: &str = "petshop";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    /// Schema holding the entity tables. A plain SQL identifier.
    pub schema: String,
    pub bind: SocketAddr,
    pub max_connections: u32,
    /// Request body limit in bytes.
    pub body_limit: usize,
}

impl Settings {
    /// `DATABASE_URL`, `PETSHOP_SCHEMA`, `PETSHOP_BIND`,
    /// `PETSHOP_MAX_CONNECTIONS` and `PETSHOP_BODY_LIMIT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let schema = read("PETSHOP_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        if !is_identifier(&schema) {
            return Err(ConfigError::Invalid {
                key: "PETSHOP_SCHEMA",
                reason: format!("'{}' is not a valid identifier", schema),
            });
        }

        let bind_raw = read("PETSHOP_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let bind: SocketAddr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
            key: "PETSHOP_BIND",
            reason: format!("'{}': {}", bind_raw, e),
        })?;

        let max_connections = match read("PETSHOP_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "PETSHOP_MAX_CONNECTIONS",
                        reason: format!("'{}' is not a positive integer", raw),
                    })
                }
            },
        };

        let body_limit = match read("PETSHOP_BODY_LIMIT") {
            None => DEFAULT_BODY_LIMIT,
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                key: "PETSHOP_BODY_LIMIT",
                reason: format!("'{}': {}", raw, e),
            })?,
        };

        Ok(Self {
            database_url: read("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            schema,
            bind,
            max_connections,
            body_limit,
        })
    }
}

/// Letter or underscore first, then letters, digits or underscores.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(s.schema, "petshop");
        assert_eq!(s.bind.port(), 8080);
        assert_eq!(s.max_connections, 5);
        assert_eq!(s.body_limit, 65536);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("PETSHOP_SCHEMA", "loja_1"),
            ("PETSHOP_BIND", "127.0.0.1:3000"),
            ("PETSHOP_MAX_CONNECTIONS", "12"),
            ("PETSHOP_BODY_LIMIT", "1024"),
        ])
        .unwrap();
        assert_eq!(s.database_url, "postgres://db/shop");
        assert_eq!(s.schema, "loja_1");
        assert_eq!(s.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(s.max_connections, 12);
        assert_eq!(s.body_limit, 1024);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let s = settings(&[("PETSHOP_SCHEMA", "  ")]).unwrap();
        assert_eq!(s.schema, DEFAULT_SCHEMA);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("PETSHOP_SCHEMA", "pet-shop"),
            ("PETSHOP_SCHEMA", "1shop"),
            ("PETSHOP_BIND", "localhost"),
            ("PETSHOP_MAX_CONNECTIONS", "0"),
            ("PETSHOP_BODY_LIMIT", "-5"),
        ] {
            let err = settings(&[(key, value)]).unwrap_err();
            let ConfigError::Invalid { key: failed, .. } = err;
            assert_eq!(failed, key, "{value}");
        }
    }
}
