use chrono::Duration;
use dotenvy::dotenv;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} missing, it is required")]
    Missing(&'static str),
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let ttl_hours: i64 = parse_or("JWT_TTL_HOURS", 24, "number of hours")?;
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_HOURS",
                expected: "positive number of hours",
                value: ttl_hours.to_string(),
            });
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 3000, "u16 number")?,
            database_url: required("DATABASE_URL")?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5, "u32 number")?,
            jwt_secret: required("JWT_SECRET")?,
            token_ttl: Duration::hours(ttl_hours),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_joins_host_and_port() {
        let config = Config {
            host: "0.0.0.0".into(),
            port: 8080,
            database_url: String::new(),
            max_connections: 1,
            jwt_secret: "s".into(),
            token_ttl: Duration::hours(1),
        };
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn config_error_names_the_variable() {
        let err = ConfigError::Missing("JWT_SECRET");
        assert_eq!(err.to_string(), "JWT_SECRET missing, it is required");
    }
}
