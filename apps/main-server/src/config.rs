//! Server configuration.

use std::env;

use auth::{DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_JWT_ISSUER, JwtConfig};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database URL. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Secret used to sign access tokens.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// `iss` claim written into and required of every token.
    pub jwt_issuer: String,
    /// Log level.
    pub log_level: String,
    /// Allowed browser origin. Any origin is allowed when unset.
    pub cors_origin: Option<String>,
}

impl Config {
    /// Creates a configuration with defaults and the given signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            jwt_issuer: DEFAULT_JWT_ISSUER.to_string(),
            log_level: "info".to_string(),
            cors_origin: None,
        }
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("TASKFLOW_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("TASKFLOW_JWT_SECRET is required"))?;

        let port = match lookup("TASKFLOW_SERVER_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("TASKFLOW_SERVER_PORT is not a valid port: {}", port))?,
            None => DEFAULT_PORT,
        };

        let jwt_expiration_hours = match lookup("TASKFLOW_JWT_EXPIRATION_HOURS") {
            Some(hours) => hours.parse().map_err(|_| {
                anyhow::anyhow!("TASKFLOW_JWT_EXPIRATION_HOURS is not a number: {}", hours)
            })?,
            None => DEFAULT_JWT_EXPIRATION_HOURS,
        };

        let config = Self {
            host: lookup("TASKFLOW_SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            jwt_secret,
            jwt_expiration_hours,
            jwt_issuer: lookup("TASKFLOW_JWT_ISSUER")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            log_level: lookup("TASKFLOW_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            cors_origin: lookup("TASKFLOW_CORS_ORIGIN").filter(|s| !s.is_empty()),
        };

        config.jwt_config().validate()?;
        Ok(config)
    }

    /// Token settings derived from this configuration.
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.clone())
            .with_expiration_hours(self.jwt_expiration_hours)
            .with_issuer(self.jwt_issuer.clone())
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("TASKFLOW_JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:5000");
        assert_eq!(config.jwt_expiration_hours, 720);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.jwt_issuer, "taskflow");
        assert!(config.database_url.is_none());
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_secret_required() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("TASKFLOW_JWT_SECRET", "")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TASKFLOW_JWT_SECRET", "s3cret"),
            ("TASKFLOW_SERVER_PORT", "8080"),
            ("TASKFLOW_JWT_EXPIRATION_HOURS", "1"),
            ("DATABASE_URL", "sqlite://taskflow.db?mode=rwc"),
            ("TASKFLOW_CORS_ORIGIN", "http://localhost:3000"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_expiration_hours, 1);
        assert_eq!(config.database_url.as_deref(), Some("sqlite://taskflow.db?mode=rwc"));
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn test_zero_token_lifetime_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("TASKFLOW_JWT_SECRET", "s3cret"),
            ("TASKFLOW_JWT_EXPIRATION_HOURS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_issuer_flows_into_tokens() {
        let config = Config::from_lookup(lookup_from(&[
            ("TASKFLOW_JWT_SECRET", "s3cret"),
            ("TASKFLOW_JWT_ISSUER", "taskflow-staging"),
        ]))
        .unwrap();

        let manager = auth::JwtManager::new(config.jwt_config());
        let token = manager
            .generate_token(uuid::Uuid::new_v4(), "ada@example.com".to_string(), None)
            .unwrap();
        assert_eq!(manager.validate_token(&token).unwrap().iss, "taskflow-staging");
    }

    #[test]
    fn test_bad_port_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("TASKFLOW_JWT_SECRET", "s3cret"),
            ("TASKFLOW_SERVER_PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }
}
