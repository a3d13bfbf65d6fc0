//! Server configuration loaded from the environment.

use std::net::SocketAddr;

/// Configuration for the modgrant HTTP server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address for the HTTP server.
    pub listen_addr: SocketAddr,

    /// Database connection URL.
    pub database_url: String,

    /// Maximum connections in the database pool.
    pub max_connections: u32,

    /// HMAC secret shared with the external authenticator.
    pub jwt_secret: String,

    /// Expected JWT issuer, if the authenticator sets one.
    pub issuer: Option<String>,

    /// Whether to seed the demo catalog and users on startup.
    pub seed_demo_data: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let listen_addr = reader("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("LISTEN_ADDR".into(), e.to_string()))?;

        let database_url =
            reader("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL".into()))?;

        let max_connections = reader("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".into(), e.to_string())
            })?;

        let jwt_secret =
            reader("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET".into()))?;

        let issuer = reader("JWT_ISSUER").ok();

        let seed_demo_data = reader("SEED_DEMO_DATA")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        Ok(Self {
            listen_addr,
            database_url,
            max_connections,
            jwt_secret,
            issuer,
            seed_demo_data,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn make_reader(vars: HashMap<&str, &str>) -> impl Fn(&str) -> Result<String, VarError> {
        let owned: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| owned.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let reader = make_reader(HashMap::from([
            ("DATABASE_URL", "postgres://localhost/modgrant"),
            ("JWT_SECRET", "secret"),
        ]));

        let config = AppConfig::from_reader(reader).unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.max_connections, 10);
        assert!(config.issuer.is_none());
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let reader = make_reader(HashMap::from([("JWT_SECRET", "secret")]));
        assert!(matches!(
            AppConfig::from_reader(reader),
            Err(ConfigError::MissingVar(var)) if var == "DATABASE_URL"
        ));
    }

    #[test]
    fn invalid_listen_addr_is_an_error() {
        let reader = make_reader(HashMap::from([
            ("DATABASE_URL", "postgres://localhost/modgrant"),
            ("JWT_SECRET", "secret"),
            ("LISTEN_ADDR", "not-an-addr"),
        ]));
        assert!(matches!(
            AppConfig::from_reader(reader),
            Err(ConfigError::InvalidValue(var, _)) if var == "LISTEN_ADDR"
        ));
    }
}
