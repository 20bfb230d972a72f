use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while assembling the application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Resolve an `APP_ENV` value; anything unrecognised is development
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Environment::Production,
            "test" | "testing" => Environment::Test,
            _ => Environment::Development,
        }
    }

    /// Stem of the YAML file holding this environment's settings
    pub fn file_stem(&self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Test => "test",
            Environment::Production => "prod",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Drain deadline applied once a shutdown signal arrives
    pub shutdown_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: u64,
    pub issuer: String,
    /// HS256, HS384 or HS512
    pub algorithm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// `*` allows any origin
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration for the environment named by `APP_ENV`.
    ///
    /// Built-in defaults are overlaid with `config/<env>.yaml` (directory
    /// overridable through `CONFIG_DIR`) and finally with individual
    /// environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::parse(&env::var("APP_ENV").unwrap_or_default());
        let dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let config = Self::load_from(environment, &dir)?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults for `environment` overlaid with the matching YAML file, if any
    pub fn load_from(environment: Environment, dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(format!("{}.yaml", environment.file_stem()));
        let defaults = Self::defaults(environment);

        if !path.exists() {
            return Ok(defaults);
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let overlay: serde_yaml::Value =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;

        let mut merged = serde_yaml::to_value(&defaults)
            .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        merge_yaml(&mut merged, overlay);

        let mut config: AppConfig = serde_yaml::from_value(merged)
            .map_err(|source| ConfigError::Parse { path, source })?;
        // The file never gets to relabel which environment it was loaded for
        config.environment = environment;
        Ok(config)
    }

    pub fn defaults(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Test => Self::test(),
            Environment::Production => Self::production(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("SERVER_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_SHUTDOWN_TIMEOUT_SECS") {
            self.server.shutdown_timeout_secs = v.parse().unwrap_or(self.server.shutdown_timeout_secs);
        }
        if let Ok(v) = env::var("SERVER_BODY_LIMIT_BYTES") {
            self.server.body_limit_bytes = v.parse().unwrap_or(self.server.body_limit_bytes);
        }

        // JWT overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.jwt.expiry_hours = v.parse().unwrap_or(self.jwt.expiry_hours);
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.jwt.issuer = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = if v.trim().is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Logging overrides
        if let Ok(v) = env::var("LOG_LEVEL") {
            self.log.level = v;
        }
        if let Ok(v) = env::var("LOG_FORMAT") {
            self.log.format = match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => self.log.format,
            };
        }

        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        self
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt.secret must be set".to_string()));
        }
        if self.environment == Environment::Production && self.jwt.secret.len() < 32 {
            return Err(ConfigError::Invalid(
                "jwt.secret must be at least 32 bytes in production".to_string(),
            ));
        }
        if !matches!(self.jwt.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(ConfigError::Invalid(format!(
                "jwt.algorithm '{}' is not an HMAC algorithm",
                self.jwt.algorithm
            )));
        }
        if self.jwt.expiry_hours == 0 {
            return Err(ConfigError::Invalid("jwt.expiry_hours must be positive".to_string()));
        }
        if let Some(raw) = &self.database.url {
            let parsed = url::Url::parse(raw)
                .map_err(|e| ConfigError::Invalid(format!("database.url is not a valid URL: {}", e)))?;
            if !matches!(parsed.scheme(), "postgres" | "postgresql") {
                return Err(ConfigError::Invalid(format!(
                    "database.url scheme '{}' is not supported",
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                shutdown_timeout_secs: 5,
                body_limit_bytes: 2 * 1024 * 1024, // 2MB
            },
            jwt: JwtConfig {
                secret: "erp-dev-secret-change-me".to_string(),
                expiry_hours: 24,
                issuer: "erp-api".to_string(),
                algorithm: "HS256".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connect_timeout_secs: 5,
            },
            log: LogConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
            },
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                shutdown_timeout_secs: 1,
                body_limit_bytes: 1024 * 1024, // 1MB
            },
            jwt: JwtConfig {
                secret: "erp-test-secret".to_string(),
                expiry_hours: 1,
                issuer: "erp-api".to_string(),
                algorithm: "HS256".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 2,
                connect_timeout_secs: 1,
            },
            log: LogConfig {
                level: "warn".to_string(),
                format: LogFormat::Pretty,
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                shutdown_timeout_secs: 10,
                body_limit_bytes: 1024 * 1024, // 1MB
            },
            jwt: JwtConfig {
                // Must come from JWT_SECRET or prod.yaml
                secret: String::new(),
                expiry_hours: 8,
                issuer: "erp-api".to_string(),
                algorithm: "HS256".to_string(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connect_timeout_secs: 5,
            },
            log: LogConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
            },
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl DatabaseConfig {
    /// Connection URL with the password masked, for logs and `erp-api config`
    pub fn redacted_url(&self) -> Option<String> {
        let raw = self.url.as_ref()?;
        match url::Url::parse(raw) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                Some(parsed.to_string())
            }
            Err(_) => Some("<invalid url>".to_string()),
        }
    }
}

/// Recursively overlay `overlay` onto `base`; mappings merge, everything else replaces
fn merge_yaml(base: &mut serde_yaml::Value, overlay: serde_yaml::Value) {
    match (base, overlay) {
        (serde_yaml::Value::Mapping(base_map), serde_yaml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!(Environment::parse("prod"), Environment::Production);
        assert_eq!(Environment::parse("Production"), Environment::Production);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse(""), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }

    #[test]
    fn test_default_production_config_requires_secret() {
        let config = AppConfig::defaults(Environment::Production);
        assert!(config.validate().is_err());
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_default_development_config_is_valid() {
        let config = AppConfig::defaults(Environment::Development);
        assert!(config.validate().is_ok());
        assert_eq!(config.jwt.algorithm, "HS256");
    }

    #[test]
    fn rejects_non_hmac_algorithm() {
        let mut config = AppConfig::defaults(Environment::Test);
        config.jwt.algorithm = "RS256".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_non_postgres_database_url() {
        let mut config = AppConfig::defaults(Environment::Test);
        config.database.url = Some("mysql://root@localhost/erp".to_string());
        assert!(config.validate().is_err());
        config.database.url = Some("postgres://erp:pw@localhost/erp".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn redacted_url_hides_password() {
        let mut config = AppConfig::defaults(Environment::Test);
        config.database.url = Some("postgres://erp:hunter2@db:5432/erp".to_string());
        let redacted = config.database.redacted_url().unwrap();
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("***"));
    }

    #[test]
    fn yaml_overlay_replaces_only_present_keys() {
        let dir = std::env::temp_dir().join(format!("erp-config-{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("test.yaml"),
            "server:\n  port: 9191\njwt:\n  expiry_hours: 3\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Environment::Test, &dir).unwrap();
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.jwt.expiry_hours, 3);
        assert_eq!(config.jwt.secret, "erp-test-secret");
        assert_eq!(config.environment, Environment::Test);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_yaml_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("erp-config-does-not-exist");
        let config = AppConfig::load_from(Environment::Development, &dir).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
