//! Configuration management

use clap::Parser;
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Signing secret used when none is configured in development.
pub const DEV_JWT_SECRET: &str = "dev-insecure-secret-change-me";

/// Prefix for environment overrides, e.g. `DASHBOARD_SERVER__PORT=9090`
pub const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Invalid security configuration: {0}")]
    InvalidSecurity(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(CliArgs::parse())
    }

    /// Load configuration from already-parsed command-line arguments
    pub fn load_with(cli_args: CliArgs) -> Result<Self, ConfigError> {
        let mut builder = with_defaults(ConfigBuilder::builder())?;

        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(
                    config_path.display().to_string(),
                ));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(static_dir) = &cli_args.static_dir {
            builder = builder.set_override("server.static_dir", static_dir.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }
        if let Some(environment) = &cli_args.environment {
            builder = builder.set_override("security.environment", environment.clone())?;
        }
        if let Some(secret) = &cli_args.jwt_secret {
            builder = builder.set_override("security.jwt_secret", secret.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path, on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = with_defaults(ConfigBuilder::builder())?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.logging.validate()?;
        self.security.validate()?;
        Ok(())
    }
}

fn with_defaults(
    builder: config::builder::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Ok(builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.max_connections", 100)?
        .set_default("server.request_timeout", 30)?
        .set_default("server.static_dir", "./static")?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stdout")?
        .set_default("logging.rotation", "daily")?
        .set_default("security.environment", "development")?
        .set_default("security.token_ttl_hours", 24)?
        .set_default("security.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
        .set_default("security.seed_admin", true)?
        .set_default("security.secure_cookies", false)?
        .set_default("security.allowed_origins", vec!["*"])?
        .set_default("security.enable_hsts", false)?
        .set_default("security.hsts_max_age", 31536000)?)
}

/// Command-line arguments for configuration override
#[derive(Debug, Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales and inventory dashboard server", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory served under /static
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Deployment environment (development, production)
    #[arg(long, env = "APP_ENV", value_name = "ENV")]
    pub environment: Option<String>,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", value_name = "SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
    pub request_timeout: u64, // seconds
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer("port must be greater than 0".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidServer(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidServer(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
    pub rotation: String,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "level must be one of: {:?}",
                valid_levels
            )));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "format must be one of: {:?}",
                valid_formats
            )));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "output must be one of: {:?}",
                valid_outputs
            )));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string(),
            ));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.rotation.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "rotation must be one of: {:?}",
                valid_rotations
            )));
        }

        Ok(())
    }
}

/// Where the process is deployed; decides whether the development secret is acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub environment: RuntimeEnvironment,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub seed_admin: bool,
    pub secure_cookies: bool,
    pub allowed_origins: Vec<String>,
    pub enable_hsts: bool,
    pub hsts_max_age: u64, // seconds
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve_jwt_secret()?;

        if self.token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidSecurity(
                "token_ttl_hours must be greater than 0".to_string(),
            ));
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidSecurity(
                "bcrypt_cost must be between 4 and 31".to_string(),
            ));
        }

        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidSecurity(
                "allowed_origins cannot be empty".to_string(),
            ));
        }

        if self.enable_hsts && self.hsts_max_age == 0 {
            return Err(ConfigError::InvalidSecurity(
                "hsts_max_age must be greater than 0 when enable_hsts is true".to_string(),
            ));
        }

        Ok(())
    }

    /// The secret used to sign and validate session tokens.
    ///
    /// Outside development a missing secret, or the well-known development
    /// secret, is refused.
    pub fn resolve_jwt_secret(&self) -> Result<String, ConfigError> {
        let configured = self
            .jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (configured, self.environment) {
            (Some(secret), RuntimeEnvironment::Production) if secret == DEV_JWT_SECRET => {
                Err(ConfigError::InvalidSecurity(
                    "the development jwt_secret cannot be used in production".to_string(),
                ))
            }
            (Some(secret), _) => Ok(secret.to_string()),
            (None, RuntimeEnvironment::Development) => Ok(DEV_JWT_SECRET.to_string()),
            (None, RuntimeEnvironment::Production) => Err(ConfigError::InvalidSecurity(
                "jwt_secret must be set in production (JWT_SECRET or DASHBOARD_SECURITY__JWT_SECRET)"
                    .to_string(),
            )),
        }
    }

    /// True when tokens will be signed with the built-in development secret
    pub fn uses_insecure_secret(&self) -> bool {
        matches!(self.resolve_jwt_secret().as_deref(), Ok(DEV_JWT_SECRET))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::TEST_BCRYPT_COST;
    use std::io::Write;

    const UNSET: [(&str, Option<&str>); 4] = [
        ("JWT_SECRET", None),
        ("APP_ENV", None),
        ("DASHBOARD_SECURITY__JWT_SECRET", None),
        ("DASHBOARD_SECURITY__ENVIRONMENT", None),
    ];

    fn load_from(args: &[&str]) -> Result<Config, ConfigError> {
        let mut argv = vec!["sales-dashboard"];
        argv.extend_from_slice(args);
        Config::load_with(CliArgs::parse_from(argv))
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(UNSET, || {
            let config = load_from(&[]).unwrap();
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.security.environment, RuntimeEnvironment::Development);
            assert_eq!(config.security.token_ttl_hours, 24);
            assert_eq!(config.security.bcrypt_cost, bcrypt::DEFAULT_COST);
            assert!(config.security.seed_admin);
            assert!(config.security.uses_insecure_secret());
        });
    }

    #[test]
    fn test_cli_overrides() {
        temp_env::with_vars(UNSET, || {
            let config = load_from(&["--port", "9090", "--log-level", "debug"]).unwrap();
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.logging.level, "debug");
        });
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", None),
                ("APP_ENV", None),
                ("DASHBOARD_SECURITY__ENVIRONMENT", None),
                ("DASHBOARD_SECURITY__JWT_SECRET", Some("from-dashboard-env")),
                ("DASHBOARD_SERVER__PORT", Some("7070")),
            ],
            || {
                let config = load_from(&[]).unwrap();
                assert_eq!(config.server.port, 7070);
                assert_eq!(
                    config.security.resolve_jwt_secret().unwrap(),
                    "from-dashboard-env"
                );
            },
        );
    }

    #[test]
    fn test_production_requires_secret() {
        temp_env::with_vars(UNSET, || {
            let result = load_from(&["--environment", "production"]);
            assert!(matches!(result, Err(ConfigError::InvalidSecurity(_))));
        });
    }

    #[test]
    fn test_production_with_secret_from_env() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("a-real-production-secret")),
                ("APP_ENV", Some("production")),
                ("DASHBOARD_SECURITY__JWT_SECRET", None),
                ("DASHBOARD_SECURITY__ENVIRONMENT", None),
            ],
            || {
                let config = load_from(&[]).unwrap();
                assert_eq!(config.security.environment, RuntimeEnvironment::Production);
                assert_eq!(
                    config.security.resolve_jwt_secret().unwrap(),
                    "a-real-production-secret"
                );
                assert!(!config.security.uses_insecure_secret());
            },
        );
    }

    #[test]
    fn test_production_refuses_development_secret() {
        temp_env::with_vars(UNSET, || {
            let result = load_from(&[
                "--environment",
                "production",
                "--jwt-secret",
                DEV_JWT_SECRET,
            ]);
            assert!(matches!(result, Err(ConfigError::InvalidSecurity(_))));
        });
    }

    #[test]
    fn test_explicit_development_secret_is_insecure() {
        temp_env::with_vars(UNSET, || {
            let config = load_from(&["--jwt-secret", DEV_JWT_SECRET]).unwrap();
            assert_eq!(config.security.jwt_secret.as_deref(), Some(DEV_JWT_SECRET));
            assert!(config.security.uses_insecure_secret());

            let config = load_from(&["--jwt-secret", "a-real-secret"]).unwrap();
            assert!(!config.security.uses_insecure_secret());
        });
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 3001

[security]
jwt_secret = "file-secret"
token_ttl_hours = 2
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.security.token_ttl_hours, 2);
        assert_eq!(config.security.resolve_jwt_secret().unwrap(), "file-secret");
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_logging_validation() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            output: "file".to_string(),
            log_file: None,
            rotation: "daily".to_string(),
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLogging(_))));

        let config = LoggingConfig {
            log_file: Some(PathBuf::from("./logs/dashboard.log")),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut security = SecurityConfig {
            environment: RuntimeEnvironment::Development,
            jwt_secret: None,
            token_ttl_hours: 24,
            bcrypt_cost: TEST_BCRYPT_COST - 1,
            seed_admin: true,
            secure_cookies: false,
            allowed_origins: vec!["*".to_string()],
            enable_hsts: false,
            hsts_max_age: 0,
        };
        assert!(matches!(security.validate(), Err(ConfigError::InvalidSecurity(_))));

        security.bcrypt_cost = TEST_BCRYPT_COST;
        assert!(security.validate().is_ok());

        security.bcrypt_cost = 32;
        assert!(matches!(security.validate(), Err(ConfigError::InvalidSecurity(_))));
    }
}
