use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::evaluations::{OverMaxPolicy, ScoringConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ScoringConfig::default();
        let over_max_policy = match env::var("APP_OVER_MAX_POLICY") {
            Ok(raw) => OverMaxPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidOverMaxPolicy { value: raw.clone() })?,
            Err(_) => defaults.over_max_policy,
        };
        let scoring = ScoringConfig {
            default_sub_field_max: positive_var(
                "APP_SUB_FIELD_MAX",
                defaults.default_sub_field_max,
            )?,
            default_simple_max: positive_var("APP_SIMPLE_FIELD_MAX", defaults.default_simple_max)?,
            over_max_policy,
            standard_metrics: defaults.standard_metrics,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
        })
    }
}

fn positive_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ConfigError::InvalidScoringMax { name, value: raw }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScoringMax { name: &'static str, value: String },
    InvalidOverMaxPolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScoringMax { name, value } => {
                write!(f, "{name} must be a positive number (found '{value}')")
            }
            ConfigError::InvalidOverMaxPolicy { value } => {
                write!(
                    f,
                    "APP_OVER_MAX_POLICY must be 'reject' or 'clamp' (found '{value}')"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidScoringMax { .. }
            | ConfigError::InvalidOverMaxPolicy { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_SUB_FIELD_MAX",
            "APP_SIMPLE_FIELD_MAX",
            "APP_OVER_MAX_POLICY",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoring.default_sub_field_max, 5.0);
        assert_eq!(config.scoring.default_simple_max, 10.0);
        assert_eq!(config.scoring.over_max_policy, OverMaxPolicy::Reject);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_scoring_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("APP_SUB_FIELD_MAX", "4");
        env::set_var("APP_OVER_MAX_POLICY", "Clamp");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.scoring.default_sub_field_max, 4.0);
        assert_eq!(config.scoring.over_max_policy, OverMaxPolicy::Clamp);
        reset_env();
    }

    #[test]
    fn rejects_non_positive_scoring_max() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SIMPLE_FIELD_MAX", "0");
        match AppConfig::load() {
            Err(ConfigError::InvalidScoringMax { name, .. }) => {
                assert_eq!(name, "APP_SIMPLE_FIELD_MAX")
            }
            other => panic!("expected invalid scoring max, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_unknown_over_max_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_OVER_MAX_POLICY", "truncate");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidOverMaxPolicy { .. })
        ));
        reset_env();
    }
}
