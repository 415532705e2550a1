use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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

    /// Whether error responses may carry the underlying failure message.
    pub fn exposes_error_details(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database: DatabaseConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
        })
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

/// TLS negotiation policy for the database connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl SslMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disable" | "off" | "false" => Some(Self::Disable),
            "prefer" => Some(Self::Prefer),
            "require" | "on" | "true" => Some(Self::Require),
            "verify-ca" => Some(Self::VerifyCa),
            "verify-full" => Some(Self::VerifyFull),
            _ => None,
        }
    }
}

/// Connection settings for the company store.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: SslMode,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

    pub fn from_env() -> Result<Self, ConfigError> {
        let host = required("DB_HOST")?;
        let port = required("DB_PORT")?
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber { name: "DB_PORT" })?;
        let user = required("DB_USER")?;
        let password = required("DB_PASSWORD")?;
        let database = required("DB_NAME")?;

        let ssl_mode = match env::var("DB_SSL_MODE") {
            Ok(raw) => SslMode::parse(&raw).ok_or(ConfigError::InvalidSslMode(raw))?,
            Err(_) => SslMode::Disable,
        };

        let max_connections =
            optional_number("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS as u64)? as u32;
        let timeout_ms =
            optional_number("DB_CONNECTION_TIMEOUT", Self::DEFAULT_CONNECT_TIMEOUT_MS)?;

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
            ssl_mode,
            max_connections: max_connections.max(1),
            connect_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Fixed-window limits applied to the public listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u64,
}

impl RateLimitConfig {
    pub const DEFAULT_WINDOW_SECONDS: u64 = 60;
    pub const DEFAULT_MAX_REQUESTS: u64 = 100;

    pub fn from_env() -> Result<Self, ConfigError> {
        let window = optional_number("RATE_LIMIT_WINDOW_SECONDS", Self::DEFAULT_WINDOW_SECONDS)?;
        let max_requests =
            optional_number("RATE_LIMIT_MAX_REQUESTS", Self::DEFAULT_MAX_REQUESTS)?;

        Ok(Self {
            window: Duration::from_secs(window.max(1)),
            max_requests: max_requests.max(1),
        })
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(Self::DEFAULT_WINDOW_SECONDS),
            max_requests: Self::DEFAULT_MAX_REQUESTS,
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVariable(name)),
    }
}

fn optional_number(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingVariable(&'static str),
    InvalidNumber { name: &'static str },
    InvalidSslMode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingVariable(name) => {
                write!(f, "missing required database environment variable {name}")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a non-negative integer")
            }
            ConfigError::InvalidSslMode(value) => write!(
                f,
                "DB_SSL_MODE '{value}' is not one of disable, prefer, require, verify-ca, verify-full"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
