use axum::http::HeaderValue;
use clap::{Args, Parser, ValueEnum};
use ipnetwork::IpNetwork;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[arg(long = "database-url", env = "PROCONNECT_DATABASE_URL")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long, env = "PROCONNECT_DB_MAX_CONNECTIONS", default_value_t = 20)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long, env = "PROCONNECT_DB_MIN_CONNECTIONS", default_value_t = 1)]
    pub min_connections: u32,

    /// How long to wait for a free connection before failing a request
    #[arg(long, env = "PROCONNECT_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Timeout for the readiness probe's database ping
    #[arg(long, env = "PROCONNECT_DB_PING_TIMEOUT_MS", default_value_t = 2000)]
    pub ping_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "PROCONNECT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the public API
    #[arg(long, env = "PROCONNECT_PORT", default_value_t = 5500)]
    pub port: u16,

    /// Port for the management server (health probes)
    #[arg(long, env = "PROCONNECT_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to wait for in-flight work after a shutdown signal
    #[arg(long, env = "PROCONNECT_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,

    /// Browser origin allowed to call the API with credentials
    #[arg(long, env = "PROCONNECT_CORS_ORIGIN", default_value = "http://localhost:5173", value_parser = parse_origin)]
    pub cors_origin: HeaderValue,

    /// Comma-separated list of CIDRs to trust for X-Forwarded-For IP extraction
    #[arg(
        long,
        env = "PROCONNECT_TRUSTED_PROXIES",
        default_value = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32",
        value_delimiter = ','
    )]
    pub trusted_proxies: Vec<IpNetwork>,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// Secret used to verify session tokens issued by the account service
    #[arg(long, env = "PROCONNECT_JWT_SECRET")]
    pub jwt_secret: String,

    /// Name of the session cookie carrying the token
    #[arg(long, env = "PROCONNECT_COOKIE_NAME", default_value = "jwt-proconnect")]
    pub cookie_name: String,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Requests per second allowed per client IP
    #[arg(long, env = "PROCONNECT_RATE_LIMIT_PER_SECOND", default_value_t = 10)]
    pub per_second: u32,

    /// Burst allowance per client IP
    #[arg(long, env = "PROCONNECT_RATE_LIMIT_BURST", default_value_t = 20)]
    pub burst: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "PROCONNECT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces, metrics and logs are exported only when set
    #[arg(long, env = "PROCONNECT_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

fn parse_origin(value: &str) -> Result<HeaderValue, String> {
    HeaderValue::from_str(value).map_err(|e| format!("invalid origin {value:?}: {e}"))
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
