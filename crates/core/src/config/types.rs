use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub updater: UpdaterConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub auth: AuthConfig,
}

/// Log verbosity for the whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Error,
}

impl LogLevel {
    /// The matching tracing filter directive.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("comicdex.db")
}

/// Upstream comic source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL of the xkcd-style JSON API.
    #[serde(default = "default_upstream_url")]
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs as u64)
    }
}

fn default_upstream_url() -> String {
    "https://xkcd.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Update pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdaterConfig {
    /// Number of concurrent fetch workers (default: 8)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}

/// Search service and gateway limit configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Interval between timer-driven index rebuilds, in seconds
    /// (default: one day).
    #[serde(default = "default_index_ttl")]
    pub index_ttl_secs: u64,
    /// Debounce interval for event-driven rebuilds, in seconds (default: 10).
    #[serde(default = "default_debounce")]
    pub event_debounce_secs: u64,
    /// Max concurrent /api/search requests; overflow is rejected (default: 10).
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    /// Token refill rate for /api/isearch, requests per second (default: 5).
    #[serde(default = "default_rate_rps")]
    pub rate_rps: u32,
    /// How long an /api/isearch request may wait for a rate token before
    /// 504, in seconds (default: 30).
    #[serde(default = "default_rate_wait")]
    pub rate_wait_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_ttl_secs: default_index_ttl(),
            event_debounce_secs: default_debounce(),
            concurrency_limit: default_concurrency_limit(),
            rate_rps: default_rate_rps(),
            rate_wait_secs: default_rate_wait(),
        }
    }
}

impl SearchConfig {
    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_secs)
    }

    pub fn event_debounce(&self) -> Duration {
        Duration::from_secs(self.event_debounce_secs)
    }

    pub fn rate_wait(&self) -> Duration {
        Duration::from_secs(self.rate_wait_secs)
    }
}

fn default_index_ttl() -> u64 {
    86_400
}

fn default_debounce() -> u64 {
    10
}

fn default_concurrency_limit() -> usize {
    10
}

fn default_rate_rps() -> u32 {
    5
}

fn default_rate_wait() -> u64 {
    30
}

/// Admin authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub admin_user: String,
    pub admin_password: String,
    /// Token lifetime in seconds (default: one hour).
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

fn default_token_ttl() -> u64 {
    3600
}
