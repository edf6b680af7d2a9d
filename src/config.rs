use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;

/// Deployment tag; `Local` turns on request/response logging in the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Local,
    #[default]
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "development" | "dev" => Ok(Self::Local),
            "production" | "prod" => Ok(Self::Production),
            other => anyhow::bail!("unknown APP_ENV `{other}` (expected local or production)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub environment: Environment,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            environment: Environment::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub silent_refresh: bool,
    pub refresh_grace: Duration,
    /// How long `enter` waits for someone else to resolve `Loading` before
    /// restoring the session itself.
    pub loading_wait: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            silent_refresh: true,
            refresh_grace: Duration::from_millis(150),
            loading_wait: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub guard: GuardConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let environment = match lookup("APP_ENV") {
            Some(v) => v.parse()?,
            None => Environment::default(),
        };
        let api = ApiConfig {
            base_url: lookup("API_GATEWAY_URL").unwrap_or_else(|| "http://localhost:8000".into()),
            environment,
            timeout: Duration::from_secs(
                lookup("API_TIMEOUT_SECS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(30),
            ),
        };
        let guard = GuardConfig {
            silent_refresh: lookup("GUARD_SILENT_REFRESH")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
            refresh_grace: Duration::from_millis(
                lookup("GUARD_REFRESH_GRACE_MS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(150),
            ),
            loading_wait: Duration::from_millis(
                lookup("GUARD_LOADING_WAIT_MS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1000),
            ),
        };
        let server = ServerConfig {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: lookup("APP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("dist")),
        };
        Ok(Self { api, guard, server })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
