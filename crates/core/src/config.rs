use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://127.0.0.1:5500", "http://localhost:5500"];
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 25;
pub const ENV_HOST: &str = "SOULLENS_HOST";
pub const ENV_PORT: &str = "SOULLENS_PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "SOULLENS_ALLOWED_ORIGINS";
pub const ENV_MAX_UPLOAD_MB: &str = "SOULLENS_MAX_UPLOAD_MB";

/// A browser origin allowed to call the API. `*` allows every origin.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AllowedOrigin {
    Any,
    Exact(String),
}

impl AllowedOrigin {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let v = value.trim();
        if v.is_empty() {
            return Err(ConfigError::EmptyOrigin);
        }
        if v == "*" {
            return Ok(Self::Any);
        }
        if !(v.starts_with("http://") || v.starts_with("https://")) {
            return Err(ConfigError::OriginScheme(v.to_owned()));
        }
        Ok(Self::Exact(v.trim_end_matches('/').to_owned()))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadLimit {
    pub max_mb: u64,
}

impl UploadLimit {
    pub fn new(max_mb: u64) -> Result<Self, ConfigError> {
        if max_mb == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }
        Ok(Self { max_mb })
    }

    pub fn bytes(&self) -> usize {
        usize::try_from(self.max_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

impl Default for UploadLimit {
    fn default() -> Self {
        Self {
            max_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub allowed_origins: Vec<AllowedOrigin>,
    pub upload_limit: UploadLimit,
}

impl ServerConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.contains(&AllowedOrigin::Any)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| AllowedOrigin::Exact((*o).to_owned()))
                .collect(),
            upload_limit: UploadLimit::default(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid bind host: {0}")]
    InvalidHost(String),
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid upload limit: {0}")]
    InvalidUploadLimit(String),
    #[error("allowed origin must not be empty")]
    EmptyOrigin,
    #[error("allowed origin must start with http:// or https://, got {0}")]
    OriginScheme(String),
    #[error("upload limit must be > 0 MB")]
    ZeroUploadLimit,
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

pub fn resolve_port(cli_value: Option<u16>, env: &impl Env) -> Result<u16, ConfigError> {
    match cli_value {
        Some(p) => Ok(p),
        None => match env.var(ENV_PORT) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(v)),
            None => Ok(DEFAULT_PORT),
        },
    }
}

pub fn resolve_upload_limit(
    cli_value: Option<u64>,
    env: &impl Env,
) -> Result<UploadLimit, ConfigError> {
    let max_mb = match cli_value {
        Some(mb) => mb,
        None => match env.var(ENV_MAX_UPLOAD_MB) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidUploadLimit(v))?,
            None => DEFAULT_MAX_UPLOAD_MB,
        },
    };
    UploadLimit::new(max_mb)
}

/// CLI origins win; otherwise a comma-separated env list; otherwise the dev defaults.
pub fn resolve_origins(
    cli_values: Vec<String>,
    env: &impl Env,
) -> Result<Vec<AllowedOrigin>, ConfigError> {
    if !cli_values.is_empty() {
        return cli_values.iter().map(|o| AllowedOrigin::parse(o)).collect();
    }
    match env.var(ENV_ALLOWED_ORIGINS) {
        Some(list) => list
            .split(',')
            .filter(|o| !o.trim().is_empty())
            .map(AllowedOrigin::parse)
            .collect(),
        None => Ok(ServerConfig::default().allowed_origins),
    }
}

pub fn resolve_bind(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let ip: IpAddr = host
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidHost(host.to_owned()))?;
    Ok(SocketAddr::new(ip, port))
}
