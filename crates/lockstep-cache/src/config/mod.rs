//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `LOCKSTEP_*` environment variables.
//! The signing secret (and the upstream API key, unless the mock provider is
//! enabled) have no default; [`Config::validate`] rejects a config without them.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_RETENTION_DAYS, DEFAULT_SERVICE_NAME, DEFAULT_SWEEP_INTERVAL_SECS};

/// Default chat completions base URL used when `LOCKSTEP_UPSTREAM_URL` is not set.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1";

/// Default upstream request timeout in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `LOCKSTEP_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Reported by `/health`. Default: `lockstep`.
    pub service_name: String,

    /// Directory for the file store. `None` keeps entries in memory.
    pub storage_path: Option<PathBuf>,

    /// Entries older than this many days are swept. Default: `90`.
    pub retention_days: u64,

    /// Seconds between background sweeps; `0` disables them. Default: one day.
    pub sweep_interval_secs: u64,

    /// Secret the response signing key is derived from.
    pub signing_secret: String,

    /// Chat completions base URL.
    pub upstream_url: String,

    /// Bearer credential for the upstream.
    pub upstream_api_key: Option<String>,

    /// Upstream request timeout in seconds. Default: `120`.
    pub upstream_timeout_secs: u64,

    /// Serve canned responses instead of calling the upstream.
    pub mock_provider: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            storage_path: None,
            retention_days: DEFAULT_RETENTION_DAYS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            signing_secret: String::new(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_api_key: None,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            mock_provider: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("service_name", &self.service_name)
            .field("storage_path", &self.storage_path)
            .field("retention_days", &self.retention_days)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .field("signing_secret", &redacted(!self.signing_secret.is_empty()))
            .field("upstream_url", &self.upstream_url)
            .field("upstream_api_key", &redacted(self.upstream_api_key.is_some()))
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("mock_provider", &self.mock_provider)
            .finish()
    }
}

fn redacted(present: bool) -> &'static str {
    if present { "<redacted>" } else { "<unset>" }
}

impl Config {
    pub const ENV_PORT: &'static str = "LOCKSTEP_PORT";
    pub const ENV_BIND_ADDR: &'static str = "LOCKSTEP_BIND_ADDR";
    pub const ENV_SERVICE_NAME: &'static str = "LOCKSTEP_SERVICE_NAME";
    pub const ENV_STORAGE_PATH: &'static str = "LOCKSTEP_STORAGE_PATH";
    pub const ENV_RETENTION_DAYS: &'static str = "LOCKSTEP_RETENTION_DAYS";
    pub const ENV_SWEEP_INTERVAL_SECS: &'static str = "LOCKSTEP_SWEEP_INTERVAL_SECS";
    pub const ENV_SIGNING_SECRET: &'static str = "LOCKSTEP_SIGNING_SECRET";
    pub const ENV_UPSTREAM_URL: &'static str = "LOCKSTEP_UPSTREAM_URL";
    pub const ENV_UPSTREAM_API_KEY: &'static str = "LOCKSTEP_UPSTREAM_API_KEY";
    pub const ENV_UPSTREAM_TIMEOUT_SECS: &'static str = "LOCKSTEP_UPSTREAM_TIMEOUT_SECS";
    pub const ENV_MOCK_PROVIDER: &'static str = "LOCKSTEP_MOCK_PROVIDER";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let service_name =
            Self::parse_optional_string_from_env(Self::ENV_SERVICE_NAME).unwrap_or(defaults.service_name);
        let storage_path = Self::parse_optional_string_from_env(Self::ENV_STORAGE_PATH).map(PathBuf::from);
        let retention_days = Self::parse_u64_from_env(Self::ENV_RETENTION_DAYS, defaults.retention_days)?;
        let sweep_interval_secs =
            Self::parse_u64_from_env(Self::ENV_SWEEP_INTERVAL_SECS, defaults.sweep_interval_secs)?;
        let signing_secret = env::var(Self::ENV_SIGNING_SECRET).unwrap_or_default();
        let upstream_url =
            Self::parse_optional_string_from_env(Self::ENV_UPSTREAM_URL).unwrap_or(defaults.upstream_url);
        let upstream_api_key = Self::parse_optional_string_from_env(Self::ENV_UPSTREAM_API_KEY);
        let upstream_timeout_secs =
            Self::parse_u64_from_env(Self::ENV_UPSTREAM_TIMEOUT_SECS, defaults.upstream_timeout_secs)?;
        let mock_provider = env::var_os(Self::ENV_MOCK_PROVIDER).is_some_and(|v| !v.is_empty());

        Ok(Self {
            port,
            bind_addr,
            service_name,
            storage_path,
            retention_days,
            sweep_interval_secs,
            signing_secret,
            upstream_url,
            upstream_api_key,
            upstream_timeout_secs,
            mock_provider,
        })
    }

    /// Validates required secrets and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_SIGNING_SECRET,
            });
        }

        if !self.mock_provider && self.upstream_api_key.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_UPSTREAM_API_KEY,
            });
        }

        if !(self.upstream_url.starts_with("http://") || self.upstream_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_UPSTREAM_URL,
                reason: "must be an http:// or https:// URL",
            });
        }

        if self.retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RETENTION_DAYS,
                reason: "must be at least 1",
            });
        }

        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_UPSTREAM_TIMEOUT_SECS,
                reason: "must be at least 1",
            });
        }

        if let Some(ref path) = self.storage_path
            && path.exists()
            && !path.is_dir()
        {
            return Err(ConfigError::NotADirectory { path: path.clone() });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Background sweep period, or `None` when disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value.parse().map_err(|e| ConfigError::InvalidNumber {
                name: var_name,
                value,
                source: e,
            }),
            None => Ok(default),
        }
    }
}
