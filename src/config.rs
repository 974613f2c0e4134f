//! Registry configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags or `MCP_REGISTRY_*` environment variables in the
//! binary. A representative file is:
//!
//! ```yaml
//! listen_addr: 0.0.0.0:8000
//! log_level: info
//! probe:
//!   interval_secs: 30
//!   timeout_secs: 5
//! invocation:
//!   timeout_secs: 30
//!   invoke_path: /invoke
//! servers:
//!   - name: github-mcp
//!     kind: tool
//!     base_url: http://mcp-github:7000
//!     capabilities:
//!       search_repositories:
//!         description: Search GitHub repositories
//! ```

use crate::registry::{
    adapters::http::DEFAULT_INVOKE_PATH,
    domain::RegisterServerRequest,
    services::{ProbeSettings, RouterSettings},
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A setting has an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Background probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Whether servers are probed in the background.
    pub enabled: bool,
    /// Seconds between probes of one server.
    pub interval_secs: u64,
    /// Seconds before a probe is treated as failed.
    pub timeout_secs: u64,
    /// Evict servers after this many consecutive failures.
    pub evict_after_failures: Option<u32>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
            evict_after_failures: None,
        }
    }
}

impl ProbeConfig {
    /// Converts to supervisor settings.
    #[must_use]
    pub const fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            interval: Duration::from_secs(self.interval_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            evict_after_failures: self.evict_after_failures,
        }
    }
}

/// Tool call forwarding settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvocationConfig {
    /// Seconds before a downstream call is abandoned.
    pub timeout_secs: u64,
    /// Path appended to a server's base URL for tool calls.
    pub invoke_path: String,
    /// Refuse calls to servers whose last probe failed.
    pub block_unhealthy: bool,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            invoke_path: DEFAULT_INVOKE_PATH.to_owned(),
            block_unhealthy: false,
        }
    }
}

impl InvocationConfig {
    /// Converts to router settings.
    #[must_use]
    pub const fn settings(&self) -> RouterSettings {
        RouterSettings {
            invoke_timeout: Duration::from_secs(self.timeout_secs),
            block_unhealthy: self.block_unhealthy,
        }
    }
}

/// Complete registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Address the HTTP API binds to.
    pub listen_addr: SocketAddr,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log line format.
    pub log_format: LogFormat,
    /// Health probing.
    pub probe: ProbeConfig,
    /// Tool call forwarding.
    pub invocation: InvocationConfig,
    /// Servers registered at startup.
    pub servers: Vec<RegisterServerRequest>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            log_level: "info".to_owned(),
            log_format: LogFormat::default(),
            probe: ProbeConfig::default(),
            invocation: InvocationConfig::default(),
            servers: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Loads and validates a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed or
    /// validated.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let read_error = |source: std::io::Error| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ))
        })?;
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));

        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let text = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_yaml(&text)
    }

    /// Parses and validates YAML configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text cannot be parsed or validated.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that serde cannot express.
    ///
    /// Seed servers are validated when they are registered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first unusable setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "probe.interval_secs must be positive".to_owned(),
            ));
        }
        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "probe.timeout_secs must be positive".to_owned(),
            ));
        }
        if self.probe.evict_after_failures == Some(0) {
            return Err(ConfigError::Invalid(
                "probe.evict_after_failures must be positive when set".to_owned(),
            ));
        }
        if self.invocation.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "invocation.timeout_secs must be positive".to_owned(),
            ));
        }
        if !self.invocation.invoke_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "invocation.invoke_path must start with '/': {}",
                self.invocation.invoke_path
            )));
        }
        Ok(())
    }
}
