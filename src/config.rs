//! Handle and transport configuration.

use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;

use crate::error::{HandleError, Result};

/// Default window capacity in bytes.
pub const DEFAULT_WINDOW_SIZE: usize = 64 * 1024;

/// Whether a handle may write to its backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Read-only.
    #[default]
    Read,
    /// Read and write; writes past the end grow the store.
    ReadWrite,
}

impl AccessMode {
    pub fn is_writable(self) -> bool {
        self == AccessMode::ReadWrite
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::Read => "r",
            AccessMode::ReadWrite => "rw",
        }
    }
}

impl FromStr for AccessMode {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(AccessMode::Read),
            "rw" => Ok(AccessMode::ReadWrite),
            other => Err(HandleError::InvalidMode(other.to_string())),
        }
    }
}

/// Transport settings for remote resources.
///
/// Nothing here is applied unless the caller sets it: the library itself never
/// retries and never imposes a deadline.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Total per-request timeout.
    pub timeout: Option<Duration>,
    /// Connection establishment timeout.
    pub connect_timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            user_agent: concat!("locio/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

impl RemoteConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    /// Build the HTTP client these settings describe.
    pub(crate) fn build_client(&self, url: &str) -> Result<Client> {
        let mut builder = Client::builder().user_agent(self.user_agent.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }
        builder
            .build()
            .map_err(|source| HandleError::remote(url, source))
    }
}

/// Settings used when a [`Location`](crate::Location) opens a handle.
#[derive(Debug, Clone)]
pub struct HandleConfig {
    /// Window capacity in bytes; clamped to at least 1.
    pub window_size: usize,
    /// Requested access mode. Remote resources are always read-only.
    pub mode: AccessMode,
    /// Transport used for remote resources.
    pub remote: RemoteConfig,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            mode: AccessMode::Read,
            remote: RemoteConfig::default(),
        }
    }
}

impl HandleConfig {
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    /// The window capacity actually used by handles.
    pub fn effective_window_size(&self) -> usize {
        self.window_size.max(1)
    }
}
