//! Builder for [`LogentriesEngine`](crate::LogentriesEngine).
//!
//! Collects the credential, diagnostic flag, endpoint, TLS, timeout, and
//! backoff settings, validates them, and produces an [`EngineConfig`]. The
//! environment and INI loaders return builders so callers can layer further
//! overrides before building.

use std::time::Duration;

use thiserror::Error;

use crate::delivery::{
    BackoffPolicy, Connector, EngineConfig, LogentriesEngine, TcpConnector, TcpTransport,
    TlsOptions,
};

/// Environment variable holding the credential token.
pub const TOKEN_ENV: &str = "LOGENTRIES_TOKEN";
/// Environment variable enabling diagnostics.
pub const DEBUG_ENV: &str = "LOGENTRIES_DEBUG";

/// Errors that may occur while building an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid user supplied configuration.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    /// The INI file could not be read or parsed.
    #[error(transparent)]
    Ini(#[from] ini::Error),
}

#[derive(Clone, Debug, Default)]
struct TlsConfig {
    domain: Option<String>,
    insecure: bool,
}

/// Overrides for the reconnect backoff timings.
#[derive(Clone, Debug, Default)]
pub struct BackoffOverrides {
    base_ms: Option<u64>,
    cap_ms: Option<u64>,
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

impl BackoffOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the initial reconnect delay in milliseconds.
    pub fn with_base_ms(mut self, base_ms: u64) -> Self {
        self.base_ms = Some(base_ms);
        self
    }

    /// Override the delay cap in milliseconds.
    pub fn with_cap_ms(mut self, cap_ms: u64) -> Self {
        self.cap_ms = Some(cap_ms);
        self
    }

    fn apply(&self, policy: &mut BackoffPolicy) -> Result<(), ConfigError> {
        if let Some(base) = self.base_ms {
            ensure_positive!(base, "backoff_base_ms")?;
            policy.base = Duration::from_millis(base);
        }
        if let Some(cap) = self.cap_ms {
            ensure_positive!(cap, "backoff_cap_ms")?;
            policy.cap = Duration::from_millis(cap);
        }
        if policy.base > policy.cap {
            return Err(ConfigError::InvalidConfig(
                "backoff_base_ms must not exceed backoff_cap_ms".into(),
            ));
        }
        Ok(())
    }
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`LogentriesEngine`] instances.
#[derive(Clone, Debug, Default)]
pub struct EngineBuilder {
    token: Option<String>,
    debug: Option<bool>,
    host: Option<String>,
    port: Option<u16>,
    tls: Option<TlsConfig>,
    capacity: Option<usize>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    shutdown_timeout_ms: Option<u64>,
    backoff: BackoffOverrides,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder from `LOGENTRIES_TOKEN` and `LOGENTRIES_DEBUG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Seed a builder from an arbitrary key lookup using the environment
    /// variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::new();
        if let Some(token) = lookup(TOKEN_ENV) {
            builder = builder.with_token(token.trim());
        }
        if let Some(debug) = lookup(DEBUG_ENV) {
            builder = builder.with_debug(parse_flag(&debug));
        }
        builder
    }

    option_setter!(
        #[doc = "Set the bounded queue capacity."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);
    option_setter!(with_shutdown_timeout_ms, shutdown_timeout_ms, u64);

    /// Set the credential token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Enable or disable diagnostic output.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Target a TCP endpoint.
    pub fn with_tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    /// Configure TLS using the provided domain and validation policy.
    pub fn with_tls(mut self, domain: Option<String>, insecure: bool) -> Self {
        self.tls = Some(TlsConfig { domain, insecure });
        self
    }

    /// Override backoff timings.
    pub fn with_backoff(mut self, overrides: BackoffOverrides) -> Self {
        self.backoff = overrides;
        self
    }

    /// Validate the settings and produce a configuration.
    pub fn build_config(&self) -> Result<EngineConfig, ConfigError> {
        self.validate()?;
        let mut config = EngineConfig::default();
        self.apply_optional_fields(&mut config);
        self.backoff.apply(&mut config.backoff)?;
        config.transport.tls = self.build_tls_options(&config.transport);
        Ok(config)
    }

    /// Build an engine connecting over TCP.
    pub fn build(&self) -> Result<LogentriesEngine<TcpConnector>, ConfigError> {
        Ok(LogentriesEngine::new(self.build_config()?))
    }

    /// Build an engine that obtains its streams from `connector`.
    pub fn build_with_connector<C: Connector>(
        &self,
        connector: C,
    ) -> Result<LogentriesEngine<C>, ConfigError> {
        Ok(LogentriesEngine::with_connector(
            self.build_config()?,
            connector,
        ))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err(ConfigError::InvalidConfig(
                    "tcp host must not be empty".into(),
                ));
            }
        }
        if let Some(port) = self.port {
            ensure_positive!(port, "port")?;
        }
        if let Some(capacity) = self.capacity {
            ensure_positive!(capacity, "capacity")?;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        if let Some(timeout) = self.shutdown_timeout_ms {
            ensure_positive!(timeout, "shutdown_timeout_ms")?;
        }
        Ok(())
    }

    fn apply_optional_fields(&self, config: &mut EngineConfig) {
        if let Some(token) = &self.token {
            config.token = token.clone();
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if let Some(host) = &self.host {
            config.transport.host = host.clone();
        }
        if let Some(port) = self.port {
            config.transport.port = port;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.shutdown_timeout_ms {
            config.shutdown_timeout = Duration::from_millis(timeout);
        }
    }

    fn build_tls_options(&self, transport: &TcpTransport) -> Option<TlsOptions> {
        self.tls.as_ref().map(|tls_cfg| {
            let domain = tls_cfg
                .domain
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| transport.host.clone());
            TlsOptions {
                domain,
                insecure_skip_verify: tls_cfg.insecure,
            }
        })
    }
}

/// Interpret a textual boolean flag; anything unrecognised is `false`.
pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
