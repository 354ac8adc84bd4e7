//! Configuration structures consumed by the delivery engine.
//!
//! [`EngineBuilder`](crate::EngineBuilder) constructs these values before
//! passing them to [`LogentriesEngine`](super::LogentriesEngine) for runtime
//! use.

use std::time::Duration;

use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

use super::transport::TcpTransport;

/// Default log collection host.
pub const DEFAULT_HOST: &str = "api.logentries.com";
/// Default token-logging port on the collection host.
pub const DEFAULT_PORT: u16 = 10000;
/// Default number of frames buffered between producers and the worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32768;
/// Default connection timeout applied when establishing sockets.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout applied to socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default time `close` waits for the worker to exit before detaching it.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);
/// Initial reconnect delay.
pub const MIN_DELAY: Duration = Duration::from_millis(100);
/// Upper bound for the reconnect delay before jitter.
pub const MAX_DELAY: Duration = Duration::from_millis(10_000);

/// Runtime configuration for a [`LogentriesEngine`](super::LogentriesEngine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Raw credential; validated as a UUID when the engine is built.
    pub token: String,
    /// Emit internal diagnostics through the `log` facade.
    pub debug: bool,
    pub capacity: usize,
    pub transport: TcpTransport,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub backoff: BackoffPolicy,
    pub warn_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            debug: false,
            capacity: DEFAULT_QUEUE_CAPACITY,
            transport: TcpTransport {
                host: DEFAULT_HOST.into(),
                port: DEFAULT_PORT,
                tls: None,
            },
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            backoff: BackoffPolicy::default(),
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

/// Exponential backoff policy for reconnection attempts.
///
/// Retries are unbounded; only success or cancellation ends a reconnect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: MIN_DELAY,
            cap: MAX_DELAY,
        }
    }
}
