//! Asynchronous token-prefixed log delivery.
//!
//! [`LogentriesEngine`] accepts text lines from any thread, prefixes each with
//! the account token, and ships them to a collection endpoint over a single
//! persistent TCP (optionally TLS) connection owned by a background worker.
//! Producers never block: when the bounded queue is full the oldest frame is
//! evicted.
//!
//! ```no_run
//! use logentries::EngineBuilder;
//!
//! let engine = EngineBuilder::from_env().with_debug(true).build()?;
//! engine.submit("service started", None);
//! engine.close();
//! # Ok::<(), logentries::ConfigError>(())
//! ```

pub mod builder;
pub mod cancel;
pub mod delivery;
pub mod diagnostics;
pub mod file_config;
pub mod formatter;
pub mod log_compat;
pub mod rate_limited_warner;
pub mod token;

pub use builder::{BackoffOverrides, ConfigError, DEBUG_ENV, EngineBuilder, TOKEN_ENV};
pub use cancel::{CancellationToken, Cancelled};
pub use delivery::{
    BackoffPolicy, Connection, ConnectionError, ConnectionState, Connector, EngineConfig,
    EnqueueOutcome, Frame, FrameError, FrameQueue, LINE_SEPARATOR, LogentriesEngine,
    TcpConnector, TcpTransport, TlsOptions, WorkerState,
};
pub use diagnostics::DIAGNOSTIC_TARGET;
pub use formatter::{DefaultFormatter, LineFormatter};
pub use log_compat::LogentriesLogger;
pub use token::{Token, TokenError};
