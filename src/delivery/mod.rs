//! Token-prefixed log delivery over a persistent socket.
//!
//! This module defines [`LogentriesEngine`], which encodes submitted lines
//! into newline-terminated frames and queues them in a bounded drop-oldest
//! buffer. A single worker thread drains the buffer in batches, maintains the
//! connection, and transparently reconnects using jittered exponential
//! backoff.

pub(crate) mod backoff;
mod config;
mod connection;
mod engine;
mod frame;
mod queue;
mod transport;
mod worker;


pub use backoff::BackoffState;
pub use config::{
    BackoffPolicy, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT, DEFAULT_WRITE_TIMEOUT, EngineConfig, MAX_DELAY, MIN_DELAY,
};
pub use connection::{ConnectionManager, ConnectionState};
pub use engine::LogentriesEngine;
pub use frame::{Frame, FrameError, LINE_SEPARATOR};
pub use queue::{EnqueueOutcome, FrameQueue};
pub use transport::{Connection, ConnectionError, Connector, TcpConnector, TcpTransport, TlsOptions};
pub use worker::WorkerState;
