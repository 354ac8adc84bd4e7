//! Public engine type exported by the crate.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    time::Duration,
};

use crossbeam_channel::RecvTimeoutError;
use log::warn;
use parking_lot::Mutex;

use crate::{
    cancel::CancellationToken,
    diagnostics::{DIAGNOSTIC_TARGET, Diagnostics},
    rate_limited_warner::RateLimitedWarner,
    token::{Token, TokenError},
};

use super::{
    backoff::BackoffState,
    config::{BackoffPolicy, EngineConfig},
    connection::ConnectionManager,
    frame::Frame,
    queue::{EnqueueOutcome, FrameQueue},
    transport::{Connector, TcpConnector},
    worker::{WorkerHandle, WorkerState, spawn_worker},
};

enum WorkerSlot<C: Connector> {
    Pending(C),
    Running(WorkerHandle),
    Finished,
}

/// Asynchronous log delivery engine.
///
/// `submit` encodes lines into frames and queues them without blocking; a
/// single background thread, started on the first valid submission, ships
/// them to the collection endpoint and reconnects with backoff when the
/// connection fails.
pub struct LogentriesEngine<C: Connector = TcpConnector> {
    token: Result<Token, TokenError>,
    queue: Arc<FrameQueue>,
    cancel: CancellationToken,
    diagnostics: Diagnostics,
    overflow: RateLimitedWarner,
    backoff: BackoffPolicy,
    shutdown_timeout: Duration,
    state: AtomicU8,
    invalid_token_reported: AtomicBool,
    worker: Mutex<WorkerSlot<C>>,
}

impl LogentriesEngine<TcpConnector> {
    /// Construct an engine that connects over TCP as described by `config`.
    pub fn new(config: EngineConfig) -> Self {
        let connector = TcpConnector::new(
            config.transport.clone(),
            config.connect_timeout,
            config.write_timeout,
        );
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> LogentriesEngine<C> {
    /// Construct an engine that obtains its streams from `connector`.
    pub fn with_connector(config: EngineConfig, connector: C) -> Self {
        let diagnostics = Diagnostics::new(config.debug);
        Self {
            token: Token::parse(&config.token),
            queue: Arc::new(FrameQueue::new(config.capacity)),
            cancel: CancellationToken::new(),
            diagnostics,
            overflow: RateLimitedWarner::new(config.warn_interval),
            backoff: config.backoff,
            shutdown_timeout: config.shutdown_timeout,
            state: AtomicU8::new(encode_state(WorkerState::NotStarted)),
            invalid_token_reported: AtomicBool::new(false),
            worker: Mutex::new(WorkerSlot::Pending(connector)),
        }
    }

    /// Queue `line`, plus `failure` as a second frame when present.
    ///
    /// Never blocks and never fails. Nothing is queued while the token is
    /// invalid or after [`close`](Self::close).
    pub fn submit(&self, line: &str, failure: Option<&str>) {
        let token = match &self.token {
            Ok(token) => token,
            Err(err) => {
                self.report_invalid_token(err);
                return;
            }
        };
        if !self.ensure_started() {
            return;
        }
        self.enqueue_line(token, line);
        if let Some(failure) = failure {
            self.enqueue_line(token, failure);
        }
    }

    /// Stop the worker and release the connection. Idempotent.
    ///
    /// Frames still queued are discarded.
    pub fn close(&self) {
        self.cancel.cancel();
        let previous = {
            let mut slot = self.worker.lock();
            self.set_state(WorkerState::Stopped);
            std::mem::replace(&mut *slot, WorkerSlot::Finished)
        };
        if let WorkerSlot::Running(worker) = previous {
            self.diagnostics
                .debug(format_args!("stopping delivery worker"));
            self.join_worker(worker);
        }
        self.overflow.flush(|count| {
            self.diagnostics
                .warn(format_args!("evicted {count} frames because the queue was full"));
        });
    }

    pub fn worker_state(&self) -> WorkerState {
        decode_state(self.state.load(Ordering::Acquire))
    }

    /// Whether the configured token passed validation.
    pub fn has_valid_token(&self) -> bool {
        self.token.is_ok()
    }

    /// Approximate number of frames waiting for the worker.
    pub fn pending_frames(&self) -> usize {
        self.queue.size()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    fn ensure_started(&self) -> bool {
        match self.worker_state() {
            WorkerState::Running => return true,
            WorkerState::Stopped => return false,
            WorkerState::NotStarted => {}
        }
        let mut slot = self.worker.lock();
        match std::mem::replace(&mut *slot, WorkerSlot::Finished) {
            WorkerSlot::Pending(connector) => {
                self.diagnostics
                    .debug(format_args!("starting asynchronous delivery worker"));
                let connection = ConnectionManager::new(
                    connector,
                    BackoffState::new(self.backoff.clone()),
                    self.diagnostics,
                );
                match spawn_worker(
                    Arc::clone(&self.queue),
                    connection,
                    self.cancel.clone(),
                    self.diagnostics,
                ) {
                    Ok(worker) => {
                        *slot = WorkerSlot::Running(worker);
                        self.set_state(WorkerState::Running);
                        true
                    }
                    Err(err) => {
                        warn!(
                            target: DIAGNOSTIC_TARGET,
                            "LogentriesEngine: failed to spawn delivery worker: {err}"
                        );
                        self.set_state(WorkerState::Stopped);
                        false
                    }
                }
            }
            WorkerSlot::Running(worker) => {
                *slot = WorkerSlot::Running(worker);
                true
            }
            WorkerSlot::Finished => false,
        }
    }

    fn enqueue_line(&self, token: &Token, text: &str) {
        self.diagnostics.debug(format_args!("queueing {text}"));
        let frame = match Frame::encode(token.as_str(), text) {
            Ok(frame) => frame,
            Err(err) => {
                self.diagnostics.warn(format_args!("{err}"));
                return;
            }
        };
        if let EnqueueOutcome::EvictedOldest(count) = self.queue.enqueue(frame) {
            self.overflow.record_drops(count as u64);
            self.overflow.warn_if_due(|count| {
                self.diagnostics
                    .warn(format_args!("evicted {count} frames because the queue was full"));
            });
        }
    }

    fn report_invalid_token(&self, err: &TokenError) {
        if !self.invalid_token_reported.swap(true, Ordering::Relaxed) {
            self.diagnostics.warn(format_args!(
                "invalid LOGENTRIES_TOKEN ({err}); nothing will be delivered"
            ));
        }
    }

    fn join_worker(&self, worker: WorkerHandle) {
        match worker.done_rx.recv_timeout(self.shutdown_timeout) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    target: DIAGNOSTIC_TARGET,
                    "LogentriesEngine: delivery worker did not stop within {:?}; detaching",
                    self.shutdown_timeout
                );
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    warn!(target: DIAGNOSTIC_TARGET, "LogentriesEngine: delivery worker panicked");
                }
            }
        }
    }

    fn set_state(&self, state: WorkerState) {
        self.state.store(encode_state(state), Ordering::Release);
    }
}

fn encode_state(state: WorkerState) -> u8 {
    match state {
        WorkerState::NotStarted => 0,
        WorkerState::Running => 1,
        WorkerState::Stopped => 2,
    }
}

fn decode_state(raw: u8) -> WorkerState {
    match raw {
        0 => WorkerState::NotStarted,
        1 => WorkerState::Running,
        _ => WorkerState::Stopped,
    }
}

impl<C: Connector> Drop for LogentriesEngine<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Connector> std::fmt::Debug for LogentriesEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogentriesEngine")
            .field("token", &self.token)
            .field("state", &self.worker_state())
            .field("queue", &self.queue)
            .finish()
    }
}
