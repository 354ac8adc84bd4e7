//! Connection lifecycle owned by the delivery worker.

use std::io::{self, Write};

use crate::{
    cancel::{Cancelled, CancellationToken},
    diagnostics::Diagnostics,
};

use super::{
    backoff::BackoffState,
    frame::Frame,
    transport::{ConnectionError, Connector},
};

/// Observable connection state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Opens, closes, and re-establishes the outbound connection.
///
/// Only the delivery worker holds a manager, so no locking is needed around
/// the stream or the state transitions.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    stream: Option<C::Stream>,
    state: ConnectionState,
    backoff: BackoffState,
    diagnostics: Diagnostics,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, backoff: BackoffState, diagnostics: Diagnostics) -> Self {
        Self {
            connector,
            stream: None,
            state: ConnectionState::Disconnected,
            backoff,
            diagnostics,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Establish a fresh connection, replacing any existing stream.
    pub fn open(&mut self) -> Result<(), ConnectionError> {
        self.stream = None;
        self.state = ConnectionState::Connecting;
        match self.connector.connect() {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(err) => {
                self.state = ConnectionState::Disconnected;
                Err(err)
            }
        }
    }

    /// Release the connection if one exists.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush();
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Close and retry [`open`](Self::open) until it succeeds.
    ///
    /// Sleeps between attempts follow the backoff policy and are interrupted
    /// by `cancel`, which aborts the loop.
    pub fn reopen_with_backoff(&mut self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        self.close();
        self.backoff.reset();
        loop {
            cancel.check()?;
            match self.open() {
                Ok(()) => {
                    self.diagnostics.debug(format_args!(
                        "connected to {} after {} failed attempts",
                        self.connector.endpoint(),
                        self.backoff.failures()
                    ));
                    return Ok(());
                }
                Err(err) => {
                    let delay = self.backoff.next_sleep();
                    self.diagnostics.warn(format_args!(
                        "unable to connect: {err}; retrying in {delay:?}"
                    ));
                    cancel.sleep(delay)?;
                }
            }
        }
    }

    /// Write one frame. Any failure drops the stream.
    pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        let result = match self.stream.as_mut() {
            Some(stream) => stream.write_all(frame.as_bytes()),
            None => Err(not_connected()),
        };
        self.drop_on_error(result)
    }

    /// Flush buffered bytes. Any failure drops the stream.
    pub fn flush(&mut self) -> io::Result<()> {
        let result = match self.stream.as_mut() {
            Some(stream) => stream.flush(),
            None => Err(not_connected()),
        };
        self.drop_on_error(result)
    }

    fn drop_on_error(&mut self, result: io::Result<()>) -> io::Result<()> {
        if result.is_err() {
            self.stream = None;
            self.state = ConnectionState::Disconnected;
        }
        result
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "no active connection")
}
