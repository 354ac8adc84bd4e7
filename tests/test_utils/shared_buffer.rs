//! Shared buffer utilities for delivery tests.
//!
//! Provides a thread-safe byte sink standing in for the socket and a helper
//! that waits for the worker to write a given amount of data.

use std::{
    io::{self, Write},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Thread-safe wrapper around a byte buffer written by the delivery worker.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// Return a snapshot of the buffer contents.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Poll `buf` until it holds at least `len` bytes or `timeout` elapses, then
/// return its contents.
#[allow(dead_code)]
pub fn wait_for_len(buf: &SharedBuf, len: usize, timeout: Duration) -> Vec<u8> {
    let deadline = Instant::now() + timeout;
    while buf.len() < len && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    buf.contents()
}
