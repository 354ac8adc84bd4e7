//! Worker thread driving socket I/O.
//!
//! The worker is the only code that touches the connection. Each pass blocks
//! for one frame, snapshots the queue length, drains that many more frames,
//! and flushes once.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, bounded};

use crate::{
    cancel::{Cancelled, CancellationToken},
    diagnostics::Diagnostics,
};

use super::{
    connection::ConnectionManager,
    frame::Frame,
    queue::FrameQueue,
    transport::Connector,
};

/// Lifecycle of the delivery worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    NotStarted,
    Running,
    Stopped,
}

/// Handle to a running worker thread.
pub(crate) struct WorkerHandle {
    pub(crate) handle: JoinHandle<()>,
    pub(crate) done_rx: Receiver<()>,
}

pub(crate) struct DeliveryWorker<C: Connector> {
    queue: Arc<FrameQueue>,
    connection: ConnectionManager<C>,
    cancel: CancellationToken,
    diagnostics: Diagnostics,
}

/// Spawn the worker thread.
pub(crate) fn spawn_worker<C: Connector>(
    queue: Arc<FrameQueue>,
    connection: ConnectionManager<C>,
    cancel: CancellationToken,
    diagnostics: Diagnostics,
) -> std::io::Result<WorkerHandle> {
    let (done_tx, done_rx) = bounded(1);
    let worker = DeliveryWorker {
        queue,
        connection,
        cancel,
        diagnostics,
    };
    let handle = thread::Builder::new()
        .name("logentries-delivery".into())
        .spawn(move || {
            worker.run();
            let _ = done_tx.send(());
        })?;
    Ok(WorkerHandle { handle, done_rx })
}

impl<C: Connector> DeliveryWorker<C> {
    fn run(mut self) {
        if self.connection.reopen_with_backoff(&self.cancel).is_ok() {
            while self.deliver_batch().is_ok() {}
        }
        self.diagnostics
            .debug(format_args!("delivery worker interrupted; closing connection"));
        self.connection.close();
    }

    fn deliver_batch(&mut self) -> Result<(), Cancelled> {
        let first = self.queue.dequeue_blocking(&self.cancel)?;
        // Frames arriving after this snapshot wait for the next pass.
        let batch_size = self.queue.size();
        self.transmit(&first)?;
        for _ in 0..batch_size {
            self.cancel.check()?;
            let Some(frame) = self.queue.try_dequeue() else {
                break;
            };
            self.transmit(&frame)?;
        }
        if let Err(err) = self.connection.flush() {
            self.diagnostics
                .warn(format_args!("flush failed: {err}; reconnecting"));
            self.connection.reopen_with_backoff(&self.cancel)?;
        }
        Ok(())
    }

    /// Write `frame`, reconnecting and rewriting it until it succeeds.
    fn transmit(&mut self, frame: &Frame) -> Result<(), Cancelled> {
        loop {
            match self.connection.write_frame(frame) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    self.diagnostics
                        .warn(format_args!("write failed: {err}; reconnecting"));
                    self.connection.reopen_with_backoff(&self.cancel)?;
                }
            }
        }
    }
}
