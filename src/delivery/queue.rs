//! Bounded drop-oldest frame queue shared by producers and the worker.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, select};

use crate::cancel::{Cancelled, CancellationToken};

use super::frame::Frame;

/// Result of a non-blocking enqueue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The frame was appended without displacing anything.
    Appended,
    /// The frame was appended after evicting this many frames from the head.
    EvictedOldest(usize),
}

/// Fixed-capacity FIFO of [`Frame`] values.
///
/// Both channel ends live in the queue: producers push through the sender and
/// evict through a clone of the receiver, so the channel never disconnects
/// while the queue exists.
pub struct FrameQueue {
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
    capacity: usize,
}

impl FrameQueue {
    /// Create a queue holding at most `capacity` frames (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Append `frame`, evicting from the head while the queue is full.
    pub fn enqueue(&self, frame: Frame) -> EnqueueOutcome {
        let mut pending = frame;
        let mut evicted = 0;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => break,
                Err(TrySendError::Full(rejected)) => {
                    // Another producer or the worker may drain concurrently;
                    // only count frames this call actually discarded.
                    if self.rx.try_recv().is_ok() {
                        evicted += 1;
                    }
                    pending = rejected;
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
        if evicted == 0 {
            EnqueueOutcome::Appended
        } else {
            EnqueueOutcome::EvictedOldest(evicted)
        }
    }

    /// Block until a frame is available or `cancel` fires.
    pub fn dequeue_blocking(&self, cancel: &CancellationToken) -> Result<Frame, Cancelled> {
        cancel.check()?;
        select! {
            recv(self.rx) -> frame => frame.map_err(|_| Cancelled),
            recv(cancel.receiver()) -> _ => Err(Cancelled),
        }
    }

    /// Take the head frame if one is queued.
    pub fn try_dequeue(&self) -> Option<Frame> {
        self.rx.try_recv().ok()
    }

    /// Approximate occupancy.
    pub fn size(&self) -> usize {
        self.rx.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("size", &self.size())
            .field("capacity", &self.capacity)
            .finish()
    }
}
