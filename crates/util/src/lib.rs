//! Cooperative event plumbing for the host loop.
//!
//! The editing surface raises notifications (scroll changes, content
//! changes) while the paging controller is mid-call; they must not re-enter
//! the controller synchronously. The host parks them in an [`EventQueue`]
//! and drains it once per tick, calling `settle()` on the controller
//! afterwards so the loading guard can release.

use crossbeam_channel::{Receiver, unbounded};

pub use crossbeam_channel::Sender;

/// Unbounded single-consumer event queue.
///
/// Senders are cheap clones handed to whatever raises events; the owner
/// drains from the loop. Sends never block.
#[derive(Debug)]
pub struct EventQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A handle for raising events into the queue.
    pub fn sender(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Takes every event currently queued, in arrival order.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
