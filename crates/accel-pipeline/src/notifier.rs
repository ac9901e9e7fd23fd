//! Best-effort wakeup fan-out to registered readers
//!
//! A wakeup is a hint to poll, never a count of waiting samples. Full or
//! closed inboxes drop the wakeup and the producer moves on.

use crate::ConsumerId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

/// "Data available" message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup;

/// Non-blocking notification primitive
pub trait Notify: Send + Sync {
    /// Try to wake `owner`. Returns whether the wakeup was delivered.
    fn try_notify(&self, owner: ConsumerId) -> bool;
}

impl<N: Notify + ?Sized> Notify for Arc<N> {
    fn try_notify(&self, owner: ConsumerId) -> bool {
        (**self).try_notify(owner)
    }
}

/// Bounded per-reader inboxes backed by tokio channels
#[derive(Debug)]
pub struct Mailboxes {
    depth: usize,
    inboxes: Mutex<HashMap<ConsumerId, mpsc::Sender<Wakeup>>>,
}

impl Mailboxes {
    /// Create inboxes holding at most `depth` pending wakeups each
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            inboxes: Mutex::new(HashMap::new()),
        }
    }

    /// Open (or replace) the inbox for `owner`
    pub fn open(&self, owner: ConsumerId) -> mpsc::Receiver<Wakeup> {
        let (tx, rx) = mpsc::channel(self.depth);
        self.inboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(owner, tx);
        debug!("Opened inbox for {}", owner);
        rx
    }

    /// Close the inbox for `owner`; its receiver then yields `None`
    pub fn close(&self, owner: ConsumerId) -> bool {
        self.inboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&owner)
            .is_some()
    }
}

impl Notify for Mailboxes {
    fn try_notify(&self, owner: ConsumerId) -> bool {
        let inboxes = self.inboxes.lock().unwrap_or_else(PoisonError::into_inner);
        inboxes
            .get(&owner)
            .is_some_and(|tx| tx.try_send(Wakeup).is_ok())
    }
}
