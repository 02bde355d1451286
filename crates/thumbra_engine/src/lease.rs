//! Per-key generation leases.
//!
//! At most one generation runs per thumbnail key. The first request to miss
//! becomes the owner and receives a [`LeaseGuard`]; later requests for the same
//! key receive a [`LeaseWaiter`] that resolves with the owner's outcome.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thumbra_core::StorageKey;
use tokio::sync::watch;

/// How a finished generation ended, as seen by every request waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The thumbnail is now in the store.
    Generated,
    /// Requested width exceeds the original; serve the original instead.
    WidthTooLarge,
    /// The original does not exist.
    OriginalMissing,
    /// Generation failed; the message is for logs only.
    Failed(String),
}

type Slot = watch::Receiver<Option<GenerationOutcome>>;

/// Registry of in-flight generations keyed by thumbnail key.
#[derive(Debug, Clone, Default)]
pub struct GenerationLeases {
    inflight: Arc<Mutex<HashMap<StorageKey, Slot>>>,
}

/// Result of trying to take the lease for a key.
#[derive(Debug)]
pub enum Lease {
    /// Caller must generate and then publish through the guard.
    Owner(LeaseGuard),
    /// Another task is generating; wait for its outcome.
    Waiter(LeaseWaiter),
}

impl GenerationLeases {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lease for `key`, or join the generation already holding it.
    pub fn acquire(&self, key: &StorageKey) -> Lease {
        let mut inflight = self.inflight.lock();
        if let Some(slot) = inflight.get(key) {
            return Lease::Waiter(LeaseWaiter {
                receiver: slot.clone(),
            });
        }

        let (sender, receiver) = watch::channel(None);
        inflight.insert(key.clone(), receiver);
        Lease::Owner(LeaseGuard {
            key: key.clone(),
            sender,
            inflight: Arc::clone(&self.inflight),
        })
    }

    /// Number of keys currently being generated.
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Whether `key` is currently being generated.
    pub fn is_held(&self, key: &StorageKey) -> bool {
        self.inflight.lock().contains_key(key)
    }
}

/// Exclusive right to generate one key.
///
/// Dropping the guard releases the lease whether or not an outcome was
/// published; waiters that saw no outcome retry.
#[derive(Debug)]
pub struct LeaseGuard {
    key: StorageKey,
    sender: watch::Sender<Option<GenerationOutcome>>,
    inflight: Arc<Mutex<HashMap<StorageKey, Slot>>>,
}

impl LeaseGuard {
    /// Key this lease covers.
    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    /// Publish the outcome to all waiters and release the lease.
    pub fn complete(self, outcome: GenerationOutcome) {
        self.sender.send_replace(Some(outcome));
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.inflight.lock().remove(&self.key);
    }
}

/// Handle on someone else's in-flight generation.
#[derive(Debug)]
pub struct LeaseWaiter {
    receiver: Slot,
}

impl LeaseWaiter {
    /// Wait for the owner's outcome.
    ///
    /// Returns `None` if the owner went away without publishing one.
    pub async fn outcome(mut self) -> Option<GenerationOutcome> {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        }
    }
}
