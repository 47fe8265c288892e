//! Cooperative cancellation.
//!
//! A `CancellationToken` is shared by cloning. Waiters call `on_cancel()` to
//! get a `CancelRegistration`, whose receiver fires once when the token is
//! cancelled. Dropping the registration unregisters it.
//!
//! Running analyses poll an `Interrupt` instead, so a cancelled or abandoned
//! run can stop early.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, Sender, bounded};

#[derive(Debug, Default)]
struct Listeners {
    next_id: u64,
    senders: HashMap<u64, Sender<()>>,
}

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    listeners: Mutex<Listeners>,
}

impl Shared {
    fn listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and notify every registered listener. Idempotent.
    pub fn cancel(&self) {
        if self.shared.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let senders: Vec<Sender<()>> = self
            .shared
            .listeners()
            .senders
            .drain()
            .map(|(_, sender)| sender)
            .collect();
        tracing::debug!(listeners = senders.len(), "cancellation requested");
        for sender in senders {
            let _ = sender.try_send(());
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Register a listener. Fires immediately if already cancelled.
    pub fn on_cancel(&self) -> CancelRegistration {
        let (sender, receiver) = bounded(1);
        let mut listeners = self.shared.listeners();
        // Checked under the lock so a concurrent cancel() cannot be missed
        if self.is_cancelled() {
            let _ = sender.try_send(());
            return CancelRegistration {
                id: None,
                shared: Arc::clone(&self.shared),
                receiver,
            };
        }
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.senders.insert(id, sender);
        CancelRegistration {
            id: Some(id),
            shared: Arc::clone(&self.shared),
            receiver,
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.shared.listeners().senders.len()
    }
}

/// Polled by a running analysis to learn that its result is no longer wanted.
///
/// Raised when the caller's token is cancelled or the worker that owns the
/// run has been dropped.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    token: Option<CancellationToken>,
    abandoned: Option<Arc<AtomicBool>>,
}

impl Interrupt {
    /// An interrupt that is never raised.
    pub fn never() -> Self {
        Self::default()
    }

    pub fn from_token(token: &CancellationToken) -> Self {
        Self {
            token: Some(token.clone()),
            abandoned: None,
        }
    }

    pub(crate) fn with_flag(mut self, abandoned: Arc<AtomicBool>) -> Self {
        self.abandoned = Some(abandoned);
        self
    }

    pub fn is_raised(&self) -> bool {
        self.token.as_ref().is_some_and(CancellationToken::is_cancelled)
            || self
                .abandoned
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Live cancellation listener. Unregisters on drop.
#[derive(Debug)]
pub struct CancelRegistration {
    id: Option<u64>,
    shared: Arc<Shared>,
    receiver: Receiver<()>,
}

impl CancelRegistration {
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }

    pub fn is_fired(&self) -> bool {
        !self.receiver.is_empty() || self.shared.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for CancelRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            self.shared.listeners().senders.remove(&id);
        }
    }
}
