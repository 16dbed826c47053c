use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

/// A single subscriber slot shared between a source and its host-side handle.
///
/// Values sent while nobody is subscribed are discarded.
#[derive(Debug)]
pub(crate) struct SubscriberSlot<T> {
    inner: Arc<Mutex<Option<mpsc::UnboundedSender<T>>>>,
}

impl<T> Clone for SubscriberSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SubscriberSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace any existing subscriber with a fresh channel.
    pub(crate) fn attach(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.lock() = Some(tx);
        rx
    }

    pub(crate) fn detach(&self) {
        self.lock().take();
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.lock().as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Returns `true` if a subscriber received the value.
    pub(crate) fn send(&self, value: T) -> bool {
        match self.lock().as_ref() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<T>>> {
        // A panic while holding the lock cannot leave the Option half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
