//! Visibility source: tells the runtime when the host surface is hidden.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::slot::SubscriberSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityEvent {
    /// Host became hidden or lost focus.
    Lost,
    /// Host returned to the foreground.
    Regained,
}

/// Source of visibility events.
///
/// The runtime subscribes while a session is running or waiting on a
/// warning, and unsubscribes otherwise.
pub trait VisibilitySource: Send {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<VisibilityEvent>;
    fn unsubscribe(&mut self);
}

/// In-process visibility source fed through a [`VisibilityHandle`].
#[derive(Debug)]
pub struct ChannelVisibility {
    slot: SubscriberSlot<VisibilityEvent>,
}

impl ChannelVisibility {
    pub fn new() -> (Self, VisibilityHandle) {
        let slot = SubscriberSlot::new();
        (Self { slot: slot.clone() }, VisibilityHandle { slot })
    }
}

impl VisibilitySource for ChannelVisibility {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<VisibilityEvent> {
        self.slot.attach()
    }

    fn unsubscribe(&mut self) {
        self.slot.detach();
    }
}

/// Host-side reporter. Reports made while nobody listens are discarded.
#[derive(Debug, Clone)]
pub struct VisibilityHandle {
    slot: SubscriberSlot<VisibilityEvent>,
}

impl VisibilityHandle {
    pub fn report(&self, event: VisibilityEvent) -> bool {
        self.slot.send(event)
    }

    pub fn lost(&self) -> bool {
        self.report(VisibilityEvent::Lost)
    }

    pub fn regained(&self) -> bool {
        self.report(VisibilityEvent::Regained)
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.is_attached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_reach_only_current_subscriber() {
        let (mut source, handle) = ChannelVisibility::new();
        assert!(!handle.lost());

        let mut rx = source.subscribe();
        assert!(handle.is_subscribed());
        assert!(handle.lost());
        assert!(handle.regained());
        assert_eq!(rx.try_recv().ok(), Some(VisibilityEvent::Lost));
        assert_eq!(rx.try_recv().ok(), Some(VisibilityEvent::Regained));

        source.unsubscribe();
        assert!(!handle.is_subscribed());
        assert!(!handle.lost());
    }
}
