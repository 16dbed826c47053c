use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{ForestEntry, GrowthStage, SessionStatus};

/// Every state change in the session produces an Event.
/// Renderers print them; the runtime broadcasts them to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        duration_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero and a tree was planted.
    SessionCompleted {
        entry: ForestEntry,
        forest_size: usize,
        at: DateTime<Utc>,
    },
    /// Visibility was lost under the confirm policy; countdown is frozen.
    WarningRaised {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// User chose to keep focusing after a warning.
    WarningDismissed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The session was lost to a visibility change and the tree withers.
    SessionInterrupted {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Hold interval elapsed; back to idle with a full countdown.
    SessionReset {
        from: SessionStatus,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: SessionStatus,
        remaining_secs: u64,
        duration_secs: u64,
        progress: f64,
        growth: GrowthStage,
        forest_size: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::WarningRaised { at, .. }
            | Event::WarningDismissed { at, .. }
            | Event::SessionInterrupted { at, .. }
            | Event::SessionReset { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::SessionInterrupted {
            remaining_secs: 1490,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SessionInterrupted");
        assert_eq!(json["remaining_secs"], 1490);
    }

    #[test]
    fn reset_carries_lowercase_status() {
        let event = Event::SessionReset {
            from: SessionStatus::Withering,
            remaining_secs: 1500,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["from"], "withering");
    }
}
