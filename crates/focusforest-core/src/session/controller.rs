//! Session controller.
//!
//! The controller is a pure state machine. It does not own any timer: the
//! caller (normally [`SessionRuntime`](crate::runtime::SessionRuntime))
//! invokes `tick()` once per second while running and `settle()` once the
//! hold interval after a completion or wither has elapsed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Completed -> Idle
//!            |   \-> Withering -> Idle
//!            \-> WarningPending -> (Running | Withering)
//! ```
//!
//! Calls that do not apply to the current state return `None` and change
//! nothing.
//!
//! ## Usage
//!
//! ```
//! use focusforest_core::{SessionController, SessionSettings, SessionStatus};
//!
//! let mut session = SessionController::new(SessionSettings::default());
//! session.start();
//! session.tick();
//! assert_eq!(session.status(), SessionStatus::Running);
//! assert_eq!(session.remaining_secs(), 1499);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::display::{format_time, GrowthStage};
use super::forest::{Forest, ForestEntry};
use crate::events::Event;

/// Default session length: 25 minutes.
pub const DEFAULT_SESSION_SECS: u64 = 25 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Running,
    /// Visibility was lost under the confirm policy; waiting for an answer.
    WarningPending,
    /// Session lost; held until `settle()`.
    Withering,
    /// Tree planted; held until `settle()`.
    Completed,
}

impl SessionStatus {
    /// Statuses during which the clock and visibility subscriptions are held.
    pub fn is_active(self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::WarningPending)
    }

    /// Statuses that end after the hold interval.
    pub fn is_holding(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Withering)
    }
}

/// What to do when the host reports that it lost visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityPolicy {
    /// Wither at once (desktop: the page is already hidden).
    #[default]
    Immediate,
    /// Ask first (mobile/ambiguous: the user may only be about to leave).
    Confirm,
}

impl std::str::FromStr for VisibilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(VisibilityPolicy::Immediate),
            "confirm" => Ok(VisibilityPolicy::Confirm),
            other => Err(format!("unknown visibility policy: {other}")),
        }
    }
}

/// Answer to a visibility warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningChoice {
    Continue,
    Leave,
}

impl std::str::FromStr for WarningChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continue" => Ok(WarningChoice::Continue),
            "leave" => Ok(WarningChoice::Leave),
            other => Err(format!("unknown warning choice: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub duration_secs: u64,
    pub policy: VisibilityPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_SESSION_SECS,
            policy: VisibilityPolicy::Immediate,
        }
    }
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub remaining_secs: u64,
    pub duration_secs: u64,
    pub progress: f64,
    pub formatted_time: String,
    pub growth: GrowthStage,
    pub forest: Vec<ForestEntry>,
}

impl SessionSnapshot {
    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn is_withering(&self) -> bool {
        self.status == SessionStatus::Withering
    }
}

/// Owns the current session and the forest.
#[derive(Debug, Clone)]
pub struct SessionController {
    settings: SessionSettings,
    status: SessionStatus,
    remaining_secs: u64,
    forest: Forest,
}

impl SessionController {
    /// Create a controller in `Idle` with a full countdown.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            status: SessionStatus::Idle,
            remaining_secs: settings.duration_secs,
            forest: Forest::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.settings.duration_secs
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn is_withering(&self) -> bool {
        self.status == SessionStatus::Withering
    }

    /// 0.0 .. 1.0 elapsed share of the session.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.settings.duration_secs;
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.remaining_secs);
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn formatted_time(&self) -> String {
        format_time(self.remaining_secs)
    }

    pub fn growth(&self) -> GrowthStage {
        GrowthStage::for_progress(self.progress_fraction(), self.is_withering())
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn forest_snapshot(&self) -> &[ForestEntry] {
        self.forest.entries()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            remaining_secs: self.remaining_secs,
            duration_secs: self.settings.duration_secs,
            progress: self.progress_fraction(),
            formatted_time: self.formatted_time(),
            growth: self.growth(),
            forest: self.forest.entries().to_vec(),
        }
    }

    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            status: self.status,
            remaining_secs: self.remaining_secs,
            duration_secs: self.settings.duration_secs,
            progress: self.progress_fraction(),
            growth: self.growth(),
            forest_size: self.forest.len(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.status != SessionStatus::Idle {
            debug!(status = ?self.status, "start ignored");
            return None;
        }
        self.status = SessionStatus::Running;
        info!(remaining_secs = self.remaining_secs, "session started");
        Some(Event::SessionStarted {
            duration_secs: self.settings.duration_secs,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Call once per second. Returns `Some(Event::SessionCompleted)` when the
    /// countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit completion timestamp.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.status != SessionStatus::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        self.status = SessionStatus::Completed;
        let entry = self.forest.plant(now);
        info!(tree = entry.id, forest_size = self.forest.len(), "session completed");
        Some(Event::SessionCompleted {
            entry,
            forest_size: self.forest.len(),
            at: now,
        })
    }

    /// The host lost visibility/focus. Only meaningful while running.
    pub fn report_visibility_lost(&mut self) -> Option<Event> {
        if self.status != SessionStatus::Running {
            debug!(status = ?self.status, "visibility loss ignored");
            return None;
        }
        match self.settings.policy {
            VisibilityPolicy::Immediate => Some(self.wither()),
            VisibilityPolicy::Confirm => {
                self.status = SessionStatus::WarningPending;
                info!(remaining_secs = self.remaining_secs, "visibility warning raised");
                Some(Event::WarningRaised {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn acknowledge_warning(&mut self, choice: WarningChoice) -> Option<Event> {
        if self.status != SessionStatus::WarningPending {
            debug!(status = ?self.status, ?choice, "warning acknowledgement ignored");
            return None;
        }
        match choice {
            WarningChoice::Continue => {
                self.status = SessionStatus::Running;
                info!(remaining_secs = self.remaining_secs, "warning dismissed");
                Some(Event::WarningDismissed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            WarningChoice::Leave => Some(self.wither()),
        }
    }

    /// Hold interval elapsed: return to `Idle` with a full countdown.
    pub fn settle(&mut self) -> Option<Event> {
        if !self.status.is_holding() {
            return None;
        }
        let from = self.status;
        self.status = SessionStatus::Idle;
        self.remaining_secs = self.settings.duration_secs;
        info!(?from, "session reset");
        Some(Event::SessionReset {
            from,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn wither(&mut self) -> Event {
        self.status = SessionStatus::Withering;
        info!(remaining_secs = self.remaining_secs, "session interrupted, tree withering");
        Event::SessionInterrupted {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }
}
