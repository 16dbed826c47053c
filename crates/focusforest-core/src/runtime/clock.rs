//! Pulse sources driving `tick()`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::slot::SubscriberSlot;

/// One countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse;

/// Periodic pulse source plus wall-clock time.
///
/// `subscribe` acquires the recurring timer; `unsubscribe` releases it.
pub trait Clock: Send {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Pulse>;
    fn unsubscribe(&mut self);

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock backed by `tokio::time::interval` in a spawned task.
///
/// Must be subscribed from inside a tokio runtime. The task is aborted on
/// `unsubscribe` and on drop.
#[derive(Debug)]
pub struct IntervalClock {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl IntervalClock {
    /// Periods shorter than a millisecond are raised to one.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            task: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_subscribed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Clock for IntervalClock {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Pulse> {
        self.unsubscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            // First pulse one full period after subscribing, not immediately.
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Pulse).is_err() {
                    break;
                }
            }
        }));
        debug!(period_ms = period.as_millis() as u64, "interval clock acquired");
        rx
    }

    fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("interval clock released");
        }
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Clock that only pulses when told to through its [`ManualClockHandle`].
#[derive(Debug)]
pub struct ManualClock {
    slot: SubscriberSlot<Pulse>,
}

impl ManualClock {
    pub fn new() -> (Self, ManualClockHandle) {
        let slot = SubscriberSlot::new();
        (Self { slot: slot.clone() }, ManualClockHandle { slot })
    }
}

impl Clock for ManualClock {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Pulse> {
        self.slot.attach()
    }

    fn unsubscribe(&mut self) {
        self.slot.detach();
    }
}

#[derive(Debug, Clone)]
pub struct ManualClockHandle {
    slot: SubscriberSlot<Pulse>,
}

impl ManualClockHandle {
    /// Returns `false` if the clock was not subscribed.
    pub fn pulse(&self) -> bool {
        self.slot.send(Pulse)
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot.is_attached()
    }
}
