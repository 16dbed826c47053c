//! Async driver for [`SessionController`].
//!
//! `SessionRuntime` is one tokio task that owns the controller. It listens to
//! host commands, clock pulses and visibility events, and publishes a
//! [`SessionSnapshot`] after every change. Each change is also broadcast as
//! an [`Event::StateSnapshot`] following the event that caused it.
//!
//! The clock and visibility subscriptions are held only while the session is
//! running or waiting on a warning; every other status releases both. After
//! a completion or wither the runtime waits out the hold interval and then
//! settles the controller back to idle.
//!
//! Visibility always wins over a pulse that is ready at the same time, so a
//! session that loses focus on its final second withers instead of completing.

mod clock;
mod slot;
mod visibility;

use std::future::pending;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

pub use clock::{Clock, IntervalClock, ManualClock, ManualClockHandle, Pulse};
pub use visibility::{ChannelVisibility, VisibilityEvent, VisibilityHandle, VisibilitySource};

use crate::events::Event;
use crate::session::{SessionController, SessionSnapshot, WarningChoice};

/// Hold after a completion or wither before returning to idle.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(3000);

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub hold: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self { hold: DEFAULT_HOLD }
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Start,
    Acknowledge(WarningChoice),
    Shutdown,
}

enum Wake {
    Visibility(Option<VisibilityEvent>),
    Command(Option<Command>),
    Pulse(Option<Pulse>),
    HoldElapsed,
}

/// Host-side handle to a running [`SessionRuntime`].
///
/// Command methods return `false` once the runtime has stopped.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<Event>,
}

impl RuntimeHandle {
    pub fn start(&self) -> bool {
        self.commands.send(Command::Start).is_ok()
    }

    pub fn acknowledge(&self, choice: WarningChoice) -> bool {
        self.commands.send(Command::Acknowledge(choice)).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.commands.send(Command::Shutdown).is_ok()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver for renderers that redraw on every change.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

pub struct SessionRuntime<C, V> {
    controller: SessionController,
    clock: C,
    visibility: V,
    options: RuntimeOptions,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<Event>,
    pulses: Option<mpsc::UnboundedReceiver<Pulse>>,
    visibility_events: Option<mpsc::UnboundedReceiver<VisibilityEvent>>,
    subscribed: bool,
    hold_deadline: Option<Instant>,
}

impl<C: Clock, V: VisibilitySource> SessionRuntime<C, V> {
    pub fn new(
        controller: SessionController,
        clock: C,
        visibility: V,
        options: RuntimeOptions,
    ) -> (Self, RuntimeHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let handle = RuntimeHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx.clone(),
        };
        let runtime = Self {
            controller,
            clock,
            visibility,
            options,
            commands: command_rx,
            snapshots: snapshot_tx,
            events: event_tx,
            pulses: None,
            visibility_events: None,
            subscribed: false,
            hold_deadline: None,
        };
        (runtime, handle)
    }

    /// Build the runtime and spawn it on the current tokio runtime.
    ///
    /// The join handle yields the controller back after shutdown.
    pub fn spawn(
        controller: SessionController,
        clock: C,
        visibility: V,
        options: RuntimeOptions,
    ) -> (RuntimeHandle, JoinHandle<SessionController>)
    where
        C: 'static,
        V: 'static,
    {
        let (runtime, handle) = Self::new(controller, clock, visibility, options);
        (handle, tokio::spawn(runtime.run()))
    }

    /// Drive the session until shutdown or until every handle is dropped.
    pub async fn run(mut self) -> SessionController {
        info!(
            duration_secs = self.controller.duration_secs(),
            hold_ms = self.options.hold.as_millis() as u64,
            "session runtime started"
        );
        self.sync();

        loop {
            let wake = tokio::select! {
                biased;
                event = next_from(&mut self.visibility_events) => Wake::Visibility(event),
                command = self.commands.recv() => Wake::Command(command),
                pulse = next_from(&mut self.pulses) => Wake::Pulse(pulse),
                () = hold_elapsed(self.hold_deadline) => Wake::HoldElapsed,
            };

            match wake {
                Wake::Visibility(Some(event)) => self.on_visibility(event),
                Wake::Visibility(None) => {
                    warn!("visibility source closed its channel");
                    self.visibility_events = None;
                }
                Wake::Command(None) | Wake::Command(Some(Command::Shutdown)) => break,
                Wake::Command(Some(Command::Start)) => {
                    let event = self.controller.start();
                    self.emit(event);
                }
                Wake::Command(Some(Command::Acknowledge(choice))) => {
                    let event = self.controller.acknowledge_warning(choice);
                    self.emit(event);
                }
                Wake::Pulse(Some(Pulse)) => self.on_pulse(),
                Wake::Pulse(None) => {
                    warn!("clock closed its channel");
                    self.pulses = None;
                }
                Wake::HoldElapsed => {
                    self.hold_deadline = None;
                    let event = self.controller.settle();
                    self.emit(event);
                }
            }

            self.sync();
        }

        self.release();
        info!(forest_size = self.controller.forest().len(), "session runtime stopped");
        self.controller
    }

    fn on_visibility(&mut self, event: VisibilityEvent) {
        match event {
            VisibilityEvent::Lost => {
                let event = self.controller.report_visibility_lost();
                self.emit(event);
            }
            VisibilityEvent::Regained => debug!("visibility regained"),
        }
    }

    fn on_pulse(&mut self) {
        // A loss already queued takes effect before this pulse.
        let mut queued = Vec::new();
        if let Some(rx) = self.visibility_events.as_mut() {
            while let Ok(event) = rx.try_recv() {
                queued.push(event);
            }
        }
        for event in queued {
            self.on_visibility(event);
        }

        let now = self.clock.now();
        let event = self.controller.tick_at(now);
        self.emit(event);
    }

    fn emit(&self, event: Option<Event>) {
        if let Some(event) = event {
            // No receivers is fine; renderers may only watch snapshots.
            let _ = self.events.send(event);
        }
    }

    /// Bring subscriptions, hold deadline and published snapshot in line
    /// with the controller's status.
    fn sync(&mut self) {
        let status = self.controller.status();

        if status.is_active() && !self.subscribed {
            self.pulses = Some(self.clock.subscribe());
            self.visibility_events = Some(self.visibility.subscribe());
            self.subscribed = true;
            debug!(?status, "clock and visibility subscribed");
        } else if !status.is_active() && self.subscribed {
            self.release();
            debug!(?status, "clock and visibility released");
        }

        if status.is_holding() {
            if self.hold_deadline.is_none() {
                self.hold_deadline = Some(Instant::now() + self.options.hold);
            }
        } else {
            self.hold_deadline = None;
        }

        let snapshot = self.controller.snapshot();
        let changed = self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        if changed {
            self.emit(Some(self.controller.snapshot_event()));
        }
    }

    fn release(&mut self) {
        if self.subscribed {
            self.clock.unsubscribe();
            self.visibility.unsubscribe();
            self.subscribed = false;
        }
        self.pulses = None;
        self.visibility_events = None;
    }
}

async fn next_from<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

async fn hold_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
