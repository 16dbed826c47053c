//! # Focus Forest Core Library
//!
//! Core logic for the Focus Forest focus timer: a countdown session that
//! grows a tree, withers it if the host loses visibility before the end,
//! and collects completed sessions into a forest.
//!
//! ## Architecture
//!
//! - **Session Controller**: a pure state machine; the caller invokes
//!   `tick()` once per second and `settle()` when a hold interval elapses
//! - **Runtime**: a tokio task that owns the controller, subscribes to a
//!   clock and a visibility source only while a session is active, and
//!   publishes snapshots to renderers
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionController`]: Session state machine and forest
//! - [`SessionRuntime`]: Async driver with scoped timer/visibility subscriptions
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod runtime;
pub mod session;
pub mod storage;

pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use events::Event;
pub use runtime::{
    ChannelVisibility, Clock, IntervalClock, ManualClock, ManualClockHandle, RuntimeHandle,
    RuntimeOptions, SessionRuntime, VisibilityEvent, VisibilityHandle, VisibilitySource,
};
pub use session::{
    forest_label, format_time, Forest, ForestEntry, GrowthStage, SessionController,
    SessionSettings, SessionSnapshot, SessionStatus, VisibilityPolicy, WarningChoice,
};
pub use storage::Config;
