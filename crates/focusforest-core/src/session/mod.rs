mod controller;
pub mod display;
mod forest;

pub use controller::{
    SessionController, SessionSettings, SessionSnapshot, SessionStatus, VisibilityPolicy,
    WarningChoice, DEFAULT_SESSION_SECS,
};
pub use display::{forest_label, format_time, tree_size, GrowthStage};
pub use forest::{Forest, ForestEntry};
