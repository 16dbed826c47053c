//! Plain-text renderer for terminal output.

use focusforest_core::session::display::{
    tree_size, COMPLETION_MESSAGE, COMPLETION_TITLE, EMPTY_FOREST_MESSAGE, WARNING_MESSAGE,
    WITHER_MESSAGE,
};
use focusforest_core::{
    forest_label, Event, ForestEntry, GrowthStage, SessionSnapshot, SessionStatus,
};

const BAR_WIDTH: usize = 20;

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Idle => "Ready",
        SessionStatus::Running => "Focus in progress...",
        SessionStatus::WarningPending => "Waiting for answer",
        SessionStatus::Withering => "Withering",
        SessionStatus::Completed => "Complete",
    }
}

fn tree_glyph(stage: GrowthStage) -> &'static str {
    match stage {
        GrowthStage::Sapling => "🌱",
        GrowthStage::Tree => "🌲",
        GrowthStage::Withered => "🥀",
    }
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round()) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// One-line view of the session, redrawn on every change.
pub fn status_line(snapshot: &SessionSnapshot) -> String {
    format!(
        "{} {:>6}  {} {:>3}%  size {:.0}  {}  | {}",
        tree_glyph(snapshot.growth),
        snapshot.formatted_time,
        progress_bar(snapshot.progress),
        (snapshot.progress * 100.0).round() as u64,
        tree_size(snapshot.progress),
        status_label(snapshot.status),
        forest_label(snapshot.forest.len()),
    )
}

/// Message shown for a lifecycle event, if any.
pub fn event_message(event: &Event) -> Option<String> {
    match event {
        Event::SessionStarted { duration_secs, .. } => Some(format!(
            "Focus started: {} minutes. Stay on this page!",
            duration_secs / 60
        )),
        Event::SessionCompleted { entry, .. } => Some(format!(
            "{COMPLETION_TITLE} {COMPLETION_MESSAGE} (tree #{})",
            entry.id
        )),
        Event::WarningRaised { .. } => Some(format!("{WARNING_MESSAGE} [continue/leave]")),
        Event::WarningDismissed { .. } => Some("Back to focusing.".to_string()),
        Event::SessionInterrupted { .. } => Some(WITHER_MESSAGE.to_string()),
        Event::SessionReset { .. } => Some("Ready for the next session.".to_string()),
        Event::StateSnapshot { .. } => None,
    }
}

/// The forest dialog.
pub fn forest_listing(entries: &[ForestEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_FOREST_MESSAGE.to_string();
    }
    let mut out = forest_label(entries.len());
    for entry in entries {
        out.push_str(&format!(
            "\n  🌲 #{:<3} planted {}",
            entry.id,
            entry.planted_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    out
}
