//! Deterministic, instant replay of one session.
//!
//! Drives the controller without a clock: each tick is applied directly and
//! hold intervals settle immediately. Useful for scripts and for checking
//! policies without waiting 25 minutes.

use clap::Args;
use focusforest_core::{
    Config, Event, SessionController, SessionSnapshot, VisibilityPolicy, WarningChoice,
};
use serde::Serialize;

use crate::render;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of one-second ticks to apply
    #[arg(long)]
    pub ticks: u64,
    /// Report visibility loss before this tick (0-based)
    #[arg(long)]
    pub hide_at: Option<u64>,
    /// Answer given to a visibility warning
    #[arg(long)]
    pub answer: Option<WarningChoice>,
    /// Visibility policy: immediate or confirm (overrides config)
    #[arg(long)]
    pub policy: Option<VisibilityPolicy>,
    /// Session length in seconds (overrides config)
    #[arg(long)]
    pub duration: Option<u64>,
    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub events: Vec<Event>,
    #[serde(rename = "final")]
    pub final_state: SessionSnapshot,
}

pub fn simulate(args: &SimulateArgs, config: &Config) -> SimulationReport {
    let mut settings = config.session_settings();
    if let Some(duration) = args.duration {
        settings.duration_secs = duration;
    }
    if let Some(policy) = args.policy {
        settings.policy = policy;
    }

    let mut controller = SessionController::new(settings);
    let mut events = Vec::new();
    events.extend(controller.start());

    for tick in 0..args.ticks {
        if args.hide_at == Some(tick) {
            events.extend(controller.report_visibility_lost());
            if let Some(choice) = args.answer {
                events.extend(controller.acknowledge_warning(choice));
            }
        }
        events.extend(controller.tick());
        // No hold in a replay.
        events.extend(controller.settle());
    }

    SimulationReport {
        events,
        final_state: controller.snapshot(),
    }
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    if let Some(0) = args.duration {
        return Err("duration must be greater than zero".into());
    }
    let report = simulate(&args, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for event in &report.events {
        if let Some(message) = render::event_message(event) {
            println!("{message}");
        }
    }
    println!("{}", render::status_line(&report.final_state));
    Ok(())
}
