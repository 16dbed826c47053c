use std::io::Write;
use std::str::FromStr;

use clap::Args;
use focusforest_core::{
    ChannelVisibility, Config, IntervalClock, SessionController, SessionRuntime,
    VisibilityPolicy, WarningChoice,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::render;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Session length in seconds (overrides config)
    #[arg(long)]
    pub duration: Option<u64>,
    /// Hold after completion/wither in milliseconds (overrides config)
    #[arg(long)]
    pub hold_ms: Option<u64>,
    /// Visibility policy: immediate or confirm (overrides config)
    #[arg(long)]
    pub policy: Option<VisibilityPolicy>,
    /// Clock period in milliseconds (overrides config)
    #[arg(long)]
    pub tick_ms: Option<u64>,
}

impl RunArgs {
    /// Apply command-line overrides on top of the stored config.
    pub fn apply(&self, mut config: Config) -> Result<Config, Box<dyn std::error::Error>> {
        if let Some(duration) = self.duration {
            config.session.duration_secs = duration;
        }
        if let Some(hold_ms) = self.hold_ms {
            config.session.hold_ms = hold_ms;
        }
        if let Some(policy) = self.policy {
            config.session.visibility_policy = policy;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.session.tick_interval_ms = tick_ms;
        }
        config.validate()?;
        Ok(config)
    }
}

/// A line typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Start,
    Hide,
    Show,
    Answer(WarningChoice),
    Forest,
    Status,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => Ok(Input::Start),
            "hide" | "h" => Ok(Input::Hide),
            "show" => Ok(Input::Show),
            "continue" | "c" => Ok(Input::Answer(WarningChoice::Continue)),
            "leave" | "l" => Ok(Input::Answer(WarningChoice::Leave)),
            "forest" | "f" => Ok(Input::Forest),
            "status" => Ok(Input::Status),
            "help" | "?" => Ok(Input::Help),
            "quit" | "q" | "exit" => Ok(Input::Quit),
            other => Err(format!("unknown command: {other} (type 'help')")),
        }
    }
}

const HELP: &str = "\
commands:
  start     begin a focus session
  hide      simulate leaving the page (visibility lost)
  show      simulate returning to the page
  continue  keep focusing after a warning
  leave     give up after a warning
  forest    list planted trees
  status    print the current timer
  quit      exit";

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.apply(Config::load()?)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(config));
    // A stdin read may still be parked on a blocking thread.
    runtime.shutdown_background();
    result
}

async fn session(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let (visibility, host) = ChannelVisibility::new();
    let controller = SessionController::new(config.session_settings());
    let (handle, task) = SessionRuntime::spawn(
        controller,
        IntervalClock::new(config.tick_interval()),
        visibility,
        config.runtime_options(),
    );
    let mut events = handle.subscribe_events();
    let mut snapshots = handle.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Focus Forest");
    println!("{HELP}");
    println!("{}", render::status_line(&handle.snapshot()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Start) => { handle.start(); }
                    Ok(Input::Hide) => { host.lost(); }
                    Ok(Input::Show) => { host.regained(); }
                    Ok(Input::Answer(choice)) => { handle.acknowledge(choice); }
                    Ok(Input::Forest) => println!("{}", render::forest_listing(&handle.snapshot().forest)),
                    Ok(Input::Status) => println!("{}", render::status_line(&handle.snapshot())),
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(Input::Quit) => break,
                    Err(message) => println!("{message}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(message) = render::event_message(&event) {
                        println!("\n{message}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "renderer fell behind on events"),
                Err(RecvError::Closed) => break,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = render::status_line(&snapshots.borrow_and_update());
                print!("\r{line}");
                std::io::stdout().flush()?;
            }
        }
    }

    handle.shutdown();
    let controller = task.await?;
    debug!(status = ?controller.status(), "runtime joined");
    println!("\n{}", render::forest_listing(controller.forest_snapshot()));
    Ok(())
}
