use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `quiet` keeps only errors and
/// `verbose` turns on debug output for the focusforest crates.
pub fn init_logging(verbose: bool, quiet: bool) {
    let directive = if quiet {
        "focusforest=error"
    } else if verbose {
        "focusforest=debug"
    } else {
        "focusforest=warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // A second init (e.g. from tests) is not an error worth reporting.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
