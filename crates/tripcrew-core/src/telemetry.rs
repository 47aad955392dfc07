//! Tracing setup for the `tripcrew` binary.
//!
//! Logs go to stderr so a plan rendered on stdout can be piped as-is.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global subscriber. Later calls are no-ops.
///
/// `RUST_LOG` wins when set. Otherwise TripCrew's own crates log at `level`
/// and dependencies (reqwest, hyper) at `warn`. `json` switches to
/// newline-delimited JSON lines.
pub fn init_tracing(json: bool, level: Level) {
    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let output = if json {
        stderr.json().boxed()
    } else {
        stderr.boxed()
    };

    tracing_subscriber::registry()
        .with(default_filter(level))
        .with(output)
        .try_init()
        .ok();
}

fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str();
        EnvFilter::new(format!("warn,tripcrew_core={level},tripcrew={level}"))
    })
}
