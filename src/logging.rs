//! Diagnostic logging on stderr.
//!
//! `RUST_LOG` wins when set; otherwise `-v` selects the crate's level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for a `-v` count.
#[must_use]
pub const fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "tinacms_cli=info,warn",
        _ => "tinacms_cli=debug,warn",
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
