//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Verbosity;

/// Environment variable holding a filter directive, e.g. `askkai=debug`
pub const LOG_ENV: &str = "ASKKAI_LOG";

static INIT: Once = Once::new();

/// Pick the filter: `ASKKAI_LOG` first, then the verbosity flags, then the
/// configured level.
pub fn filter_directive(env: Option<&str>, verbosity: Verbosity, configured: &str) -> String {
    match env.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directive) => directive.to_string(),
        None => verbosity
            .log_directive()
            .map(str::to_string)
            .unwrap_or_else(|| configured.to_string()),
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_tracing(verbosity: Verbosity, configured: &str) {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let directive = filter_directive(env.as_deref(), verbosity, configured);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
