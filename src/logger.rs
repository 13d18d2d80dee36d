pub use tracing::{debug, error, info, warn, trace, instrument};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};
use tracing_subscriber::util::TryInitError;

/// Installs the global subscriber, panicking if one is already set.
pub fn init() {
    if let Err(e) = try_init("info") {
        panic!("failed to install tracing subscriber: {}", e);
    }
}

/// Installs the global subscriber with `default_directive` unless `RUST_LOG` is set.
pub fn try_init(default_directive: &str) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let span_events = if wants_span_timing(&env_filter) {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}

// span close events carry per-step timings; emitted at debug or trace only
fn wants_span_timing(filter: &EnvFilter) -> bool {
    let directive = filter.to_string();
    directive.contains("debug")
        || directive.contains("trace")
        || std::env::var("RUST_LOG").unwrap_or_default().contains("debug")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let _ = try_init("warn");
        assert!(try_init("warn").is_err());
    }
}
