//! Tracing setup for unit and integration tests.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{filter::filter_fn, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Directives used when `RUST_LOG` is unset or does not parse.
const DEFAULT_DIRECTIVES: &str = "twintree=debug";

/// Targets too chatty to be useful in test output.
const QUIET_TARGETS: &[&str] = &["rayon_core"];

static INIT: Once = Once::new();

/// Installs a fmt subscriber for the test binary, once.
///
/// Filtering follows `RUST_LOG` and falls back to `twintree=debug`. Spans
/// are logged on enter and on close. Output goes through the test writer,
/// so it is captured per test.
pub fn init_test_setup() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
        let quiet = filter_fn(|metadata| {
            !QUIET_TARGETS
                .iter()
                .any(|target| metadata.target().starts_with(target))
        });

        let layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
            .with_filter(quiet)
            .with_filter(env_filter);

        match tracing_subscriber::registry().with(layer).try_init() {
            Ok(()) => debug!("test tracing installed"),
            Err(e) => eprintln!("tracing subscriber not installed: {e}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_init_test_setup_then_installs_once() {
        init_test_setup();
        init_test_setup();
        assert!(INIT.is_completed());
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn given_any_environment_when_init_test_setup_then_rust_log_untouched() {
        let before = std::env::var("RUST_LOG").ok();
        init_test_setup();
        assert_eq!(std::env::var("RUST_LOG").ok(), before);
    }

    #[test]
    fn given_default_directives_when_parsed_then_valid() {
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
    }
}
