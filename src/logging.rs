//! `tracing` subscriber setup for the onesub binary.
//!
//! Filter comes from `RUST_LOG` (default `onesub=info`); set
//! `RUST_LOG_FORMAT=json` for JSON lines. Output always goes to stderr so the
//! subtitle document can be piped from stdout.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "onesub=info";

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let is_json = std::env::var("RUST_LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if is_json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::{init, init_with_default};

    #[test]
    fn init_is_idempotent() {
        init();
        init_with_default("onesub=debug");
    }
}
