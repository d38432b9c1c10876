//! Structured logging configuration.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! forwards those records as well.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Levels are configurable via the RUST_LOG env var.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Log a finished generation run
///
/// # Arguments
///
/// * `championship_id` - Championship the tree belongs to
/// * `rounds` - Number of rounds stored
/// * `duration_ms` - Duration in milliseconds
pub fn log_generation(championship_id: i64, rounds: usize, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            championship_id = championship_id,
            rounds = rounds,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow tree generation"
        );
    } else {
        tracing::info!(
            championship_id = championship_id,
            rounds = rounds,
            duration_ms = duration_ms,
            "Tree generated"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_generation() {
        // Just ensure it doesn't panic
        log_generation(1, 8, 40);
        log_generation(2, 64, 2500);
    }
}
