//! Log output for the runner binaries
//!
//! The library only emits `tracing` events. Binaries call [`init_logging`]
//! once; `RUST_LOG` overrides the level passed in.
//!
//! - INFO: run start and finish with parameters and headline statistics
//! - DEBUG: each task assignment
//! - TRACE: each tick and each completion

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber filtered to `level` for the simulator crates
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mmc_sim={level},queue_telemetry={level},simulate={level},sweep={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}
