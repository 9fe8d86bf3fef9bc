//! Error types for simulation setup and reporting

use thiserror::Error;

/// Top-level error type for simulator operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid average service time {0}: must be finite and greater than zero")]
    InvalidServiceTime(f64),

    #[error("invalid arrival rate {0}: must be finite and non-negative")]
    InvalidArrivalRate(f64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export failed: {0}")]
    Export(#[from] queue_telemetry::ExportError),
}
