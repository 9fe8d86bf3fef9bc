//! M/M/c Queue Simulator
//!
//! Advances a pool of identical servers and one FCFS queue in unit ticks.
//! Arrivals are Poisson per tick, service times exponential rounded to whole
//! ticks. The engine records queue length and busy-server count per tick and
//! the wait time of every assignment, then derives summary statistics.
//!
//! ```no_run
//! use mmc_sim::{SimConfig, SimulationEngine};
//!
//! let config = SimConfig::new(2, 0.8, 2.0).with_seed(7);
//! let mut engine = SimulationEngine::new(config)?;
//! engine.run(2000);
//! println!("{:?}", engine.summary_map());
//! # Ok::<(), mmc_sim::SimError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod queue;
pub mod server;
pub mod task;
pub mod workload;

pub use config::SimConfig;
pub use engine::SimulationEngine;
pub use error::SimError;
pub use metrics::History;
pub use queue::TaskQueue;
pub use server::{Server, ServerState};
pub use task::{Task, TaskId};
pub use workload::{PoissonWorkload, ScriptedWorkload, Workload};

pub use queue_telemetry::{RunSummary, TickSample, TickWindow};
