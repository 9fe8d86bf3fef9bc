//! Queue Telemetry Schema v1
//!
//! Per-tick samples, run summaries, rolling windows and export helpers
//! shared by the queueing simulator and its reporting tools.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Write;
use thiserror::Error;

/// State of the system at the end of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSample {
    pub tick: u64,
    pub queue_length: usize,   // tasks waiting after assignment
    pub busy_servers: usize,   // servers holding a task
}

/// Summary statistics for a completed run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(rename = "tasks completed")]
    pub tasks_completed: usize,
    #[serde(rename = "average wait time")]
    pub average_wait_time: f64,
    #[serde(rename = "pool utilization")]
    pub pool_utilization: f64,
    #[serde(rename = "tasks arrived")]
    pub tasks_arrived: u64,
    #[serde(rename = "tasks finished")]
    pub tasks_finished: u64,
    #[serde(rename = "p50 wait time")]
    pub p50_wait_time: f64,
    #[serde(rename = "p95 wait time")]
    pub p95_wait_time: f64,
    #[serde(rename = "p99 wait time")]
    pub p99_wait_time: f64,
    #[serde(rename = "max wait time")]
    pub max_wait_time: u64,
    #[serde(rename = "mean queue length")]
    pub mean_queue_length: f64,
    #[serde(rename = "max queue length")]
    pub max_queue_length: usize,
    pub ticks: u64,
}

impl RunSummary {
    /// Keys of the core statistics, in reporting order
    pub const CORE_KEYS: [&'static str; 3] =
        ["tasks completed", "average wait time", "pool utilization"];
}

/// Aggregate over the most recent ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub end_tick: u64,
    pub ticks: usize,
    pub mean_queue_length: f64,
    pub max_queue_length: usize,
    pub mean_busy_servers: f64,
}

const MAX_PREALLOC: usize = 1024;

/// Rolling window over tick samples.
///
/// Keeps at most `window_ticks` samples and emits an aggregate every
/// `step_ticks` ticks. Memory stays bounded regardless of run length.
#[derive(Debug)]
pub struct TickWindow {
    window_ticks: usize,
    step_ticks: u64,
    samples: VecDeque<TickSample>,
    last_emit_tick: Option<u64>,
}

impl TickWindow {
    pub fn new(window_ticks: usize, step_ticks: u64) -> Self {
        Self {
            window_ticks: window_ticks.max(1),
            step_ticks: step_ticks.max(1),
            samples: VecDeque::with_capacity(window_ticks.clamp(1, MAX_PREALLOC)),
            last_emit_tick: None,
        }
    }

    /// Add a sample, evicting the oldest once the window is full
    pub fn push(&mut self, sample: TickSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.window_ticks {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check if a new aggregate is due
    pub fn should_emit(&self) -> bool {
        let Some(latest) = self.samples.back() else {
            return false;
        };
        match self.last_emit_tick {
            None => latest.tick.saturating_add(1) >= self.step_ticks,
            Some(last) => latest.tick >= last.saturating_add(self.step_ticks),
        }
    }

    /// Emit the current aggregate if one is due
    pub fn emit(&mut self) -> Option<WindowStats> {
        if !self.should_emit() {
            return None;
        }
        let stats = self.stats()?;
        self.last_emit_tick = Some(stats.end_tick);
        Some(stats)
    }

    /// Aggregate the samples currently held, ignoring the emit schedule
    pub fn stats(&self) -> Option<WindowStats> {
        let latest = self.samples.back()?;
        let n = self.samples.len() as f64;
        let queue_sum: usize = self.samples.iter().map(|s| s.queue_length).sum();
        let busy_sum: usize = self.samples.iter().map(|s| s.busy_servers).sum();
        let max_queue = self.samples.iter().map(|s| s.queue_length).max().unwrap_or(0);

        Some(WindowStats {
            end_tick: latest.tick,
            ticks: self.samples.len(),
            mean_queue_length: queue_sum as f64 / n,
            max_queue_length: max_queue,
            mean_busy_servers: busy_sum as f64 / n,
        })
    }
}

/// Export failures
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write tick samples as CSV with a `tick,queue_length,busy_servers` header
pub fn write_samples_csv<W, I>(writer: W, samples: I) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = TickSample>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    let mut wrote_any = false;
    for sample in samples {
        wtr.serialize(sample)?;
        wrote_any = true;
    }
    // serialize() only emits the header alongside the first row
    if !wrote_any {
        wtr.write_record(["tick", "queue_length", "busy_servers"])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write wait times as CSV, one row per assignment in assignment order
pub fn write_wait_times_csv<W: Write>(writer: W, wait_times: &[u64]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["assignment", "wait_time"])?;
    for (i, wait) in wait_times.iter().enumerate() {
        wtr.write_record([i.to_string(), wait.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a summary as pretty-printed JSON
pub fn write_summary_json<W: Write>(
    mut writer: W,
    summary: &RunSummary,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    Ok(())
}
