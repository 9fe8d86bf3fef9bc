//! Run history and the statistics derived from it

use queue_telemetry::{RunSummary, TickSample};
use std::collections::BTreeMap;

/// Per-tick series plus per-assignment wait times
#[derive(Debug, Clone, Default)]
pub struct History {
    pub queue_length: Vec<usize>,
    pub busy_servers: Vec<usize>,
    pub wait_times: Vec<u64>,       // assignment order
    pub server_busy_ticks: Vec<u64>, // indexed by server
}

impl History {
    pub fn new(num_servers: usize) -> Self {
        Self {
            server_busy_ticks: vec![0; num_servers],
            ..Self::default()
        }
    }

    pub fn record_wait(&mut self, wait_time: u64) {
        self.wait_times.push(wait_time);
    }

    pub fn record_tick(&mut self, queue_length: usize, busy_servers: usize) {
        self.queue_length.push(queue_length);
        self.busy_servers.push(busy_servers);
    }

    pub fn record_server_busy(&mut self, server: usize) {
        self.server_busy_ticks[server] += 1;
    }

    /// Ticks recorded so far
    pub fn ticks(&self) -> usize {
        self.queue_length.len()
    }

    pub fn samples(&self) -> impl Iterator<Item = TickSample> + '_ {
        self.queue_length
            .iter()
            .zip(&self.busy_servers)
            .enumerate()
            .map(|(tick, (&queue_length, &busy_servers))| TickSample {
                tick: tick as u64,
                queue_length,
                busy_servers,
            })
    }

    /// Number of recorded wait times, one per assignment
    pub fn tasks_completed(&self) -> usize {
        self.wait_times.len()
    }

    pub fn average_wait_time(&self) -> f64 {
        if self.wait_times.is_empty() {
            return 0.0;
        }
        self.wait_times.iter().sum::<u64>() as f64 / self.wait_times.len() as f64
    }

    /// Busy server-ticks over available server-ticks
    pub fn pool_utilization(&self) -> f64 {
        let available = self.server_busy_ticks.len() as u64 * self.ticks() as u64;
        if available == 0 {
            return 0.0;
        }
        let busy: u64 = self.busy_servers.iter().map(|&b| b as u64).sum();
        busy as f64 / available as f64
    }

    /// Busy fraction of each server, by index
    pub fn server_utilization(&self) -> Vec<f64> {
        let ticks = self.ticks();
        self.server_busy_ticks
            .iter()
            .map(|&busy| if ticks == 0 { 0.0 } else { busy as f64 / ticks as f64 })
            .collect()
    }

    pub fn p50_wait_time(&self) -> f64 {
        self.percentile_wait(0.50)
    }

    pub fn p95_wait_time(&self) -> f64 {
        self.percentile_wait(0.95)
    }

    pub fn p99_wait_time(&self) -> f64 {
        self.percentile_wait(0.99)
    }

    fn percentile_wait(&self, p: f64) -> f64 {
        if self.wait_times.is_empty() {
            return 0.0;
        }
        let mut sorted = self.wait_times.clone();
        sorted.sort_unstable();
        let idx = ((sorted.len() as f64) * p).floor() as usize;
        sorted[idx.min(sorted.len() - 1)] as f64
    }

    pub fn mean_queue_length(&self) -> f64 {
        if self.queue_length.is_empty() {
            return 0.0;
        }
        self.queue_length.iter().sum::<usize>() as f64 / self.queue_length.len() as f64
    }

    pub fn summary(&self, tasks_arrived: u64, tasks_finished: u64) -> RunSummary {
        RunSummary {
            tasks_completed: self.tasks_completed(),
            average_wait_time: self.average_wait_time(),
            pool_utilization: self.pool_utilization(),
            tasks_arrived,
            tasks_finished,
            p50_wait_time: self.p50_wait_time(),
            p95_wait_time: self.p95_wait_time(),
            p99_wait_time: self.p99_wait_time(),
            max_wait_time: self.wait_times.iter().copied().max().unwrap_or(0),
            mean_queue_length: self.mean_queue_length(),
            max_queue_length: self.queue_length.iter().copied().max().unwrap_or(0),
            ticks: self.ticks() as u64,
        }
    }

    /// The three core statistics keyed by their report names
    pub fn summary_map(&self) -> BTreeMap<String, f64> {
        let values = [
            self.tasks_completed() as f64,
            self.average_wait_time(),
            self.pool_utilization(),
        ];
        RunSummary::CORE_KEYS
            .iter()
            .zip(values)
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_defaults() {
        let history = History::new(3);
        assert_eq!(history.tasks_completed(), 0);
        assert_eq!(history.average_wait_time(), 0.0);
        assert_eq!(history.pool_utilization(), 0.0);
        assert_eq!(history.p99_wait_time(), 0.0);
        assert_eq!(history.server_utilization(), vec![0.0; 3]);

        let summary = history.summary(0, 0);
        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.max_queue_length, 0);
    }

    #[test]
    fn test_zero_servers_utilization() {
        let mut history = History::new(0);
        history.record_tick(4, 0);
        assert_eq!(history.pool_utilization(), 0.0);
    }

    #[test]
    fn test_derived_statistics() {
        let mut history = History::new(2);
        for (queue, busy) in [(0, 1), (2, 2), (1, 2), (0, 1)] {
            history.record_tick(queue, busy);
        }
        for wait in [0, 4, 2, 0] {
            history.record_wait(wait);
        }

        assert_eq!(history.tasks_completed(), 4);
        assert!((history.average_wait_time() - 1.5).abs() < 1e-12);
        // 6 busy server-ticks out of 8
        assert!((history.pool_utilization() - 0.75).abs() < 1e-12);
        assert_eq!(history.p50_wait_time(), 2.0);
        assert_eq!(history.p99_wait_time(), 4.0);
        assert!((history.mean_queue_length() - 0.75).abs() < 1e-12);

        let samples: Vec<TickSample> = history.samples().collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(
            samples[1],
            TickSample {
                tick: 1,
                queue_length: 2,
                busy_servers: 2,
            }
        );
    }

    #[test]
    fn test_summary_map_keys() {
        let mut history = History::new(1);
        history.record_tick(0, 1);
        history.record_wait(3);

        let map = history.summary_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["tasks completed"], 1.0);
        assert_eq!(map["average wait time"], 3.0);
        assert_eq!(map["pool utilization"], 1.0);
    }

    #[test]
    fn test_server_utilization() {
        let mut history = History::new(2);
        history.record_tick(0, 1);
        history.record_server_busy(0);
        history.record_tick(0, 0);
        assert_eq!(history.server_utilization(), vec![0.5, 0.0]);
    }
}
