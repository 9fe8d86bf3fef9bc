//! Tick-stepped multi-server queue simulator

use crate::config::SimConfig;
use crate::error::SimError;
use crate::metrics::History;
use crate::queue::TaskQueue;
use crate::server::Server;
use crate::task::{Task, TaskId};
use crate::workload::{PoissonWorkload, Workload};
use queue_telemetry::{RunSummary, TickSample};
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// Multi-server FCFS queue advanced one tick at a time.
///
/// Each tick runs four phases in a fixed order: arrivals are enqueued,
/// every server is advanced, idle servers take tasks from the head of the
/// queue (lowest index first), and the tick's metrics are recorded. A server
/// that finishes on a tick can therefore take a task that arrived on that
/// same tick.
pub struct SimulationEngine<W: Workload = PoissonWorkload> {
    config: SimConfig,
    servers: Vec<Server>,
    queue: TaskQueue,
    workload: W,
    history: History,
    current_tick: u64,
    next_task_id: u64,
    tasks_finished: u64,
}

impl SimulationEngine<PoissonWorkload> {
    /// Engine with Poisson arrivals and exponential service seeded from `config.seed`
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let workload =
            PoissonWorkload::seeded(config.arrival_lambda, config.avg_service_time, config.seed)?;
        Self::with_workload(config, workload)
    }
}

impl<W: Workload> SimulationEngine<W> {
    pub fn with_workload(config: SimConfig, workload: W) -> Result<Self, SimError> {
        config.validate()?;

        let servers = (0..config.num_servers).map(Server::new).collect();
        let history = History::new(config.num_servers);

        Ok(Self {
            config,
            servers,
            queue: TaskQueue::new(),
            workload,
            history,
            current_tick: 0,
            next_task_id: 0,
            tasks_finished: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Tick the next `step` will execute; equals the number of ticks run so far
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn tasks_arrived(&self) -> u64 {
        self.next_task_id
    }

    pub fn tasks_in_service(&self) -> usize {
        self.servers.iter().filter(|s| s.is_busy()).count()
    }

    /// Tasks whose service has fully completed
    pub fn tasks_finished(&self) -> u64 {
        self.tasks_finished
    }

    /// Enqueue a task created at the current tick, bypassing the workload
    pub fn inject_task(&mut self, processing_time: u32) -> TaskId {
        let tick = self.current_tick;
        self.enqueue(tick, processing_time)
    }

    /// Run `duration` more ticks, continuing from the current state
    pub fn run(&mut self, duration: u64) {
        self.run_with_observer(duration, |_| {});
    }

    /// Run `duration` more ticks, handing each tick's sample to `observer`
    pub fn run_with_observer<F>(&mut self, duration: u64, mut observer: F)
    where
        F: FnMut(&TickSample),
    {
        info!(
            num_servers = self.config.num_servers,
            arrival_lambda = self.config.arrival_lambda,
            avg_service_time = self.config.avg_service_time,
            start_tick = self.current_tick,
            duration,
            "starting simulation"
        );

        for _ in 0..duration {
            let sample = self.step();
            observer(&sample);
        }

        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            tasks_arrived = summary.tasks_arrived,
            tasks_completed = summary.tasks_completed,
            average_wait_time = summary.average_wait_time,
            pool_utilization = summary.pool_utilization,
            "simulation finished"
        );
    }

    /// Execute exactly one tick
    pub fn step(&mut self) -> TickSample {
        let tick = self.current_tick;

        self.handle_arrivals(tick);
        self.tick_servers();
        self.assign_tasks(tick);
        let sample = self.collect_metrics(tick);

        debug_assert!(self.check_conservation(), "task conservation violated at tick {tick}");
        self.current_tick += 1;
        sample
    }

    /// arrived = queued + in service + finished
    pub fn check_conservation(&self) -> bool {
        let accounted =
            self.queue.len() as u64 + self.tasks_in_service() as u64 + self.tasks_finished;
        accounted == self.next_task_id
    }

    pub fn summary(&self) -> RunSummary {
        self.history.summary(self.tasks_arrived(), self.tasks_finished)
    }

    /// "tasks completed", "average wait time" and "pool utilization"
    pub fn summary_map(&self) -> BTreeMap<String, f64> {
        self.history.summary_map()
    }

    fn enqueue(&mut self, tick: u64, processing_time: u32) -> TaskId {
        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        self.queue.push_back(Task::new(id, tick, processing_time));
        id
    }

    fn handle_arrivals(&mut self, tick: u64) {
        let num_arrivals = self.workload.arrivals(tick);
        for _ in 0..num_arrivals {
            let processing_time = self.workload.processing_time(tick);
            self.enqueue(tick, processing_time);
        }
    }

    fn tick_servers(&mut self) {
        for server in &mut self.servers {
            if let Some(task) = server.tick() {
                trace!(server = server.id(), task = task.id().0, "task finished");
                self.tasks_finished += 1;
            }
        }
    }

    fn assign_tasks(&mut self, tick: u64) {
        for server in &mut self.servers {
            if server.is_busy() {
                continue;
            }
            let Some(task) = self.queue.pop_front() else {
                break;
            };

            let wait_time = tick - task.creation_time();
            self.history.record_wait(wait_time);
            debug!(
                tick,
                server = server.id(),
                task = task.id().0,
                wait_time,
                processing_time = task.processing_time(),
                "task assigned"
            );
            server.start_new_task(task);
        }
    }

    fn collect_metrics(&mut self, tick: u64) -> TickSample {
        let mut busy_servers = 0;
        for server in &self.servers {
            if server.is_busy() {
                self.history.record_server_busy(server.id());
                busy_servers += 1;
            }
        }
        let queue_length = self.queue.len();
        self.history.record_tick(queue_length, busy_servers);

        trace!(tick, queue_length, busy_servers, "tick recorded");
        TickSample {
            tick,
            queue_length,
            busy_servers,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn every_tick_respects_invariants(
            num_servers in 0usize..5,
            arrival_lambda in 0.0f64..3.0,
            avg_service_time in 0.2f64..6.0,
            duration in 0u64..300,
            seed in any::<u64>(),
        ) {
            let config =
                SimConfig::new(num_servers, arrival_lambda, avg_service_time).with_seed(seed);
            let mut engine = SimulationEngine::new(config).unwrap();
            let mut last_creation = 0u64;

            for _ in 0..duration {
                let assigned_before = engine.history().wait_times.len();
                let sample = engine.step();

                prop_assert!(engine.check_conservation());
                let accounted = sample.queue_length as u64
                    + sample.busy_servers as u64
                    + engine.tasks_finished();
                prop_assert_eq!(accounted, engine.tasks_arrived());
                prop_assert!(sample.busy_servers <= num_servers);

                // assignments leave the queue in creation order
                for &wait in &engine.history().wait_times[assigned_before..] {
                    prop_assert!(wait <= sample.tick);
                    let creation = sample.tick - wait;
                    prop_assert!(creation >= last_creation);
                    last_creation = creation;
                }
                let newest_in_service = engine.servers().iter()
                    .filter_map(|s| s.current_task().map(Task::id))
                    .max();
                if let (Some(head), Some(newest)) = (engine.queue().front(), newest_in_service) {
                    prop_assert!(head.id() > newest);
                }
                for server in engine.servers() {
                    if let Some(task) = server.current_task() {
                        prop_assert!(task.processing_time() >= 1);
                        prop_assert!(server.remaining_time() >= 1);
                    }
                }
            }

            let summary = engine.summary();
            prop_assert!((0.0..=1.0).contains(&summary.pool_utilization));
            prop_assert_eq!(summary.ticks, duration);
            if num_servers == 0 {
                prop_assert_eq!(summary.tasks_completed, 0);
            }
        }

        #[test]
        fn fixed_seed_is_reproducible(
            num_servers in 1usize..4,
            arrival_lambda in 0.0f64..2.0,
            seed in any::<u64>(),
        ) {
            let config = SimConfig::new(num_servers, arrival_lambda, 2.0).with_seed(seed);
            let mut a = SimulationEngine::new(config.clone()).unwrap();
            let mut b = SimulationEngine::new(config).unwrap();
            a.run(200);
            b.run(200);
            prop_assert_eq!(&a.history().queue_length, &b.history().queue_length);
            prop_assert_eq!(&a.history().busy_servers, &b.history().busy_servers);
            prop_assert_eq!(&a.history().wait_times, &b.history().wait_times);
        }
    }
}
