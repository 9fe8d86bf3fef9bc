//! Single-run simulator
//!
//! Runs one M/M/c simulation, prints the stability prediction and summary,
//! and optionally exports the history for plotting.

use clap::Parser;
use mmc_sim::logging::init_logging;
use mmc_sim::{RunSummary, SimConfig, SimError, SimulationEngine, TickWindow};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Run a tick-stepped M/M/c queue simulation")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of servers in the pool
    #[arg(short = 'c', long)]
    servers: Option<usize>,

    /// Mean arrivals per tick
    #[arg(short, long)]
    lambda: Option<f64>,

    /// Mean service time in ticks
    #[arg(short = 's', long)]
    service_time: Option<f64>,

    /// Ticks to simulate
    #[arg(short, long)]
    duration: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Write per-tick queue length and busy servers as CSV
    #[arg(long)]
    history_csv: Option<PathBuf>,

    /// Write wait times as CSV
    #[arg(long)]
    wait_csv: Option<PathBuf>,

    /// Write the summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Log a rolling-window progress line every N ticks (0 disables)
    #[arg(long, default_value_t = 0)]
    progress_every: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn resolve_config(&self) -> Result<SimConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_json_file(path)?,
            None => SimConfig::default(),
        };
        if let Some(servers) = self.servers {
            config.num_servers = servers;
        }
        if let Some(lambda) = self.lambda {
            config.arrival_lambda = lambda;
        }
        if let Some(service_time) = self.service_time {
            config.avg_service_time = service_time;
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let config = args.resolve_config()?;
    print_parameters(&config);

    let mut engine = SimulationEngine::new(config.clone())?;
    if args.progress_every > 0 {
        let mut window = TickWindow::new(args.progress_every as usize, args.progress_every);
        engine.run_with_observer(config.duration, |sample| {
            window.push(*sample);
            if let Some(stats) = window.emit() {
                info!(
                    tick = stats.end_tick,
                    mean_queue_length = stats.mean_queue_length,
                    max_queue_length = stats.max_queue_length,
                    mean_busy_servers = stats.mean_busy_servers,
                    "progress"
                );
            }
        });
    } else {
        engine.run(config.duration);
    }

    let summary = engine.summary();
    print_summary(&summary, &engine.history().server_utilization());

    if let Some(path) = &args.history_csv {
        let writer = BufWriter::new(File::create(path)?);
        queue_telemetry::write_samples_csv(writer, engine.history().samples())?;
        println!("History written to {}", path.display());
    }
    if let Some(path) = &args.wait_csv {
        let writer = BufWriter::new(File::create(path)?);
        queue_telemetry::write_wait_times_csv(writer, &engine.history().wait_times)?;
        println!("Wait times written to {}", path.display());
    }
    if let Some(path) = &args.summary_json {
        let writer = BufWriter::new(File::create(path)?);
        queue_telemetry::write_summary_json(writer, &summary)?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

fn print_parameters(config: &SimConfig) {
    println!("=== System Parameters ===");
    println!("Servers: {}", config.num_servers);
    println!("Arrival rate (lambda): {:.3} tasks/tick", config.arrival_lambda);
    println!("Mean service time: {:.3} ticks", config.avg_service_time);
    println!("Duration: {} ticks (seed {})", config.duration, config.seed);
    println!("Traffic intensity (rho): {:.3}", config.traffic_intensity());
    if config.is_stable() {
        println!("Prediction: STABLE, the queue should remain bounded.");
    } else {
        println!("Prediction: UNSTABLE, the queue is expected to grow without bound.");
    }
    println!("{:-<40}", "");
}

fn print_summary(summary: &RunSummary, per_server: &[f64]) {
    println!("\n=== Simulation Summary ===");
    println!("Tasks arrived: {}", summary.tasks_arrived);
    println!("Tasks completed: {}", summary.tasks_completed);
    println!("Tasks finished service: {}", summary.tasks_finished);
    println!("Average wait time: {:.2} ticks", summary.average_wait_time);
    println!(
        "Wait time p50/p95/p99: {:.0} / {:.0} / {:.0} ticks (max {})",
        summary.p50_wait_time, summary.p95_wait_time, summary.p99_wait_time, summary.max_wait_time
    );
    println!(
        "Queue length: mean {:.2}, max {}",
        summary.mean_queue_length, summary.max_queue_length
    );
    println!("Pool utilization: {:.2}%", summary.pool_utilization * 100.0);
    for (i, utilization) in per_server.iter().enumerate() {
        println!("  server {:<3} {:>6.2}%", i, utilization * 100.0);
    }
    println!("{:-<40}", "");
}
