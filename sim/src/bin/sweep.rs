//! Pool Size Sweep
//!
//! Runs the same workload across several pool sizes and reports the
//! smallest pool reaching the lowest p95 wait time.

use clap::Parser;
use mmc_sim::logging::init_logging;
use mmc_sim::{RunSummary, SimConfig, SimError, SimulationEngine};

#[derive(Parser, Debug)]
#[command(name = "sweep", about = "Compare M/M/c pool sizes on one workload")]
struct Args {
    /// Pool sizes to try
    #[arg(
        short = 'c',
        long,
        value_delimiter = ',',
        default_values_t = [1usize, 2, 4, 8, 16]
    )]
    servers: Vec<usize>,

    /// Mean arrivals per tick
    #[arg(short, long, default_value_t = 0.8)]
    lambda: f64,

    /// Mean service time in ticks
    #[arg(short = 's', long, default_value_t = 2.0)]
    service_time: f64,

    /// Ticks per run
    #[arg(short, long, default_value_t = 2000)]
    duration: u64,

    /// Seed shared by every run
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run_simulation(args: &Args, num_servers: usize) -> Result<(SimConfig, RunSummary), SimError> {
    let config = SimConfig::new(num_servers, args.lambda, args.service_time)
        .with_duration(args.duration)
        .with_seed(args.seed);
    let mut engine = SimulationEngine::new(config.clone())?;
    engine.run(config.duration);
    Ok((config, engine.summary()))
}

/// Smallest pool with the lowest p95 wait. Pools that completed no tasks have
/// no wait distribution and are never chosen.
fn best_pool(results: &[(usize, RunSummary)]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (n, summary) in results {
        if *n == 0 || summary.tasks_completed == 0 {
            continue;
        }
        if best.map_or(true, |(_, p95)| summary.p95_wait_time < p95) {
            best = Some((*n, summary.p95_wait_time));
        }
    }
    best
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = sweep(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn sweep(args: &Args) -> Result<(), SimError> {
    println!("=== Pool Size Sweep ===");
    println!(
        "Workload: lambda {} tasks/tick, {} ticks/task, {} ticks\n",
        args.lambda, args.service_time, args.duration
    );
    println!(
        "{:<10} {:>8} {:>10} {:>12} {:>10} {:>12} {:>12}",
        "Servers", "rho", "Completed", "Avg wait", "p95 wait", "Mean queue", "Utilization"
    );
    println!("{:-<80}", "");

    let mut servers = args.servers.clone();
    servers.sort_unstable();
    servers.dedup();

    let mut results = Vec::with_capacity(servers.len());
    for n in servers {
        let (config, summary) = run_simulation(args, n)?;

        println!(
            "{:<10} {:>8.3} {:>10} {:>12.2} {:>10.0} {:>12.2} {:>11.1}%",
            n,
            config.traffic_intensity(),
            summary.tasks_completed,
            summary.average_wait_time,
            summary.p95_wait_time,
            summary.mean_queue_length,
            summary.pool_utilization * 100.0
        );

        results.push((n, summary));
    }

    println!("\n=== Empirical Optimum ===");
    match best_pool(&results) {
        Some((n, p95)) => println!("Best pool: {} servers (p95 wait = {:.0} ticks)", n, p95),
        None => println!("No pool completed any tasks"),
    }
    Ok(())
}
