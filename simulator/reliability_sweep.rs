//! Reliability Sweep Example
//!
//! Run with: cargo run --release --example reliability_sweep

mod experiments;

use experiments::config::{ExperimentConfig, SweepConfig, TopologySpec};
use experiments::runner::ExperimentRunner;
use log::info;
use nr_rust::{PathMetric, SimulationConfig};
use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new().init().unwrap();

    println!("╔════════════════════════════════════════════════════════╗");
    println!("║        Network Reliability Sweep                       ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    info!("Setting up reliability experiment...");

    let config = ExperimentConfig {
        seed: None, // Will be auto-generated
        topology: TopologySpec::Campus,
        capacity_range: (7_000_000.0, 10_000_000.0),
        packet_size: 1500.0,
        survival_probability: 0.9,
        trials: 100,
        steps: 10,

        simulation: SimulationConfig {
            max_delay: 0.1,
            demand_range: (1, 10),
            path_metric: PathMetric::Hops,
        },

        sweeps: SweepConfig {
            demand_increment: 10,
            capacity_percent: 10.0,
            edges_per_step: 2,
        },
    };

    info!("Configuration:");
    info!("  Topology: {:?}", config.topology);
    info!("  Survival probability: {}", config.survival_probability);
    info!("  Trials per step: {}", config.trials);
    info!("  Steps per sweep: {}", config.steps);
    info!("");

    info!("Starting sweeps...");

    match ExperimentRunner::new(config).run() {
        Ok(result) => {
            result.print_summary();
            info!("✓ Sweeps complete!");
        }
        Err(e) => {
            eprintln!("Experiment failed: {}", e);
            std::process::exit(1);
        }
    }
}
