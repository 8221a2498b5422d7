// Scenario Runner - Load and execute reliability experiment YAML files
//
// Usage:
//   cargo run --bin scenario_runner simulator/scenarios/campus_baseline.yaml
//   cargo run --bin scenario_runner simulator/scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner simulator/scenarios/ring_fragile.yaml --seed 0x1234...

mod experiments;

use experiments::config::{ExperimentConfig, TopologySpec};
use experiments::runner::ExperimentRunner;
use experiments::stats::seed_hex;
use simple_logger::SimpleLogger;
use std::env;
use std::fs;
use std::path::Path;

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    meta: ScenarioMeta,

    /// Experiment configuration (missing fields take their defaults)
    #[serde(default)]
    config: ExperimentConfig,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScenarioMeta {
    name: Option<String>,
    description: Option<String>,
    hypothesis: Option<String>,
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} simulator/scenarios/campus_baseline.yaml", args[0]);
        eprintln!("  {} simulator/scenarios/", args[0]);
        eprintln!("  {} simulator/scenarios/campus_baseline.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    let seed: Option<[u8; 32]> = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3]))
    } else {
        None
    };

    if path.is_file() {
        run_scenario_file(path, seed);
    } else if path.is_dir() {
        run_scenario_directory(path, seed);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<[u8; 32]>) {
    let mut scenarios = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  SCENARIO RUNNER - Multiple Scenarios                  ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All scenarios complete!                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) {
    println!("Loading scenario from: {}", path.display());

    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let scenario: ScenarioFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    println!("\n╔════════════════════════════════════════════════════════╗");
    match scenario.meta.name {
        Some(ref name) => {
            println!("║  {}{}", name, " ".repeat(54_usize.saturating_sub(name.len())));
        }
        None => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unnamed");
            println!("║  Scenario: {}", stem);
        }
    }
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc.trim_end());
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    let mut config = scenario.config;
    config.seed = seed;

    let topology = match &config.topology {
        TopologySpec::Campus => "campus".to_string(),
        TopologySpec::Ring { nodes } => format!("ring of {}", nodes),
        TopologySpec::Custom { nodes, edges } => {
            format!("custom ({} nodes, {} edges)", nodes, edges.len())
        }
    };

    println!("Configuration:");
    println!("  Topology: {}", topology);
    println!(
        "  Capacity range: {:.0}..{:.0}",
        config.capacity_range.0, config.capacity_range.1
    );
    println!("  Packet size: {}", config.packet_size);
    println!("  Survival probability: {}", config.survival_probability);
    println!("  Max delay: {}", config.simulation.max_delay);
    println!("  Trials: {} x {} steps", config.trials, config.steps);
    if let Some(ref s) = config.seed {
        println!("  Seed: {}", seed_hex(s));
    }
    println!("\nStarting experiment...\n");

    let result = ExperimentRunner::new(config).run().unwrap_or_else(|e| {
        eprintln!("Experiment {} failed: {}", path.display(), e);
        std::process::exit(1);
    });

    result.print_summary();

    println!("\n✓ Scenario complete!\n");
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let parsed = std::str::from_utf8(chunk)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok());
        seed[i] = parsed.unwrap_or_else(|| {
            eprintln!("Invalid hex seed: {}", hex);
            std::process::exit(1);
        });
    }

    seed
}
