//! Results for reliability experiments

use nr_rust::ReliabilityReport;

/// One step of a sweep
#[derive(Debug, Clone)]
pub struct SweepPoint {
    /// Step number (1-based)
    pub step: usize,

    /// What changed so far, e.g. "demand +30"
    pub label: String,

    /// Trial counts at this step
    pub report: ReliabilityReport,
}

/// A named series of sweep points
#[derive(Debug, Clone, Default)]
pub struct Sweep {
    pub name: String,
    pub points: Vec<SweepPoint>,
}

impl Sweep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn ratios(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.report.ratio()).collect()
    }

    fn print(&self) {
        println!("{}:", self.name);
        println!(
            "  {:>4}  {:<18} {:>11} {:>9} {:>10} {:>7} {:>12}",
            "step", "change", "reliability", "reliable", "overloaded", "delay", "disconnected"
        );
        println!("  {}", "-".repeat(80));
        for point in &self.points {
            let report = &point.report;
            println!(
                "  {:>4}  {:<18} {:>11.3} {:>9} {:>10} {:>7} {:>12}",
                point.step,
                point.label,
                report.ratio(),
                report.reliable,
                report.overloaded,
                report.delay_exceeded,
                report.disconnected
            );
        }
        println!();
    }
}

/// Experiment result
#[derive(Debug)]
pub struct ExperimentResult {
    /// Seed used for the experiment
    pub seed_used: [u8; 32],

    /// Nodes and edges of the base topology
    pub base_topology: (usize, usize),

    /// Mean edge capacity of the base topology
    pub base_mean_capacity: f64,

    /// Reliability at the unmodified starting point
    pub baseline: ReliabilityReport,

    /// Rising demand
    pub demand_sweep: Sweep,

    /// Rising capacity
    pub capacity_sweep: Sweep,

    /// Growing topology
    pub topology_sweep: Sweep,
}

impl ExperimentResult {
    /// Print a summary of the experiment results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Network Reliability Results                     ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Seed: {}", seed_hex(&self.seed_used));
        println!(
            "  Topology: {} nodes, {} edges",
            self.base_topology.0, self.base_topology.1
        );
        println!("  Mean capacity: {:.0}", self.base_mean_capacity);
        println!(
            "  Baseline reliability: {:.3} ({} trials)\n",
            self.baseline.ratio(),
            self.baseline.trials
        );

        self.demand_sweep.print();
        self.capacity_sweep.print();
        self.topology_sweep.print();
    }
}

/// Seed as a hex string accepted by `--seed`
pub fn seed_hex(seed: &[u8; 32]) -> String {
    let mut hex = String::from("0x");
    for byte in seed {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_hex() {
        let mut seed = [0u8; 32];
        seed[0] = 0xab;
        seed[31] = 0x01;
        let hex = seed_hex(&seed);
        assert!(hex.starts_with("0xab00"));
        assert!(hex.ends_with("01"));
        assert_eq!(hex.len(), 66);
    }
}
