//! Experiment runner
//!
//! Builds the base topology, fills the demand matrix, then runs three sweeps
//! against the same simulation, restoring what the previous sweep changed:
//! 1. raise demand step by step (demand restored afterwards)
//! 2. raise capacities step by step (capacities restored afterwards)
//! 3. add random edges at the current mean capacity

use super::config::ExperimentConfig;
use super::stats::{ExperimentResult, Sweep, SweepPoint};
use super::topology;
use log::info;
use nr_rust::{NetworkSimulation, ReliabilityReport, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Reliability experiment runner
pub struct ExperimentRunner {
    config: ExperimentConfig,
    rng: StdRng,
    seed: [u8; 32],
}

impl ExperimentRunner {
    /// Create a new experiment runner
    pub fn new(config: ExperimentConfig) -> Self {
        let seed = config.resolve_seed();
        let rng = StdRng::from_seed(seed);

        Self { config, rng, seed }
    }

    /// Run all sweeps
    pub fn run(mut self) -> Result<ExperimentResult> {
        let graph = topology::build(
            &self.config.topology,
            self.config.capacity_range,
            &mut self.rng,
        )?;
        let nodes = graph.node_count();
        let base_topology = (nodes, graph.edge_count());

        let mut sim =
            NetworkSimulation::with_config(graph, nodes, self.config.simulation.clone())?;
        sim.populate_demand(&mut self.rng)?;
        let base_mean_capacity = sim.average_capacity();
        let total_demand = sim.demand().total()?;

        info!(
            "topology: {} nodes, {} edges, total demand {}",
            base_topology.0, base_topology.1, total_demand
        );

        let baseline = self.estimate(&sim)?;
        info!("baseline reliability: {:.3}", baseline.ratio());

        let demand_sweep = self.demand_sweep(&mut sim)?;
        let capacity_sweep = self.capacity_sweep(&mut sim)?;
        let topology_sweep = self.topology_sweep(&mut sim)?;

        Ok(ExperimentResult {
            seed_used: self.seed,
            base_topology,
            base_mean_capacity,
            baseline,
            demand_sweep,
            capacity_sweep,
            topology_sweep,
        })
    }

    fn estimate(&mut self, sim: &NetworkSimulation) -> Result<ReliabilityReport> {
        sim.reliability_report(
            self.config.survival_probability,
            self.config.packet_size,
            self.config.trials,
            &mut self.rng,
        )
    }

    fn demand_sweep(&mut self, sim: &mut NetworkSimulation) -> Result<Sweep> {
        let increment = self.config.sweeps.demand_increment;
        let saved = sim.demand().clone();
        let mut sweep = Sweep::new("Reliability vs demand");

        for step in 1..=self.config.steps {
            sim.increase_demand(increment);
            let report = self.estimate(sim)?;
            info!("demand step {}: {:.3}", step, report.ratio());
            sweep.points.push(SweepPoint {
                step,
                label: format!("demand +{}", increment * step as u64),
                report,
            });
        }

        sim.set_demand(saved)?;
        Ok(sweep)
    }

    fn capacity_sweep(&mut self, sim: &mut NetworkSimulation) -> Result<Sweep> {
        let percent = self.config.sweeps.capacity_percent;
        let saved = sim.capacity_snapshot();
        let base_mean = sim.average_capacity();
        let mut sweep = Sweep::new("Reliability vs capacity");

        for step in 1..=self.config.steps {
            sim.increase_capacities(percent)?;
            let report = self.estimate(sim)?;
            info!("capacity step {}: {:.3}", step, report.ratio());
            sweep.points.push(SweepPoint {
                step,
                label: format!("capacity x{:.2}", sim.average_capacity() / base_mean),
                report,
            });
        }

        sim.reset_capacities(&saved)?;
        Ok(sweep)
    }

    fn topology_sweep(&mut self, sim: &mut NetworkSimulation) -> Result<Sweep> {
        let per_step = self.config.sweeps.edges_per_step;
        let mut sweep = Sweep::new("Reliability vs topology changes");

        for step in 1..=self.config.steps {
            let mean_capacity = sim.average_capacity();
            sim.add_random_edges(per_step, mean_capacity, &mut self.rng)?;
            let report = self.estimate(sim)?;
            info!("topology step {}: {:.3}", step, report.ratio());
            sweep.points.push(SweepPoint {
                step,
                label: format!("edges +{}", per_step * step),
                report,
            });
        }

        Ok(sweep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::config::{SweepConfig, TopologySpec};

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            seed: Some([7u8; 32]),
            topology: TopologySpec::Ring { nodes: 6 },
            trials: 20,
            steps: 3,
            sweeps: SweepConfig {
                demand_increment: 5,
                capacity_percent: 20.0,
                edges_per_step: 1,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_run_produces_all_sweeps() {
        let result = ExperimentRunner::new(small_config()).run().unwrap();

        assert_eq!(result.seed_used, [7u8; 32]);
        assert_eq!(result.base_topology, (6, 6));
        assert_eq!(result.demand_sweep.points.len(), 3);
        assert_eq!(result.capacity_sweep.points.len(), 3);
        assert_eq!(result.topology_sweep.points.len(), 3);
        assert_eq!(result.topology_sweep.points[2].label, "edges +3");
        assert!(result
            .demand_sweep
            .ratios()
            .iter()
            .all(|r| (0.0..=1.0).contains(r)));
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let first = ExperimentRunner::new(small_config()).run().unwrap();
        let second = ExperimentRunner::new(small_config()).run().unwrap();

        assert_eq!(first.demand_sweep.ratios(), second.demand_sweep.ratios());
        assert_eq!(first.capacity_sweep.ratios(), second.capacity_sweep.ratios());
        assert_eq!(first.topology_sweep.ratios(), second.topology_sweep.ratios());
    }

    #[test]
    fn test_topology_sweep_fails_when_graph_fills_up() {
        let config = ExperimentConfig {
            steps: 20,
            ..small_config()
        };
        // a 6-ring only has 9 free pairs
        assert!(ExperimentRunner::new(config).run().is_err());
    }
}
