//! Network simulation
//!
//! Owns the canonical topology and demand matrix for one experiment and
//! exposes the operations experiment drivers use: demand and capacity
//! mutators between batches, and reliability estimation over the current
//! state. Estimation borrows the simulation immutably and every mutator needs
//! `&mut self`, so the canonical state can never change under a running batch.

use log::info;
use rand::Rng;

use crate::nr_delay::DelayModel;
use crate::nr_demand::DemandMatrix;
use crate::nr_error::{EdgeRejection, NetworkError, Result};
use crate::nr_graph::{CapacitySnapshot, Graph};
use crate::nr_interface::{Capacity, Demand, DEFAULT_MAX_DELAY};
use crate::nr_reliability::{ReliabilityEstimator, ReliabilityReport};
use crate::nr_routing::{LoadAssignment, PathMetric, RoutingEngine};

/// Simulation-wide settings that stay fixed across batches
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum acceptable mean packet delay (default: 0.1)
    pub max_delay: f64,

    /// Inclusive range for random demand per node pair (default: 1..=10)
    pub demand_range: (Demand, Demand),

    /// Path selection weight (default: hop count)
    pub path_metric: PathMetric,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_delay: DEFAULT_MAX_DELAY,
            demand_range: (1, 10),
            path_metric: PathMetric::Hops,
        }
    }
}

impl SimulationConfig {
    fn validate(&self) -> Result<()> {
        if !(self.max_delay.is_finite() && self.max_delay > 0.0) {
            return Err(NetworkError::InvalidConfig(format!(
                "maximum delay must be positive, got {}",
                self.max_delay
            )));
        }
        if self.demand_range.0 > self.demand_range.1 {
            return Err(NetworkError::InvalidConfig(format!(
                "empty demand range {}..={}",
                self.demand_range.0, self.demand_range.1
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NetworkSimulation {
    graph: Graph,
    demand: DemandMatrix,
    config: SimulationConfig,
}

impl NetworkSimulation {
    /// Wrap an existing graph with `node_count` nodes and an empty demand matrix
    pub fn new(graph: Graph, node_count: usize) -> Result<Self> {
        Self::with_config(graph, node_count, SimulationConfig::default())
    }

    pub fn with_config(graph: Graph, node_count: usize, config: SimulationConfig) -> Result<Self> {
        if graph.node_count() != node_count {
            return Err(NetworkError::DimensionMismatch {
                expected: node_count,
                found: graph.node_count(),
            });
        }
        config.validate()?;

        Ok(Self {
            graph,
            demand: DemandMatrix::new(node_count),
            config,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn demand(&self) -> &DemandMatrix {
        &self.demand
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn routing(&self) -> RoutingEngine {
        RoutingEngine::new(self.config.path_metric)
    }

    // ===== Demand =====

    /// Replace the demand matrix with uniform draws from the configured range
    pub fn populate_demand<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let (low, high) = self.config.demand_range;
        self.demand = DemandMatrix::random(self.node_count(), low..=high, rng)?;
        Ok(())
    }

    /// Raise every nonzero demand entry by `delta`
    pub fn increase_demand(&mut self, delta: Demand) {
        self.demand.increase_nonzero(delta);
    }

    /// Swap in a previously saved demand matrix
    pub fn set_demand(&mut self, demand: DemandMatrix) -> Result<()> {
        demand.ensure_size(self.node_count())?;
        self.demand = demand;
        Ok(())
    }

    // ===== Topology =====

    /// Grow every capacity by `percent` percent of its current value
    pub fn increase_capacities(&mut self, percent: f64) -> Result<()> {
        self.graph.scale_capacities(1.0 + percent / 100.0)?;
        info!(
            "capacities raised by {}% (mean now {:.0})",
            percent,
            self.graph.average_capacity()
        );
        Ok(())
    }

    /// Add `count` new edges between random distinct, unconnected node pairs.
    ///
    /// Fails before adding anything if fewer than `count` pairs are free
    /// (`InvalidConfig`) or the capacity is not positive (`InvalidEdge` on the
    /// first pair drawn).
    pub fn add_random_edges<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        capacity: Capacity,
        rng: &mut R,
    ) -> Result<usize> {
        let free = self.graph.free_pair_count();
        if count > free {
            return Err(NetworkError::InvalidConfig(format!(
                "cannot add {} edges, only {} node pairs are unconnected",
                count, free
            )));
        }

        let node_count = self.node_count();
        let mut added = 0;
        while added < count {
            let u = rng.gen_range(1..=node_count);
            let v = rng.gen_range(1..=node_count);
            if u == v || self.graph.has_edge(u, v) {
                continue;
            }
            if !(capacity.is_finite() && capacity > 0.0) {
                return Err(NetworkError::invalid_edge(
                    u,
                    v,
                    EdgeRejection::NonPositiveCapacity,
                ));
            }
            self.graph.add_edge(u, v, capacity)?;
            added += 1;
        }

        info!(
            "added {} edges with capacity {:.0} ({} total)",
            added,
            capacity,
            self.graph.edge_count()
        );
        Ok(added)
    }

    pub fn capacity_snapshot(&self) -> CapacitySnapshot {
        self.graph.capacity_snapshot()
    }

    pub fn reset_capacities(&mut self, snapshot: &CapacitySnapshot) -> Result<()> {
        self.graph.restore_capacities(snapshot)
    }

    pub fn average_capacity(&self) -> f64 {
        self.graph.average_capacity()
    }

    // ===== Routing & reliability =====

    /// Load assignment for `graph` under the current demand matrix
    pub fn compute_load(&self, graph: &Graph) -> Result<LoadAssignment> {
        self.routing().compute_load(graph, &self.demand)
    }

    pub fn estimator(&self, packet_size: f64) -> Result<ReliabilityEstimator> {
        ReliabilityEstimator::new(
            self.routing(),
            DelayModel::new(packet_size)?,
            self.config.max_delay,
        )
    }

    /// Run a batch of failure trials and return the per-outcome counts
    pub fn reliability_report<R: Rng + ?Sized>(
        &self,
        survival_probability: f64,
        packet_size: f64,
        trials: usize,
        rng: &mut R,
    ) -> Result<ReliabilityReport> {
        self.estimator(packet_size)?.estimate(
            &self.graph,
            &self.demand,
            survival_probability,
            trials,
            rng,
        )
    }

    /// Fraction of `trials` random failure scenarios that stay connected,
    /// unoverloaded and within the delay bound
    pub fn estimate_reliability<R: Rng + ?Sized>(
        &self,
        survival_probability: f64,
        packet_size: f64,
        trials: usize,
        rng: &mut R,
    ) -> Result<f64> {
        Ok(self
            .reliability_report(survival_probability, packet_size, trials, rng)?
            .ratio())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ring(n: usize, capacity: Capacity) -> Graph {
        let edges: Vec<_> = (1..=n)
            .map(|u| (u, if u == n { 1 } else { u + 1 }, capacity))
            .collect();
        Graph::from_edges(n, &edges).unwrap()
    }

    #[test]
    fn test_node_count_must_match_graph() {
        assert!(matches!(
            NetworkSimulation::new(ring(4, 1.0), 5),
            Err(NetworkError::DimensionMismatch {
                expected: 5,
                found: 4
            })
        ));

        let config = SimulationConfig {
            max_delay: -1.0,
            ..Default::default()
        };
        assert!(NetworkSimulation::with_config(ring(4, 1.0), 4, config).is_err());
    }

    #[test]
    fn test_populate_and_increase_demand() {
        let mut sim = NetworkSimulation::new(ring(5, 1e6), 5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        sim.populate_demand(&mut rng).unwrap();

        let before = sim.demand().clone();
        sim.increase_demand(10);
        for (i, j, demand) in before.pairs() {
            assert_eq!(sim.demand().demand(i, j), demand + 10);
        }

        sim.set_demand(before.clone()).unwrap();
        assert_eq!(sim.demand(), &before);
        assert!(sim.set_demand(DemandMatrix::new(3)).is_err());
    }

    #[test]
    fn test_increase_and_reset_capacities() {
        let mut sim = NetworkSimulation::new(ring(4, 1000.0), 4).unwrap();
        let snapshot = sim.capacity_snapshot();

        sim.increase_capacities(10.0).unwrap();
        assert!((sim.average_capacity() - 1100.0).abs() < 1e-9);
        sim.increase_capacities(10.0).unwrap();
        assert!((sim.average_capacity() - 1210.0).abs() < 1e-9);

        sim.reset_capacities(&snapshot).unwrap();
        assert_eq!(sim.average_capacity(), 1000.0);
        assert!(sim.increase_capacities(-100.0).is_err());
    }

    #[test]
    fn test_add_random_edges() {
        let mut sim = NetworkSimulation::new(ring(5, 1000.0), 5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        assert_eq!(sim.add_random_edges(3, 500.0, &mut rng).unwrap(), 3);
        assert_eq!(sim.graph().edge_count(), 8);
        assert_eq!(sim.graph().free_pair_count(), 2);

        // only 2 pairs left
        assert!(matches!(
            sim.add_random_edges(3, 500.0, &mut rng),
            Err(NetworkError::InvalidConfig(_))
        ));
        for capacity in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                sim.add_random_edges(1, capacity, &mut rng),
                Err(NetworkError::InvalidEdge {
                    reason: EdgeRejection::NonPositiveCapacity,
                    ..
                })
            ));
        }
        assert_eq!(sim.graph().edge_count(), 8);

        assert_eq!(sim.add_random_edges(2, 500.0, &mut rng).unwrap(), 2);
        assert_eq!(sim.graph().free_pair_count(), 0);
    }

    #[test]
    fn test_estimate_reliability_extremes() {
        let mut sim = NetworkSimulation::with_config(
            ring(6, 1e7),
            6,
            SimulationConfig {
                max_delay: 1.0,
                ..Default::default()
            },
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        sim.populate_demand(&mut rng).unwrap();

        let estimator = sim.estimator(1500.0).unwrap();
        assert_eq!(estimator.max_delay(), 1.0);

        assert_eq!(sim.estimate_reliability(1.0, 1500.0, 10, &mut rng).unwrap(), 1.0);
        assert_eq!(sim.estimate_reliability(0.0, 1500.0, 10, &mut rng).unwrap(), 0.0);
        assert!(sim.estimate_reliability(0.9, 0.0, 10, &mut rng).is_err());
    }

    #[test]
    fn test_saturated_demand_reports_overflow() {
        let graph = Graph::from_edges(2, &[(1, 2, 1e7)]).unwrap();
        let mut sim = NetworkSimulation::new(graph, 2).unwrap();
        let mut demand = DemandMatrix::new(2);
        demand.set_demand(1, 2, 1).unwrap();
        sim.set_demand(demand).unwrap();
        sim.increase_demand(u64::MAX);

        assert_eq!(
            sim.compute_load(sim.graph()),
            Err(NetworkError::DemandOverflow)
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            sim.estimate_reliability(1.0, 1500.0, 1, &mut rng),
            Err(NetworkError::DemandOverflow)
        );
    }

    #[test]
    fn test_compute_load_on_snapshot() {
        let mut sim = NetworkSimulation::new(ring(4, 1e6), 4).unwrap();
        let mut demand = DemandMatrix::new(4);
        demand.set_demand(1, 2, 4).unwrap();
        sim.set_demand(demand).unwrap();

        let cut = sim.graph().without_edge(1, 2).unwrap();
        let load = sim.compute_load(&cut).unwrap();

        // 1 -> 4 -> 3 -> 2 once the direct link is gone
        assert_eq!(load.load(1, 2), 0);
        assert_eq!(load.load(1, 4), 8);
        assert_eq!(load.load(3, 4), 8);
        assert_eq!(load.load(2, 3), 8);
        assert!(sim.graph().has_edge(1, 2));
    }
}
