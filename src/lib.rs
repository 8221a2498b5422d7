//! # nr_rust - Network Reliability Estimation
//!
//! Estimates how reliable a packet-switched network is under random link
//! failures: the fraction of failure scenarios that leave the topology
//! connected, free of overloaded links, and within a mean packet delay budget.
//!
//! ## Core Components
//!
//! - **Graph**: Undirected capacitated topology with connectivity queries
//! - **DemandMatrix**: Symmetric point-to-point traffic demand
//! - **RoutingEngine**: Shortest-path flow assignment producing a LoadAssignment
//! - **DelayModel**: Per-edge overload test and network-wide mean delay
//! - **ReliabilityEstimator**: Monte Carlo failure trials, run in parallel
//! - **NetworkSimulation**: Owns graph and demand, exposes experiment operations
//!
//! ## Usage
//!
//! ```no_run
//! use nr_rust::{Graph, NetworkSimulation};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let graph = Graph::from_edges(
//!     4,
//!     &[(1, 2, 9e6), (2, 3, 9e6), (3, 4, 9e6), (4, 1, 9e6)],
//! )?;
//! let mut sim = NetworkSimulation::new(graph, 4)?;
//!
//! // Seeded source: identical inputs give identical results
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! sim.populate_demand(&mut rng)?;
//!
//! let reliability = sim.estimate_reliability(0.9, 1500.0, 100, &mut rng)?;
//! assert!((0.0..=1.0).contains(&reliability));
//! # Ok::<(), nr_rust::NetworkError>(())
//! ```
//!
//! ## Experiments
//!
//! Topology construction, parameter sweeps and result tables live in the
//! separate `simulator/` targets, which use only the API re-exported here.

// Core modules
pub mod nr_delay;
pub mod nr_demand;
pub mod nr_error;
pub mod nr_graph;
pub mod nr_interface;
pub mod nr_reliability;
pub mod nr_routing;
pub mod nr_simulation;

// Re-export commonly used types
pub use nr_delay::DelayModel;
pub use nr_demand::DemandMatrix;
pub use nr_error::{EdgeRejection, NetworkError, Result};
pub use nr_graph::{CapacitySnapshot, Graph};
pub use nr_interface::{
    Capacity, Delay, Demand, EdgeKey, NodeId, TrialOutcome, DEFAULT_MAX_DELAY,
    DEFAULT_PACKET_SIZE,
};
pub use nr_reliability::{ReliabilityEstimator, ReliabilityReport, TrialRng};
pub use nr_routing::{LoadAssignment, PathMetric, RoutingEngine, ShortestPaths};
pub use nr_simulation::{NetworkSimulation, SimulationConfig};
