//! Configuration for reliability experiments

use nr_rust::{NodeId, SimulationConfig, DEFAULT_PACKET_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Configuration for one experiment (three parameter sweeps over one topology)
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Random seed (None = generate random)
    #[serde(skip)]
    pub seed: Option<[u8; 32]>,

    /// Base topology
    pub topology: TopologySpec,

    /// Uniform range for initial edge capacities (bits/sec)
    pub capacity_range: (f64, f64),

    /// Average packet size in bits
    pub packet_size: f64,

    /// Probability that an edge survives a trial
    pub survival_probability: f64,

    /// Trials per reliability estimate
    pub trials: usize,

    /// Steps per sweep
    pub steps: usize,

    /// Core simulation settings (delay bound, demand range, path metric)
    pub simulation: SimulationConfig,

    /// Step sizes for the three sweeps
    pub sweeps: SweepConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: None,
            topology: TopologySpec::Campus,
            capacity_range: (7_000_000.0, 10_000_000.0),
            packet_size: DEFAULT_PACKET_SIZE,
            survival_probability: 0.9,
            trials: 100,
            steps: 10,
            simulation: SimulationConfig::default(),
            sweeps: SweepConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Get or generate seed
    pub fn resolve_seed(&self) -> [u8; 32] {
        self.seed.unwrap_or_else(|| {
            let mut temp_rng = StdRng::from_entropy();
            let mut seed = [0u8; 32];
            use rand::RngCore;
            temp_rng.fill_bytes(&mut seed);
            seed
        })
    }
}

/// Base topology to build before the sweeps start
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    /// 20 nodes: an outer ring of 8, an inner square of 4, and 8 leaves
    /// closing a second ring
    Campus,

    /// Simple cycle 1-2-...-n-1
    Ring { nodes: usize },

    /// Explicit edge list
    Custom {
        nodes: usize,
        edges: Vec<(NodeId, NodeId)>,
    },
}

/// Per-step increments for each sweep
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Added to every nonzero demand entry per step
    pub demand_increment: u64,

    /// Capacity growth per step, in percent of the current value
    pub capacity_percent: f64,

    /// Random edges added per step (at the current mean capacity)
    pub edges_per_step: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            demand_increment: 10,
            capacity_percent: 10.0,
            edges_per_step: 2,
        }
    }
}
