// shared types for the reliability engine

use std::fmt;

// nodes are numbered 1..=V
pub type NodeId = usize;

// bits/sec (or any consistent unit)
pub type Capacity = f64;

// abstract demand units between a node pair
pub type Demand = u64;

/// Average packet size in bits used when none is configured
pub const DEFAULT_PACKET_SIZE: f64 = 1500.0;

/// Maximum acceptable mean packet delay used when none is configured
pub const DEFAULT_MAX_DELAY: f64 = 0.1;

/// Load on an undirected edge is counted once per direction
pub const BIDIRECTIONAL_FACTOR: f64 = 2.0;

/// Unordered node pair identifying an undirected edge.
///
/// Always stored with `low < high`, so `EdgeKey::new(3, 1) == EdgeKey::new(1, 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    low: NodeId,
    high: NodeId,
}

impl EdgeKey {
    pub fn new(u: NodeId, v: NodeId) -> Self {
        if u <= v {
            Self { low: u, high: v }
        } else {
            Self { low: v, high: u }
        }
    }

    pub fn low(&self) -> NodeId {
        self.low
    }

    pub fn high(&self) -> NodeId {
        self.high
    }

    pub fn is_self_loop(&self) -> bool {
        self.low == self.high
    }

    pub fn nodes(&self) -> (NodeId, NodeId) {
        (self.low, self.high)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Network-wide mean delay figure.
///
/// A saturated edge makes the delay `Unbounded` rather than an IEEE infinity,
/// so it can never be compared as if it were finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delay {
    Finite(f64),
    Unbounded,
}

impl Delay {
    /// Pass/fail against the configured bound: only strictly smaller passes
    pub fn is_within(&self, max_delay: f64) -> bool {
        match self {
            Delay::Finite(t) => *t < max_delay,
            Delay::Unbounded => false,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Delay::Unbounded)
    }

    pub fn as_finite(&self) -> Option<f64> {
        match self {
            Delay::Finite(t) => Some(*t),
            Delay::Unbounded => None,
        }
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::Finite(t) => write!(f, "{:.6}", t),
            Delay::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Classification of a single randomized failure trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialOutcome {
    /// Connected, no edge overloaded, delay under the bound
    Reliable,

    /// Connected but at least one edge carries more than its capacity
    Overloaded,

    /// Connected and not overloaded, but the delay bound is not met
    DelayExceeded,

    /// Edge removal split the network
    Disconnected,
}

impl TrialOutcome {
    pub fn is_reliable(&self) -> bool {
        matches!(self, TrialOutcome::Reliable)
    }
}
