// Queueing-delay model over a load assignment
//
// Each edge is treated as an M/M/1 queue with service rate c/m and arrival
// rate 2 * load (load is counted once per direction on an undirected edge).

use crate::nr_demand::DemandMatrix;
use crate::nr_error::{NetworkError, Result};
use crate::nr_graph::Graph;
use crate::nr_interface::{Delay, EdgeKey, BIDIRECTIONAL_FACTOR};
use crate::nr_routing::LoadAssignment;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayModel {
    packet_size: f64,
}

impl DelayModel {
    /// `packet_size` is the mean packet length `m`, in the capacity's bit unit
    pub fn new(packet_size: f64) -> Result<Self> {
        if !(packet_size.is_finite() && packet_size > 0.0) {
            return Err(NetworkError::InvalidConfig(format!(
                "packet size must be positive, got {}",
                packet_size
            )));
        }
        Ok(Self { packet_size })
    }

    pub fn packet_size(&self) -> f64 {
        self.packet_size
    }

    fn ensure_size(graph: &Graph, load: &LoadAssignment) -> Result<()> {
        if load.size() != graph.node_count() {
            return Err(NetworkError::DimensionMismatch {
                expected: graph.node_count(),
                found: load.size(),
            });
        }
        Ok(())
    }

    /// Edges where `2 * load * m` exceeds capacity, in edge order
    pub fn overloaded_edges(&self, graph: &Graph, load: &LoadAssignment) -> Result<Vec<EdgeKey>> {
        Self::ensure_size(graph, load)?;
        Ok(graph
            .edges()
            .filter(|(edge, capacity)| {
                BIDIRECTIONAL_FACTOR * load.edge_load(*edge) as f64 * self.packet_size > *capacity
            })
            .map(|(edge, _)| edge)
            .collect())
    }

    pub fn is_overloaded(&self, graph: &Graph, load: &LoadAssignment) -> Result<bool> {
        Ok(!self.overloaded_edges(graph, load)?.is_empty())
    }

    /// Network-wide mean delay `T = sum(a / (c/m - a)) / G` with `a = 2 * load`
    /// and `G` the total offered demand.
    ///
    /// Any edge with `c/m - a <= 0` is saturated and makes the delay
    /// `Unbounded`. With no offered demand at all the network is idle and the
    /// delay is zero.
    pub fn mean_delay(
        &self,
        graph: &Graph,
        load: &LoadAssignment,
        demand: &DemandMatrix,
    ) -> Result<Delay> {
        Self::ensure_size(graph, load)?;
        demand.ensure_size(graph.node_count())?;
        let offered = demand.total()?;

        let mut queued = 0.0;
        for (edge, capacity) in graph.edges() {
            let arrival = BIDIRECTIONAL_FACTOR * load.edge_load(edge) as f64;
            let service = capacity / self.packet_size;
            let headroom = service - arrival;
            if headroom <= 0.0 {
                return Ok(Delay::Unbounded);
            }
            queued += arrival / headroom;
        }

        if offered == 0 {
            return Ok(Delay::Finite(0.0));
        }
        Ok(Delay::Finite(queued / offered as f64))
    }
}
