// Shortest-path flow assignment
//
// Every call recomputes paths and loads from scratch for the given snapshot;
// nothing is cached between calls.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;

use crate::nr_demand::DemandMatrix;
use crate::nr_error::{NetworkError, Result};
use crate::nr_graph::Graph;
use crate::nr_interface::{Capacity, Demand, EdgeKey, NodeId};

/// Edge weight used for path selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMetric {
    /// Every edge weighs 1, paths minimize hop count
    #[default]
    Hops,

    /// Edges weigh 1/capacity, preferring fat links
    InverseCapacity,
}

impl PathMetric {
    fn weight(&self, capacity: Capacity) -> f64 {
        match self {
            PathMetric::Hops => 1.0,
            PathMetric::InverseCapacity => 1.0 / capacity,
        }
    }
}

/// Frontier entry, ordered so the heap pops the smallest (cost, node) first
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shortest-path tree rooted at one source
#[derive(Debug, Clone, PartialEq)]
struct PathTree {
    // indexed by node - 1, None when unreachable
    distance: Vec<Option<f64>>,
    predecessor: Vec<Option<NodeId>>,
}

impl PathTree {
    fn build(graph: &Graph, source: NodeId, metric: PathMetric) -> Self {
        let n = graph.node_count();
        let mut distance: Vec<Option<f64>> = vec![None; n];
        let mut predecessor = vec![None; n];
        let mut settled = vec![false; n];
        let mut frontier = BinaryHeap::new();

        distance[source - 1] = Some(0.0);
        frontier.push(Frontier {
            cost: 0.0,
            node: source,
        });

        while let Some(Frontier { cost, node }) = frontier.pop() {
            if settled[node - 1] {
                continue;
            }
            settled[node - 1] = true;

            for next in graph.neighbors(node) {
                let Some(capacity) = graph.capacity(node, next) else {
                    continue;
                };
                let candidate = cost + metric.weight(capacity);
                // strict improvement only: the first path found wins ties
                let improves = distance[next - 1].map_or(true, |known| candidate < known);
                if improves {
                    distance[next - 1] = Some(candidate);
                    predecessor[next - 1] = Some(node);
                    frontier.push(Frontier {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        Self {
            distance,
            predecessor,
        }
    }
}

/// All-pairs shortest paths for one graph snapshot.
///
/// When several shortest paths tie, the one found first wins: the frontier is
/// ordered by (distance, node id) and neighbors are scanned in ascending order.
/// Callers must not rely on which of the tied paths that is.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    // indexed by source - 1
    trees: Vec<PathTree>,
}

impl ShortestPaths {
    pub fn compute(graph: &Graph, metric: PathMetric) -> Self {
        let trees = graph
            .nodes()
            .map(|source| PathTree::build(graph, source, metric))
            .collect();
        Self { trees }
    }

    fn tree(&self, from: NodeId) -> Option<&PathTree> {
        from.checked_sub(1).and_then(|index| self.trees.get(index))
    }

    /// Path length under the metric, None when `to` is unreachable
    pub fn distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let tree = self.tree(from)?;
        to.checked_sub(1)
            .and_then(|index| tree.distance.get(index))
            .copied()
            .flatten()
    }

    /// Chosen route from `from` to `to`, both endpoints included
    pub fn path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        self.distance(from, to)?;
        let mut path = vec![to];
        self.walk(from, to, |prev, _| {
            path.push(prev);
            Ok(())
        })
        .ok()?;
        path.reverse();
        Some(path)
    }

    // Calls `visit(prev, node)` for each hop, walking back from `to` to `from`,
    // and stops at the first error. Assumes `to` is reachable.
    fn walk<F>(&self, from: NodeId, to: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(NodeId, NodeId) -> Result<()>,
    {
        let Some(tree) = self.tree(from) else {
            return Ok(());
        };
        let mut node = to;
        while node != from {
            match tree.predecessor[node - 1] {
                Some(prev) => {
                    visit(prev, node)?;
                    node = prev;
                }
                None => break,
            }
        }
        Ok(())
    }
}

/// Aggregated flow per directed incidence, recomputed per snapshot.
///
/// Both directions of an undirected edge receive the same flow, so the matrix
/// is symmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAssignment {
    size: usize,
    // row-major, (i - 1) * size + (j - 1)
    loads: Vec<Demand>,
}

impl LoadAssignment {
    fn new(size: usize) -> Self {
        Self {
            size,
            loads: vec![0; size * size],
        }
    }

    fn add(&mut self, u: NodeId, v: NodeId, flow: Demand) -> Result<()> {
        for index in [(u - 1) * self.size + (v - 1), (v - 1) * self.size + (u - 1)] {
            self.loads[index] = self.loads[index]
                .checked_add(flow)
                .ok_or(NetworkError::DemandOverflow)?;
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Load from `u` towards `v`; 0 for unknown nodes
    pub fn load(&self, u: NodeId, v: NodeId) -> Demand {
        if u == 0 || v == 0 || u > self.size || v > self.size {
            return 0;
        }
        self.loads[(u - 1) * self.size + (v - 1)]
    }

    pub fn edge_load(&self, edge: EdgeKey) -> Demand {
        self.load(edge.low(), edge.high())
    }

    pub fn is_symmetric(&self) -> bool {
        (1..=self.size).all(|u| ((u + 1)..=self.size).all(|v| self.load(u, v) == self.load(v, u)))
    }
}

/// Turns a demand matrix into per-edge load over shortest paths
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutingEngine {
    metric: PathMetric,
}

impl RoutingEngine {
    pub fn new(metric: PathMetric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> PathMetric {
        self.metric
    }

    pub fn shortest_paths(&self, graph: &Graph) -> ShortestPaths {
        ShortestPaths::compute(graph, self.metric)
    }

    /// Route every ordered pair `(i, j)`, `i != j`, along its chosen shortest
    /// path and add `demand(i, j)` to each traversed edge in both directions.
    ///
    /// Fails with `DisconnectedGraph` on the first unreachable pair, whether or
    /// not that pair carries demand, and with `DemandOverflow` when an edge's
    /// load no longer fits in a `Demand`.
    pub fn compute_load(&self, graph: &Graph, demand: &DemandMatrix) -> Result<LoadAssignment> {
        demand.ensure_size(graph.node_count())?;

        let paths = self.shortest_paths(graph);
        let mut assignment = LoadAssignment::new(graph.node_count());

        for from in graph.nodes() {
            for to in graph.nodes().filter(|to| *to != from) {
                if paths.distance(from, to).is_none() {
                    return Err(NetworkError::DisconnectedGraph { from, to });
                }
                let flow = demand.demand(from, to);
                if flow == 0 {
                    continue;
                }
                paths.walk(from, to, |prev, node| assignment.add(prev, node, flow))?;
            }
        }

        trace!(
            "routed {} nodes over {} edges ({:?})",
            graph.node_count(),
            graph.edge_count(),
            self.metric
        );

        Ok(assignment)
    }
}
