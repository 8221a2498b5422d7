// Undirected capacitated topology
//
// Edges keep their insertion order, which makes every walk over the edge set
// (random removal, overload checks, delay sums) reproducible for a given seed.
// Neighbor sets are ordered so traversals explore lower node ids first.

use std::collections::{BTreeSet, VecDeque};
use std::ops::RangeInclusive;

use indexmap::IndexMap;

use crate::nr_error::{EdgeRejection, NetworkError, Result};
use crate::nr_interface::{Capacity, EdgeKey, NodeId};

/// Per-edge capacities captured at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct CapacitySnapshot {
    capacities: hashbrown::HashMap<EdgeKey, Capacity>,
}

impl CapacitySnapshot {
    pub fn get(&self, u: NodeId, v: NodeId) -> Option<Capacity> {
        self.capacities.get(&EdgeKey::new(u, v)).copied()
    }

    pub fn len(&self) -> usize {
        self.capacities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capacities.is_empty()
    }
}

/// Undirected graph over nodes `1..=node_count`, at most one edge per pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    node_count: usize,
    edges: IndexMap<EdgeKey, Capacity>,
    // indexed by node - 1
    adjacency: Vec<BTreeSet<NodeId>>,
}

fn valid_capacity(capacity: Capacity) -> bool {
    capacity.is_finite() && capacity > 0.0
}

impl Graph {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: IndexMap::new(),
            adjacency: vec![BTreeSet::new(); node_count],
        }
    }

    /// Build a graph from `(u, v, capacity)` triples, rejecting the first bad edge
    pub fn from_edges(node_count: usize, edges: &[(NodeId, NodeId, Capacity)]) -> Result<Self> {
        let mut graph = Self::new(node_count);
        for &(u, v, capacity) in edges {
            graph.add_edge(u, v, capacity)?;
        }
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn nodes(&self) -> RangeInclusive<NodeId> {
        1..=self.node_count
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        node >= 1 && node <= self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of node pairs that could still receive an edge
    pub fn free_pair_count(&self) -> usize {
        let pairs = self.node_count * self.node_count.saturating_sub(1) / 2;
        pairs - self.edges.len()
    }

    /// Add an undirected edge.
    ///
    /// Self-loops, duplicates, unknown endpoints and non-positive capacities are
    /// rejected and leave the graph untouched.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, capacity: Capacity) -> Result<()> {
        let key = EdgeKey::new(u, v);
        if !self.contains_node(u) || !self.contains_node(v) {
            return Err(NetworkError::invalid_edge(u, v, EdgeRejection::UnknownNode));
        }
        if key.is_self_loop() {
            return Err(NetworkError::invalid_edge(u, v, EdgeRejection::SelfLoop));
        }
        if self.edges.contains_key(&key) {
            return Err(NetworkError::invalid_edge(u, v, EdgeRejection::Duplicate));
        }
        if !valid_capacity(capacity) {
            return Err(NetworkError::invalid_edge(
                u,
                v,
                EdgeRejection::NonPositiveCapacity,
            ));
        }

        self.edges.insert(key, capacity);
        self.adjacency[u - 1].insert(v);
        self.adjacency[v - 1].insert(u);
        Ok(())
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edges.contains_key(&EdgeKey::new(u, v))
    }

    pub fn capacity(&self, u: NodeId, v: NodeId) -> Option<Capacity> {
        self.edges.get(&EdgeKey::new(u, v)).copied()
    }

    pub fn set_capacity(&mut self, u: NodeId, v: NodeId, capacity: Capacity) -> Result<()> {
        if !valid_capacity(capacity) {
            return Err(NetworkError::invalid_edge(
                u,
                v,
                EdgeRejection::NonPositiveCapacity,
            ));
        }
        match self.edges.get_mut(&EdgeKey::new(u, v)) {
            Some(c) => {
                *c = capacity;
                Ok(())
            }
            None => Err(NetworkError::invalid_edge(u, v, EdgeRejection::Missing)),
        }
    }

    /// Neighbors of `node` in ascending order (empty for unknown nodes)
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.checked_sub(1)
            .and_then(|index| self.adjacency.get(index))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// All edges with their capacities, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, Capacity)> + '_ {
        self.edges.iter().map(|(key, capacity)| (*key, *capacity))
    }

    /// Remove an edge from this graph. Returns false if it was not present.
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        let key = EdgeKey::new(u, v);
        if self.edges.shift_remove(&key).is_none() {
            return false;
        }
        let (low, high) = key.nodes();
        self.adjacency[low - 1].remove(&high);
        self.adjacency[high - 1].remove(&low);
        true
    }

    /// Copy of this graph without the edge `u-v`; `self` is left untouched.
    pub fn without_edge(&self, u: NodeId, v: NodeId) -> Result<Graph> {
        let mut copy = self.clone();
        if copy.remove_edge(u, v) {
            Ok(copy)
        } else {
            Err(NetworkError::invalid_edge(u, v, EdgeRejection::Missing))
        }
    }

    /// Keep only edges for which `keep` returns true.
    ///
    /// `keep` is called exactly once per edge, in insertion order.
    pub fn retain_edges<F>(&mut self, mut keep: F)
    where
        F: FnMut(EdgeKey, Capacity) -> bool,
    {
        let before = self.edges.len();
        self.edges.retain(|key, capacity| keep(*key, *capacity));
        if self.edges.len() == before {
            return;
        }

        for neighbors in self.adjacency.iter_mut() {
            neighbors.clear();
        }
        for key in self.edges.keys() {
            let (low, high) = key.nodes();
            self.adjacency[low - 1].insert(high);
            self.adjacency[high - 1].insert(low);
        }
    }

    /// Reachability from every node to every other node.
    ///
    /// Graphs with zero or one node are trivially connected.
    pub fn is_connected(&self) -> bool {
        if self.node_count <= 1 {
            return true;
        }
        self.reachable_from(1).iter().all(|seen| *seen)
    }

    /// Breadth-first reachability, indexed by node - 1
    fn reachable_from(&self, start: NodeId) -> Vec<bool> {
        let mut seen = vec![false; self.node_count];
        if !self.contains_node(start) {
            return seen;
        }

        let mut queue = VecDeque::new();
        seen[start - 1] = true;
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            for next in self.neighbors(node) {
                if !seen[next - 1] {
                    seen[next - 1] = true;
                    queue.push_back(next);
                }
            }
        }

        seen
    }

    /// Multiply every capacity by `factor` (must be positive and finite)
    pub fn scale_capacities(&mut self, factor: f64) -> Result<()> {
        if !valid_capacity(factor) {
            return Err(NetworkError::InvalidConfig(format!(
                "capacity scale factor must be positive, got {}",
                factor
            )));
        }
        if let Some((key, _)) = self
            .edges
            .iter()
            .find(|(_, capacity)| !valid_capacity(**capacity * factor))
        {
            return Err(NetworkError::invalid_edge(
                key.low(),
                key.high(),
                EdgeRejection::NonPositiveCapacity,
            ));
        }
        for capacity in self.edges.values_mut() {
            *capacity *= factor;
        }
        Ok(())
    }

    pub fn capacity_snapshot(&self) -> CapacitySnapshot {
        CapacitySnapshot {
            capacities: self.edges.iter().map(|(k, c)| (*k, *c)).collect(),
        }
    }

    /// Restore capacities from `snapshot`.
    ///
    /// The snapshot must cover exactly the current edge set; nothing is
    /// changed if it does not.
    pub fn restore_capacities(&mut self, snapshot: &CapacitySnapshot) -> Result<()> {
        if snapshot.len() != self.edges.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.edges.len(),
                found: snapshot.len(),
            });
        }
        if let Some(key) = self
            .edges
            .keys()
            .find(|key| !snapshot.capacities.contains_key(*key))
        {
            return Err(NetworkError::invalid_edge(
                key.low(),
                key.high(),
                EdgeRejection::Missing,
            ));
        }

        for (key, capacity) in self.edges.iter_mut() {
            *capacity = snapshot.capacities[key];
        }
        Ok(())
    }

    /// Mean capacity over all current edges, 0 when there are none
    pub fn average_capacity(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.edges.values().sum::<f64>() / self.edges.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize, capacity: Capacity) -> Graph {
        let mut graph = Graph::new(n);
        for u in 1..=n {
            let v = if u == n { 1 } else { u + 1 };
            graph.add_edge(u, v, capacity).unwrap();
        }
        graph
    }

    #[test]
    fn test_add_edge_rejects_bad_edges() {
        let mut graph = Graph::new(3);
        graph.add_edge(1, 2, 10.0).unwrap();

        assert_eq!(
            graph.add_edge(2, 2, 10.0),
            Err(NetworkError::invalid_edge(2, 2, EdgeRejection::SelfLoop))
        );
        assert_eq!(
            graph.add_edge(2, 1, 10.0),
            Err(NetworkError::invalid_edge(2, 1, EdgeRejection::Duplicate))
        );
        assert_eq!(
            graph.add_edge(1, 4, 10.0),
            Err(NetworkError::invalid_edge(1, 4, EdgeRejection::UnknownNode))
        );
        assert_eq!(
            graph.add_edge(1, 3, 0.0),
            Err(NetworkError::invalid_edge(1, 3, EdgeRejection::NonPositiveCapacity))
        );
        assert_eq!(
            graph.add_edge(1, 3, f64::NAN),
            Err(NetworkError::invalid_edge(1, 3, EdgeRejection::NonPositiveCapacity))
        );

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.free_pair_count(), 2);
    }

    #[test]
    fn test_edge_lookup_is_symmetric() {
        let graph = ring(4, 100.0);
        assert!(graph.has_edge(1, 4));
        assert!(graph.has_edge(4, 1));
        assert!(!graph.has_edge(1, 3));
        assert_eq!(graph.capacity(2, 1), Some(100.0));
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(graph.neighbors(9).count(), 0);
    }

    #[test]
    fn test_without_edge_leaves_original_intact() {
        let graph = ring(4, 100.0);
        let cut = graph.without_edge(1, 2).unwrap();

        assert!(graph.has_edge(1, 2));
        assert!(!cut.has_edge(1, 2));
        assert_eq!(cut.edge_count(), 3);
        assert!(cut.is_connected());

        assert!(graph.without_edge(1, 3).is_err());
    }

    #[test]
    fn test_connectivity() {
        let mut graph = ring(4, 100.0);
        assert!(graph.is_connected());

        graph.remove_edge(1, 2);
        assert!(graph.is_connected());

        graph.remove_edge(3, 4);
        assert!(!graph.is_connected());

        assert!(Graph::new(1).is_connected());
        assert!(!Graph::new(2).is_connected());
    }

    #[test]
    fn test_retain_edges_visits_in_insertion_order() {
        let mut graph = ring(4, 100.0);
        let mut visited = Vec::new();
        graph.retain_edges(|key, _| {
            visited.push(key);
            key != EdgeKey::new(2, 3)
        });

        assert_eq!(
            visited,
            vec![
                EdgeKey::new(1, 2),
                EdgeKey::new(2, 3),
                EdgeKey::new(3, 4),
                EdgeKey::new(4, 1)
            ]
        );
        assert!(!graph.has_edge(2, 3));
        assert_eq!(graph.neighbors(2).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_retain_edges_drops_many_and_keeps_order() {
        let mut graph = ring(6, 100.0);
        graph.add_edge(1, 4, 50.0).unwrap();
        graph.retain_edges(|key, capacity| {
            capacity < 100.0 || (key.low() % 2 == 1 && key.high() == key.low() + 1)
        });

        // kept: 1-2, 3-4, 5-6 and the 1-4 chord
        assert_eq!(
            graph.edges().map(|(key, _)| key).collect::<Vec<_>>(),
            vec![
                EdgeKey::new(1, 2),
                EdgeKey::new(3, 4),
                EdgeKey::new(5, 6),
                EdgeKey::new(1, 4)
            ]
        );
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(graph.neighbors(4).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(graph.neighbors(6).collect::<Vec<_>>(), vec![5]);
        assert!(!graph.is_connected());
        assert_eq!(graph.free_pair_count(), 11);
    }

    #[test]
    fn test_capacity_snapshot_restore() {
        let mut graph = ring(4, 100.0);
        let snapshot = graph.capacity_snapshot();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.get(2, 1), Some(100.0));
        assert_eq!(snapshot.get(1, 3), None);

        graph.scale_capacities(1.5).unwrap();
        assert_eq!(graph.capacity(1, 2), Some(150.0));
        assert_eq!(graph.average_capacity(), 150.0);

        graph.restore_capacities(&snapshot).unwrap();
        assert_eq!(graph.capacity(1, 2), Some(100.0));

        graph.add_edge(1, 3, 50.0).unwrap();
        assert_eq!(
            graph.restore_capacities(&snapshot),
            Err(NetworkError::DimensionMismatch {
                expected: 5,
                found: 4
            })
        );
    }

    #[test]
    fn test_average_capacity_of_empty_graph() {
        assert_eq!(Graph::new(5).average_capacity(), 0.0);
    }
}
