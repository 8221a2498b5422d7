//! Base topologies with random capacities

use super::config::TopologySpec;
use nr_rust::{Graph, NetworkError, NodeId, Result};
use rand::Rng;

/// Edge list of the 20-node campus topology
const CAMPUS_EDGES: [(NodeId, NodeId); 28] = [
    (1, 2), (2, 3), (3, 4), (4, 5),
    (5, 6), (6, 7), (7, 8), (1, 8),
    (2, 9), (4, 10), (5, 11), (7, 12),
    (9, 10), (10, 11), (11, 12), (12, 9),
    (9, 13), (11, 14), (10, 15), (12, 16),
    (13, 17), (14, 18), (15, 19), (16, 20),
    (17, 18), (18, 19), (19, 20), (20, 17),
];

const CAMPUS_NODES: usize = 20;

/// Node count and edge list for a topology spec
pub fn layout(spec: &TopologySpec) -> Result<(usize, Vec<(NodeId, NodeId)>)> {
    match spec {
        TopologySpec::Campus => Ok((CAMPUS_NODES, CAMPUS_EDGES.to_vec())),
        TopologySpec::Ring { nodes } if *nodes < 3 => Err(NetworkError::InvalidConfig(format!(
            "ring needs at least 3 nodes, got {}",
            nodes
        ))),
        TopologySpec::Ring { nodes } => {
            let edges = (1..=*nodes)
                .map(|u| (u, if u == *nodes { 1 } else { u + 1 }))
                .collect();
            Ok((*nodes, edges))
        }
        TopologySpec::Custom { nodes, edges } => Ok((*nodes, edges.clone())),
    }
}

/// Build the topology, drawing each capacity uniformly from `capacity_range`
pub fn build<R: Rng + ?Sized>(
    spec: &TopologySpec,
    capacity_range: (f64, f64),
    rng: &mut R,
) -> Result<Graph> {
    let (low, high) = capacity_range;
    if !(low > 0.0 && low <= high && high.is_finite()) {
        return Err(NetworkError::InvalidConfig(format!(
            "capacity range must be positive and ordered, got {}..={}",
            low, high
        )));
    }

    let (nodes, edges) = layout(spec)?;
    let mut graph = Graph::new(nodes);
    for (u, v) in edges {
        let capacity = rng.gen_range(low..=high);
        graph.add_edge(u, v, capacity)?;
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_campus_is_connected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let graph = build(&TopologySpec::Campus, (7e6, 1e7), &mut rng).unwrap();

        assert_eq!(graph.node_count(), 20);
        assert_eq!(graph.edge_count(), 28);
        assert!(graph.is_connected());
        assert!(graph.edges().all(|(_, c)| (7e6..=1e7).contains(&c)));
    }

    #[test]
    fn test_ring_layout() {
        let (nodes, edges) = layout(&TopologySpec::Ring { nodes: 3 }).unwrap();
        assert_eq!(nodes, 3);
        assert_eq!(edges, vec![(1, 2), (2, 3), (3, 1)]);
    }

    #[test]
    fn test_short_ring_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for nodes in 0..3 {
            let spec = TopologySpec::Ring { nodes };
            assert!(matches!(layout(&spec), Err(NetworkError::InvalidConfig(_))));
            assert!(matches!(
                build(&spec, (1.0, 2.0), &mut rng),
                Err(NetworkError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_bad_custom_edges_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spec = TopologySpec::Custom {
            nodes: 3,
            edges: vec![(1, 2), (2, 1)],
        };
        assert!(build(&spec, (1.0, 2.0), &mut rng).is_err());
        assert!(build(&TopologySpec::Ring { nodes: 3 }, (0.0, 2.0), &mut rng).is_err());
    }
}
