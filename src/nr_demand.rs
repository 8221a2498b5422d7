// Symmetric point-to-point traffic demand

use std::ops::RangeInclusive;

use rand::Rng;

use crate::nr_error::{NetworkError, Result};
use crate::nr_interface::{Demand, NodeId};

/// V×V demand matrix over nodes `1..=V`.
///
/// Always symmetric with a zero diagonal: writes go to both halves and the
/// diagonal cannot be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandMatrix {
    size: usize,
    // row-major, (i - 1) * size + (j - 1)
    entries: Vec<Demand>,
}

impl DemandMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            entries: vec![0; size * size],
        }
    }

    /// Fill every off-diagonal pair with a uniform draw from `range`
    pub fn random<R: Rng + ?Sized>(
        size: usize,
        range: RangeInclusive<Demand>,
        rng: &mut R,
    ) -> Result<Self> {
        if range.is_empty() {
            return Err(NetworkError::InvalidConfig(format!(
                "empty demand range {:?}",
                range
            )));
        }

        let mut matrix = Self::new(size);
        for i in 1..=size {
            for j in (i + 1)..=size {
                let demand = rng.gen_range(range.clone());
                matrix.write(i, j, demand);
            }
        }
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, i: NodeId, j: NodeId) -> Option<usize> {
        if i == 0 || j == 0 || i > self.size || j > self.size {
            return None;
        }
        Some((i - 1) * self.size + (j - 1))
    }

    fn write(&mut self, i: NodeId, j: NodeId, demand: Demand) {
        let forward = (i - 1) * self.size + (j - 1);
        let backward = (j - 1) * self.size + (i - 1);
        self.entries[forward] = demand;
        self.entries[backward] = demand;
    }

    /// Demand between `i` and `j`; 0 on the diagonal and for unknown nodes
    pub fn demand(&self, i: NodeId, j: NodeId) -> Demand {
        self.index(i, j).map_or(0, |index| self.entries[index])
    }

    /// Set `demand(i, j)` and `demand(j, i)` together
    pub fn set_demand(&mut self, i: NodeId, j: NodeId, demand: Demand) -> Result<()> {
        if self.index(i, j).is_none() {
            return Err(NetworkError::InvalidConfig(format!(
                "demand pair {}-{} outside 1..={}",
                i, j, self.size
            )));
        }
        if i == j {
            return Err(NetworkError::InvalidConfig(format!(
                "diagonal demand {}-{} is fixed at zero",
                i, j
            )));
        }
        self.write(i, j, demand);
        Ok(())
    }

    /// Raise every nonzero entry by `delta`; zero pairs stay zero
    pub fn increase_nonzero(&mut self, delta: Demand) {
        for entry in self.entries.iter_mut().filter(|entry| **entry != 0) {
            *entry = entry.saturating_add(delta);
        }
    }

    /// Sum over all entries (both halves of the matrix)
    pub fn total(&self) -> Result<Demand> {
        self.entries
            .iter()
            .try_fold(0, |sum: Demand, entry| sum.checked_add(*entry))
            .ok_or(NetworkError::DemandOverflow)
    }

    /// Fail unless this matrix matches a graph with `node_count` nodes
    pub fn ensure_size(&self, node_count: usize) -> Result<()> {
        if self.size != node_count {
            return Err(NetworkError::DimensionMismatch {
                expected: node_count,
                found: self.size,
            });
        }
        Ok(())
    }

    /// Nonzero pairs with `i < j`
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId, Demand)> + '_ {
        (1..=self.size).flat_map(move |i| {
            ((i + 1)..=self.size).filter_map(move |j| {
                let demand = self.demand(i, j);
                (demand != 0).then_some((i, j, demand))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_demand_is_symmetric() {
        let mut matrix = DemandMatrix::new(4);
        matrix.set_demand(1, 3, 5).unwrap();

        assert_eq!(matrix.demand(1, 3), 5);
        assert_eq!(matrix.demand(3, 1), 5);
        assert_eq!(matrix.total().unwrap(), 10);
        assert_eq!(matrix.pairs().collect::<Vec<_>>(), vec![(1, 3, 5)]);
    }

    #[test]
    fn test_diagonal_and_bounds_are_rejected() {
        let mut matrix = DemandMatrix::new(3);
        assert!(matrix.set_demand(2, 2, 1).is_err());
        assert!(matrix.set_demand(0, 1, 1).is_err());
        assert!(matrix.set_demand(1, 4, 1).is_err());
        assert_eq!(matrix.demand(2, 2), 0);
        assert_eq!(matrix.demand(4, 1), 0);
    }

    #[test]
    fn test_increase_only_grows_existing_demand() {
        let mut matrix = DemandMatrix::new(3);
        matrix.set_demand(1, 2, 4).unwrap();
        matrix.increase_nonzero(10);

        assert_eq!(matrix.demand(1, 2), 14);
        assert_eq!(matrix.demand(2, 1), 14);
        assert_eq!(matrix.demand(1, 3), 0);
        assert_eq!(matrix.demand(3, 3), 0);
    }

    #[test]
    fn test_random_fills_every_pair_within_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let matrix = DemandMatrix::random(5, 1..=10, &mut rng).unwrap();

        for i in 1..=5 {
            assert_eq!(matrix.demand(i, i), 0);
            for j in 1..=5 {
                assert_eq!(matrix.demand(i, j), matrix.demand(j, i));
                if i != j {
                    assert!((1..=10).contains(&matrix.demand(i, j)));
                }
            }
        }
        assert_eq!(matrix.pairs().count(), 10);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let mut matrix = DemandMatrix::new(2);
        matrix.set_demand(1, 2, 1).unwrap();
        matrix.increase_nonzero(u64::MAX);

        // each entry saturates, but both halves together do not fit
        assert_eq!(matrix.demand(1, 2), u64::MAX);
        assert_eq!(matrix.total(), Err(NetworkError::DemandOverflow));
    }

    #[test]
    fn test_ensure_size() {
        let matrix = DemandMatrix::new(4);
        assert!(matrix.ensure_size(4).is_ok());
        assert_eq!(
            matrix.ensure_size(5),
            Err(NetworkError::DimensionMismatch {
                expected: 5,
                found: 4
            })
        );
    }
}
