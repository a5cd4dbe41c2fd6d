use crate::{Error, PointId, Result};

/// The two exposed ends of a chain. Never equal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChainEnds {
    a: PointId,
    b: PointId,
}

impl ChainEnds {
    pub fn new(a: PointId, b: PointId) -> Result<Self> {
        if a == b {
            return Err(Error::invariant(format!("chain end {a} would map to itself")));
        }
        Ok(Self { a, b })
    }

    pub fn ends(&self) -> (PointId, PointId) {
        (self.a, self.b)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Merge {
    /// The chains were joined; these are the ends of the combined chain.
    Joined(ChainEnds),
    /// Both points end the same chain; linking them would close a cycle.
    SameChain,
}

/// Symmetric map from each chain end to the opposite end of its chain.
///
/// Isolated points have no entry and act as their own opposite end. Entries
/// are removed as soon as a point becomes interior.
#[derive(Clone, Debug)]
pub struct EndpointMap {
    ends: Vec<Option<PointId>>,
}

impl EndpointMap {
    pub fn new(n: usize) -> Self {
        Self {
            ends: vec![None; n],
        }
    }

    #[inline]
    pub fn get(&self, id: PointId) -> Option<PointId> {
        self.ends[id]
    }

    /// Opposite end of the chain `id` terminates, `id` itself for an isolated point.
    pub fn opposite(&self, id: PointId) -> Result<PointId> {
        let Some(other) = self.ends[id] else {
            return Ok(id);
        };
        if self.ends[other] != Some(id) {
            return Err(Error::invariant(format!(
                "endpoint map asymmetric: {id} -> {other} but {other} -> {:?}",
                self.ends[other]
            )));
        }
        Ok(other)
    }

    /// Joins the chain ending at `i` with the chain ending at `p`.
    ///
    /// The far ends of both chains become linked to each other; `i` and `p`
    /// lose their entries if they turn interior.
    pub fn merge(&mut self, i: PointId, p: PointId) -> Result<Merge> {
        let j = self.opposite(i)?;
        if j == p {
            return Ok(Merge::SameChain);
        }
        let k = self.opposite(p)?;
        let joined = ChainEnds::new(j, k)?;

        if j != i {
            self.ends[i] = None;
        }
        if k != p {
            self.ends[p] = None;
        }
        self.link(joined);
        Ok(Merge::Joined(joined))
    }

    /// Removes the last chain once its ends have been connected into a cycle.
    pub fn close(&mut self, a: PointId, b: PointId) -> Result<()> {
        if a == b || self.opposite(a)? != b {
            return Err(Error::invariant(format!(
                "points {a} and {b} are not the two ends of one chain"
            )));
        }
        self.ends[a] = None;
        self.ends[b] = None;
        Ok(())
    }

    fn link(&mut self, chain: ChainEnds) {
        let (a, b) = chain.ends();
        self.ends[a] = Some(b);
        self.ends[b] = Some(a);
    }

    pub fn entries(&self) -> usize {
        self.ends.iter().filter(|e| e.is_some()).count()
    }

    /// Full symmetry and self-loop scan.
    pub fn check(&self) -> Result<()> {
        for (id, entry) in self.ends.iter().enumerate() {
            let Some(other) = *entry else {
                continue;
            };
            if other == id {
                return Err(Error::invariant(format!("endpoint {id} maps to itself")));
            }
            self.opposite(id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainEnds, EndpointMap, Merge};

    #[test]
    fn chain_ends_cannot_alias() {
        assert!(ChainEnds::new(4, 4).expect_err("alias").is_invariant());
        assert_eq!(ChainEnds::new(1, 2).expect("ends").ends(), (1, 2));
    }

    #[test]
    fn isolated_points_are_their_own_opposite() {
        let map = EndpointMap::new(3);
        assert_eq!(map.opposite(2).expect("opposite"), 2);
        assert_eq!(map.entries(), 0);
    }

    #[test]
    fn merging_two_isolated_points_links_them() {
        let mut map = EndpointMap::new(4);
        let merged = map.merge(0, 1).expect("merge");
        assert_eq!(merged, Merge::Joined(ChainEnds::new(0, 1).expect("ends")));
        assert_eq!(map.opposite(0).expect("opposite"), 1);
        assert_eq!(map.opposite(1).expect("opposite"), 0);
        map.check().expect("consistent");
    }

    #[test]
    fn attaching_isolated_point_routes_to_far_end() {
        let mut map = EndpointMap::new(4);
        map.merge(0, 1).expect("merge");
        // chain 0-1, attach 2 to 1: ends become (0, 2) and 1 turns interior.
        map.merge(2, 1).expect("merge");
        assert_eq!(map.opposite(2).expect("opposite"), 0);
        assert_eq!(map.opposite(0).expect("opposite"), 2);
        assert_eq!(map.get(1), None);
        map.check().expect("consistent");
    }

    #[test]
    fn joining_two_chains_links_far_ends() {
        let mut map = EndpointMap::new(6);
        map.merge(0, 1).expect("merge");
        map.merge(2, 3).expect("merge");
        // chains 0-1 and 2-3 joined through 1-2.
        let merged = map.merge(1, 2).expect("merge");
        assert_eq!(merged, Merge::Joined(ChainEnds::new(0, 3).expect("ends")));
        assert_eq!(map.opposite(3).expect("opposite"), 0);
        assert_eq!(map.get(1), None);
        assert_eq!(map.get(2), None);
        assert_eq!(map.entries(), 2);
        map.check().expect("consistent");
    }

    #[test]
    fn ends_of_the_same_chain_are_not_merged() {
        let mut map = EndpointMap::new(3);
        map.merge(0, 1).expect("merge");
        map.merge(2, 1).expect("merge");
        assert_eq!(map.merge(0, 2).expect("merge"), Merge::SameChain);
        assert_eq!(map.merge(2, 0).expect("merge"), Merge::SameChain);
        assert_eq!(map.opposite(0).expect("opposite"), 2);
    }

    #[test]
    fn close_requires_opposite_ends() {
        let mut map = EndpointMap::new(5);
        map.merge(0, 1).expect("merge");
        map.merge(2, 3).expect("merge");
        assert!(map.close(0, 2).expect_err("different chains").is_invariant());
        map.close(0, 1).expect("close");
        assert_eq!(map.entries(), 2);
    }

    #[test]
    fn asymmetric_entries_are_detected() {
        let mut map = EndpointMap::new(3);
        map.merge(0, 1).expect("merge");
        map.ends[1] = Some(2);
        assert!(map.opposite(0).expect_err("asymmetric").is_invariant());
        assert!(map.check().is_err());
    }
}
