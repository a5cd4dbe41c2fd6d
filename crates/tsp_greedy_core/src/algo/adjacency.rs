use crate::{Error, PointId, Result};

/// Up to two neighbors of a point, in the order the edges were accepted.
/// The number of filled slots is the point's degree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Neighbors {
    slots: [PointId; 2],
    len: u8,
}

impl Neighbors {
    #[inline]
    pub fn degree(&self) -> u8 {
        self.len
    }

    #[inline]
    pub fn as_slice(&self) -> &[PointId] {
        &self.slots[..usize::from(self.len)]
    }

    /// The neighbor of a degree-1 point.
    #[inline]
    pub fn only(&self) -> Option<PointId> {
        (self.len == 1).then_some(self.slots[0])
    }

    fn push(&mut self, owner: PointId, p: PointId) -> Result<()> {
        if self.len >= 2 {
            return Err(Error::invariant(format!(
                "point {owner} would exceed degree 2 (neighbors {:?}, new {p})",
                self.as_slice()
            )));
        }
        self.slots[usize::from(self.len)] = p;
        self.len += 1;
        Ok(())
    }
}

/// Degree table and adjacency lists of the graph under construction.
#[derive(Clone, Debug)]
pub struct Adjacency {
    neighbors: Vec<Neighbors>,
}

impl Adjacency {
    pub fn new(n: usize) -> Self {
        Self {
            neighbors: vec![Neighbors::default(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    #[inline]
    pub fn degree(&self, id: PointId) -> u8 {
        self.neighbors[id].degree()
    }

    #[inline]
    pub fn neighbors(&self, id: PointId) -> &Neighbors {
        &self.neighbors[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbors> {
        self.neighbors.iter()
    }

    /// Adds the undirected edge `a-b`.
    pub fn connect(&mut self, a: PointId, b: PointId) -> Result<()> {
        if a == b {
            return Err(Error::invariant(format!("self-edge on point {a}")));
        }
        self.neighbors[a].push(a, b)?;
        self.neighbors[b].push(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::Adjacency;

    #[test]
    fn connect_records_both_directions_in_order() {
        let mut adj = Adjacency::new(3);
        adj.connect(0, 1).expect("edge");
        adj.connect(0, 2).expect("edge");
        assert_eq!(adj.neighbors(0).as_slice(), &[1, 2]);
        assert_eq!(adj.neighbors(1).as_slice(), &[0]);
        assert_eq!(adj.neighbors(1).only(), Some(0));
        assert_eq!(adj.neighbors(0).only(), None);
        assert_eq!(adj.degree(2), 1);
    }

    #[test]
    fn third_edge_is_an_invariant_violation() {
        let mut adj = Adjacency::new(4);
        adj.connect(0, 1).expect("edge");
        adj.connect(0, 2).expect("edge");
        let err = adj.connect(0, 3).expect_err("degree 3");
        assert!(err.is_invariant());
        assert!(err.to_string().contains("exceed degree 2"));
    }

    #[test]
    fn self_edge_is_rejected() {
        let mut adj = Adjacency::new(2);
        assert!(adj.connect(1, 1).expect_err("self edge").is_invariant());
        assert_eq!(adj.degree(1), 0);
    }
}
