use rand::{Rng, seq::SliceRandom};

use crate::PointId;

/// Position of a point in the randomized processing order.
pub type Sequence = usize;

/// A uniformly random bijection over point ids and its inverse.
#[derive(Clone, Debug)]
pub struct Permutation {
    random_mapping: Vec<PointId>,
    sequence_mapping: Vec<Sequence>,
}

impl Permutation {
    pub fn shuffled<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut random_mapping: Vec<PointId> = (0..n).collect();
        random_mapping.shuffle(rng);

        let mut sequence_mapping = vec![0; n];
        for (seq, &id) in random_mapping.iter().enumerate() {
            sequence_mapping[id] = seq;
        }

        Self {
            random_mapping,
            sequence_mapping,
        }
    }

    #[inline]
    pub fn point(&self, seq: Sequence) -> PointId {
        self.random_mapping[seq]
    }

    #[inline]
    pub fn sequence(&self, id: PointId) -> Sequence {
        self.sequence_mapping[id]
    }

    pub fn len(&self) -> usize {
        self.random_mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.random_mapping.is_empty()
    }
}
