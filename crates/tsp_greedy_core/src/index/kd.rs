use std::collections::HashMap;

use kiddo::{KdTree, SquaredEuclidean};

use crate::{
    Point, PointId, Region,
    index::{SpatialIndex, SpatialIndexKind},
};

/// Relative slack on the circumscribed query radius so corner points survive
/// floating-point rounding; results are filtered against the box afterwards.
const RADIUS_SLACK: f64 = 1e-9;

/// kiddo-backed index: a radius query circumscribing the box, then an exact
/// box filter.
///
/// kiddo leaves cannot hold more than a bucket of items at one location, so
/// the tree stores each distinct location once and maps it to its point ids.
pub struct KdTreeIndex<'a> {
    points: &'a [Point],
    tree: KdTree<f64, 2>,
    locations: Vec<Vec<PointId>>,
}

impl<'a> KdTreeIndex<'a> {
    pub fn new(points: &'a [Point]) -> Self {
        let mut slots: HashMap<(u64, u64), usize> = HashMap::with_capacity(points.len());
        let mut locations: Vec<Vec<PointId>> = Vec::new();
        let mut tree: KdTree<f64, 2> = KdTree::with_capacity(points.len());

        for (idx, p) in points.iter().enumerate() {
            // `+ 0.0` folds -0.0 into 0.0 so both share a slot.
            let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
            let slot = *slots.entry(key).or_insert_with(|| {
                tree.add(&[p.x, p.y], locations.len() as u64);
                locations.push(Vec::new());
                locations.len() - 1
            });
            locations[slot].push(idx);
        }

        Self {
            points,
            tree,
            locations,
        }
    }

    /// Distinct coordinates stored in the tree.
    pub fn distinct_locations(&self) -> usize {
        self.locations.len()
    }
}

impl SpatialIndex for KdTreeIndex<'_> {
    fn candidates(&self, id: PointId, region: &Region, out: &mut Vec<PointId>) {
        let center = region.center();
        let radius = region.half_diagonal() * (1.0 + RADIUS_SLACK) + RADIUS_SLACK;
        let hits = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&[center.x, center.y], radius * radius);
        for nn in hits {
            let ids = &self.locations[nn.item as usize];
            let Some(&first) = ids.first() else {
                continue;
            };
            if !region.contains(self.points[first]) {
                continue;
            }
            out.extend(ids.iter().copied().filter(|&p| p != id));
        }
    }

    fn kind(&self) -> SpatialIndexKind {
        SpatialIndexKind::KdTree
    }

    fn log_stats(&self) {
        log::info!(
            "index: kd-tree size={} locations={} points={}",
            self.tree.size(),
            self.distinct_locations(),
            self.points.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::KdTreeIndex;
    use crate::{Point, Region, index::SpatialIndex};

    #[test]
    fn corner_points_are_not_lost() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(-3.0, 3.0),
            Point::new(3.1, 0.0),
        ];
        let index = KdTreeIndex::new(&points);
        let mut found = Vec::new();
        index.candidates(0, &Region::around(points[0], 3.0), &mut found);
        found.sort_unstable();
        assert_eq!(found, vec![1, 2]);
    }

    #[test]
    fn coincident_points_share_one_location() {
        let mut points = vec![Point::new(5.0, 5.0); 100];
        points.push(Point::new(0.0, 0.0));
        points.push(Point::new(-0.0, 0.0));
        let index = KdTreeIndex::new(&points);
        assert_eq!(index.distinct_locations(), 2);

        let mut found = Vec::new();
        index.candidates(7, &Region::around(points[7], 1.0), &mut found);
        found.sort_unstable();
        let expected: Vec<usize> = (0..100).filter(|&p| p != 7).collect();
        assert_eq!(found, expected);

        found.clear();
        index.candidates(100, &Region::around(points[100], 1.0), &mut found);
        assert_eq!(found, vec![101]);
    }
}
