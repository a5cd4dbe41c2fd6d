//! Expanding-radius greedy matching.
//!
//! Every pass visits the still-open points in random order and gives each of
//! them at most one new edge: the first candidate inside the current query box
//! (in shuffled order) that keeps the graph a union of simple paths. The box
//! doubles after every pass until a single chain spans all points, whose two
//! ends are then joined to close the tour.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    Domain, Error, Point, PointId, Result,
    algo::{
        adjacency::Adjacency,
        endpoints::{EndpointMap, Merge},
        permutation::{Permutation, Sequence},
    },
    constants::{MIN_CYCLE_POINTS, RADIUS_GROWTH},
    geo::region::RegionBuilder,
    index::SpatialIndex,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchStats {
    pub passes: usize,
    pub edges: usize,
    /// Total points returned by the spatial index over all queries.
    pub candidates: usize,
    pub same_chain_rejections: usize,
    pub duplicate_edge_rejections: usize,
}

/// Graph produced by a finished construction: every point has degree 2.
#[derive(Debug)]
pub struct Construction {
    pub adjacency: Adjacency,
    pub stats: MatchStats,
    pub final_radius: f64,
}

/// All mutable state of one tour construction. Only the session writes it.
pub struct ConstructionSession<'a> {
    index: &'a dyn SpatialIndex,
    regions: RegionBuilder<'a>,
    domain: &'a Domain,
    permutation: Permutation,
    adjacency: Adjacency,
    endpoints: EndpointMap,
    remaining: Vec<Sequence>,
    radius: f64,
    rng: StdRng,
    candidates: Vec<PointId>,
    stats: MatchStats,
}

impl<'a> ConstructionSession<'a> {
    pub fn new(
        points: &'a [Point],
        domain: &'a Domain,
        index: &'a dyn SpatialIndex,
        seed: u64,
        initial_radius: f64,
    ) -> Result<Self> {
        let n = points.len();
        if n < MIN_CYCLE_POINTS {
            return Err(Error::invalid_input(format!(
                "a tour needs at least {MIN_CYCLE_POINTS} points, got {n}"
            )));
        }
        if !(initial_radius.is_finite() && initial_radius > 0.0) {
            return Err(Error::invalid_input(format!(
                "initial radius must be finite and > 0, got {initial_radius}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let permutation = Permutation::shuffled(n, &mut rng);

        Ok(Self {
            index,
            regions: RegionBuilder::new(points),
            domain,
            permutation,
            adjacency: Adjacency::new(n),
            endpoints: EndpointMap::new(n),
            remaining: (0..n).collect(),
            radius: initial_radius,
            rng,
            candidates: Vec::new(),
            stats: MatchStats::default(),
        })
    }

    /// Runs passes until one chain remains, then closes it into a cycle.
    pub fn run(mut self) -> Result<Construction> {
        while self.remaining.len() > 2 {
            self.pass()?;
        }
        self.close()?;

        log::debug!(
            "matching: done passes={} edges={} candidates={} same_chain_rejections={} duplicate_rejections={} final_radius={}",
            self.stats.passes,
            self.stats.edges,
            self.stats.candidates,
            self.stats.same_chain_rejections,
            self.stats.duplicate_edge_rejections,
            self.radius
        );

        Ok(Construction {
            adjacency: self.adjacency,
            stats: self.stats,
            final_radius: self.radius,
        })
    }

    /// One sweep over the open points at the current radius. Returns the
    /// number of accepted edges.
    pub(crate) fn pass(&mut self) -> Result<usize> {
        let mut accepted = 0;
        let mut finished: Vec<Sequence> = Vec::new();

        for pos in 0..self.remaining.len() {
            let i = self.permutation.point(self.remaining[pos]);
            if self.adjacency.degree(i) == 2 {
                continue;
            }
            if let Some(p) = self.extend_from(i)? {
                accepted += 1;
                for id in [i, p] {
                    if self.adjacency.degree(id) == 2 {
                        finished.push(self.permutation.sequence(id));
                    }
                }
            }
        }

        finished.sort_unstable();
        let before = self.remaining.len();
        self.remaining
            .retain(|seq| finished.binary_search(seq).is_err());
        if before - self.remaining.len() != finished.len() {
            return Err(Error::invariant(format!(
                "pass finished {} points but {} left the open set",
                finished.len(),
                before - self.remaining.len()
            )));
        }
        if let Some(&seq) = self
            .remaining
            .iter()
            .find(|&&seq| self.adjacency.degree(self.permutation.point(seq)) == 2)
        {
            return Err(Error::invariant(format!(
                "point {} has degree 2 but is still open",
                self.permutation.point(seq)
            )));
        }

        self.stats.passes += 1;
        log::debug!(
            "matching: pass={} radius={} accepted={accepted} open={}",
            self.stats.passes,
            self.radius,
            self.remaining.len()
        );

        if accepted == 0
            && self.remaining.len() > 2
            && self.domain.is_covered_by_radius(self.radius)
        {
            return Err(Error::invariant(format!(
                "no edge accepted at radius {} covering the whole domain with {} open points",
                self.radius,
                self.remaining.len()
            )));
        }

        self.radius *= RADIUS_GROWTH;
        Ok(accepted)
    }

    /// Tries to give `i` one new edge. Returns the accepted neighbor.
    fn extend_from(&mut self, i: PointId) -> Result<Option<PointId>> {
        let region = self.regions.region(i, self.radius);
        let mut candidates = std::mem::take(&mut self.candidates);
        candidates.clear();
        self.index.candidates(i, &region, &mut candidates);
        self.stats.candidates += candidates.len();
        // Index order differs between implementations; the shuffle must not.
        candidates.sort_unstable();
        candidates.shuffle(&mut self.rng);

        let mut accepted = None;
        for &p in &candidates {
            if self.try_connect(i, p)? {
                accepted = Some(p);
                break;
            }
        }

        self.candidates = candidates;
        Ok(accepted)
    }

    /// Acceptance filter. On success the edge `i-p` is in the graph and the
    /// endpoint map describes the merged chain.
    fn try_connect(&mut self, i: PointId, p: PointId) -> Result<bool> {
        if p == i || self.adjacency.degree(p) == 2 {
            return Ok(false);
        }
        if self.adjacency.neighbors(i).only() == Some(p)
            || self.adjacency.neighbors(p).only() == Some(i)
        {
            self.stats.duplicate_edge_rejections += 1;
            return Ok(false);
        }
        self.check_endpoint(i)?;
        self.check_endpoint(p)?;

        match self.endpoints.merge(i, p)? {
            Merge::SameChain => {
                self.stats.same_chain_rejections += 1;
                Ok(false)
            }
            Merge::Joined(_) => {
                self.adjacency.connect(i, p)?;
                self.stats.edges += 1;
                Ok(true)
            }
        }
    }

    /// Degree-0 points have no endpoint entry, degree-1 points must have one.
    fn check_endpoint(&self, id: PointId) -> Result<()> {
        match (self.adjacency.degree(id), self.endpoints.get(id)) {
            (0, None) | (1, Some(_)) => Ok(()),
            (degree, entry) => Err(Error::invariant(format!(
                "point {id} has degree {degree} but endpoint entry {entry:?}"
            ))),
        }
    }

    fn close(&mut self) -> Result<()> {
        let &[a, b] = self.remaining.as_slice() else {
            return Err(Error::invariant(format!(
                "expected 2 open points before closing, found {}",
                self.remaining.len()
            )));
        };
        let (a, b) = (self.permutation.point(a), self.permutation.point(b));
        self.endpoints.close(a, b)?;
        self.adjacency.connect(a, b)?;
        self.stats.edges += 1;
        self.remaining.clear();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn open_points(&self) -> usize {
        self.remaining.len()
    }

    #[cfg(test)]
    pub(crate) fn open_sequences(&self) -> &[Sequence] {
        &self.remaining
    }

    #[cfg(test)]
    pub(crate) fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    #[cfg(test)]
    pub(crate) fn endpoints(&self) -> &EndpointMap {
        &self.endpoints
    }

    #[cfg(test)]
    pub(crate) fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::ConstructionSession;
    use crate::{
        Domain, Point, PointId, Region,
        index::{PointQuadtree, SpatialIndex, SpatialIndexKind},
    };

    fn random_points(n: usize, seed: u64) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Point::new(rng.random_range(0.0..10_000.0), rng.random_range(0.0..10_000.0)))
            .collect()
    }

    fn session<'a>(
        points: &'a [Point],
        domain: &'a Domain,
        index: &'a PointQuadtree<'a>,
        seed: u64,
    ) -> ConstructionSession<'a> {
        ConstructionSession::new(points, domain, index, seed, 1.0).expect("session")
    }

    /// Counts points reachable from `start` without closing a cycle, and
    /// whether the component is a cycle.
    fn component(adjacency: &crate::algo::adjacency::Adjacency, start: PointId) -> (usize, bool) {
        let mut seen = vec![false; adjacency.len()];
        let mut stack = vec![start];
        let mut size = 0;
        let mut degree_sum = 0;
        while let Some(id) = stack.pop() {
            if seen[id] {
                continue;
            }
            seen[id] = true;
            size += 1;
            degree_sum += usize::from(adjacency.degree(id));
            stack.extend(adjacency.neighbors(id).as_slice().iter().copied());
        }
        // a connected graph is a cycle when edges == vertices
        (size, degree_sum / 2 == size)
    }

    #[test]
    fn every_point_ends_with_degree_two() {
        let points = random_points(1_000, 1);
        let domain = Domain::from_points(&points).expect("domain");
        let index = PointQuadtree::new(&points, &domain, 8);

        let construction = session(&points, &domain, &index, 5).run().expect("construction");
        assert!(construction.adjacency.iter().all(|nb| nb.degree() == 2));
        assert_eq!(construction.stats.edges, points.len());
        assert_eq!(component(&construction.adjacency, 0), (points.len(), true));
    }

    #[test]
    fn invariants_hold_after_every_pass() {
        let points = random_points(600, 2);
        let domain = Domain::from_points(&points).expect("domain");
        let index = PointQuadtree::new(&points, &domain, 8);
        let mut session = session(&points, &domain, &index, 9);

        let mut last_open = session.open_points();
        while session.open_points() > 2 {
            session.pass().expect("pass");
            session.endpoints().check().expect("endpoint map consistent");

            let adjacency = session.adjacency();
            assert!(adjacency.iter().all(|nb| nb.degree() <= 2));
            for id in 0..points.len() {
                let (size, is_cycle) = component(adjacency, id);
                assert!(!is_cycle, "premature cycle of {size} points through {id}");
                if let Some(other) = session.endpoints().get(id) {
                    assert_ne!(other, id);
                    assert_eq!(adjacency.degree(id), 1);
                }
            }

            assert!(session.open_points() <= last_open);
            last_open = session.open_points();
        }
        assert_eq!(session.open_points(), 2);
    }

    #[test]
    fn open_set_holds_exactly_the_unfinished_sequences() {
        let points = random_points(300, 12);
        let domain = Domain::from_points(&points).expect("domain");
        let index = PointQuadtree::new(&points, &domain, 8);
        let mut session = session(&points, &domain, &index, 3);

        while session.open_points() > 2 {
            session.pass().expect("pass");
            let mut expected: Vec<usize> = (0..points.len())
                .filter(|&id| session.adjacency().degree(id) < 2)
                .map(|id| session.permutation().sequence(id))
                .collect();
            expected.sort_unstable();
            assert_eq!(session.open_sequences(), expected.as_slice());
        }
    }

    #[test]
    fn same_chain_rejection_is_exercised() {
        let mut rejections = 0;
        for seed in 0..5 {
            let points = random_points(400, 100 + seed);
            let domain = Domain::from_points(&points).expect("domain");
            let index = PointQuadtree::new(&points, &domain, 8);
            let construction = session(&points, &domain, &index, seed).run().expect("run");
            rejections += construction.stats.same_chain_rejections;
        }
        assert!(rejections > 0);
    }

    #[test]
    fn fewer_than_three_points_is_an_input_error() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let domain = Domain::from_points(&points).expect("domain");
        let index = PointQuadtree::new(&points, &domain, 8);
        let err = ConstructionSession::new(&points, &domain, &index, 0, 1.0)
            .err()
            .expect("two points must be rejected");
        assert!(matches!(err, crate::Error::InvalidInput(_)));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let points = random_points(5, 0);
        let domain = Domain::from_points(&points).expect("domain");
        let index = PointQuadtree::new(&points, &domain, 8);
        assert!(ConstructionSession::new(&points, &domain, &index, 0, 0.0).is_err());
        assert!(ConstructionSession::new(&points, &domain, &index, 0, f64::NAN).is_err());
    }

    #[test]
    fn coincident_points_still_form_a_cycle() {
        let mut points = vec![Point::new(3.0, 3.0); 10];
        points.extend(random_points(20, 4));
        let domain = Domain::from_points(&points).expect("domain");
        let index = PointQuadtree::new(&points, &domain, 2);
        let construction = session(&points, &domain, &index, 1).run().expect("run");
        assert_eq!(component(&construction.adjacency, 0), (points.len(), true));
    }

    struct BlindIndex;

    impl SpatialIndex for BlindIndex {
        fn candidates(&self, _id: PointId, _region: &Region, _out: &mut Vec<PointId>) {}

        fn kind(&self) -> SpatialIndexKind {
            SpatialIndexKind::Quadtree
        }
    }

    #[test]
    fn index_false_negatives_fail_fast() {
        let points = random_points(10, 6);
        let domain = Domain::from_points(&points).expect("domain");
        let err = ConstructionSession::new(&points, &domain, &BlindIndex, 0, 1.0)
            .expect("session")
            .run()
            .expect_err("blind index cannot make progress");
        assert!(err.is_invariant());
        assert!(err.to_string().contains("no edge accepted"));
    }
}
