//! Spatial indexes answering "which points lie inside this region" queries.

mod kd;
mod quadtree;

use std::time::Instant;

use tsp_greedy_derive::CliValue;

pub use kd::KdTreeIndex;
pub use quadtree::PointQuadtree;

use crate::{Domain, Point, PointId, Region};

/// Candidate lookup used by the matching engine.
///
/// Implementations may return points outside `region` but must never miss a
/// point inside it. The queried point itself is never returned.
pub trait SpatialIndex: Send + Sync {
    /// Appends candidates for `id` within `region` to `out`.
    fn candidates(&self, id: PointId, region: &Region, out: &mut Vec<PointId>);

    fn kind(&self) -> SpatialIndexKind;

    fn log_stats(&self) {}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "spatial-index")]
pub enum SpatialIndexKind {
    Quadtree,
    #[cli(alias = "kd")]
    #[cli(alias = "kdtree")]
    KdTree,
}

pub fn build_index<'a>(
    kind: SpatialIndexKind,
    points: &'a [Point],
    domain: &Domain,
    bucket_capacity: usize,
) -> Box<dyn SpatialIndex + 'a> {
    let now = Instant::now();
    let index: Box<dyn SpatialIndex + 'a> = match kind {
        SpatialIndexKind::Quadtree => {
            Box::new(PointQuadtree::new(points, domain, bucket_capacity))
        }
        SpatialIndexKind::KdTree => Box::new(KdTreeIndex::new(points)),
    };
    log::info!(
        "index: built kind={kind} n={} time={:.3}s",
        points.len(),
        now.elapsed().as_secs_f32()
    );
    index.log_stats();
    index
}
