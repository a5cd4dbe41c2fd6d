//! Greedy TSP tour construction by expanding-radius matching over a spatial
//! index. Includes coordinate loading, multi-run best-of selection and tour
//! output.

mod algo;
mod constants;
mod error;
mod geo;
mod index;
mod io;
pub mod logging;
mod point;
mod solver;
mod tour;

pub use algo::{
    adjacency::{Adjacency, Neighbors},
    endpoints::{ChainEnds, EndpointMap, Merge},
    linearize::linearize,
    matching::{Construction, ConstructionSession, MatchStats},
    permutation::{Permutation, Sequence},
};
pub use error::{Error, Result};
pub use geo::{
    domain::Domain,
    length::LengthCalculator,
    region::{Region, RegionBuilder},
};
pub use index::{KdTreeIndex, PointQuadtree, SpatialIndex, SpatialIndexKind, build_index};
pub use io::{
    config::ConfigFile,
    input::{parse_points, read_points},
    options::{LogFormat, LogLevel, TourOptions},
    output::{write_tour, write_tour_to},
};
pub use point::{Length, Point, PointId};
pub use solver::{TourResult, solve};
pub use tour::{Tour, TourMetrics};
