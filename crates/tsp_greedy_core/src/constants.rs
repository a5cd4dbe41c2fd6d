/// A cycle needs at least three distinct points.
pub(crate) const MIN_CYCLE_POINTS: usize = 3;

/// Half-width of the first query box; doubled after every pass.
pub(crate) const DEFAULT_INITIAL_RADIUS: f64 = 1.0;
pub(crate) const RADIUS_GROWTH: f64 = 2.0;

pub(crate) const DEFAULT_QUADTREE_BUCKET: usize = 8;
/// Coincident points can never be separated, so subdivision stops here.
pub(crate) const MAX_QUADTREE_DEPTH: usize = 24;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "config.txt";
pub(crate) const STDIO_PATH: &str = "-";
