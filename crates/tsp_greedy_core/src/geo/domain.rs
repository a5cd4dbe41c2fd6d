use crate::{Error, Point, Result};

/// Axis-aligned bounding box of the whole point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Domain {
    pub fn from_points(points: &[Point]) -> Result<Self> {
        let Some(first) = points.first() else {
            return Err(Error::invalid_input("cannot compute domain of an empty point set"));
        };
        let mut domain = Self {
            xmin: first.x,
            xmax: first.x,
            ymin: first.y,
            ymax: first.y,
        };
        for p in &points[1..] {
            domain.xmin = domain.xmin.min(p.x);
            domain.xmax = domain.xmax.max(p.x);
            domain.ymin = domain.ymin.min(p.y);
            domain.ymax = domain.ymax.max(p.y);
        }
        Ok(domain)
    }

    pub fn xdim(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn ydim(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// `xdim / ydim`; infinite for a horizontal line, NaN for a single location.
    pub fn aspect_ratio(&self) -> f64 {
        self.xdim() / self.ydim()
    }

    pub fn max_extent(&self) -> f64 {
        self.xdim().max(self.ydim())
    }

    /// A box of this half-width centered on any point of the domain contains
    /// the entire domain.
    pub fn is_covered_by_radius(&self, radius: f64) -> bool {
        radius >= self.max_extent()
    }

    pub(crate) fn log_summary(&self) {
        log::info!(
            "domain: aspect_ratio={:.4} xdim={} ydim={}",
            self.aspect_ratio(),
            self.xdim(),
            self.ydim()
        );
    }
}
