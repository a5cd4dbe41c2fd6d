use crate::{Point, PointId};

/// Axis-aligned query box, bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Region {
    pub fn around(center: Point, radius: f64) -> Self {
        Self {
            xmin: center.x - radius,
            xmax: center.x + radius,
            ymin: center.y - radius,
            ymax: center.y + radius,
        }
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    #[inline]
    pub fn intersects(&self, xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> bool {
        self.xmin <= xmax && xmin <= self.xmax && self.ymin <= ymax && ymin <= self.ymax
    }

    pub fn center(&self) -> Point {
        Point::new(
            0.5 * (self.xmin + self.xmax),
            0.5 * (self.ymin + self.ymax),
        )
    }

    pub fn half_diagonal(&self) -> f64 {
        0.5 * (self.xmax - self.xmin).hypot(self.ymax - self.ymin)
    }
}

/// Builds the square query region centered on a point.
pub struct RegionBuilder<'a> {
    points: &'a [Point],
}

impl<'a> RegionBuilder<'a> {
    pub fn new(points: &'a [Point]) -> Self {
        Self { points }
    }

    #[inline]
    pub fn region(&self, id: PointId, radius: f64) -> Region {
        Region::around(self.points[id], radius)
    }
}
