use crate::{Length, Point, PointId};

/// Integral edge lengths: Euclidean distance rounded to the nearest integer.
pub struct LengthCalculator<'a> {
    points: &'a [Point],
}

impl<'a> LengthCalculator<'a> {
    pub fn new(points: &'a [Point]) -> Self {
        Self { points }
    }

    #[inline]
    pub fn length(&self, a: PointId, b: PointId) -> Length {
        (self.points[a].dist(&self.points[b]) + 0.5) as Length
    }

    /// Sum over consecutive pairs including the closing edge `(last, first)`.
    pub fn tour_length(&self, tour: &[PointId]) -> Length {
        let Some(&last) = tour.last() else {
            return 0;
        };
        let mut prev = last;
        let mut total: Length = 0;
        for &id in tour {
            total += self.length(prev, id);
            prev = id;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::LengthCalculator;
    use crate::Point;

    #[test]
    fn length_rounds_to_nearest_integer() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.4, 0.0),
            Point::new(0.6, 0.0),
        ];
        let calc = LengthCalculator::new(&points);
        assert_eq!(calc.length(0, 1), 14);
        assert_eq!(calc.length(0, 2), 0);
        assert_eq!(calc.length(0, 3), 1);
        assert_eq!(calc.length(1, 0), calc.length(0, 1));
    }

    #[test]
    fn tour_length_closes_cycle() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ];
        let calc = LengthCalculator::new(&points);
        assert_eq!(calc.tour_length(&[0, 1, 2, 3]), 4);
        assert_eq!(calc.tour_length(&[]), 0);
    }

    #[test]
    fn right_triangle_matches_pairwise_sum() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        let calc = LengthCalculator::new(&points);
        assert_eq!(calc.tour_length(&[0, 1, 2]), 10 + 14 + 10);
    }
}
