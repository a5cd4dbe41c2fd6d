use tsp_greedy_derive::New;

use crate::{Length, PointId, geo::length::LengthCalculator};

/// Closed tour: every point id once, last connected back to first.
#[derive(Clone, Debug, Default, Eq, PartialEq, New)]
pub struct Tour {
    pub order: Vec<PointId>,
    pub length: Length,
}

impl Tour {
    pub fn n(&self) -> usize {
        self.order.len()
    }

    /// True when the order visits each of `0..n` exactly once.
    pub fn is_permutation(&self, n: usize) -> bool {
        if self.order.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        self.order
            .iter()
            .all(|&id| id < n && !std::mem::replace(&mut seen[id], true))
    }

    pub fn tour_metrics(&self, calc: &LengthCalculator<'_>) -> TourMetrics {
        let n = self.n();
        if n < 2 {
            log::info!("metrics: n < 2 so there's nothing to report");
            return TourMetrics::default();
        }

        let mut total: Length = 0;
        let mut longest: Length = 0;
        for i in 0..n {
            let d = calc.length(self.order[i], self.order[(i + 1) % n]);
            total += d;
            longest = longest.max(d);
        }
        let average = total as f64 / n as f64;

        log::info!("metrics: n={n} total={total} longest={longest} avg={average:.2}");

        TourMetrics::new(total, longest, average)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, New)]
pub struct TourMetrics {
    pub total: Length,
    pub longest: Length,
    pub average: f64,
}

#[cfg(test)]
mod tests {
    use super::Tour;
    use crate::{Point, geo::length::LengthCalculator};

    #[test]
    fn is_permutation_detects_duplicates_and_gaps() {
        assert!(Tour::new(vec![2, 0, 1], 0).is_permutation(3));
        assert!(!Tour::new(vec![2, 2, 1], 0).is_permutation(3));
        assert!(!Tour::new(vec![0, 1, 3], 0).is_permutation(3));
        assert!(!Tour::new(vec![0, 1], 0).is_permutation(3));
    }

    #[test]
    fn metrics_include_closing_edge() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 4.0),
        ];
        let calc = LengthCalculator::new(&points);
        let tour = Tour::new(vec![0, 1, 2], 12);
        let metrics = tour.tour_metrics(&calc);
        assert_eq!(metrics.total, 12);
        assert_eq!(metrics.longest, 5);
        assert!((metrics.average - 4.0).abs() < 1e-12);
        assert_eq!(metrics.total, calc.tour_length(&tour.order));
    }

    #[test]
    fn builders_replace_fields() {
        let tour = Tour::default().with_order(vec![1, 0, 2]).with_length(7);
        assert_eq!(tour.order, vec![1, 0, 2]);
        assert_eq!(tour.length, 7);
    }
}
