use crate::{Error, PointId, Result, algo::adjacency::Adjacency, constants::MIN_CYCLE_POINTS};

/// Walks a graph in which every point has exactly two neighbors, starting at
/// point 0 and leaving through its first neighbor.
pub fn linearize(adjacency: &Adjacency) -> Result<Vec<PointId>> {
    let n = adjacency.len();
    if n < MIN_CYCLE_POINTS {
        return Err(Error::invariant(format!("cannot linearize a {n}-point graph")));
    }
    for (id, nb) in adjacency.iter().enumerate() {
        match nb.as_slice() {
            [a, b] if a != b => {}
            other => {
                return Err(Error::invariant(format!(
                    "point {id} has neighbors {other:?}, expected two distinct"
                )));
            }
        }
    }

    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    let mut prev = 0;
    let mut current = adjacency.neighbors(0).as_slice()[0];
    visited[0] = true;
    tour.push(0);

    while tour.len() < n {
        if visited[current] {
            return Err(Error::invariant(format!(
                "walk revisited point {current} after {} of {n} points",
                tour.len()
            )));
        }
        visited[current] = true;
        tour.push(current);

        let next = match adjacency.neighbors(current).as_slice() {
            &[a, b] if a == prev => b,
            &[a, b] if b == prev => a,
            other => {
                return Err(Error::invariant(format!(
                    "point {current} reached from {prev} but lists neighbors {other:?}"
                )));
            }
        };
        prev = current;
        current = next;
    }

    if current != 0 {
        return Err(Error::invariant(format!(
            "walk over {n} points ended at {current} instead of returning to 0"
        )));
    }
    Ok(tour)
}

#[cfg(test)]
mod tests {
    use super::linearize;
    use crate::algo::adjacency::Adjacency;

    fn cycle(order: &[usize]) -> Adjacency {
        let mut adj = Adjacency::new(order.len());
        for w in 0..order.len() {
            adj.connect(order[w], order[(w + 1) % order.len()])
                .expect("edge");
        }
        adj
    }

    #[test]
    fn walks_single_cycle_from_point_zero() {
        let adj = cycle(&[0, 3, 1, 4, 2]);
        let tour = linearize(&adj).expect("tour");
        assert_eq!(tour, vec![0, 3, 1, 4, 2]);
    }

    #[test]
    fn follows_first_neighbor_of_point_zero() {
        let mut adj = Adjacency::new(4);
        adj.connect(0, 2).expect("edge");
        adj.connect(2, 1).expect("edge");
        adj.connect(1, 3).expect("edge");
        adj.connect(3, 0).expect("edge");
        assert_eq!(linearize(&adj).expect("tour"), vec![0, 2, 1, 3]);
    }

    #[test]
    fn two_disjoint_cycles_are_rejected() {
        let mut adj = Adjacency::new(6);
        for (a, b) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            adj.connect(a, b).expect("edge");
        }
        let err = linearize(&adj).expect_err("two cycles");
        assert!(err.is_invariant());
        assert!(err.to_string().contains("revisited"));
    }

    #[test]
    fn missing_degree_is_rejected() {
        let mut adj = Adjacency::new(3);
        adj.connect(0, 1).expect("edge");
        adj.connect(1, 2).expect("edge");
        let err = linearize(&adj).expect_err("open path");
        assert!(err.to_string().contains("expected two distinct"));
    }

    #[test]
    fn tiny_graphs_are_rejected() {
        assert!(linearize(&Adjacency::new(2)).is_err());
    }
}
