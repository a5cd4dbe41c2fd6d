use crate::{
    Domain, Point, PointId, Region,
    constants::MAX_QUADTREE_DEPTH,
    index::{SpatialIndex, SpatialIndexKind},
};

#[derive(Clone, Copy, Debug)]
struct Bounds {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl Bounds {
    fn mid(&self) -> (f64, f64) {
        (0.5 * (self.xmin + self.xmax), 0.5 * (self.ymin + self.ymax))
    }

    /// Quadrant order: bit 0 set for the upper x half, bit 1 for the upper y half.
    fn quadrant(&self, q: usize) -> Self {
        let (mx, my) = self.mid();
        let (xmin, xmax) = if q & 1 == 0 { (self.xmin, mx) } else { (mx, self.xmax) };
        let (ymin, ymax) = if q & 2 == 0 { (self.ymin, my) } else { (my, self.ymax) };
        Self { xmin, xmax, ymin, ymax }
    }

    fn quadrant_of(&self, p: Point) -> usize {
        let (mx, my) = self.mid();
        usize::from(p.x >= mx) | (usize::from(p.y >= my) << 1)
    }
}

#[derive(Debug)]
enum NodeKind {
    Leaf(Vec<PointId>),
    Branch([usize; 4]),
}

#[derive(Debug)]
struct QuadNode {
    bounds: Bounds,
    kind: NodeKind,
}

/// Bucketed point quadtree stored as a flat node arena.
pub struct PointQuadtree<'a> {
    points: &'a [Point],
    nodes: Vec<QuadNode>,
    bucket_capacity: usize,
}

impl<'a> PointQuadtree<'a> {
    pub fn new(points: &'a [Point], domain: &Domain, bucket_capacity: usize) -> Self {
        let mut tree = Self {
            points,
            nodes: Vec::new(),
            bucket_capacity: bucket_capacity.max(1),
        };
        let root = Bounds {
            xmin: domain.xmin,
            xmax: domain.xmax,
            ymin: domain.ymin,
            ymax: domain.ymax,
        };
        tree.build(root, (0..points.len()).collect(), 0);
        tree
    }

    fn build(&mut self, bounds: Bounds, ids: Vec<PointId>, depth: usize) -> usize {
        let node = self.nodes.len();
        if ids.len() <= self.bucket_capacity || depth >= MAX_QUADTREE_DEPTH {
            self.nodes.push(QuadNode {
                bounds,
                kind: NodeKind::Leaf(ids),
            });
            return node;
        }

        self.nodes.push(QuadNode {
            bounds,
            kind: NodeKind::Branch([0; 4]),
        });
        let mut parts: [Vec<PointId>; 4] = Default::default();
        for id in ids {
            parts[bounds.quadrant_of(self.points[id])].push(id);
        }

        let mut children = [0; 4];
        for (q, part) in parts.into_iter().enumerate() {
            children[q] = self.build(bounds.quadrant(q), part, depth + 1);
        }
        self.nodes[node].kind = NodeKind::Branch(children);
        node
    }

    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn count_points(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| match &node.kind {
                NodeKind::Leaf(ids) => ids.len(),
                NodeKind::Branch(_) => 0,
            })
            .sum()
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let NodeKind::Branch(children) = &self.nodes[node].kind {
                stack.extend(children.iter().map(|&c| (c, depth + 1)));
            }
        }
        deepest
    }
}

impl SpatialIndex for PointQuadtree<'_> {
    fn candidates(&self, id: PointId, region: &Region, out: &mut Vec<PointId>) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            let QuadNode { bounds, kind } = &self.nodes[node];
            if !region.intersects(bounds.xmin, bounds.xmax, bounds.ymin, bounds.ymax) {
                continue;
            }
            match kind {
                NodeKind::Leaf(ids) => out.extend(
                    ids.iter()
                        .copied()
                        .filter(|&p| p != id && region.contains(self.points[p])),
                ),
                NodeKind::Branch(children) => stack.extend_from_slice(children),
            }
        }
    }

    fn kind(&self) -> SpatialIndexKind {
        SpatialIndexKind::Quadtree
    }

    fn log_stats(&self) {
        let nodes = self.count_nodes();
        let points = self.count_points();
        log::info!(
            "index: quadtree nodes={nodes} points={points} node_ratio={:.4} depth={}",
            nodes as f64 / points.max(1) as f64,
            self.depth()
        );
    }
}
