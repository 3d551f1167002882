use kiddo::{ImmutableKdTree, SquaredEuclidean};

use crate::error::{ColorError, MathError, Result};
use crate::math::Point3;

/// Nearest-neighbour lookup over a fixed point set.
///
/// Backed by a bulk-built [`ImmutableKdTree`], which tolerates grid-aligned
/// and duplicated points. Equidistant points resolve to the lowest original
/// index.
#[derive(Debug, Clone)]
pub(crate) struct NodeIndex {
    tree: ImmutableKdTree<f64, 3>,
}

impl NodeIndex {
    /// # Errors
    ///
    /// Returns [`ColorError::EmptyStressField`] for an empty set and
    /// [`MathError::NonFinite`] if a point has a NaN/inf coordinate.
    pub(crate) fn build(points: impl IntoIterator<Item = Point3>) -> Result<Self> {
        let coords: Vec<[f64; 3]> = points.into_iter().map(|p| [p.x, p.y, p.z]).collect();
        if coords.is_empty() {
            return Err(ColorError::EmptyStressField.into());
        }
        if coords.iter().flatten().any(|c| !c.is_finite()) {
            return Err(MathError::NonFinite("FEA node position").into());
        }
        Ok(Self {
            tree: ImmutableKdTree::new_from_slice(&coords),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.size()
    }

    /// Original index of the point closest to `query`.
    #[allow(clippy::cast_possible_truncation)] // items are slice indices
    pub(crate) fn nearest(&self, query: &Point3) -> usize {
        let query = [query.x, query.y, query.z];
        let best = self.tree.nearest_one::<SquaredEuclidean>(&query);
        // The tree returns any one of several equidistant points.
        let lowest = self
            .tree
            .within_unsorted::<SquaredEuclidean>(&query, best.distance)
            .into_iter()
            .map(|n| n.item)
            .min()
            .unwrap_or(best.item);
        lowest as usize
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TankMeshError;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Deterministic scatter of points in `[-50, 50)^3`.
    #[allow(clippy::cast_precision_loss)]
    fn scatter(count: usize, seed: u64) -> Vec<Point3> {
        let mut state = seed;
        let mut next = || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64 * 100.0 - 50.0
        };
        (0..count).map(|_| p(next(), next(), next())).collect()
    }

    fn brute_force(points: &[Point3], q: &Point3) -> usize {
        let mut best = (f64::INFINITY, usize::MAX);
        for (i, pt) in points.iter().enumerate() {
            let candidate = ((pt - q).norm_squared(), i);
            if candidate < best {
                best = candidate;
            }
        }
        best.1
    }

    #[test]
    fn matches_brute_force() {
        let nodes = scatter(100, 7);
        let index = NodeIndex::build(nodes.iter().copied()).unwrap();
        assert_eq!(index.len(), 100);
        for q in scatter(500, 11) {
            assert_eq!(index.nearest(&q), brute_force(&nodes, &q), "query {q:?}");
        }
    }

    #[test]
    fn exact_node_position_returns_that_node() {
        let nodes = scatter(40, 3);
        let index = NodeIndex::build(nodes.iter().copied()).unwrap();
        for (i, n) in nodes.iter().enumerate() {
            assert_eq!(index.nearest(n), i);
        }
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        // Grid-aligned nodes share x; the query is equidistant from 1 and 2.
        let nodes = [p(5.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, -1.0, 0.0)];
        let index = NodeIndex::build(nodes).unwrap();
        assert_eq!(index.nearest(&p(1.0, 0.0, 0.0)), 1);

        let nodes = [p(2.0, 0.0, 0.0), p(-2.0, 0.0, 0.0)];
        let index = NodeIndex::build(nodes).unwrap();
        assert_eq!(index.nearest(&p(0.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn duplicate_nodes_pick_first() {
        let nodes = [p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(3.0, 0.0, 0.0)];
        let index = NodeIndex::build(nodes).unwrap();
        assert_eq!(index.nearest(&p(2.9, 0.0, 0.0)), 1);
    }

    #[test]
    fn grid_with_stacked_duplicates_matches_brute_force() {
        // More copies of one node than a tree leaf holds.
        let mut nodes: Vec<Point3> = (0..1000)
            .map(|i| p(f64::from(i % 10), f64::from(i / 10 % 10), f64::from(i / 100)))
            .collect();
        nodes.extend(std::iter::repeat(p(4.0, 4.0, 4.0)).take(500));
        let index = NodeIndex::build(nodes.iter().copied()).unwrap();
        assert_eq!(index.len(), 1500);

        // Query sits on the stacked node; the grid copy at index 444 comes first.
        assert_eq!(index.nearest(&p(4.0, 4.0, 4.0)), 444);
        assert_eq!(index.nearest(&p(4.01, 4.0, 4.0)), 444);
        for q in scatter(200, 5) {
            let q = p(q.x / 10.0 + 4.5, q.y / 10.0 + 4.5, q.z / 10.0 + 4.5);
            assert_eq!(index.nearest(&q), brute_force(&nodes, &q), "query {q:?}");
        }
    }

    #[test]
    fn single_node_wins_everything() {
        let index = NodeIndex::build([p(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(index.nearest(&p(-100.0, 0.0, 0.0)), 0);
        assert_eq!(index.nearest(&p(100.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn empty_and_non_finite_sets_fail() {
        assert!(matches!(
            NodeIndex::build(Vec::new()),
            Err(TankMeshError::Color(ColorError::EmptyStressField))
        ));
        assert!(matches!(
            NodeIndex::build([p(0.0, f64::NAN, 0.0)]),
            Err(TankMeshError::Math(MathError::NonFinite(_)))
        ));
    }
}
