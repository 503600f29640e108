use std::collections::VecDeque;

use voronoi_map::geom::{polygon_area, polygon_centroid};
use voronoi_map::{
    Cell, DEFAULT_CELL_TOLERANCE, DEFAULT_CONVERGENCE_RATIO, DEFAULT_MAX_ITERATIONS, MapError,
    Point, VoronoiMap,
};

use crate::error::VinylError;
use crate::hierarchy::Hierarchy;

/// Splits one polygon into cells proportional to `weights`.
///
/// `salt` differs per parent node so sibling groups do not share the same
/// random start. Implementations must be deterministic for equal inputs.
pub trait LayoutEngine {
    fn partition(&self, clip: &[Point], weights: &[f64], salt: u64) -> Result<Vec<Cell>, MapError>;
}

/// Weighted Voronoi partition at every level of the tree.
#[derive(Clone, Debug)]
pub struct VoronoiTreemap {
    seed: u64,
    convergence_ratio: f64,
    max_iterations: usize,
    cell_tolerance: f64,
}

impl VoronoiTreemap {
    pub fn new(seed: u64) -> Self {
        VoronoiTreemap {
            seed,
            convergence_ratio: DEFAULT_CONVERGENCE_RATIO,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cell_tolerance: DEFAULT_CELL_TOLERANCE,
        }
    }

    pub fn convergence_ratio(mut self, ratio: f64) -> Self {
        self.convergence_ratio = ratio;
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn cell_tolerance(mut self, tolerance: f64) -> Self {
        self.cell_tolerance = tolerance;
        self
    }
}

impl LayoutEngine for VoronoiTreemap {
    fn partition(&self, clip: &[Point], weights: &[f64], salt: u64) -> Result<Vec<Cell>, MapError> {
        let map = VoronoiMap::new(clip.to_vec())
            .seed(self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .convergence_ratio(self.convergence_ratio)
            .max_iterations(self.max_iterations)
            .cell_tolerance(self.cell_tolerance);
        Ok(map.compute(weights)?.cells)
    }
}

/// Assign a polygon and site to every node, top down.
///
/// The root takes `clip` as is; a bad boundary is an error. A nested cell that
/// cannot be split leaves its children without polygons and is only logged.
pub fn layout(
    tree: &mut Hierarchy,
    clip: &[Point],
    engine: &dyn LayoutEngine,
) -> Result<(), VinylError> {
    if clip.len() < 3 || polygon_area(clip) <= f64::EPSILON {
        return Err(MapError::DegenerateClip.into());
    }
    let root = tree.root();
    {
        let n = tree.node_mut(root);
        n.polygon = clip.to_vec();
        n.site = polygon_centroid(clip);
    }

    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        let children = tree.children(id).to_vec();
        if children.is_empty() {
            continue;
        }
        let polygon = tree.node(id).polygon.clone();
        if polygon.is_empty() {
            continue;
        }
        let weights = children
            .iter()
            .map(|c| tree.node(*c).weight)
            .collect::<Vec<_>>();
        let cells = match engine.partition(&polygon, &weights, id.0 as u64) {
            Ok(cells) => cells,
            Err(e) if id == root => return Err(e.into()),
            Err(e) => {
                log::warn!("cannot split {:?}: {e}", tree.node(id).key);
                continue;
            }
        };
        if cells.len() != children.len() {
            log::warn!(
                "split of {:?} gave {} cells for {} children",
                tree.node(id).key,
                cells.len(),
                children.len()
            );
        }
        for (child, cell) in children.iter().zip(cells) {
            let n = tree.node_mut(*child);
            n.site = (!cell.polygon.is_empty()).then_some(cell.site);
            n.polygon = cell.polygon;
            queue.push_back(*child);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::nest_by_format;
    use crate::record::Record;
    use voronoi_map::geom::{polygon_contains, rect};

    fn tree() -> Hierarchy {
        Hierarchy::build(&nest_by_format(&[
            Record::new("A", "F1", 100.0),
            Record::new("B", "F1", 50.0),
            Record::new("C", "F2", 200.0),
        ]))
    }

    fn area_of(t: &Hierarchy, id: crate::hierarchy::NodeId) -> f64 {
        polygon_area(&t.node(id).polygon)
    }

    #[test]
    fn children_tile_their_parent() {
        let mut t = tree();
        let clip = rect(0.0, 0.0, 400.0, 300.0);
        layout(&mut t, &clip, &VoronoiTreemap::new(7)).unwrap();
        for id in t.descendants() {
            let n = t.node(id);
            assert!(!n.polygon.is_empty(), "{} has no polygon", n.key);
            let site = n.site.unwrap();
            assert!(polygon_contains(&n.polygon, site) || n.polygon.contains(&site));
            if !n.is_leaf() {
                let sum: f64 = n.children.iter().map(|c| area_of(&t, *c)).sum();
                assert!((sum - area_of(&t, id)).abs() / area_of(&t, id) < 1e-6);
            }
        }
        assert!((area_of(&t, t.root()) - 120_000.0).abs() < 1e-6);
    }

    #[test]
    fn every_node_holds_its_share_of_the_parent() {
        let mut t = Hierarchy::build(&nest_by_format(&[
            Record::new("A", "F1", 100.0),
            Record::new("B", "F1", 50.0),
            Record::new("C", "F2", 200.0),
            Record::new("D", "F2", 2.0),
            Record::new("E", "F3", 1.0),
        ]));
        let engine = VoronoiTreemap::new(3).cell_tolerance(0.005);
        layout(&mut t, &rect(0.0, 0.0, 400.0, 300.0), &engine).unwrap();
        for id in t.descendants() {
            let Some(parent) = t.parent(id) else { continue };
            let want = t.node(id).weight / t.node(parent).weight;
            let got = area_of(&t, id) / area_of(&t, parent);
            assert!(
                (got - want).abs() / want < 0.02,
                "{}: share {got} expected {want}",
                t.node(id).key
            );
        }
    }

    #[test]
    fn same_seed_same_polygons() {
        let clip = rect(0.0, 0.0, 400.0, 300.0);
        let mut a = tree();
        let mut b = tree();
        layout(&mut a, &clip, &VoronoiTreemap::new(42)).unwrap();
        layout(&mut b, &clip, &VoronoiTreemap::new(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_boundary_is_an_error() {
        let mut t = tree();
        let line = vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 0.0 }];
        assert!(matches!(
            layout(&mut t, &line, &VoronoiTreemap::new(1)),
            Err(VinylError::Layout(MapError::DegenerateClip))
        ));
    }

    struct FailNested;

    impl LayoutEngine for FailNested {
        fn partition(&self, clip: &[Point], weights: &[f64], salt: u64) -> Result<Vec<Cell>, MapError> {
            if salt != 0 {
                return Err(MapError::DegenerateClip);
            }
            VoronoiTreemap::new(0).partition(clip, weights, salt)
        }
    }

    struct DropLast;

    impl LayoutEngine for DropLast {
        fn partition(&self, clip: &[Point], weights: &[f64], salt: u64) -> Result<Vec<Cell>, MapError> {
            let mut cells = VoronoiTreemap::new(0).partition(clip, weights, salt)?;
            cells.pop();
            Ok(cells)
        }
    }

    #[test]
    fn short_split_leaves_the_rest_unplaced() {
        let mut t = tree();
        layout(&mut t, &rect(0.0, 0.0, 100.0, 100.0), &DropLast).unwrap();
        let formats = t.at_depth(1);
        assert!(!t.node(formats[0]).polygon.is_empty());
        let last = *formats.last().unwrap();
        assert!(t.node(last).polygon.is_empty());
        assert_eq!(t.node(last).site, None);
    }

    #[test]
    fn nested_failure_only_drops_that_branch() {
        let mut t = tree();
        layout(&mut t, &rect(0.0, 0.0, 100.0, 100.0), &FailNested).unwrap();
        for f in t.at_depth(1) {
            assert!(!t.node(f).polygon.is_empty());
        }
        for leaf in t.at_depth(2) {
            assert!(t.node(leaf).polygon.is_empty());
            assert_eq!(t.node(leaf).site, None);
        }
    }
}
