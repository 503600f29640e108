use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::MapError;
use crate::geom::{
    Point, bounds_of, clip_half_plane, is_convex, polygon_area, polygon_centroid,
    polygon_contains,
};

/// Default stop criterion: summed area error below 1% of the clip area.
pub const DEFAULT_CONVERGENCE_RATIO: f64 = 0.01;
/// Default per-cell bound: every cell within 1% of its own target area.
pub const DEFAULT_CELL_TOLERANCE: f64 = 0.01;
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Weight-only passes run after the centroid moves, sites held still.
const SETTLE_ITERATIONS: usize = 200;
/// Damping of each weight step; areas react to all neighbours at once.
const WEIGHT_STEP: f64 = 0.5;
/// A cell never loses more than this share of its area in one step.
const MAX_SHRINK: f64 = 0.5;
/// Distance, relative to the clip size, under which a vertex lies on a bisector.
const EDGE_TOLERANCE: f64 = 1e-7;
const SAMPLE_ATTEMPTS: usize = 1000;

/// One output cell. Empty `polygon` means the input weight was zero.
#[derive(Clone, Debug, Default)]
pub struct Cell {
    pub polygon: Vec<Point>,
    pub site: Point,
    pub target_area: f64,
}

#[derive(Clone, Debug, Default)]
pub struct MapResult {
    /// One entry per input weight, same order.
    pub cells: Vec<Cell>,
    pub iterations: usize,
    pub converged: bool,
    /// Summed absolute area error divided by the clip area.
    pub error: f64,
}

/// Weighted Voronoi map over a convex clipping polygon.
///
/// Cells are power-diagram cells refined by alternating centroid moves and
/// weight adaptation until their areas match the requested weights.
#[derive(Clone, Debug)]
pub struct VoronoiMap {
    clip: Vec<Point>,
    seed: u64,
    convergence_ratio: f64,
    max_iterations: usize,
    cell_tolerance: f64,
}

#[derive(Clone, Copy, Debug)]
struct Site {
    index: usize,
    pos: Point,
    weight: f64,
    target_area: f64,
}

impl VoronoiMap {
    pub fn new(clip: Vec<Point>) -> Self {
        VoronoiMap {
            clip,
            seed: 0,
            convergence_ratio: DEFAULT_CONVERGENCE_RATIO,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cell_tolerance: DEFAULT_CELL_TOLERANCE,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn convergence_ratio(mut self, ratio: f64) -> Self {
        self.convergence_ratio = ratio;
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Largest accepted `|area - target| / target` of any single cell.
    pub fn cell_tolerance(mut self, tolerance: f64) -> Self {
        self.cell_tolerance = tolerance;
        self
    }

    pub fn clip(&self) -> &[Point] {
        &self.clip
    }

    pub fn compute(&self, weights: &[f64]) -> Result<MapResult, MapError> {
        if weights.is_empty() {
            return Err(MapError::EmptyWeights);
        }
        if let Some(i) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(MapError::InvalidWeight(i));
        }
        let clip_area = polygon_area(&self.clip);
        if self.clip.len() < 3 || clip_area <= f64::EPSILON {
            return Err(MapError::DegenerateClip);
        }
        if !is_convex(&self.clip) {
            return Err(MapError::NonConvexClip);
        }
        let clip_ctr = polygon_centroid(&self.clip).unwrap_or_default();

        let mut result = MapResult {
            cells: vec![
                Cell {
                    polygon: Vec::new(),
                    site: clip_ctr,
                    target_area: 0.0,
                };
                weights.len()
            ],
            iterations: 0,
            converged: true,
            error: 0.0,
        };

        let active = weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.0)
            .map(|(i, w)| (i, *w))
            .collect::<Vec<_>>();
        match active.len() {
            0 => return Ok(result),
            1 => {
                let cell = &mut result.cells[active[0].0];
                cell.polygon = self.clip.clone();
                cell.site = clip_ctr;
                cell.target_area = clip_area;
                return Ok(result);
            }
            _ => {}
        }

        let total: f64 = active.iter().map(|(_, w)| *w).sum();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut sites = Vec::with_capacity(active.len());
        for (index, w) in &active {
            let pos = self.random_point(&mut rng, clip_ctr);
            sites.push(Site {
                index: *index,
                pos,
                weight: 0.0,
                target_area: clip_area * w / total,
            });
        }

        let mut cells = self.power_cells(&sites);
        let mut fit = Fit::of(&sites, &cells, clip_area);
        let mut iterations = 0;
        let mut settle = 0;
        while !self.accepts(fit) && iterations < self.max_iterations + SETTLE_ITERATIONS {
            if iterations < self.max_iterations {
                // Move to centroids
                for (s, cell) in sites.iter_mut().zip(cells.iter()) {
                    if cell.len() >= 3
                        && let Some(c) = polygon_centroid(cell)
                    {
                        s.pos = c;
                    }
                }
                cells = self.power_cells(&sites);
            } else {
                settle += 1;
            }
            self.adapt_weights(&mut sites, &cells);
            cells = self.power_cells(&sites);
            iterations += 1;
            fit = Fit::of(&sites, &cells, clip_area);
        }
        let converged = self.accepts(fit);
        log::debug!(
            "voronoi map: {} sites, {} iterations ({} settling), error {:.4}, worst cell {:.4}, converged {}",
            sites.len(),
            iterations,
            settle,
            fit.error,
            fit.worst,
            converged
        );

        for (s, poly) in sites.iter().zip(cells) {
            let cell = &mut result.cells[s.index];
            cell.site = if polygon_contains(&poly, s.pos) {
                s.pos
            } else {
                polygon_centroid(&poly).unwrap_or(s.pos)
            };
            cell.polygon = poly;
            cell.target_area = s.target_area;
        }
        result.iterations = iterations;
        result.converged = converged;
        result.error = fit.error;
        Ok(result)
    }

    fn random_point(&self, rng: &mut ChaCha8Rng, fallback: Point) -> Point {
        let (minx, miny, maxx, maxy) = bounds_of(&self.clip);
        for _ in 0..SAMPLE_ATTEMPTS {
            let p = Point {
                x: rng.gen_range(minx..maxx),
                y: rng.gen_range(miny..maxy),
            };
            if polygon_contains(&self.clip, p) {
                return p;
            }
        }
        fallback
    }

    /// Power diagram restricted to the clip: each cell is the clip cut by one
    /// half-plane per other site.
    fn power_cells(&self, sites: &[Site]) -> Vec<Vec<Point>> {
        let mut out = Vec::with_capacity(sites.len());
        for (i, si) in sites.iter().enumerate() {
            let mut poly = self.clip.clone();
            for (j, sj) in sites.iter().enumerate() {
                if i == j || poly.is_empty() {
                    continue;
                }
                let (nx, ny, c) = bisector(si, sj);
                if nx == 0.0 && ny == 0.0 {
                    // coincident sites: lower index keeps the region on a tie
                    if c < 0.0 || (c == 0.0 && i > j) {
                        poly.clear();
                    }
                    continue;
                }
                poly = clip_half_plane(&poly, nx, ny, c);
            }
            out.push(poly);
        }
        out
    }

    fn accepts(&self, fit: Fit) -> bool {
        fit.error < self.convergence_ratio && fit.worst < self.cell_tolerance
    }

    /// One damped Newton step on the weights, each cell on its own slope.
    /// A cell that vanished is given back a weight that puts its site inside
    /// a region of roughly its target size.
    fn adapt_weights(&self, sites: &mut [Site], cells: &[Vec<Point>]) {
        let (minx, miny, maxx, maxy) = bounds_of(&self.clip);
        let tol = EDGE_TOLERANCE * (maxx - minx).hypot(maxy - miny);
        let mut next = sites.iter().map(|s| s.weight).collect::<Vec<_>>();
        for (i, cell) in cells.iter().enumerate() {
            let area = polygon_area(cell);
            let slope = area_slope(i, sites, cell, tol);
            if area <= f64::EPSILON || slope <= f64::EPSILON {
                let floor = sites
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, o)| o.weight - o.pos.dist2(sites[i].pos))
                    .fold(f64::NEG_INFINITY, f64::max);
                if area <= f64::EPSILON && floor.is_finite() {
                    next[i] = floor + sites[i].target_area / std::f64::consts::PI;
                }
                continue;
            }
            let change = (WEIGHT_STEP * (sites[i].target_area - area)).max(-MAX_SHRINK * area);
            next[i] += change / slope;
        }
        for (s, w) in sites.iter_mut().zip(next) {
            s.weight = w;
        }
    }
}

/// Area error of one diagram against its targets.
#[derive(Clone, Copy, Debug)]
struct Fit {
    /// Summed absolute error over the clip area.
    error: f64,
    /// Largest relative error of a single cell.
    worst: f64,
}

impl Fit {
    fn of(sites: &[Site], cells: &[Vec<Point>], clip_area: f64) -> Fit {
        let mut error = 0.0;
        let mut worst: f64 = 0.0;
        for (s, c) in sites.iter().zip(cells) {
            let diff = (polygon_area(c) - s.target_area).abs();
            error += diff;
            worst = worst.max(diff / s.target_area);
        }
        Fit {
            error: error / clip_area,
            worst,
        }
    }
}

/// Bisector between the cells of `a` and `b` as `nx * x + ny * y <= c`,
/// the side `a` keeps. Raising `a.weight` by `d` moves it `d / |n|` towards `b`.
fn bisector(a: &Site, b: &Site) -> (f64, f64, f64) {
    (
        2.0 * (b.pos.x - a.pos.x),
        2.0 * (b.pos.y - a.pos.y),
        b.pos.norm2() - a.pos.norm2() + a.weight - b.weight,
    )
}

/// Rate at which the cell of `sites[i]` grows with its own weight: the sum of
/// its shared edge lengths, each over the length of its bisector normal.
fn area_slope(i: usize, sites: &[Site], poly: &[Point], tol: f64) -> f64 {
    let mut slope = 0.0;
    for (k, a) in poly.iter().enumerate() {
        let b = poly[(k + 1) % poly.len()];
        for (j, other) in sites.iter().enumerate() {
            if j == i {
                continue;
            }
            let (nx, ny, c) = bisector(&sites[i], other);
            let norm = (nx * nx + ny * ny).sqrt();
            if norm == 0.0 {
                continue;
            }
            let off = |p: Point| (nx * p.x + ny * p.y - c).abs() / norm;
            if off(*a) <= tol && off(b) <= tol {
                slope += a.dist2(b).sqrt() / norm;
                break;
            }
        }
    }
    slope
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{ellipse, rect};

    fn areas(r: &MapResult) -> Vec<f64> {
        r.cells.iter().map(|c| polygon_area(&c.polygon)).collect()
    }

    #[test]
    fn cells_tile_the_clip() {
        let clip = rect(0.0, 0.0, 100.0, 100.0);
        let r = VoronoiMap::new(clip)
            .seed(3)
            .compute(&[5.0, 1.0, 2.0, 8.0, 3.0])
            .unwrap();
        let a = areas(&r);
        assert!(a.iter().all(|v| *v > 0.0));
        let sum: f64 = a.iter().sum();
        assert!((sum - 10_000.0).abs() < 1e-6 * 10_000.0);
    }

    fn worst_share_error(weights: &[f64], r: &MapResult, clip_area: f64) -> f64 {
        let total: f64 = weights.iter().sum();
        areas(r)
            .iter()
            .zip(weights)
            .map(|(a, w)| {
                let want = w / total;
                (a / clip_area - want).abs() / want
            })
            .fold(0.0, f64::max)
    }

    #[test]
    fn cell_areas_match_their_share() {
        let clip = ellipse(50.0, 50.0, 50.0, 50.0, 64, 0.0);
        let clip_area = polygon_area(&clip);
        let w = [1.0, 3.0, 12.0, 0.5, 6.0];
        let r = VoronoiMap::new(clip).seed(7).compute(&w).unwrap();
        assert!(r.converged);
        assert!((r.cells[1].target_area / r.cells[0].target_area - 3.0).abs() < 1e-9);
        let worst = worst_share_error(&w, &r, clip_area);
        assert!(worst < 0.02, "worst share error {worst}");
    }

    #[test]
    fn tiny_weight_is_not_inflated() {
        let w = [1000.0, 1.0];
        for seed in [1, 17, 42] {
            let r = VoronoiMap::new(rect(0.0, 0.0, 100.0, 100.0))
                .seed(seed)
                .compute(&w)
                .unwrap();
            assert!((r.cells[1].target_area - 10_000.0 / 1001.0).abs() < 1e-9);
            let worst = worst_share_error(&w, &r, 10_000.0);
            assert!(worst < 0.02, "seed {seed}: worst share error {worst}");
        }
    }

    #[test]
    fn same_seed_same_cells() {
        let clip = rect(0.0, 0.0, 300.0, 200.0);
        let w = [4.0, 2.0, 9.0, 1.0];
        let a = VoronoiMap::new(clip.clone()).seed(42).compute(&w).unwrap();
        let b = VoronoiMap::new(clip).seed(42).compute(&w).unwrap();
        for (ca, cb) in a.cells.iter().zip(b.cells.iter()) {
            assert_eq!(ca.polygon, cb.polygon);
            assert_eq!(ca.site, cb.site);
        }
    }

    #[test]
    fn sites_lie_inside_their_cells() {
        let clip = rect(0.0, 0.0, 100.0, 60.0);
        let r = VoronoiMap::new(clip).seed(11).compute(&[3.0, 3.0, 1.0]).unwrap();
        for c in &r.cells {
            assert!(polygon_contains(&c.polygon, c.site));
        }
    }

    #[test]
    fn single_weight_takes_whole_clip() {
        let clip = rect(0.0, 0.0, 10.0, 10.0);
        let r = VoronoiMap::new(clip.clone()).compute(&[0.0, 7.0]).unwrap();
        assert!(r.cells[0].polygon.is_empty());
        assert_eq!(r.cells[1].polygon, clip);
        assert!(r.cells[1].site.dist2(Point { x: 5.0, y: 5.0 }) < 1e-12);
    }

    #[test]
    fn bad_input_is_rejected() {
        let clip = rect(0.0, 0.0, 10.0, 10.0);
        let m = VoronoiMap::new(clip);
        assert_eq!(m.compute(&[]).unwrap_err(), MapError::EmptyWeights);
        assert_eq!(m.compute(&[1.0, -2.0]).unwrap_err(), MapError::InvalidWeight(1));
        assert_eq!(m.compute(&[f64::NAN]).unwrap_err(), MapError::InvalidWeight(0));
        let flat = VoronoiMap::new(vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 1.0 }]);
        assert_eq!(flat.compute(&[1.0]).unwrap_err(), MapError::DegenerateClip);
    }
}
