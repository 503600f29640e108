use serde::{Deserialize, Serialize};
use voronoi_map::Point;
use voronoi_map::geom::{ellipse, translate};

/// Chart-wide constants. Lengths are CSS pixels.
pub const WIDTH: f64 = 1100.0;
pub const HEIGHT: f64 = 800.0;
pub const MARGIN: f64 = 40.0;
/// Vertex count of the elliptical boundary.
pub const BOUNDARY_EDGES: usize = 200;
pub const BOUNDARY_ROTATION: f64 = 0.0;

pub const DATASET_PATH: &str = "data/most_valuable_vinyl_records.json";
pub const IMAGE_DIR: &str = "img/";
/// Seeds are drawn from `0..SEED_RANGE` when none is configured.
pub const SEED_RANGE: u64 = 100;

pub const CELL_FILL_OPACITY: f64 = 0.7;
pub const PATTERN_W: f64 = 100.0;
pub const PATTERN_H: f64 = 80.0;
pub const PATTERN_IMAGE_W: f64 = 90.0;

pub const LABEL_FONT_SIZE: f64 = 12.0;
pub const LABEL_FONT_FAMILY: &str = "Montserrat";
pub const LABEL_OFFSET_Y: f64 = 6.0;

/// Page coordinates are divided by this before placing the tooltip.
pub const POINTER_SCALE: f64 = 1.5;
/// Minimum room the tooltip needs to the right of its left edge.
pub const TOOLTIP_EDGE_MARGIN: f64 = 150.0;
pub const TOOLTIP_NUDGE: f64 = 40.0;

/// Runtime chart configuration. Every field falls back to the constants above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub boundary_edges: usize,
    pub boundary_rotation: f64,
    pub image_dir: String,
    pub seed: Option<u64>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: WIDTH,
            height: HEIGHT,
            margin: MARGIN,
            boundary_edges: BOUNDARY_EDGES,
            boundary_rotation: BOUNDARY_ROTATION,
            image_dir: IMAGE_DIR.to_string(),
            seed: None,
        }
    }
}

impl ChartConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Ellipse inscribed in the canvas minus the margin, shifted by half the
    /// margin so it sits centered.
    pub fn boundary(&self) -> Vec<Point> {
        let w = (self.width - self.margin).max(0.0);
        let h = (self.height - self.margin).max(0.0);
        let pts = ellipse(
            w / 2.0,
            h / 2.0,
            w / 2.0,
            h / 2.0,
            self.boundary_edges,
            self.boundary_rotation,
        );
        translate(&pts, self.margin / 2.0, self.margin / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voronoi_map::geom::bounds_of;

    #[test]
    fn boundary_fits_inside_the_margin() {
        let cfg = ChartConfig::default();
        let b = cfg.boundary();
        assert_eq!(b.len(), BOUNDARY_EDGES);
        let (minx, miny, maxx, maxy) = bounds_of(&b);
        assert!(minx >= MARGIN / 2.0 - 1e-9);
        assert!(miny >= MARGIN / 2.0 - 1e-9);
        assert!(maxx <= WIDTH - MARGIN / 2.0 + 1e-9);
        assert!(maxy <= HEIGHT - MARGIN / 2.0 + 1e-9);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ChartConfig = serde_json::from_str(r#"{"width": 600, "seed": 9}"#).unwrap();
        assert_eq!(cfg.width, 600.0);
        assert_eq!(cfg.height, HEIGHT);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.image_dir, IMAGE_DIR);
    }
}
