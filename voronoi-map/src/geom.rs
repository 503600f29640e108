use geo::{Area, Centroid, Contains};
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Basic two dimensional point used for geometry operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

impl Point {
    pub fn dist2(self, o: Point) -> f64 {
        let dx = self.x - o.x;
        let dy = self.y - o.y;
        dx * dx + dy * dy
    }

    pub fn norm2(self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

fn to_geo(poly: &[Point]) -> Polygon<f64> {
    let coords = poly
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect::<Vec<_>>();
    Polygon::new(LineString::new(coords), vec![])
}

/// Unsigned area of a simple polygon. Fewer than three vertices is zero.
pub fn polygon_area(poly: &[Point]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    to_geo(poly).unsigned_area()
}

pub fn polygon_centroid(poly: &[Point]) -> Option<Point> {
    if poly.is_empty() {
        return None;
    }
    to_geo(poly).centroid().map(|c| Point { x: c.x(), y: c.y() })
}

pub fn polygon_contains(poly: &[Point], p: Point) -> bool {
    if poly.len() < 3 {
        return false;
    }
    to_geo(poly).contains(&geo::Point::new(p.x, p.y))
}

pub fn bounds_of(pts: &[Point]) -> (f64, f64, f64, f64) {
    let mut minx = f64::INFINITY;
    let mut miny = f64::INFINITY;
    let mut maxx = f64::NEG_INFINITY;
    let mut maxy = f64::NEG_INFINITY;
    for p in pts {
        minx = minx.min(p.x);
        miny = miny.min(p.y);
        maxx = maxx.max(p.x);
        maxy = maxy.max(p.y);
    }
    (minx, miny, maxx, maxy)
}

/// True when every turn of the ring goes the same way. Near-collinear
/// vertices (left behind by repeated clipping) are ignored.
pub fn is_convex(poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let (minx, miny, maxx, maxy) = bounds_of(poly);
    let span = (maxx - minx).max(maxy - miny);
    let eps = 1e-7 * span * span;
    let mut sign = 0.0_f64;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let c = poly[(i + 2) % n];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() <= eps {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Clip a convex polygon to the half-plane `nx * x + ny * y <= c`.
/// Returns an empty ring when less than a triangle survives.
pub fn clip_half_plane(poly: &[Point], nx: f64, ny: f64, c: f64) -> Vec<Point> {
    let n = poly.len();
    if n == 0 {
        return Vec::new();
    }
    let side = |p: Point| nx * p.x + ny * p.y - c;
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..n {
        let cur = poly[i];
        let next = poly[(i + 1) % n];
        let sc = side(cur);
        let sn = side(next);
        if sc <= 0.0 {
            out.push(cur);
        }
        if (sc < 0.0 && sn > 0.0) || (sc > 0.0 && sn < 0.0) {
            let t = sc / (sc - sn);
            out.push(Point {
                x: cur.x + t * (next.x - cur.x),
                y: cur.y + t * (next.y - cur.y),
            });
        }
    }
    if out.len() < 3 { Vec::new() } else { out }
}

/// Regular sampling of an ellipse, `edges` vertices starting at `rotation` radians.
pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64, edges: usize, rotation: f64) -> Vec<Point> {
    let k = edges.max(3);
    let mut pts = Vec::with_capacity(k);
    for i in 0..k {
        let a = rotation + (i as f64) / (k as f64) * 2.0 * std::f64::consts::PI;
        pts.push(Point {
            x: cx + rx * a.cos(),
            y: cy + ry * a.sin(),
        });
    }
    pts
}

pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<Point> {
    vec![
        Point { x, y },
        Point { x: x + w, y },
        Point { x: x + w, y: y + h },
        Point { x, y: y + h },
    ]
}

pub fn translate(pts: &[Point], dx: f64, dy: f64) -> Vec<Point> {
    pts.iter()
        .map(|p| Point {
            x: p.x + dx,
            y: p.y + dy,
        })
        .collect()
}
