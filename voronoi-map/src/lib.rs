//! Weighted Voronoi maps: split a convex polygon into one cell per weight,
//! cell areas proportional to the weights.

use std::fmt;

pub mod geom;
mod map;

pub use geom::Point;
pub use map::{
    Cell, DEFAULT_CELL_TOLERANCE, DEFAULT_CONVERGENCE_RATIO, DEFAULT_MAX_ITERATIONS, MapResult,
    VoronoiMap,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    /// Fewer than three vertices or no enclosed area.
    DegenerateClip,
    /// The clipping polygon turns both ways.
    NonConvexClip,
    EmptyWeights,
    /// Negative or non-finite weight at this index.
    InvalidWeight(usize),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::DegenerateClip => write!(f, "clipping polygon has no area"),
            MapError::NonConvexClip => write!(f, "clipping polygon is not convex"),
            MapError::EmptyWeights => write!(f, "no weights to lay out"),
            MapError::InvalidWeight(i) => write!(f, "weight {i} is negative or not finite"),
        }
    }
}

impl std::error::Error for MapError {}
