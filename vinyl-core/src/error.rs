use std::fmt;

use voronoi_map::MapError;

/// Errors surfaced by the chart pipeline.
#[derive(Debug)]
pub enum VinylError {
    /// The dataset file is not a JSON array of record objects.
    Parse(String),
    /// The boundary polygon could not be partitioned.
    Layout(MapError),
    /// The SVG scene could not be parsed or rasterized.
    Render(String),
    /// PNG encoding failed.
    Encode(String),
}

impl fmt::Display for VinylError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VinylError::Parse(msg) => write!(f, "dataset parse error: {msg}"),
            VinylError::Layout(e) => write!(f, "layout error: {e}"),
            VinylError::Render(msg) => write!(f, "render error: {msg}"),
            VinylError::Encode(msg) => write!(f, "encode error: {msg}"),
        }
    }
}

impl std::error::Error for VinylError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VinylError::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for VinylError {
    fn from(e: serde_json::Error) -> Self {
        VinylError::Parse(e.to_string())
    }
}

impl From<MapError> for VinylError {
    fn from(e: MapError) -> Self {
        VinylError::Layout(e)
    }
}

impl From<png::EncodingError> for VinylError {
    fn from(e: png::EncodingError) -> Self {
        VinylError::Encode(e.to_string())
    }
}
