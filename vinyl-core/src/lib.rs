//! Voronoi treemap of the most valuable vinyl records: records are grouped by
//! format, laid out as nested weighted Voronoi cells inside an ellipse, colored
//! per format and rendered to SVG with an interactive detail overlay.

pub mod aggregate;
pub mod chart;
pub mod color;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod format;
pub mod hierarchy;
pub mod record;
pub mod scene;
pub mod tooltip;
pub mod treemap;

pub use aggregate::{AggregateNode, RecordIndex, nest, nest_by_format};
pub use chart::{Chart, LabelChange};
pub use config::ChartConfig;
pub use dataset::{Dataset, load_records};
pub use error::VinylError;
pub use hierarchy::{Hierarchy, HierarchyNode, NodeId};
pub use record::Record;
pub use scene::FillMode;
pub use tooltip::{Pointer, Tooltip, TooltipState, TooltipView};
pub use treemap::{LayoutEngine, VoronoiTreemap};

/// Parse `json` and build the chart with the Voronoi engine seeded from
/// `config.seed` (0 when unset).
pub fn build_chart(json: &str, config: ChartConfig) -> Result<Chart, VinylError> {
    let dataset = load_records(json)?;
    let engine = VoronoiTreemap::new(config.seed.unwrap_or_default());
    Chart::build(dataset, config, &engine)
}
