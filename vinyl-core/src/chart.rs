use crate::aggregate::{RecordIndex, nest_by_format};
use crate::color::annotate;
use crate::config::ChartConfig;
use crate::dataset::Dataset;
use crate::error::VinylError;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::scene::{FillMode, render_svg};
use crate::tooltip::{Pointer, Tooltip};
use crate::treemap::{LayoutEngine, layout};

/// Label visibility changes after a pointer event, as draw ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelChange {
    pub hide: Option<usize>,
    pub show: Option<usize>,
}

/// One drawn chart and its interaction state.
pub struct Chart {
    config: ChartConfig,
    dataset: Dataset,
    index: RecordIndex,
    tree: Hierarchy,
    tooltip: Tooltip,
    hovered: Option<NodeId>,
}

impl Chart {
    /// Group, lay out and color `dataset` inside the configured boundary.
    pub fn build(
        dataset: Dataset,
        config: ChartConfig,
        engine: &dyn LayoutEngine,
    ) -> Result<Self, VinylError> {
        let index = RecordIndex::build(dataset.records());
        let mut tree = Hierarchy::build(&nest_by_format(dataset.records()));
        layout(&mut tree, &config.boundary(), engine)?;
        annotate(&mut tree);
        log::info!(
            "chart built: {} formats, {} records, total {}",
            tree.at_depth(1).len(),
            tree.at_depth(2).len(),
            tree.node(tree.root()).weight
        );
        let tooltip = Tooltip::new(&config.image_dir);
        Ok(Chart {
            config,
            dataset,
            index,
            tree,
            tooltip,
            hovered: None,
        })
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    fn interactive(&self, draw_id: usize) -> Option<NodeId> {
        self.tree
            .by_draw_id(draw_id)
            .filter(|id| self.tree.node(*id).is_interactive())
    }

    /// Show the record behind `draw_id`. Returns false, leaving the overlay
    /// untouched, when the cell is not a record or has no match.
    pub fn click(&mut self, draw_id: usize, pointer: Pointer) -> bool {
        let Some(id) = self.interactive(draw_id) else {
            return false;
        };
        match self.index.first(&self.tree.node(id).key) {
            Some(record) => {
                self.tooltip.show(record, pointer);
                true
            }
            None => {
                log::debug!("no record for cell {draw_id}");
                false
            }
        }
    }

    /// Highlight the cell under the pointer; only one label is visible.
    pub fn hover(&mut self, draw_id: usize, pointer: Pointer) -> LabelChange {
        let Some(id) = self.interactive(draw_id) else {
            return LabelChange::default();
        };
        let prev = self.hovered.replace(id);
        self.click(draw_id, pointer);
        LabelChange {
            hide: prev
                .filter(|p| *p != id)
                .map(|p| self.tree.node(p).id),
            show: Some(draw_id),
        }
    }

    pub fn leave(&mut self, draw_id: usize) -> LabelChange {
        match self.hovered {
            Some(h) if self.tree.node(h).id == draw_id => {
                self.hovered = None;
                LabelChange {
                    hide: Some(draw_id),
                    show: None,
                }
            }
            _ => LabelChange::default(),
        }
    }

    pub fn dismiss_tooltip(&mut self) {
        self.tooltip.dismiss();
    }

    pub fn label_visible(&self, draw_id: usize) -> bool {
        self.hovered
            .is_some_and(|h| self.tree.node(h).id == draw_id)
    }

    pub fn scene(&self, mode: FillMode) -> String {
        render_svg(&self.tree, &self.index, &self.config, self.hovered, mode)
    }
}
