use voronoi_map::Point;

use crate::aggregate::RecordIndex;
use crate::color::fill_color;
use crate::config::{
    CELL_FILL_OPACITY, ChartConfig, LABEL_FONT_FAMILY, LABEL_FONT_SIZE, LABEL_OFFSET_Y, PATTERN_H,
    PATTERN_IMAGE_W, PATTERN_W,
};
use crate::format::{asset_path, format_usd, html_escape};
use crate::hierarchy::{Hierarchy, HierarchyNode, NodeId};

/// How leaf cells are painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Per-record band image, falling back to the format color.
    #[default]
    Pattern,
    /// Flat format colors on white, no labels; used for raster export.
    Color,
}

pub fn pattern_id(node: &HierarchyNode) -> String {
    format!("pattern-{}", node.id)
}

pub fn label_class(node: &HierarchyNode) -> String {
    format!("label-{}", node.id)
}

pub fn stroke_width(depth: usize) -> f64 {
    (4.0 - 2.8 * depth as f64).max(0.4)
}

/// Native hover text of a cell: "Title - $amount", empty without a record.
pub fn cell_title(node: &HierarchyNode, index: &RecordIndex) -> String {
    index
        .first(&node.key)
        .map(|r| format!("{} - {}", r.display_title(), format_usd(r.max_amount)))
        .unwrap_or_default()
}

/// Build the complete chart document. Cells go out deepest first so group
/// outlines end up above the records they contain.
pub fn render_svg(
    tree: &Hierarchy,
    index: &RecordIndex,
    config: &ChartConfig,
    hovered: Option<NodeId>,
    mode: FillMode,
) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" class=\"chart\">\n",
        config.width, config.height, config.width, config.height
    ));
    if mode == FillMode::Color {
        s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    }

    let drawn = tree
        .draw_order()
        .iter()
        .map(|id| tree.node(*id))
        .filter(|n| !n.polygon.is_empty())
        .collect::<Vec<_>>();

    if mode == FillMode::Pattern {
        s.push_str("<defs>\n");
        for n in drawn.iter().filter(|n| n.is_interactive()) {
            s.push_str(&format!(
                "<pattern id=\"{}\" width=\"{}\" height=\"{}\" patternUnits=\"userSpaceOnUse\" preserveAspectRatio=\"xMidYMid slice\"><image xlink:href=\"{}\" href=\"{}\" x=\"0\" y=\"0\" width=\"{}\"/></pattern>\n",
                pattern_id(n),
                PATTERN_W,
                PATTERN_H,
                html_escape(&asset_path(&config.image_dir, &n.key, "_band.png")),
                html_escape(&asset_path(&config.image_dir, &n.key, "_band.png")),
                PATTERN_IMAGE_W
            ));
        }
        s.push_str("</defs>\n");
    }

    s.push_str("<g class=\"cells\">\n");
    for n in &drawn {
        s.push_str(&cell_path(n, index, mode));
    }
    s.push_str("</g>\n");

    if mode == FillMode::Pattern {
        s.push_str(&format!(
            "<g class=\"labels\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" pointer-events=\"none\" cursor=\"default\">\n",
            LABEL_FONT_FAMILY, LABEL_FONT_SIZE
        ));
        for n in drawn.iter().filter(|n| n.is_interactive()) {
            let Some(site) = n.site else { continue };
            let text = index
                .first(&n.key)
                .map(|r| r.display_title())
                .unwrap_or(n.key.as_str());
            let shown = hovered.is_some_and(|h| tree.node(h).id == n.id);
            s.push_str(&label(n, site, text, shown));
        }
        s.push_str("</g>\n");
    }

    s.push_str("</svg>\n");
    s
}

fn cell_path(n: &HierarchyNode, index: &RecordIndex, mode: FillMode) -> String {
    let color = fill_color(n.color);
    let fill = match (n.is_interactive(), mode) {
        (false, _) => "none".to_string(),
        (true, FillMode::Pattern) => format!("url(#{}) {}", pattern_id(n), color),
        (true, FillMode::Color) => color.to_string(),
    };
    let stroke = if n.is_interactive() { "#ffffff" } else { color };
    let mut out = format!(
        "<path class=\"cell depth-{}\" data-node=\"{}\" d=\"{}\" fill=\"{}\" fill-opacity=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linejoin=\"round\" pointer-events=\"{}\">",
        n.depth,
        n.id,
        path_data(&n.polygon),
        fill,
        CELL_FILL_OPACITY,
        stroke,
        stroke_width(n.depth),
        if n.is_interactive() { "all" } else { "none" },
    );
    let title = cell_title(n, index);
    if !title.is_empty() {
        out.push_str(&format!("<title>{}</title>", html_escape(&title)));
    }
    out.push_str("</path>\n");
    out
}

fn label(n: &HierarchyNode, site: Point, text: &str, shown: bool) -> String {
    let transform = format!("translate({:.2},{:.2})", site.x, site.y + LABEL_OFFSET_Y);
    let opacity = if shown { 1 } else { 0 };
    let class = label_class(n);
    let text = html_escape(text);
    format!(
        "<text class=\"label-halo {class}\" transform=\"{transform}\" opacity=\"{opacity}\" fill=\"#ffffff\" stroke=\"#ffffff\" stroke-width=\"3\" stroke-linejoin=\"round\">{text}</text>\n<text class=\"label {class}\" transform=\"{transform}\" opacity=\"{opacity}\" fill=\"black\">{text}</text>\n"
    )
}

fn path_data(pts: &[Point]) -> String {
    let Some(first) = pts.first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.x, first.y);
    for p in &pts[1..] {
        d.push_str(&format!(" L {:.2} {:.2}", p.x, p.y));
    }
    d.push_str(" Z");
    d
}
