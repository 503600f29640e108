use std::collections::VecDeque;

use crate::hierarchy::Hierarchy;

pub const ROOT_COLOR: &str = "black";
/// Fill for formats the palette does not know.
pub const FALLBACK_COLOR: &str = "#bdbdbd";

const FORMAT_PALETTE: [(&str, &str); 8] = [
    ("12-inch double vinyl, 33-1/3 rpm", "#596F7E"),
    ("10-inch acetate, 78 rpm", "#168B98"),
    ("7-inch vinyl, 45 rpm", "#ED5B67"),
    ("12-inch vinyl, 33-1/3 rpm", "#fd8f24"),
    ("12-inch acetate, 33-1/3 rpm", "#919c4c"),
    ("10-inch shellac, 78 rpm", "#910c4c"),
    ("10-inch vinyl, 33-1/3 rpm", "#310c4c"),
    ("10-inch vinyl, 78 rpm", "#960c4c"),
];

pub fn format_color(format: &str) -> Option<&'static str> {
    FORMAT_PALETTE
        .iter()
        .find(|(k, _)| *k == format)
        .map(|(_, c)| *c)
}

/// Color every node top-down: root fixed, formats from the palette, deeper
/// nodes copy their parent. Unknown formats stay `None`.
pub fn annotate(tree: &mut Hierarchy) {
    let mut queue = VecDeque::from([tree.root()]);
    while let Some(id) = queue.pop_front() {
        let color = match (tree.node(id).depth, tree.parent(id)) {
            (0, _) => Some(ROOT_COLOR),
            (1, _) => {
                let key = &tree.node(id).key;
                let c = format_color(key);
                if c.is_none() {
                    log::warn!("no palette entry for format {key:?}, using fallback fill");
                }
                c
            }
            (_, Some(p)) => tree.node(p).color,
            (_, None) => None,
        };
        tree.node_mut(id).color = color;
        queue.extend(tree.children(id).iter().copied());
    }
}

/// Color actually painted for a node.
pub fn fill_color(color: Option<&'static str>) -> &'static str {
    color.unwrap_or(FALLBACK_COLOR)
}
