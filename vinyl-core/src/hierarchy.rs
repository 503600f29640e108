use std::collections::VecDeque;

use voronoi_map::Point;

use crate::aggregate::AggregateNode;

/// Key of the synthetic root node.
pub const ROOT_KEY: &str = "nested_group";
/// Depth of individual records; the only interactive level.
pub const LEAF_DEPTH: usize = 2;

/// Index into the hierarchy arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyNode {
    pub key: String,
    /// Value carried by the aggregate node itself (leaves only, 0 otherwise).
    pub value: f64,
    /// Sum of leaf values under this node.
    pub weight: f64,
    /// 0 = root, 1 = format, 2 = record.
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub color: Option<&'static str>,
    /// Empty until laid out.
    pub polygon: Vec<Point>,
    pub site: Option<Point>,
    /// Position in draw order (deepest first). Valid for one draw only.
    pub id: usize,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_interactive(&self) -> bool {
        self.depth == LEAF_DEPTH
    }
}

/// Arena-backed tree: parents own their child lists, children point back by
/// index. Node 0 is the root; every parent precedes its children.
#[derive(Clone, Debug, PartialEq)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
    draw_order: Vec<NodeId>,
}

impl Hierarchy {
    /// Wrap aggregate groups under a synthetic root, roll weights up and
    /// assign draw ids.
    pub fn build(groups: &[AggregateNode]) -> Self {
        let mut tree = Hierarchy {
            nodes: vec![new_node(ROOT_KEY, 0.0, 0, None)],
            draw_order: Vec::new(),
        };
        let mut queue: VecDeque<(NodeId, &AggregateNode)> = VecDeque::new();
        for g in groups {
            let id = tree.push_child(NodeId(0), g);
            queue.push_back((id, g));
        }
        while let Some((parent, agg)) = queue.pop_front() {
            for c in &agg.children {
                let id = tree.push_child(parent, c);
                queue.push_back((id, c));
            }
        }
        tree.sum_weights();
        tree.assign_ids();
        tree
    }

    fn push_child(&mut self, parent: NodeId, agg: &AggregateNode) -> NodeId {
        let depth = self.nodes[parent.0].depth + 1;
        // internal aggregate values are derived, only leaves contribute
        let value = if agg.children.is_empty() { agg.value } else { 0.0 };
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(new_node(&agg.key, value, depth, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn sum_weights(&mut self) {
        for n in &mut self.nodes {
            n.weight = n.value;
        }
        for i in (1..self.nodes.len()).rev() {
            if let Some(p) = self.nodes[i].parent {
                let w = self.nodes[i].weight;
                self.nodes[p.0].weight += w;
            }
        }
    }

    /// Breadth-first order, then a stable sort by depth, deepest first.
    fn assign_ids(&mut self) {
        let mut order = self.descendants();
        order.sort_by(|a, b| self.nodes[b.0].depth.cmp(&self.nodes[a.0].depth));
        for (i, id) in order.iter().enumerate() {
            self.nodes[id.0].id = i;
        }
        self.draw_order = order;
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut HierarchyNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Every node, breadth first from the root.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            out.push(id);
            queue.extend(self.nodes[id.0].children.iter().copied());
        }
        out
    }

    pub fn at_depth(&self, depth: usize) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.nodes[id.0].depth == depth)
            .collect()
    }

    pub fn leaves(&self) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.nodes[id.0].is_leaf())
            .collect()
    }

    /// Deepest nodes first; index in this slice equals `HierarchyNode::id`.
    pub fn draw_order(&self) -> &[NodeId] {
        &self.draw_order
    }

    pub fn by_draw_id(&self, id: usize) -> Option<NodeId> {
        self.draw_order.get(id).copied()
    }
}

fn new_node(key: &str, value: f64, depth: usize, parent: Option<NodeId>) -> HierarchyNode {
    HierarchyNode {
        key: key.to_string(),
        value,
        weight: 0.0,
        depth,
        parent,
        children: Vec::new(),
        color: None,
        polygon: Vec::new(),
        site: None,
        id: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::nest_by_format;
    use crate::record::Record;

    fn tree() -> Hierarchy {
        Hierarchy::build(&nest_by_format(&[
            Record::new("A", "F1", 100.0),
            Record::new("B", "F1", 50.0),
            Record::new("C", "F2", 200.0),
        ]))
    }

    fn assert_weights_roll_up(t: &Hierarchy) {
        for id in t.descendants() {
            let n = t.node(id);
            if !n.is_leaf() {
                let sum: f64 = n.children.iter().map(|c| t.node(*c).weight).sum();
                assert!((n.weight - sum).abs() < 1e-9, "node {}", n.key);
            }
        }
    }

    #[test]
    fn wraps_groups_under_a_root() {
        let t = tree();
        assert_eq!(t.len(), 6);
        let root = t.node(t.root());
        assert_eq!(root.key, ROOT_KEY);
        assert_eq!(root.depth, 0);
        assert_eq!(root.weight, 350.0);
        let formats = t.at_depth(1);
        assert_eq!(formats.len(), 2);
        assert_eq!(t.node(formats[0]).key, "F1");
        assert_eq!(t.node(formats[0]).weight, 150.0);
        assert_eq!(t.node(formats[1]).weight, 200.0);
        assert_eq!(t.at_depth(2).len(), 3);
        assert_weights_roll_up(&t);
    }

    #[test]
    fn parents_link_back() {
        let t = tree();
        for leaf in t.leaves() {
            let p = t.parent(leaf).unwrap();
            assert!(t.children(p).contains(&leaf));
            assert_eq!(t.node(p).depth + 1, t.node(leaf).depth);
            assert_eq!(t.parent(p), Some(t.root()));
        }
        assert_eq!(t.parent(t.root()), None);
    }

    #[test]
    fn draw_ids_go_deepest_first() {
        let t = tree();
        let depths = t
            .draw_order()
            .iter()
            .map(|id| t.node(*id).depth)
            .collect::<Vec<_>>();
        assert_eq!(depths, [2, 2, 2, 1, 1, 0]);
        for (i, id) in t.draw_order().iter().enumerate() {
            assert_eq!(t.node(*id).id, i);
            assert_eq!(t.by_draw_id(i), Some(*id));
        }
        // breadth-first order survives within a depth
        let keys = t.draw_order()[..3]
            .iter()
            .map(|id| t.node(*id).key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, ["A", "B", "C"]);
        assert_eq!(t.by_draw_id(6), None);
    }

    #[test]
    fn empty_input_is_a_lone_root() {
        let t = Hierarchy::build(&[]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.node(t.root()).weight, 0.0);
        assert_eq!(t.leaves(), vec![t.root()]);
    }
}
