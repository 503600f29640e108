use std::collections::HashMap;

use crate::record::Record;

/// One group of the two-level nesting. Leaves have no children.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateNode {
    pub key: String,
    /// Sum of the value selector over every record under this node.
    pub value: f64,
    pub children: Vec<AggregateNode>,
}

/// Group `records` by `primary`, then by `secondary` inside each group, and
/// sum `value` per group. Keys appear in first-seen order.
pub fn nest<P, S, V>(records: &[Record], primary: P, secondary: S, value: V) -> Vec<AggregateNode>
where
    P: Fn(&Record) -> &str,
    S: Fn(&Record) -> &str,
    V: Fn(&Record) -> f64,
{
    let mut groups: Vec<AggregateNode> = Vec::new();
    let mut index: HashMap<String, (usize, HashMap<String, usize>)> = HashMap::new();
    for r in records {
        let pk = primary(r);
        let sk = secondary(r);
        let v = value(r);
        let (gi, leaves) = index.entry(pk.to_string()).or_insert_with(|| {
            groups.push(AggregateNode {
                key: pk.to_string(),
                value: 0.0,
                children: Vec::new(),
            });
            (groups.len() - 1, HashMap::new())
        });
        let group = &mut groups[*gi];
        if let Some(li) = leaves.get(sk) {
            group.children[*li].value += v;
        } else {
            leaves.insert(sk.to_string(), group.children.len());
            group.children.push(AggregateNode {
                key: sk.to_string(),
                value: v,
                children: Vec::new(),
            });
        }
    }
    for g in &mut groups {
        g.value = g.children.iter().map(|c| c.value).sum();
    }
    groups
}

/// Format, then record name, summing sale amounts.
pub fn nest_by_format(records: &[Record]) -> Vec<AggregateNode> {
    nest(records, Record::format_key, Record::name_key, |r| r.max_amount)
}

/// Record name → every record carrying that name, in input order.
#[derive(Clone, Debug, Default)]
pub struct RecordIndex {
    by_name: HashMap<String, Vec<Record>>,
}

impl RecordIndex {
    pub fn build(records: &[Record]) -> Self {
        let mut by_name: HashMap<String, Vec<Record>> = HashMap::new();
        for r in records {
            by_name.entry(r.name.clone()).or_default().push(r.clone());
        }
        RecordIndex { by_name }
    }

    /// First record with this name.
    pub fn first(&self, name: &str) -> Option<&Record> {
        self.by_name.get(name).and_then(|v| v.first())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MISSING_KEY;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("A", "F1", 100.0),
            Record::new("B", "F1", 50.0),
            Record::new("C", "F2", 200.0),
        ]
    }

    #[test]
    fn groups_by_format_then_name() {
        let g = nest_by_format(&sample());
        assert_eq!(g.len(), 2);
        assert_eq!(g[0].key, "F1");
        assert_eq!(g[0].value, 150.0);
        let leaf_keys = g[0].children.iter().map(|c| c.key.as_str()).collect::<Vec<_>>();
        assert_eq!(leaf_keys, ["A", "B"]);
        assert_eq!(g[1].key, "F2");
        assert_eq!(g[1].value, 200.0);
        assert!(g[1].children[0].children.is_empty());
    }

    #[test]
    fn duplicate_names_within_a_format_are_summed() {
        let mut rs = sample();
        rs.push(Record::new("A", "F1", 25.0));
        rs.push(Record::new("A", "F2", 1.0));
        let g = nest_by_format(&rs);
        assert_eq!(g[0].children.len(), 2);
        assert_eq!(g[0].children[0].value, 125.0);
        assert_eq!(g[0].value, 175.0);
        // same name under another format is its own leaf
        assert_eq!(g[1].children.len(), 2);
        assert_eq!(g[1].value, 201.0);
    }

    #[test]
    fn records_without_format_share_one_bucket() {
        let mut rs = sample();
        rs.push(Record {
            format: None,
            ..Record::new("D", "", 5.0)
        });
        let g = nest_by_format(&rs);
        assert_eq!(g.last().unwrap().key, MISSING_KEY);
        assert_eq!(g.last().unwrap().value, 5.0);
    }

    #[test]
    fn custom_selectors() {
        let g = nest(&sample(), |_| "all", Record::format_key, |_| 1.0);
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].value, 3.0);
        assert_eq!(g[0].children[0].value, 2.0);
    }

    #[test]
    fn index_keeps_every_duplicate_first_wins() {
        let mut rs = sample();
        rs.push(Record {
            title: Some("second".into()),
            ..Record::new("A", "F3", 1.0)
        });
        let idx = RecordIndex::build(&rs);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.first("A").unwrap().max_amount, 100.0);
        assert!(idx.first("missing").is_none());
    }
}
