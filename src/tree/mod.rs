pub mod aggregate;
pub mod arena;

use std::collections::HashMap;

use compact_str::CompactString;

use self::arena::{NodeId, OrgTree};
use crate::record::Record;

/// Label of the sentinel root. Renderers filter it out by this value.
pub const ROOT_LABEL: &str = "Root";
/// Label substituted for missing or blank grouping values.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One grouping level: the field whose normalized value keys the nodes at that depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupKey {
    pub field: CompactString,
}

impl GroupKey {
    pub fn field(name: &str) -> Self {
        Self {
            field: CompactString::new(name),
        }
    }
}

/// What sits at the terminal depth of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafMode {
    /// One leaf per record (weight 1) carrying the record as payload.
    #[default]
    Records,
    /// The last grouping level forms the leaves; each weighs its record count.
    Count,
}

/// How flat records are grouped into a hierarchy.
#[derive(Debug, Clone)]
pub struct Grouping {
    /// Grouping levels, outermost first
    pub keys: Vec<GroupKey>,
    pub leaves: LeafMode,
    /// Field used as the label of record leaves
    pub name_field: CompactString,
}

impl Default for Grouping {
    fn default() -> Self {
        Self {
            keys: vec![GroupKey::field("department"), GroupKey::field("location")],
            leaves: LeafMode::Records,
            name_field: CompactString::new("name"),
        }
    }
}

impl Grouping {
    pub fn by(fields: &[&str]) -> Self {
        Self {
            keys: fields.iter().map(|f| GroupKey::field(f)).collect(),
            ..Self::default()
        }
    }

    pub fn with_leaves(mut self, leaves: LeafMode) -> Self {
        self.leaves = leaves;
        self
    }
}

/// Build an [`OrgTree`] from records in input order.
///
/// Siblings are keyed by grouping value and appear in first-seen order. Weights
/// are aggregated bottom-up once every record has been placed, so the root's
/// weight is the number of records consumed.
pub fn build_tree<'r, I>(records: I, grouping: &Grouping) -> OrgTree<'r>
where
    I: IntoIterator<Item = &'r Record>,
{
    let mut tree = OrgTree::new(ROOT_LABEL);

    // (parent, label) → child, so lookups stay within one sibling set
    let mut child_map: HashMap<(NodeId, CompactString), NodeId> = HashMap::new();
    let mut missing = vec![0usize; grouping.keys.len()];
    let mut record_count = 0usize;

    for record in records {
        record_count += 1;
        let mut parent = tree.root;

        for (level, key) in grouping.keys.iter().enumerate() {
            let label = match record.normalized(&key.field) {
                Some(value) => value,
                None => {
                    missing[level] += 1;
                    CompactString::new(UNKNOWN_LABEL)
                }
            };
            parent = match child_map.get(&(parent, label.clone())) {
                Some(&id) => id,
                None => {
                    let id = tree.add_child(parent, label.clone(), 0, None);
                    child_map.insert((parent, label), id);
                    id
                }
            };
        }

        match grouping.leaves {
            LeafMode::Records => {
                let label = record
                    .normalized(&grouping.name_field)
                    .unwrap_or_else(|| CompactString::new(UNKNOWN_LABEL));
                tree.add_child(parent, label, 1, Some(record));
            }
            LeafMode::Count => {
                tree.get_mut(parent).weight += 1;
            }
        }
    }

    for (key, count) in grouping.keys.iter().zip(&missing) {
        if *count > 0 {
            tracing::warn!(
                "{} records missing '{}', grouped under '{}'",
                count,
                key.field,
                UNKNOWN_LABEL
            );
        }
    }

    aggregate::aggregate_weights(&mut tree);
    debug_assert_eq!(tree.get(tree.root).weight, record_count as u64);

    tracing::info!(
        "Tree built: {} records, {} nodes, {} top-level groups",
        record_count,
        tree.len(),
        tree.children(tree.root).count()
    );

    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(dept: &str, loc: &str) -> Record {
        Record::new()
            .with_text("name", &format!("{dept}-{loc}"))
            .with_text("dept", dept)
            .with_text("loc", loc)
    }

    fn child_summary(tree: &OrgTree<'_>, parent: NodeId) -> Vec<(String, u64)> {
        tree.children(parent)
            .map(|id| (tree.get(id).label.to_string(), tree.get(id).weight))
            .collect()
    }

    #[test]
    fn groups_in_first_seen_order_with_merged_keys() {
        let records = vec![rec("A", "X"), rec("B", "Y"), rec("A", "X")];
        for leaves in [LeafMode::Records, LeafMode::Count] {
            let grouping = Grouping::by(&["dept", "loc"]).with_leaves(leaves);
            let tree = build_tree(&records, &grouping);
            assert_eq!(tree.get(tree.root).label, ROOT_LABEL);
            assert_eq!(tree.get(tree.root).weight, 3);
            assert_eq!(
                child_summary(&tree, tree.root),
                [("A".to_string(), 2), ("B".to_string(), 1)]
            );
            let a = tree.children(tree.root).next().unwrap();
            assert_eq!(child_summary(&tree, a), [("X".to_string(), 2)]);
            let b = tree.children(tree.root).nth(1).unwrap();
            assert_eq!(child_summary(&tree, b), [("Y".to_string(), 1)]);
        }
    }

    #[test]
    fn record_leaves_borrow_their_record() {
        let records = vec![rec("A", "X"), rec("A", "X")];
        let tree = build_tree(&records, &Grouping::by(&["dept", "loc"]));
        let leaves = tree.leaves(tree.root);
        assert_eq!(leaves.len(), 2);
        for (leaf, record) in leaves.iter().zip(&records) {
            let payload = tree.get(*leaf).payload.unwrap();
            assert!(std::ptr::eq(payload, record));
            assert_eq!(tree.get(*leaf).depth, 3);
        }
    }

    #[test]
    fn missing_values_fall_back_to_unknown() {
        let records = vec![
            Record::new().with_text("name", "n1"),
            Record::new().with_text("dept", "A"),
        ];
        let tree = build_tree(&records, &Grouping::by(&["dept"]));
        let groups = child_summary(&tree, tree.root);
        assert_eq!(
            groups,
            [(UNKNOWN_LABEL.to_string(), 1), ("A".to_string(), 1)]
        );
        let a = tree.children(tree.root).nth(1).unwrap();
        assert_eq!(child_summary(&tree, a), [(UNKNOWN_LABEL.to_string(), 1)]);
    }

    #[test]
    fn numeric_and_text_keys_merge_by_value() {
        let records = vec![
            Record::new().with_number("year", 2021.0),
            Record::new().with_text("year", "2021"),
        ];
        let tree = build_tree(
            &records,
            &Grouping::by(&["year"]).with_leaves(LeafMode::Count),
        );
        assert_eq!(child_summary(&tree, tree.root), [("2021".to_string(), 2)]);
    }

    #[test]
    fn same_label_under_different_parents_is_not_double_counted() {
        let records = vec![rec("A", "X"), rec("B", "X"), rec("B", "X")];
        let tree = build_tree(&records, &Grouping::by(&["dept", "loc"]));
        assert_eq!(tree.get(tree.root).weight, 3);
        assert_eq!(
            child_summary(&tree, tree.root),
            [("A".to_string(), 1), ("B".to_string(), 2)]
        );
    }

    #[test]
    fn same_named_records_stay_separate_leaves() {
        let ada = Record::new()
            .with_text("name", "Ada")
            .with_text("dept", "A")
            .with_text("loc", "X");
        let records = vec![ada.clone(), ada];
        let tree = build_tree(&records, &Grouping::by(&["dept", "loc"]));

        let a = tree.children(tree.root).next().unwrap();
        let x = tree.children(a).next().unwrap();
        assert_eq!(tree.children(tree.root).count(), 1);
        assert_eq!(tree.children(a).count(), 1);
        assert_eq!(
            child_summary(&tree, x),
            [("Ada".to_string(), 1), ("Ada".to_string(), 1)]
        );
        assert_eq!(tree.get(tree.root).weight, 2);
    }

    #[test]
    fn empty_input_gives_bare_root() {
        let records: Vec<Record> = Vec::new();
        let tree = build_tree(&records, &Grouping::default());
        assert!(tree.is_empty());
        assert_eq!(tree.get(tree.root).weight, 0);
        assert_eq!(tree.children(tree.root).count(), 0);
    }
}
