//! Property-based invariant tests for the aggregation and layout pipeline.
//!
//! Verifies:
//! 1. Weight conservation: root weight equals the filtered record count and
//!    every internal node weighs the sum of its children
//! 2. Grouping labels are unique within every sibling set
//! 3. Determinism: repeated runs produce identical trees and geometry
//! 4. Filter: number and string years match the same selector
//! 5. Treemap: every rect is ordered, finite, inside its parent, and siblings never overlap
//! 6. Empty selection: zero-weight root and no treemap rects
//! 7. Node-link: one edge per parent–child pair, depth steps of `dy`

use std::collections::HashSet;

use orgmap_rs::filter::filter;
use orgmap_rs::layout::{
    compute_node_link, compute_treemap, NodeLinkConfig, Rect, Tiling, TreemapConfig,
};
use orgmap_rs::pipeline::{run, ChartRequest};
use orgmap_rs::record::Record;
use orgmap_rs::tree::arena::{NodeId, OrgTree};
use orgmap_rs::tree::{build_tree, Grouping, LeafMode};
use proptest::prelude::*;

const YEAR: &str = "programme-year";

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_record() -> impl Strategy<Value = Record> {
    (
        proptest::option::of(0u8..4),
        proptest::option::of(0u8..3),
        2019u16..2023,
        any::<bool>(),
    )
        .prop_map(|(dept, loc, year, as_number)| {
            let mut r = Record::new().with_text("name", "member");
            if let Some(d) = dept {
                r = r.with_text("department", &format!("D{d}"));
            }
            if let Some(l) = loc {
                r = r.with_text("location", &format!("L{l}"));
            }
            if as_number {
                r.with_number(YEAR, year as f64)
            } else {
                r.with_text(YEAR, &year.to_string())
            }
        })
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    proptest::collection::vec(arb_record(), 0..40)
}

fn arb_selector() -> impl Strategy<Value = Option<String>> {
    proptest::option::of((2018u16..2024).prop_map(|y| y.to_string()))
}

fn arb_leaf_mode() -> impl Strategy<Value = LeafMode> {
    prop_oneof![Just(LeafMode::Records), Just(LeafMode::Count)]
}

fn arb_tiling() -> impl Strategy<Value = Tiling> {
    prop_oneof![Just(Tiling::default()), Just(Tiling::SliceDice)]
}

fn year_of(r: &Record) -> String {
    r.normalized(YEAR).map(|s| s.to_string()).unwrap_or_default()
}

fn check_weights(tree: &OrgTree<'_>, id: NodeId) {
    let node = tree.get(id);
    if node.is_leaf() {
        return;
    }
    let sum: u64 = tree.children(id).map(|c| tree.get(c).weight).sum();
    assert_eq!(node.weight, sum, "node '{}' weight", node.label);
    // Record leaves may share a name; grouping nodes may not
    let mut seen = HashSet::new();
    for c in tree.children(id) {
        let child = tree.get(c);
        if child.payload.is_none() {
            assert!(seen.insert(child.label.clone()), "duplicate group label");
        }
        check_weights(tree, c);
    }
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn weights_are_conserved(
        records in arb_records(),
        selector in arb_selector(),
        leaves in arb_leaf_mode(),
    ) {
        let selection = filter(&records, YEAR, selector.as_deref());
        let expected = records
            .iter()
            .filter(|r| selector.as_deref().map_or(true, |s| year_of(r) == s))
            .count();
        prop_assert_eq!(selection.len(), expected);

        let tree = build_tree(selection.iter(), &Grouping::default().with_leaves(leaves));
        prop_assert_eq!(tree.get(tree.root).weight, expected as u64);
        check_weights(&tree, tree.root);
    }

    #[test]
    fn runs_are_deterministic(records in arb_records(), selector in arb_selector()) {
        let request = ChartRequest {
            selector: selector.map(Into::into),
            ..ChartRequest::default()
        };
        let a = run(&records, &request);
        let b = run(&records, &request);
        let shape = |t: &OrgTree<'_>| -> Vec<(String, u64, Option<NodeId>)> {
            t.preorder(t.root)
                .into_iter()
                .map(|id| (t.get(id).label.to_string(), t.get(id).weight, t.get(id).parent))
                .collect()
        };
        prop_assert_eq!(shape(&a.tree), shape(&b.tree));
        let ra: Vec<Rect> = a.treemap.rects.iter().map(|r| r.rect).collect();
        let rb: Vec<Rect> = b.treemap.rects.iter().map(|r| r.rect).collect();
        prop_assert_eq!(ra, rb);
        prop_assert_eq!(a.node_link.nodes, b.node_link.nodes);
    }

    #[test]
    fn number_and_string_years_match_alike(year in 2000u16..2100) {
        let records = vec![
            Record::new().with_number(YEAR, year as f64),
            Record::new().with_text(YEAR, &year.to_string()),
            Record::new().with_number(YEAR, (year - 1) as f64),
        ];
        let selected = filter(&records, YEAR, Some(&year.to_string()));
        prop_assert_eq!(selected.len(), 2);
    }

    #[test]
    fn treemap_rects_nest_without_overlap(
        records in arb_records(),
        leaves in arb_leaf_mode(),
        tiling in arb_tiling(),
        width in 0.0f64..1200.0,
        height in 0.0f64..900.0,
        padding in 0.0f64..4.0,
    ) {
        let tree = build_tree(&records, &Grouping::default().with_leaves(leaves));
        let config = TreemapConfig { padding, tiling };
        let map = compute_treemap(&tree, tree.root, Rect::from_size(width, height), &config);

        if records.is_empty() {
            prop_assert!(map.is_empty());
        }
        for r in &map.rects {
            prop_assert!(r.rect.x0.is_finite() && r.rect.y0.is_finite());
            prop_assert!(r.rect.x1.is_finite() && r.rect.y1.is_finite());
            prop_assert!(r.rect.x0 <= r.rect.x1 && r.rect.y0 <= r.rect.y1);
            prop_assert!(tree.get(r.node).weight > 0);

            let Some(parent) = tree.get(r.node).parent else {
                continue;
            };
            let parent_rect = map.get(parent).map(|p| p.rect);
            prop_assert!(parent_rect.is_some());
            prop_assert!(parent_rect.unwrap().contains_rect(&r.rect));

            for sibling in tree.children(parent).filter(|&s| s > r.node) {
                if let Some(other) = map.get(sibling) {
                    prop_assert!(!r.rect.overlaps(&other.rect));
                }
            }
        }
    }

    #[test]
    fn node_link_edges_match_tree(records in arb_records(), dy in 1.0f64..200.0) {
        let tree = build_tree(&records, &Grouping::default());
        let config = NodeLinkConfig { dy, ..NodeLinkConfig::default() };
        let layout = compute_node_link(&tree, tree.root, &config);
        prop_assert_eq!(layout.nodes.len(), tree.len());
        prop_assert_eq!(layout.edges.len(), tree.len() - 1);
        for n in &layout.nodes {
            prop_assert!((n.y - n.depth as f64 * dy).abs() < 1e-9);
        }
        for e in &layout.edges {
            prop_assert_eq!(tree.get(e.target).parent, Some(e.source));
            prop_assert!((e.to.y - e.from.y - dy).abs() < 1e-9);
        }
    }
}

#[test]
fn grouping_follows_first_seen_order() {
    let records: Vec<Record> = [("A", "X"), ("B", "Y"), ("A", "X")]
        .iter()
        .map(|(d, l)| Record::new().with_text("dept", d).with_text("loc", l))
        .collect();
    let tree = build_tree(&records, &Grouping::by(&["dept", "loc"]));
    let top: Vec<_> = tree.children(tree.root).collect();
    assert_eq!(top.len(), 2);
    assert_eq!(tree.get(top[0]).label, "A");
    assert_eq!(tree.get(top[1]).label, "B");

    let a_kids: Vec<_> = tree.children(top[0]).collect();
    assert_eq!(a_kids.len(), 1);
    assert_eq!(tree.get(a_kids[0]).label, "X");
    assert_eq!(tree.get(a_kids[0]).weight, 2);

    let b_kids: Vec<_> = tree.children(top[1]).collect();
    assert_eq!(b_kids.len(), 1);
    assert_eq!(tree.get(b_kids[0]).label, "Y");
    assert_eq!(tree.get(b_kids[0]).weight, 1);
}

#[test]
fn empty_selection_is_a_terminal_state() {
    let records = vec![Record::new().with_number(YEAR, 2020.0)];
    let request = ChartRequest {
        selector: Some("2031".into()),
        ..ChartRequest::default()
    };
    let chart = run(&records, &request);
    let root = chart.tree.get(chart.tree.root);
    assert_eq!(root.weight, 0);
    assert_eq!(chart.tree.children(chart.tree.root).count(), 0);
    assert!(chart.treemap.rects.is_empty());
}
