use std::cmp::Ordering;

use super::arena::{NodeId, OrgTree};

/// Compute weights for all internal nodes (bottom-up).
/// After this, each internal node's `weight` equals the sum of its children's weights;
/// leaf weights are left as assigned during construction.
pub fn aggregate_weights(tree: &mut OrgTree<'_>) {
    // Children always have higher indices than their parents in the arena,
    // so a reverse sweep sees every child before its parent.
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        let node = &tree.nodes[i];
        if node.is_leaf() {
            continue;
        }

        let mut total: u64 = 0;
        let mut child = node.first_child;
        while let Some(child_id) = child {
            total += tree.nodes[child_id.index()].weight;
            child = tree.nodes[child_id.index()].next_sibling;
        }
        tree.nodes[i].weight = total;
    }
}

/// Sort children of each node by weight (descending). Ties keep first-seen order.
/// Display-only: aggregation never calls this.
pub fn sort_children_by_weight(tree: &mut OrgTree<'_>) {
    sort_children_by(tree, |tree, a, b| tree.get(b).weight.cmp(&tree.get(a).weight));
}

/// Sort children of each node by label (ascending). Display-only.
pub fn sort_children_by_label(tree: &mut OrgTree<'_>) {
    sort_children_by(tree, |tree, a, b| tree.get(a).label.cmp(&tree.get(b).label));
}

/// Re-link every sibling list in the order given by `cmp` without moving nodes in the arena.
fn sort_children_by<F>(tree: &mut OrgTree<'_>, cmp: F)
where
    F: Fn(&OrgTree<'_>, NodeId, NodeId) -> Ordering,
{
    let len = tree.nodes.len();
    for i in 0..len {
        if tree.nodes[i].is_leaf() {
            continue;
        }

        let mut children: Vec<NodeId> = tree.children(NodeId(i as u32)).collect();
        let view: &OrgTree<'_> = tree;
        children.sort_by(|&a, &b| cmp(view, a, b));

        let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
            continue;
        };
        tree.nodes[i].first_child = Some(first);
        tree.nodes[i].last_child = Some(last);
        for w in children.windows(2) {
            tree.nodes[w[0].index()].next_sibling = Some(w[1]);
        }
        tree.nodes[last.index()].next_sibling = None;
    }
}
