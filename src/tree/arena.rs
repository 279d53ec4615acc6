use compact_str::CompactString;
use serde::Serialize;

use crate::record::Record;

/// Index into the arena `Vec<TreeNode>`. Uses u32 to keep nodes compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single node in the aggregated hierarchy, stored in a flat arena.
/// Uses sibling-list representation: each node has `first_child` and `next_sibling`.
#[derive(Debug, Clone)]
pub struct TreeNode<'r> {
    /// Category value, record name for record leaves, or the root sentinel
    pub label: CompactString,
    /// Leaf: record count (1 per record leaf). Internal: sum of children.
    pub weight: u64,
    /// Originating record for record leaves; borrowed, never copied
    pub payload: Option<&'r Record>,
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    /// Last child, kept so appends preserve first-seen order in O(1)
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
}

impl<'r> TreeNode<'r> {
    fn new(label: CompactString, weight: u64, payload: Option<&'r Record>) -> Self {
        Self {
            label,
            weight,
            payload,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            depth: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }
}

/// The aggregated tree stored as a flat arena of nodes.
/// Children always have higher indices than their parents.
#[derive(Debug, Clone)]
pub struct OrgTree<'r> {
    pub nodes: Vec<TreeNode<'r>>,
    pub root: NodeId,
}

impl<'r> OrgTree<'r> {
    /// Create a tree holding only a root node.
    pub fn new(root_label: &str) -> Self {
        OrgTree {
            nodes: vec![TreeNode::new(CompactString::new(root_label), 0, None)],
            root: NodeId(0),
        }
    }

    /// Append a child after the parent's current last child. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        label: CompactString,
        weight: u64,
        payload: Option<&'r Record>,
    ) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        let mut node = TreeNode::new(label, weight, payload);
        node.parent = Some(parent);
        node.depth = self.nodes[parent.index()].depth + 1;

        match self.nodes[parent.index()].last_child {
            Some(last) => self.nodes[last.index()].next_sibling = Some(new_id),
            None => self.nodes[parent.index()].first_child = Some(new_id),
        }
        self.nodes[parent.index()].last_child = Some(new_id);

        self.nodes.push(node);
        new_id
    }

    pub fn get(&self, id: NodeId) -> &TreeNode<'r> {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode<'r> {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (only root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node in stored order.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_, 'r> {
        ChildIter {
            tree: self,
            current: self.nodes[parent.index()].first_child,
        }
    }

    /// Depth-first pre-order walk starting at `from`, children in stored order.
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mark = stack.len();
            stack.extend(self.children(id));
            stack[mark..].reverse();
        }
        out
    }

    /// Leaf nodes under `from`, in pre-order.
    pub fn leaves(&self, from: NodeId) -> Vec<NodeId> {
        self.preorder(from)
            .into_iter()
            .filter(|&id| id != from && self.get(id).is_leaf())
            .collect()
    }

    /// Height below the root (0 for a root without children).
    pub fn height(&self) -> u16 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a, 'r> {
    tree: &'a OrgTree<'r>,
    current: Option<NodeId>,
}

impl<'a, 'r> Iterator for ChildIter<'a, 'r> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}
