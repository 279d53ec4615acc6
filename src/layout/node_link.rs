use serde::Serialize;

use super::link::{link_path, to_svg_path, LinkShape, PathCommand};
use super::Point;
use crate::tree::arena::{NodeId, OrgTree};

/// Which way depth grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    /// Root on top, depth grows along +y.
    #[default]
    Vertical,
    /// Root on the left, depth grows along +x.
    Horizontal,
}

/// Configuration for the node-link (org chart) layout.
#[derive(Debug, Clone)]
pub struct NodeLinkConfig {
    /// Spacing between neighbouring siblings (px)
    pub dx: f64,
    /// Spacing between depth levels (px)
    pub dy: f64,
    pub orientation: Orientation,
    /// Added to every position after layout, e.g. to leave room for a banner
    pub offset: Point,
    pub link: LinkShape,
}

impl Default for NodeLinkConfig {
    fn default() -> Self {
        Self {
            dx: 120.0,
            dy: 80.0,
            orientation: Orientation::Vertical,
            offset: Point::default(),
            link: LinkShape::Curved,
        }
    }
}

/// A positioned node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutNode {
    pub node: NodeId,
    pub x: f64,
    pub y: f64,
    /// Depth relative to the layout root
    pub depth: u16,
}

impl LayoutNode {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One parent–child connection between finalized node positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub from: Point,
    pub to: Point,
    pub shape: LinkShape,
    pub orientation: Orientation,
}

impl LayoutEdge {
    pub fn path(&self) -> Vec<PathCommand> {
        link_path(self.from, self.to, self.shape, self.orientation)
    }

    pub fn to_svg_path(&self) -> String {
        to_svg_path(&self.path())
    }
}

#[derive(Debug, Default)]
pub struct NodeLinkLayout {
    /// Pre-order, children in stored order
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl NodeLinkLayout {
    /// Bounding box of all node positions as `(min, max)`.
    pub fn extent(&self) -> Option<(Point, Point)> {
        let first = self.nodes.first()?.point();
        Some(self.nodes.iter().fold((first, first), |(lo, hi), n| {
            (
                Point::new(lo.x.min(n.x), lo.y.min(n.y)),
                Point::new(hi.x.max(n.x), hi.y.max(n.y)),
            )
        }))
    }
}

/// Lay out the subtree at `root` on a uniform grid.
///
/// Children are centered under their parent at `dx` steps and each depth level
/// sits `dy` further from the root. Subtrees are not compacted and may overlap.
pub fn compute_node_link(
    tree: &OrgTree<'_>,
    root: NodeId,
    config: &NodeLinkConfig,
) -> NodeLinkLayout {
    let order = tree.preorder(root);
    let root_depth = tree.get(root).depth;

    // (sibling axis, depth axis) per arena slot; parents are always placed first
    let mut grid: Vec<Option<(f64, f64)>> = vec![None; tree.len()];
    grid[root.index()] = Some((0.0, 0.0));

    for &id in &order {
        let Some((u, v)) = grid[id.index()] else {
            continue;
        };
        let children: Vec<NodeId> = tree.children(id).collect();
        let center = (children.len() as f64 - 1.0) / 2.0;
        for (i, child) in children.into_iter().enumerate() {
            grid[child.index()] = Some((u + (i as f64 - center) * config.dx, v + config.dy));
        }
    }

    let place = |id: NodeId| -> Point {
        let (u, v) = grid[id.index()].unwrap_or_default();
        let (x, y) = match config.orientation {
            Orientation::Vertical => (u, v),
            Orientation::Horizontal => (v, u),
        };
        Point::new(x + config.offset.x, y + config.offset.y)
    };

    let nodes: Vec<LayoutNode> = order
        .iter()
        .map(|&id| {
            let p = place(id);
            LayoutNode {
                node: id,
                x: p.x,
                y: p.y,
                depth: tree.get(id).depth - root_depth,
            }
        })
        .collect();

    let edges: Vec<LayoutEdge> = order
        .iter()
        .flat_map(move |&parent| tree.children(parent).map(move |child| (parent, child)))
        .map(|(parent, child)| LayoutEdge {
            source: parent,
            target: child,
            from: place(parent),
            to: place(child),
            shape: config.link,
            orientation: config.orientation,
        })
        .collect();

    tracing::info!(
        "Node-link layout computed: {} nodes, {} edges",
        nodes.len(),
        edges.len()
    );

    NodeLinkLayout { nodes, edges }
}
