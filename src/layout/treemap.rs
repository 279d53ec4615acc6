use std::collections::HashMap;

use serde::Serialize;

use super::{Point, Rect};
use crate::tree::arena::{NodeId, OrgTree};

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LayoutRect {
    pub node: NodeId,
    pub rect: Rect,
    /// Depth relative to the layout root (root = 0)
    pub depth: u16,
    /// Leaves are drawn as filled tiles; internal rects only frame them
    pub is_leaf: bool,
}

impl LayoutRect {
    /// Where a renderer places the tile's text label.
    pub fn label_anchor(&self) -> Point {
        Point::new(self.rect.x0 + 5.0, self.rect.y0 + 20.0)
    }
}

/// The full treemap result (rects + fast lookup).
#[derive(Debug, Default)]
pub struct Treemap {
    /// Every node with positive weight, parent before children, siblings in stored order
    pub rects: Vec<LayoutRect>,
    /// node → index into `rects`
    pub node_to_rect: HashMap<NodeId, usize>,
}

impl Treemap {
    pub fn get(&self, node: NodeId) -> Option<&LayoutRect> {
        self.node_to_rect.get(&node).map(|&i| &self.rects[i])
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LayoutRect> {
        self.rects.iter().filter(|r| r.is_leaf)
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// How a node's rectangle is divided among its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tiling {
    /// Rows of near-target aspect ratio; keeps sibling order.
    Squarify { ratio: f64 },
    /// Split along x at even depths and along y at odd depths.
    SliceDice,
}

impl Default for Tiling {
    fn default() -> Self {
        Tiling::Squarify {
            ratio: (1.0 + 5f64.sqrt()) / 2.0,
        }
    }
}

/// Configuration for treemap layout.
#[derive(Debug, Clone)]
pub struct TreemapConfig {
    /// Inset applied to every child cell on all sides (px)
    pub padding: f64,
    pub tiling: Tiling,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            padding: 1.0,
            tiling: Tiling::default(),
        }
    }
}

/// Compute the treemap for the subtree at `root` inside `bounds`.
///
/// Nodes with zero weight, and everything below them, are left out. A root of
/// weight zero yields an empty treemap.
pub fn compute_treemap(
    tree: &OrgTree<'_>,
    root: NodeId,
    bounds: Rect,
    config: &TreemapConfig,
) -> Treemap {
    let mut out = Treemap::default();

    let root_node = tree.get(root);
    if root_node.weight == 0 {
        tracing::debug!("Treemap root '{}' has zero weight, nothing to lay out", root_node.label);
        return out;
    }

    let bounds = Rect::new(bounds.x0, bounds.y0, bounds.x1, bounds.y1);
    out.rects.push(LayoutRect {
        node: root,
        rect: bounds,
        depth: 0,
        is_leaf: root_node.is_leaf(),
    });
    out.node_to_rect.insert(root, 0);

    layout_children(tree, root, bounds, 0, config, &mut out);

    tracing::info!(
        "Treemap computed: {} rects ({} leaves) in {:.0}x{:.0}",
        out.rects.len(),
        out.leaves().count(),
        bounds.width(),
        bounds.height()
    );

    out
}

/// Recursively partition `rect` among the positive-weight children of `parent`.
fn layout_children(
    tree: &OrgTree<'_>,
    parent: NodeId,
    rect: Rect,
    depth: u16,
    config: &TreemapConfig,
    out: &mut Treemap,
) {
    let children: Vec<NodeId> = tree
        .children(parent)
        .filter(|&id| tree.get(id).weight > 0)
        .collect();
    if children.is_empty() {
        return;
    }

    let weights: Vec<f64> = children.iter().map(|&id| tree.get(id).weight as f64).collect();
    let cells = match config.tiling {
        Tiling::Squarify { ratio } => squarify(&weights, rect, ratio),
        Tiling::SliceDice if depth % 2 == 0 => dice(&weights, rect),
        Tiling::SliceDice => slice(&weights, rect),
    };

    for (&child_id, cell) in children.iter().zip(cells) {
        let child_rect = cell.inset(config.padding).clip_to(&rect);
        let child = tree.get(child_id);

        let idx = out.rects.len();
        out.rects.push(LayoutRect {
            node: child_id,
            rect: child_rect,
            depth: depth + 1,
            is_leaf: child.is_leaf(),
        });
        out.node_to_rect.insert(child_id, idx);

        if !child.is_leaf() {
            layout_children(tree, child_id, child_rect, depth + 1, config, out);
        }
    }
}

/// Cumulative split positions along `[lo, hi]`; the last edge lands exactly on `hi`
/// so neighbouring cells share boundaries bit-for-bit.
fn edges(weights: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let mut out = Vec::with_capacity(weights.len() + 1);
    out.push(lo);
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        let e = if i + 1 == weights.len() || total <= 0.0 {
            hi
        } else {
            lo + (hi - lo) * (acc / total)
        };
        out.push(e.min(hi));
    }
    out
}

/// Side-by-side cells, split along x.
fn dice(weights: &[f64], rect: Rect) -> Vec<Rect> {
    edges(weights, rect.x0, rect.x1)
        .windows(2)
        .map(|e| Rect::new(e[0], rect.y0, e[1], rect.y1))
        .collect()
}

/// Stacked cells, split along y.
fn slice(weights: &[f64], rect: Rect) -> Vec<Rect> {
    edges(weights, rect.y0, rect.y1)
        .windows(2)
        .map(|e| Rect::new(rect.x0, e[0], rect.x1, e[1]))
        .collect()
}

/// Squarified layout that keeps the input order: rows grow greedily while the
/// worst aspect ratio in the row does not get worse.
fn squarify(weights: &[f64], rect: Rect, ratio: f64) -> Vec<Rect> {
    let mut result = Vec::with_capacity(weights.len());
    let Rect { mut x0, mut y0, x1, y1 } = rect;
    let mut remaining: f64 = weights.iter().sum();
    let mut i0 = 0;

    while i0 < weights.len() {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Guard against degenerate cases
        if dx <= 1e-12 || dy <= 1e-12 || remaining <= 0.0 {
            result.extend((i0..weights.len()).map(|_| Rect::new(x0, y0, x0, y0)));
            break;
        }

        let alpha = (dy / dx).max(dx / dy) / (remaining * ratio);
        let mut row_sum = weights[i0];
        let mut min_w = row_sum;
        let mut max_w = row_sum;
        let mut best = worst_aspect_ratio(min_w, max_w, row_sum, alpha);

        let mut i1 = i0 + 1;
        while i1 < weights.len() {
            let w = weights[i1];
            let sum = row_sum + w;
            let score = worst_aspect_ratio(min_w.min(w), max_w.max(w), sum, alpha);
            if score > best {
                break;
            }
            row_sum = sum;
            min_w = min_w.min(w);
            max_w = max_w.max(w);
            best = score;
            i1 += 1;
        }

        let row = &weights[i0..i1];
        let last_row = i1 == weights.len();
        if dx < dy {
            // Horizontal row across the top, thickness consumes height
            let y_split = if last_row { y1 } else { (y0 + dy * row_sum / remaining).min(y1) };
            result.extend(dice(row, Rect::new(x0, y0, x1, y_split)));
            y0 = y_split;
        } else {
            let x_split = if last_row { x1 } else { (x0 + dx * row_sum / remaining).min(x1) };
            result.extend(slice(row, Rect::new(x0, y0, x_split, y1)));
            x0 = x_split;
        }

        remaining -= row_sum;
        i0 = i1;
    }

    result
}

fn worst_aspect_ratio(min_w: f64, max_w: f64, sum: f64, alpha: f64) -> f64 {
    let beta = sum * sum * alpha;
    (max_w / beta).max(beta / min_w)
}
