pub mod instances;
pub mod link;
pub mod node_link;
pub mod treemap;

use serde::Serialize;

pub use link::{LinkShape, PathCommand};
pub use node_link::{
    compute_node_link, LayoutEdge, LayoutNode, NodeLinkConfig, NodeLinkLayout, Orientation,
};
pub use treemap::{compute_treemap, LayoutRect, Tiling, Treemap, TreemapConfig};

use crate::tree::arena::NodeId;

/// A 2-D point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle stored as corner bounds. `x0 <= x1` and `y0 <= y1`
/// hold for every rect produced by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Build from corner bounds, swapping reversed corners.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width.max(0.0), height.max(0.0))
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Shrink inward by `pad` on every side. Collapses to the center line
    /// instead of inverting when the rect is thinner than `2 * pad`.
    pub fn inset(&self, pad: f64) -> Self {
        let pad = pad.max(0.0);
        let (x0, x1) = inset_span(self.x0, self.x1, pad);
        let (y0, y1) = inset_span(self.y0, self.y1, pad);
        Self { x0, y0, x1, y1 }
    }

    /// Clamp into `outer`. The result is always ordered and inside `outer`.
    pub fn clip_to(&self, outer: &Rect) -> Self {
        let x0 = self.x0.clamp(outer.x0, outer.x1);
        let x1 = self.x1.clamp(outer.x0, outer.x1).max(x0);
        let y0 = self.y0.clamp(outer.y0, outer.y1);
        let y1 = self.y1.clamp(outer.y0, outer.y1).max(y0);
        Self { x0, y0, x1, y1 }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }

    /// Half-open point containment, so shared edges belong to one rect only.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Whether the interiors intersect. Touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

fn inset_span(lo: f64, hi: f64, pad: f64) -> (f64, f64) {
    if hi - lo >= 2.0 * pad {
        (lo + pad, hi - pad)
    } else {
        let mid = lo + (hi - lo) / 2.0;
        (mid, mid)
    }
}

/// Hit-test: find which treemap rectangle contains the given point.
/// Returns the deepest rectangle at that point.
pub fn hit_test(rects: &[LayoutRect], x: f64, y: f64) -> Option<NodeId> {
    // Rects are emitted parent-first, so the last hit is the deepest one
    rects
        .iter()
        .rev()
        .find(|r| r.rect.contains_point(x, y))
        .map(|r| r.node)
}
