use bytemuck::{Pod, Zeroable};

use super::treemap::Treemap;

pub const FLAG_LEAF: u32 = 1;

/// Per-rectangle instance data for a GPU renderer's vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    /// x0, y0, x1, y1 in pixels
    pub rect: [f32; 4],
    pub depth: u32,
    pub flags: u32,
    _pad: [u32; 2],
}

/// Pack treemap rects for upload. With `leaves_only`, internal frames are skipped.
pub fn rect_instances(treemap: &Treemap, leaves_only: bool) -> Vec<RectInstance> {
    treemap
        .rects
        .iter()
        .filter(|r| !leaves_only || r.is_leaf)
        .map(|r| RectInstance {
            rect: [
                r.rect.x0 as f32,
                r.rect.y0 as f32,
                r.rect.x1 as f32,
                r.rect.y1 as f32,
            ],
            depth: r.depth as u32,
            flags: if r.is_leaf { FLAG_LEAF } else { 0 },
            _pad: [0; 2],
        })
        .collect()
}

/// Raw bytes for `queue.write_buffer`-style uploads.
pub fn as_bytes(instances: &[RectInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_treemap, Rect, TreemapConfig};
    use crate::record::Record;
    use crate::tree::{build_tree, Grouping};

    #[test]
    fn instances_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<RectInstance>(), 32);
    }

    #[test]
    fn leaf_filter_and_byte_view() {
        let records: Vec<Record> = ["A", "B", "A"]
            .iter()
            .map(|d| Record::new().with_text("department", d).with_text("name", "n"))
            .collect();
        let tree = build_tree(&records, &Grouping::by(&["department"]));
        let bounds = Rect::from_size(100.0, 100.0);
        let map = compute_treemap(&tree, tree.root, bounds, &TreemapConfig::default());

        let all = rect_instances(&map, false);
        let leaves = rect_instances(&map, true);
        assert_eq!(all.len(), map.rects.len());
        assert_eq!(leaves.len(), 3);
        assert!(leaves.iter().all(|i| i.flags & FLAG_LEAF != 0));
        assert_eq!(as_bytes(&leaves).len(), 3 * 32);
    }
}
