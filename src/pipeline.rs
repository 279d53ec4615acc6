use compact_str::CompactString;

use crate::filter::{filter, year_options};
use crate::layout::{
    compute_node_link, compute_treemap, NodeLinkConfig, NodeLinkLayout, Rect, Treemap,
    TreemapConfig,
};
use crate::record::Record;
use crate::tree::arena::OrgTree;
use crate::tree::{build_tree, Grouping};

/// Everything one chart render needs, besides the records themselves.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    /// Field the selector is compared against
    pub filter_field: CompactString,
    /// Active selection; `None` or empty keeps every record
    pub selector: Option<CompactString>,
    pub grouping: Grouping,
    /// Viewport the treemap fills
    pub bounds: Rect,
    pub treemap: TreemapConfig,
    pub node_link: NodeLinkConfig,
}

impl Default for ChartRequest {
    fn default() -> Self {
        Self {
            filter_field: CompactString::new("programme-year"),
            selector: None,
            grouping: Grouping::default(),
            bounds: Rect::from_size(800.0, 600.0),
            treemap: TreemapConfig::default(),
            node_link: NodeLinkConfig::default(),
        }
    }
}

/// Output of one pipeline run. Borrows the records it was built from.
#[derive(Debug)]
pub struct Chart<'r> {
    pub tree: OrgTree<'r>,
    pub treemap: Treemap,
    pub node_link: NodeLinkLayout,
    /// Selector choices, taken from the unfiltered records
    pub options: Vec<CompactString>,
}

/// Filter → aggregate → lay out. Pure: the same inputs give the same chart.
pub fn run<'r>(records: &'r [Record], request: &ChartRequest) -> Chart<'r> {
    let options = year_options(records, &request.filter_field);
    let selection = filter(records, &request.filter_field, request.selector.as_deref());

    tracing::info!(
        "Pipeline run: {} of {} records selected (selector={:?})",
        selection.len(),
        records.len(),
        request.selector
    );

    let tree = build_tree(selection.iter(), &request.grouping);
    let treemap = compute_treemap(&tree, tree.root, request.bounds, &request.treemap);
    let node_link = compute_node_link(&tree, tree.root, &request.node_link);

    Chart {
        tree,
        treemap,
        node_link,
        options,
    }
}

/// Ticket for one pipeline invocation; later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Holds the result of the most recent invocation only. Results that arrive
/// for a superseded generation are dropped rather than merged.
#[derive(Debug)]
pub struct LatestSlot<T> {
    issued: u64,
    value: Option<(Generation, T)>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            value: None,
        }
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new invocation, superseding every outstanding one.
    pub fn begin(&mut self) -> Generation {
        self.issued += 1;
        Generation(self.issued)
    }

    /// Store `value` if `generation` is still the newest. Returns whether it was kept.
    pub fn submit(&mut self, generation: Generation, value: T) -> bool {
        if generation.0 != self.issued {
            tracing::debug!(
                "Discarding stale result for generation {} (latest is {})",
                generation.0,
                self.issued
            );
            return false;
        }
        self.value = Some((generation, value));
        true
    }

    pub fn latest(&self) -> Option<&T> {
        self.value.as_ref().map(|(_, v)| v)
    }

    /// Whether the stored value belongs to the newest generation.
    pub fn is_current(&self) -> bool {
        matches!(self.value, Some((g, _)) if g.0 == self.issued)
    }
}
