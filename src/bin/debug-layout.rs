/// Diagnostic tool to verify records → tree → layout pipeline
use anyhow::Context;
use compact_str::CompactString;
use orgmap_rs::layout::instances::rect_instances;
use orgmap_rs::layout::{hit_test, Rect};
use orgmap_rs::pipeline::{self, ChartRequest};
use orgmap_rs::record;
use orgmap_rs::tree::aggregate::sort_children_by_weight;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "orgmap_rs=debug"
                    .parse::<tracing_subscriber::filter::Directive>()
                    .context("bad log directive")?,
            ),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: debug-layout <records.json> [selector]")?;
    let selector = std::env::args().nth(2).map(CompactString::from);

    println!("=== DIAGNOSTIC: Records → Tree → Layout Pipeline ===");
    println!("Records: {}", path.display());

    let records = record::load_records_json(&path)?;
    println!("\n[1] Loaded {} records", records.len());

    let request = ChartRequest {
        selector,
        ..ChartRequest::default()
    };
    let chart = pipeline::run(&records, &request);
    let tree = &chart.tree;
    let root = tree.get(tree.root);
    println!("    Selector options: {:?}", chart.options);
    println!(
        "\n[2] Tree built: {} nodes, height {}, root weight {}",
        tree.len(),
        tree.height(),
        root.weight
    );

    // Display-only ordering, on a copy so the chart keeps first-seen order
    let mut by_weight = tree.clone();
    sort_children_by_weight(&mut by_weight);
    println!("\n[3] Top 10 groups by weight:");
    for (i, id) in by_weight.children(by_weight.root).take(10).enumerate() {
        let node = by_weight.get(id);
        println!(
            "    [{}] '{}' - weight {} ({} children)",
            i,
            node.label,
            node.weight,
            by_weight.children(id).count()
        );
    }

    let rects = &chart.treemap.rects;
    println!("\n[4] Treemap computed: {} rectangles", rects.len());

    println!("\n[5] Top 10 largest leaf rectangles by area:");
    let mut leaves: Vec<_> = chart.treemap.leaves().collect();
    leaves.sort_by(|a, b| b.rect.area().total_cmp(&a.rect.area()));
    for (i, r) in leaves.iter().take(10).enumerate() {
        let node = tree.get(r.node);
        println!(
            "    [{}] '{}' - {:.1}x{:.1} at ({:.1}, {:.1}) depth {}",
            i,
            node.label,
            r.rect.width(),
            r.rect.height(),
            r.rect.x0,
            r.rect.y0,
            r.depth
        );
    }

    // Check for anomalies
    println!("\n[6] Checking for anomalies:");
    let mut escaped = 0usize;
    let mut overlapping = 0usize;
    let mut inverted = 0usize;
    for r in rects.iter() {
        if r.rect.x0 > r.rect.x1 || r.rect.y0 > r.rect.y1 || !r.rect.area().is_finite() {
            inverted += 1;
        }
        let Some(parent) = tree.get(r.node).parent else {
            continue;
        };
        if let Some(p) = chart.treemap.get(parent) {
            if !p.rect.contains_rect(&r.rect) {
                escaped += 1;
            }
        }
        let siblings = tree.children(parent).filter(|&s| s > r.node);
        for s in siblings {
            if let Some(other) = chart.treemap.get(s) {
                if r.rect.overlaps(&other.rect) {
                    overlapping += 1;
                }
            }
        }
    }
    println!("    Inverted or non-finite rects: {}", inverted);
    println!("    Rects escaping their parent:  {}", escaped);
    println!("    Overlapping sibling pairs:    {}", overlapping);

    let leaf_area: f64 = leaves.iter().map(|r| r.rect.area()).sum();
    let viewport: Rect = request.bounds;
    println!(
        "    Leaf coverage: {:.1}% of {:.0}x{:.0}",
        leaf_area / viewport.area().max(1.0) * 100.0,
        viewport.width(),
        viewport.height()
    );

    println!(
        "\n[7] Node-link layout: {} nodes, {} edges",
        chart.node_link.nodes.len(),
        chart.node_link.edges.len()
    );
    if let Some((lo, hi)) = chart.node_link.extent() {
        println!("    Extent: ({:.0}, {:.0}) .. ({:.0}, {:.0})", lo.x, lo.y, hi.x, hi.y);
    }
    for edge in chart.node_link.edges.iter().take(3) {
        println!(
            "    {} -> {}: {}",
            tree.get(edge.source).label,
            tree.get(edge.target).label,
            edge.to_svg_path()
        );
    }

    let center = (viewport.x0 + viewport.width() / 2.0, viewport.y0 + viewport.height() / 2.0);
    match hit_test(rects, center.0, center.1) {
        Some(id) => println!("\n[8] Viewport center hits '{}'", tree.get(id).label),
        None => println!("\n[8] Viewport center hits nothing"),
    }

    let instances = rect_instances(&chart.treemap, true);
    println!("    GPU instances (leaves): {}", instances.len());

    Ok(())
}
