use std::path::PathBuf;

use anyhow::{Context, Result};
use compact_str::CompactString;
use serde::Serialize;

use orgmap_rs::layout::{LayoutEdge, Point, Rect};
use orgmap_rs::pipeline::{self, Chart, ChartRequest};
use orgmap_rs::record;
use orgmap_rs::tree::{Grouping, ROOT_LABEL};

/// Geometry handed to an external renderer.
#[derive(Serialize)]
struct ChartOutput<'a> {
    options: &'a [CompactString],
    root_label: &'static str,
    tiles: Vec<TileOut<'a>>,
    nodes: Vec<NodeOut<'a>>,
    links: Vec<LinkOut>,
}

#[derive(Serialize)]
struct TileOut<'a> {
    id: u32,
    label: &'a str,
    weight: u64,
    depth: u16,
    leaf: bool,
    rect: Rect,
    label_at: Point,
}

#[derive(Serialize)]
struct NodeOut<'a> {
    id: u32,
    parent: Option<u32>,
    label: &'a str,
    weight: u64,
    depth: u16,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct LinkOut {
    source: u32,
    target: u32,
    d: String,
}

impl LinkOut {
    fn from_edge(edge: &LayoutEdge) -> Self {
        Self {
            source: edge.source.0,
            target: edge.target.0,
            d: edge.to_svg_path(),
        }
    }
}

fn to_output<'a>(chart: &'a Chart<'_>) -> ChartOutput<'a> {
    let tree = &chart.tree;
    let tiles = chart
        .treemap
        .rects
        .iter()
        .map(|r| {
            let node = tree.get(r.node);
            TileOut {
                id: r.node.0,
                label: node.label.as_str(),
                weight: node.weight,
                depth: r.depth,
                leaf: r.is_leaf,
                rect: r.rect,
                label_at: r.label_anchor(),
            }
        })
        .collect();
    let nodes = chart
        .node_link
        .nodes
        .iter()
        .map(|n| {
            let node = tree.get(n.node);
            NodeOut {
                id: n.node.0,
                parent: node.parent.map(|p| p.0),
                label: node.label.as_str(),
                weight: node.weight,
                depth: n.depth,
                x: n.x,
                y: n.y,
            }
        })
        .collect();
    let links = chart.node_link.edges.iter().map(LinkOut::from_edge).collect();

    ChartOutput {
        options: &chart.options,
        root_label: ROOT_LABEL,
        tiles,
        nodes,
        links,
    }
}

fn main() -> Result<()> {
    // Initialize logging; stdout carries the JSON, logs go to stderr
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "orgmap_rs=info"
                    .parse::<tracing_subscriber::filter::Directive>()
                    .context("bad log directive")?,
            ),
        )
        .init();

    // Parse command line: <records.json> [selector] [field,field,...]
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .context("usage: orgmap-rs <records.json> [selector] [group,fields]")?;
    let selector = args.next().filter(|s| !s.is_empty()).map(CompactString::from);
    let grouping = match args.next() {
        Some(fields) => Grouping::by(&fields.split(',').map(str::trim).collect::<Vec<_>>()),
        None => Grouping::default(),
    };

    tracing::info!("orgmap-rs starting, records: {:?}", path);

    let records = record::load_records_json(&path)?;
    let request = ChartRequest {
        selector,
        grouping,
        ..ChartRequest::default()
    };
    let chart = pipeline::run(&records, &request);

    let json = serde_json::to_string_pretty(&to_output(&chart)).context("failed to encode layout")?;
    println!("{json}");

    Ok(())
}
