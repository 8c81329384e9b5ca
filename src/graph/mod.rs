mod demo;
mod load;
pub mod model;

use std::path::Path;

use anyhow::Result;
use tracing::info;

pub use demo::demo_graph;
pub use load::read_graph_file;
pub use model::{Edge, Entity, EntityKind, GraphData, Rgb};

pub fn collect_graph(path: Option<&Path>) -> Result<GraphData> {
    let graph = match path {
        Some(path) => read_graph_file(path)?,
        None => demo_graph(),
    };

    info!(
        entities = graph.entities.len(),
        edges = graph.edges.len(),
        source = %path.map(|path| path.display().to_string()).unwrap_or_else(|| "demo".to_owned()),
        "graph data loaded"
    );
    Ok(graph)
}
