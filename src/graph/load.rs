use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::model::{
    Edge, EdgeStyle, Entity, EntityContent, EntityKind, EntityMetrics, GraphData, SourceLocation,
};

#[derive(Clone, Debug, Deserialize)]
struct RawEntity {
    id: String,
    #[serde(alias = "content_entity_type")]
    kind: String,
    #[serde(default, alias = "parent_node_id")]
    parent_id: Option<String>,
    #[serde(default)]
    content: EntityContent,
    #[serde(default)]
    metrics: EntityMetrics,
    #[serde(default)]
    location: Option<SourceLocation>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEdge {
    id: String,
    #[serde(alias = "start_node_id")]
    start: String,
    #[serde(alias = "end_node_id")]
    end: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "style_metadata")]
    style: EdgeStyle,
}

pub fn read_graph_file(path: &Path) -> Result<GraphData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    parse_graph_json(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))
}

pub(super) fn parse_graph_json(raw: &str) -> Result<GraphData> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in dataset")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("dataset must be a JSON object with `entities` and `edges`"))?;

    let raw_entities = object
        .get("entities")
        .or_else(|| object.get("nodes"))
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("dataset has no `entities` array"))?;

    let mut seen = HashSet::with_capacity(raw_entities.len());
    let mut entities = Vec::with_capacity(raw_entities.len());
    for value in raw_entities {
        let raw = match RawEntity::deserialize(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "skipping malformed entity");
                continue;
            }
        };

        let Some(kind) = EntityKind::from_key(&raw.kind) else {
            warn!(id = %raw.id, kind = %raw.kind, "skipping entity with unknown kind");
            continue;
        };

        if !seen.insert(raw.id.clone()) {
            warn!(id = %raw.id, "skipping duplicate entity id");
            continue;
        }

        entities.push(Entity {
            id: raw.id,
            kind,
            parent_id: raw.parent_id,
            content: raw.content,
            metrics: raw.metrics.clamped(),
            location: raw.location,
        });
    }

    let mut edges = Vec::new();
    if let Some(raw_edges) = object.get("edges").and_then(Value::as_array) {
        edges.reserve(raw_edges.len());
        for value in raw_edges {
            match RawEdge::deserialize(value) {
                Ok(raw) => edges.push(Edge {
                    id: raw.id,
                    start: raw.start,
                    end: raw.end,
                    description: raw.description,
                    style: raw.style,
                }),
                Err(error) => warn!(%error, "skipping malformed edge"),
            }
        }
    }

    if entities.is_empty() {
        Err(anyhow!("dataset contains no usable entities"))
    } else {
        Ok(GraphData { entities, edges })
    }
}
