use crate::util::stable_pair;

use super::model::{Edge, EdgeStyle, Entity, EntityKind, EntityMetrics, GraphData, LinePattern};

const DOCUMENT_TITLES: [&str; 5] = [
    "Onboarding Handbook",
    "Security Policy",
    "Product Roadmap",
    "Incident Postmortems",
    "API Reference",
];

const CLUSTER_TOPICS: [&str; 8] = [
    "Accounts & Access",
    "Team Rituals",
    "Threat Model",
    "Release Planning",
    "Customer Feedback",
    "Outage Timeline",
    "Authentication",
    "Rate Limits",
];

pub const DEMO_DOCUMENTS: usize = DOCUMENT_TITLES.len();
pub const DEMO_CLUSTERS: usize = CLUSTER_TOPICS.len();
pub const DEMO_CHUNKS: usize = 20;

fn demo_metrics(id: &str) -> EntityMetrics {
    let (canvas, chat) = stable_pair(id);
    EntityMetrics {
        canvas,
        chat,
        overall: (canvas + chat) * 0.5,
    }
}

/// Deterministic sample graph shaped like a small document corpus.
pub fn demo_graph() -> GraphData {
    let mut entities = Vec::with_capacity(DEMO_DOCUMENTS + DEMO_CLUSTERS + DEMO_CHUNKS);
    let mut edges = Vec::new();

    for (index, title) in DOCUMENT_TITLES.iter().enumerate() {
        let id = format!("doc-{}", index + 1);
        let mut entity = Entity::new(&id, EntityKind::Document).with_title(*title);
        entity.content.summary = format!("Source document {} of the demo corpus.", index + 1);
        entity.metrics = demo_metrics(&id);
        entities.push(entity);
    }

    for (index, topic) in CLUSTER_TOPICS.iter().enumerate() {
        let id = format!("cluster-{}", index + 1);
        let parent = format!("doc-{}", index % DEMO_DOCUMENTS + 1);
        let mut entity = Entity::new(&id, EntityKind::Cluster)
            .with_title(*topic)
            .with_parent(&parent);
        entity.content.cluster_topics = vec![topic.to_lowercase()];
        entity.metrics = demo_metrics(&id);
        entities.push(entity);

        edges.push(Edge::new(format!("edge-{id}-{parent}"), &id, &parent));
    }

    for index in 0..DEMO_CHUNKS {
        let id = format!("chunk-{}", index + 1);
        let cluster_index = index % DEMO_CLUSTERS;
        let parent = format!("cluster-{}", cluster_index + 1);
        let mut entity = Entity::new(&id, EntityKind::Chunk)
            .with_title(format!("{} #{}", CLUSTER_TOPICS[cluster_index], index / DEMO_CLUSTERS + 1))
            .with_parent(&parent);
        entity.content.quote = format!("Excerpt {} from {}.", index + 1, CLUSTER_TOPICS[cluster_index]);
        entity.content.keywords = CLUSTER_TOPICS[cluster_index]
            .split_whitespace()
            .filter(|word| word.len() > 1)
            .map(str::to_lowercase)
            .collect();
        entity.metrics = demo_metrics(&id);
        entities.push(entity);

        edges.push(Edge::new(format!("edge-{id}-{parent}"), &id, &parent));
    }

    // Related chunks on the same ring, drawn dashed.
    for index in (0..DEMO_CHUNKS).step_by(3) {
        let start = format!("chunk-{}", index + 1);
        let end = format!("chunk-{}", (index + 4) % DEMO_CHUNKS + 1);
        let mut edge = Edge::new(format!("edge-related-{start}-{end}"), start, end);
        edge.description = "related content".to_owned();
        edge.style = EdgeStyle {
            line: LinePattern::Dashed,
            ..EdgeStyle::default()
        };
        edges.push(edge);
    }

    GraphData { entities, edges }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn demo_has_expected_layer_populations() {
        let graph = demo_graph();
        assert_eq!(graph.count_of(EntityKind::Document), DEMO_DOCUMENTS);
        assert_eq!(graph.count_of(EntityKind::Cluster), DEMO_CLUSTERS);
        assert_eq!(graph.count_of(EntityKind::Chunk), DEMO_CHUNKS);
    }

    #[test]
    fn demo_edges_resolve_and_ids_are_unique() {
        let graph = demo_graph();
        let index = graph.index_by_id();
        assert_eq!(index.len(), graph.entities.len());

        let mut edge_ids = HashSet::new();
        for edge in &graph.edges {
            assert!(index.contains_key(&edge.start), "dangling start {}", edge.start);
            assert!(index.contains_key(&edge.end), "dangling end {}", edge.end);
            assert!(edge_ids.insert(edge.id.clone()), "duplicate edge {}", edge.id);
        }
    }

    #[test]
    fn demo_is_deterministic() {
        let first = demo_graph();
        let second = demo_graph();
        assert_eq!(first.entities, second.entities);
        assert_eq!(first.edges, second.edges);
    }
}
