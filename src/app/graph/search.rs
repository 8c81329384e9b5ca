use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::Entity;

use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

fn entity_matches(matcher: &SkimMatcherV2, entity: &Entity, query: &str) -> bool {
    fuzzy_match_score(matcher, entity.display_title(), query).is_some()
        || entity
            .content
            .keywords
            .iter()
            .any(|keyword| fuzzy_match_score(matcher, keyword, query).is_some())
}

pub(super) fn matching_entities(entities: &[Entity], query: &str) -> HashSet<usize> {
    let matcher = SkimMatcherV2::default();
    entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| entity_matches(&matcher, entity, query))
        .map(|(index, _)| index)
        .collect()
}

impl ViewModel {
    /// Entity indices matching the search box, while nothing is selected.
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.viewer.interaction().selected().is_some() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matches = Arc::new(matching_entities(&self.viewer.graph().entities, query));
        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EntityKind, demo_graph};

    #[test]
    fn matches_titles_and_keywords() {
        let mut keyworded = Entity::new("k1", EntityKind::Chunk).with_title("Excerpt");
        keyworded.content.keywords = vec!["latency".to_owned()];
        let entities = vec![
            Entity::new("d1", EntityKind::Document).with_title("Security Policy"),
            keyworded,
            Entity::new("c1", EntityKind::Cluster).with_title("Roadmap"),
        ];

        assert_eq!(matching_entities(&entities, "secpol"), HashSet::from([0]));
        assert_eq!(matching_entities(&entities, "LATENCY"), HashSet::from([1]));
        assert!(matching_entities(&entities, "zzz").is_empty());
    }

    #[test]
    fn demo_titles_are_searchable() {
        let graph = demo_graph();
        let index = graph.index_by_id();
        let matches = matching_entities(&graph.entities, "threat");
        assert!(matches.contains(&index["cluster-3"]));
        assert!(matches.contains(&index["chunk-3"]));
        assert!(!matches.contains(&index["doc-1"]));
    }
}
