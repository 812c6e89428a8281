use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::model::{GraphSnapshot, NodeId, NodeKind, Relation};

static EMPTY: BTreeSet<NodeId> = BTreeSet::new();

/// Relation lookups built in one pass over a snapshot's edges.
///
/// Repeated edges between the same pair collapse into one entry.
#[derive(Clone, Debug, Default)]
pub struct GraphIndex {
    bots_of_domain: BTreeMap<NodeId, BTreeSet<NodeId>>,
    domain_of_bot: BTreeMap<NodeId, NodeId>,
    features_of_bot: BTreeMap<NodeId, BTreeSet<NodeId>>,
    bots_of_feature: BTreeMap<NodeId, BTreeSet<NodeId>>,
    features_of_group: BTreeMap<NodeId, BTreeSet<NodeId>>,
    incoming: BTreeMap<NodeId, BTreeSet<NodeId>>,
    neighbors: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl GraphIndex {
    pub fn build(snapshot: &GraphSnapshot) -> Self {
        let mut index = Self::default();

        for edge in snapshot.edges() {
            let (Some(source_kind), Some(target_kind)) = (
                snapshot.kind_of(&edge.source),
                snapshot.kind_of(&edge.target),
            ) else {
                continue;
            };

            let source = edge.source.clone();
            let target = edge.target.clone();

            match (edge.relation, source_kind, target_kind) {
                (Relation::PartOf, NodeKind::Bot, NodeKind::Domain) => {
                    index
                        .bots_of_domain
                        .entry(target.clone())
                        .or_default()
                        .insert(source.clone());
                    // A bot listed under several domains keeps the last one.
                    index.domain_of_bot.insert(source.clone(), target.clone());
                }
                (Relation::HasFeature, NodeKind::Bot, NodeKind::Feature) => {
                    index
                        .features_of_bot
                        .entry(source.clone())
                        .or_default()
                        .insert(target.clone());
                    index
                        .bots_of_feature
                        .entry(target.clone())
                        .or_default()
                        .insert(source.clone());
                }
                (
                    Relation::PartOf | Relation::Category,
                    NodeKind::Feature,
                    NodeKind::FeatureGroup,
                ) => {
                    index
                        .features_of_group
                        .entry(target.clone())
                        .or_default()
                        .insert(source.clone());
                }
                _ => {}
            }

            index
                .incoming
                .entry(target.clone())
                .or_default()
                .insert(source.clone());
            index
                .neighbors
                .entry(source.clone())
                .or_default()
                .insert(target.clone());
            index.neighbors.entry(target).or_default().insert(source);
        }

        debug!(
            "graph index: {} domains, {} bots with features, {} feature groups",
            index.bots_of_domain.len(),
            index.features_of_bot.len(),
            index.features_of_group.len()
        );
        index
    }

    pub fn bots_of_domain(&self, domain_id: &str) -> &BTreeSet<NodeId> {
        self.bots_of_domain.get(domain_id).unwrap_or(&EMPTY)
    }

    pub fn domain_of_bot(&self, bot_id: &str) -> Option<&str> {
        self.domain_of_bot.get(bot_id).map(String::as_str)
    }

    pub fn features_of_bot(&self, bot_id: &str) -> &BTreeSet<NodeId> {
        self.features_of_bot.get(bot_id).unwrap_or(&EMPTY)
    }

    pub fn bots_of_feature(&self, feature_id: &str) -> &BTreeSet<NodeId> {
        self.bots_of_feature.get(feature_id).unwrap_or(&EMPTY)
    }

    pub fn features_of_group(&self, group_id: &str) -> &BTreeSet<NodeId> {
        self.features_of_group.get(group_id).unwrap_or(&EMPTY)
    }

    /// Sources of every edge ending at `node_id`, any relation.
    pub fn incoming(&self, node_id: &str) -> &BTreeSet<NodeId> {
        self.incoming.get(node_id).unwrap_or(&EMPTY)
    }

    pub fn neighbors(&self, node_id: &str) -> &BTreeSet<NodeId> {
        self.neighbors.get(node_id).unwrap_or(&EMPTY)
    }

    pub fn is_grouped_feature(&self, feature_id: &str) -> bool {
        self.features_of_group
            .values()
            .any(|features| features.contains(feature_id))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::fixtures::{edge, ids, node};

    fn sample() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                node("b1", NodeKind::Bot),
                node("b2", NodeKind::Bot),
                node("d1", NodeKind::Domain),
                node("f1", NodeKind::Feature),
                node("f2", NodeKind::Feature),
                node("g1", NodeKind::FeatureGroup),
            ],
            vec![
                edge("b1", "d1", Relation::PartOf),
                edge("b2", "d1", Relation::PartOf),
                edge("b1", "f1", Relation::HasFeature),
                edge("b1", "f1", Relation::HasFeature),
                edge("b2", "f2", Relation::HasFeature),
                edge("f1", "g1", Relation::PartOf),
                edge("f2", "g1", Relation::Category),
                edge("f1", "f2", Relation::Other),
            ],
        )
    }

    #[test]
    fn relation_lookups() {
        let snapshot = sample();
        let index = GraphIndex::build(&snapshot);

        assert_eq!(index.bots_of_domain("d1"), &ids(&["b1", "b2"]));
        assert_eq!(index.domain_of_bot("b1"), Some("d1"));
        assert_eq!(index.domain_of_bot("f1"), None);
        assert_eq!(index.features_of_bot("b1"), &ids(&["f1"]));
        assert_eq!(index.bots_of_feature("f2"), &ids(&["b2"]));
        assert_eq!(index.features_of_group("g1"), &ids(&["f1", "f2"]));
        assert_eq!(index.incoming("f2"), &ids(&["b2", "f1"]));
        assert!(index.is_grouped_feature("f1"));
        assert!(index.bots_of_domain("missing").is_empty());
    }

    #[test]
    fn feature_to_group_partof_is_not_a_domain_edge() {
        let index = GraphIndex::build(&sample());
        assert!(index.bots_of_domain("g1").is_empty());
        assert_eq!(index.neighbors("g1"), &ids(&["f1", "f2"]));
    }
}
