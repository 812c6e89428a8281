use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::graph::{GraphIndex, GraphSnapshot, NodeId, NodeKind};

use super::filter::FilterState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_node_labels: bool,
    pub show_edge_labels: bool,
    pub show_edges: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_node_labels: true,
            show_edge_labels: true,
            show_edges: true,
        }
    }
}

/// Per-element display decision of one resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Visibility {
    nodes: BTreeMap<NodeId, bool>,
    edges: BTreeMap<String, bool>,
}

impl Visibility {
    pub fn is_node_visible(&self, id: &str) -> bool {
        self.nodes.get(id).copied().unwrap_or(false)
    }

    pub fn is_edge_visible(&self, key: &str) -> bool {
        self.edges.get(key).copied().unwrap_or(false)
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, bool> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeMap<String, bool> {
        &self.edges
    }

    pub fn visible_node_count(&self) -> usize {
        self.nodes.values().filter(|visible| **visible).count()
    }

    pub fn visible_edge_count(&self) -> usize {
        self.edges.values().filter(|visible| **visible).count()
    }
}

/// A bot needs its own toggle, its domain's toggle, and, when it has any
/// controlled features, at least one of them switched on.
fn bot_visible(bot_id: &str, index: &GraphIndex, filters: &FilterState) -> bool {
    if !filters.is_active(bot_id) {
        return false;
    }

    if let Some(domain_id) = index.domain_of_bot(bot_id)
        && !filters.is_active(domain_id)
    {
        return false;
    }

    let mut controlled = index
        .features_of_bot(bot_id)
        .iter()
        .filter(|feature_id| filters.is_controlled(feature_id))
        .peekable();

    controlled.peek().is_none() || controlled.any(|feature_id| filters.is_active(feature_id))
}

fn feature_visible(
    feature_id: &str,
    index: &GraphIndex,
    filters: &FilterState,
    visible_bots: &BTreeSet<&str>,
) -> bool {
    if filters.is_controlled(feature_id) && !filters.is_active(feature_id) {
        return false;
    }

    let providers = index.bots_of_feature(feature_id);
    providers.is_empty()
        || providers
            .iter()
            .any(|bot_id| visible_bots.contains(bot_id.as_str()))
}

fn domain_visible(
    domain_id: &str,
    index: &GraphIndex,
    filters: &FilterState,
    visible_bots: &BTreeSet<&str>,
) -> bool {
    if !filters.is_active(domain_id) {
        return false;
    }

    let bots = index.bots_of_domain(domain_id);
    bots.is_empty() || bots.iter().any(|bot_id| visible_bots.contains(bot_id.as_str()))
}

pub fn resolve_visibility(
    snapshot: &GraphSnapshot,
    index: &GraphIndex,
    filters: &FilterState,
    display: &DisplayOptions,
) -> Visibility {
    let visible_bots = snapshot
        .nodes()
        .iter()
        .filter(|node| node.kind == NodeKind::Bot)
        .filter(|node| bot_visible(&node.id, index, filters))
        .map(|node| node.id.as_str())
        .collect::<BTreeSet<_>>();

    let mut nodes = BTreeMap::new();
    for node in snapshot.nodes() {
        let visible = match node.kind {
            NodeKind::Bot => visible_bots.contains(node.id.as_str()),
            NodeKind::Domain => domain_visible(&node.id, index, filters, &visible_bots),
            NodeKind::Feature => feature_visible(&node.id, index, filters, &visible_bots),
            NodeKind::FeatureGroup => index
                .features_of_group(&node.id)
                .iter()
                .any(|feature_id| feature_visible(feature_id, index, filters, &visible_bots)),
            NodeKind::User | NodeKind::Unknown => filters.is_kind_enabled(node.kind),
        };
        nodes.insert(node.id.clone(), visible);
    }

    let edges = snapshot
        .edges()
        .iter()
        .map(|edge| {
            let visible = display.show_edges
                && nodes.get(&edge.source).copied().unwrap_or(false)
                && nodes.get(&edge.target).copied().unwrap_or(false);
            (edge.key(), visible)
        })
        .collect::<BTreeMap<_, _>>();

    let visibility = Visibility { nodes, edges };
    debug!(
        "resolved visibility: {}/{} nodes, {}/{} edges",
        visibility.visible_node_count(),
        snapshot.node_count(),
        visibility.visible_edge_count(),
        snapshot.edge_count()
    );
    visibility
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::engine::filter::FilterCatalog;
    use crate::graph::fixtures::sample_snapshot;

    struct Fixture {
        snapshot: GraphSnapshot,
        index: GraphIndex,
        filters: FilterState,
    }

    impl Fixture {
        fn new() -> Self {
            let snapshot = sample_snapshot();
            let index = GraphIndex::build(&snapshot);
            let filters = FilterState::new(&FilterCatalog::build(&snapshot, &index));
            Self {
                snapshot,
                index,
                filters,
            }
        }

        fn set(&mut self, id: &str, on: bool) {
            self.filters.set_id(id, on, &self.snapshot, &self.index);
        }

        fn resolve(&self) -> Visibility {
            resolve_visibility(
                &self.snapshot,
                &self.index,
                &self.filters,
                &DisplayOptions::default(),
            )
        }

        fn visible(&self) -> Vec<String> {
            self.resolve()
                .nodes()
                .iter()
                .filter(|(_, visible)| **visible)
                .map(|(id, _)| id.clone())
                .collect()
        }
    }

    #[test]
    fn everything_visible_by_default_except_empty_groups() {
        let fixture = Fixture::new();
        let visibility = fixture.resolve();

        assert!(!visibility.is_node_visible("g2"));
        assert_eq!(visibility.visible_node_count(), fixture.snapshot.node_count() - 1);
        assert_eq!(visibility.visible_edge_count(), fixture.snapshot.edge_count());
    }

    #[test]
    fn domain_off_hides_its_bots_and_their_exclusive_features() {
        let mut fixture = Fixture::new();
        fixture.set("d1", false);
        let visibility = fixture.resolve();

        for hidden in ["d1", "b1", "b2", "f1", "n"] {
            assert!(!visibility.is_node_visible(hidden), "{hidden} should be hidden");
        }
        for shown in ["b3", "f2", "f3", "g1", "d2", "d3"] {
            assert!(visibility.is_node_visible(shown), "{shown} should be visible");
        }
        assert!(!visibility.is_edge_visible("b1->d1:partOf"));
        assert!(visibility.is_edge_visible("b3->d2:partOf"));
    }

    #[test]
    fn bot_hidden_only_when_all_controlled_features_are_off() {
        let mut fixture = Fixture::new();

        fixture.set("f1", false);
        assert!(fixture.resolve().is_node_visible("b1"));

        fixture.set("f2", false);
        assert!(fixture.resolve().is_node_visible("b1"));

        fixture.set("n", false);
        let visibility = fixture.resolve();
        assert!(!visibility.is_node_visible("b1"));
        // b3's only controlled feature is f2, so it goes too, taking f4 along.
        assert!(!visibility.is_node_visible("b3"));
        assert!(!visibility.is_node_visible("f4"));
        assert!(!visibility.is_node_visible("d2"));
    }

    #[test]
    fn feature_without_providers_follows_its_own_toggle() {
        let mut fixture = Fixture::new();
        for bot in ["b1", "b2", "b3"] {
            fixture.set(bot, false);
        }
        assert!(fixture.resolve().is_node_visible("f3"));

        fixture.set("f3", false);
        assert!(!fixture.resolve().is_node_visible("f3"));
    }

    #[test]
    fn domain_without_bots_follows_its_own_toggle() {
        let mut fixture = Fixture::new();
        assert!(fixture.resolve().is_node_visible("d3"));
        fixture.set("d3", false);
        assert!(!fixture.resolve().is_node_visible("d3"));
    }

    #[test]
    fn feature_group_tracks_its_children() {
        let mut fixture = Fixture::new();
        for feature in ["f1", "f2", "f3", "n"] {
            fixture.set(feature, false);
        }
        assert!(!fixture.resolve().is_node_visible("g1"));

        fixture.set("f3", true);
        assert!(fixture.resolve().is_node_visible("g1"));
    }

    #[test]
    fn users_follow_the_kind_flag() {
        let mut fixture = Fixture::new();
        assert!(fixture.resolve().is_node_visible("u1"));

        fixture.filters.set_node_type_enabled(NodeKind::User, false);
        assert!(!fixture.resolve().is_node_visible("u1"));
        assert!(fixture.resolve().is_node_visible("b1"));
    }

    #[test]
    fn hidden_edges_option_hides_every_edge() {
        let fixture = Fixture::new();
        let display = DisplayOptions {
            show_edges: false,
            ..DisplayOptions::default()
        };
        let visibility =
            resolve_visibility(&fixture.snapshot, &fixture.index, &fixture.filters, &display);

        assert_eq!(visibility.visible_edge_count(), 0);
        assert!(visibility.is_node_visible("b1"));
    }

    #[test]
    fn every_domain_toggle_hides_its_bots() {
        let fixture = Fixture::new();
        for domain in ["d1", "d2", "d3"] {
            let mut toggled = Fixture::new();
            toggled.set(domain, false);
            let visibility = toggled.resolve();
            for bot in fixture.index.bots_of_domain(domain) {
                assert!(!visibility.is_node_visible(bot));
            }
        }
    }

    #[test]
    fn scenario_feature_loses_its_only_provider() {
        let mut fixture = Fixture::new();
        assert!(fixture.visible().contains(&"f1".to_owned()));

        fixture.set("d1", false);
        let visible = fixture.visible();
        assert!(!visible.contains(&"b1".to_owned()));
        assert!(!visible.contains(&"b2".to_owned()));
        assert!(!visible.contains(&"f1".to_owned()));
    }

    const TOGGLABLE: [&str; 11] = [
        "b1", "b2", "b3", "d1", "d2", "d3", "f1", "f2", "f3", "n", "ghost",
    ];

    proptest! {
        #[test]
        fn resolution_is_idempotent(
            toggles in proptest::collection::vec((0usize..TOGGLABLE.len(), any::<bool>()), 0..24)
        ) {
            let mut fixture = Fixture::new();
            for (position, on) in toggles {
                fixture.set(TOGGLABLE[position], on);
            }

            let first = fixture.resolve();
            let second = fixture.resolve();
            prop_assert_eq!(&first, &second);

            let rebuilt = Fixture {
                snapshot: fixture.snapshot.clone(),
                index: GraphIndex::build(&fixture.snapshot),
                filters: fixture.filters.clone(),
            };
            prop_assert_eq!(first, rebuilt.resolve());
        }

        #[test]
        fn edges_need_both_endpoints(
            toggles in proptest::collection::vec((0usize..TOGGLABLE.len(), any::<bool>()), 0..24)
        ) {
            let mut fixture = Fixture::new();
            for (position, on) in toggles {
                fixture.set(TOGGLABLE[position], on);
            }

            let visibility = fixture.resolve();
            for edge in fixture.snapshot.edges() {
                prop_assert_eq!(
                    visibility.is_edge_visible(&edge.key()),
                    visibility.is_node_visible(&edge.source)
                        && visibility.is_node_visible(&edge.target)
                );
            }
        }
    }
}
