use std::collections::{BTreeMap, BTreeSet};

use super::model::{Edge, GraphSnapshot, Node, NodeId, NodeKind, Relation};

pub(crate) fn node(id: &str, kind: NodeKind) -> Node {
    Node {
        id: id.to_owned(),
        kind,
        label: id.to_uppercase(),
        group_id: None,
        description: None,
        screenshots: BTreeMap::new(),
        extra: BTreeMap::new(),
    }
}

pub(crate) fn labeled(id: &str, kind: NodeKind, label: &str) -> Node {
    Node {
        label: label.to_owned(),
        ..node(id, kind)
    }
}

pub(crate) fn edge(source: &str, target: &str, relation: Relation) -> Edge {
    Edge {
        id: None,
        source: source.to_owned(),
        target: target.to_owned(),
        relation,
        label: None,
    }
}

pub(crate) fn ids(values: &[&str]) -> BTreeSet<NodeId> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Bots b1, b2 under d1 and b3 under d2; d3 has no bots.
/// Group g1 holds f1 (b1), f2 (b1, b3), f3 (no providers) and n (b1, b2);
/// f4 (b3) is ungrouped, g2 is empty, u1 is a user.
pub(crate) fn sample_snapshot() -> GraphSnapshot {
    let mut screenshot_node = labeled("n", NodeKind::Feature, "Canvas");
    screenshot_node.group_id = Some("g1".to_owned());
    screenshot_node.screenshots = BTreeMap::from([
        ("b1".to_owned(), vec!["x.png".to_owned()]),
        ("b2".to_owned(), vec!["y.png".to_owned(), "z.png".to_owned()]),
    ]);

    GraphSnapshot::new(
        vec![
            labeled("b1", NodeKind::Bot, "Beta"),
            labeled("b2", NodeKind::Bot, "Alpha"),
            labeled("b3", NodeKind::Bot, "Gamma"),
            node("d1", NodeKind::Domain),
            node("d2", NodeKind::Domain),
            node("d3", NodeKind::Domain),
            node("f1", NodeKind::Feature),
            node("f2", NodeKind::Feature),
            node("f3", NodeKind::Feature),
            node("f4", NodeKind::Feature),
            screenshot_node,
            node("g1", NodeKind::FeatureGroup),
            node("g2", NodeKind::FeatureGroup),
            node("u1", NodeKind::User),
        ],
        vec![
            edge("b1", "d1", Relation::PartOf),
            edge("b2", "d1", Relation::PartOf),
            edge("b3", "d2", Relation::PartOf),
            edge("b1", "f1", Relation::HasFeature),
            edge("b1", "f2", Relation::HasFeature),
            edge("b3", "f2", Relation::HasFeature),
            edge("b3", "f4", Relation::HasFeature),
            edge("b1", "n", Relation::HasFeature),
            edge("b2", "n", Relation::HasFeature),
            edge("f1", "g1", Relation::PartOf),
            edge("f2", "g1", Relation::PartOf),
            edge("f3", "g1", Relation::PartOf),
            edge("n", "g1", Relation::PartOf),
        ],
    )
}
