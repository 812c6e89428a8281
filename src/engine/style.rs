use crate::graph::{Node, NodeKind};

use super::color::{Triad, triad};

const UNKNOWN_COLOR: &str = "#555555";

const GROUP_COLORS: [(&str, &str); 4] = [
    ("chat__content", "#E69F00"),
    ("system_features", "#CC79A7"),
    ("extended_interactions", "#0072B2"),
    ("meta_conversation", "#F0E442"),
];

pub const SELECTED_BORDER_COLOR: &str = "#0d9488";
pub const SELECTED_BORDER_WIDTH: f32 = 4.0;
pub const CLUSTERED_BORDER_COLOR: &str = "#000000";
pub const CLUSTERED_BORDER_WIDTH: f32 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    pub gradient: Triad,
    pub border_color: String,
    pub border_width: f32,
}

fn kind_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Bot => "#D55E00",
        NodeKind::Domain => "#009E73",
        NodeKind::User => "#56B4E9",
        NodeKind::Feature | NodeKind::FeatureGroup => "#999999",
        NodeKind::Unknown => UNKNOWN_COLOR,
    }
}

fn group_color(key: &str) -> Option<&'static str> {
    GROUP_COLORS
        .iter()
        .find(|(group, _)| *group == key)
        .map(|(_, color)| *color)
}

/// Base color: the node's own id in the group table, then its `groupId`,
/// then its kind.
pub fn base_color(node: &Node) -> &'static str {
    group_color(&node.id)
        .or_else(|| node.group_id.as_deref().and_then(group_color))
        .unwrap_or_else(|| kind_color(node.kind))
}

pub fn default_style(node: &Node) -> NodeStyle {
    let (border_color, border_width) = match node.kind {
        NodeKind::Feature => ("#ffffff", 2.0),
        _ => ("#666666", 0.0),
    };

    NodeStyle {
        gradient: triad(base_color(node)),
        border_color: border_color.to_owned(),
        border_width,
    }
}
