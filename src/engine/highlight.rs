use std::collections::BTreeSet;

use crate::graph::{GraphIndex, GraphSnapshot, NodeId};

use super::cluster::is_container_id;
use super::visibility::{DisplayOptions, Visibility};

/// Elements kept at full opacity while a node is hovered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverHighlight {
    pub focus: NodeId,
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<String>,
}

impl HoverHighlight {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn contains_edge(&self, key: &str) -> bool {
        self.edges.contains(key)
    }
}

/// The hovered node, its visible neighbours and the visible edges between
/// them. Cluster containers and hidden nodes never highlight, and nothing
/// does while edges are switched off.
pub fn hover_neighborhood(
    node_id: &str,
    snapshot: &GraphSnapshot,
    index: &GraphIndex,
    visibility: &Visibility,
    display: &DisplayOptions,
) -> Option<HoverHighlight> {
    if !display.show_edges || is_container_id(node_id) || !visibility.is_node_visible(node_id) {
        return None;
    }

    let mut nodes = index
        .neighbors(node_id)
        .iter()
        .filter(|neighbor| visibility.is_node_visible(neighbor))
        .cloned()
        .collect::<BTreeSet<_>>();
    nodes.insert(node_id.to_owned());

    let edges = snapshot
        .edges()
        .iter()
        .filter(|edge| edge.source == node_id || edge.target == node_id)
        .map(|edge| edge.key())
        .filter(|key| visibility.is_edge_visible(key))
        .collect();

    Some(HoverHighlight {
        focus: node_id.to_owned(),
        nodes,
        edges,
    })
}
