use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::graph::{ClusterAssignment, ClusterId, GraphSnapshot, NodeId, NodeKind};

use super::color::{NEUTRAL_GRAY, Triad, shade, triad};

pub const CONTAINER_PREFIX: &str = "cluster_group_";

pub const CLUSTER_PALETTE: [&str; 13] = [
    "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7", "#882255",
    "#332288", "#117733", "#44AA99", "#999933", "#AA4499",
];

const CLUSTER_BORDER_DELTA: i32 = -20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutConfig {
    #[default]
    Spread,
    Clustered,
}

/// Synthetic grouping node. Carries no graph semantics and takes no input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterContainer {
    pub id: String,
    pub cluster_id: ClusterId,
    pub members: BTreeSet<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterStyle {
    pub cluster_color: String,
    pub gradient: Triad,
    pub border_color: String,
    pub border_width: f32,
    /// Bots and domains get the dark outline while clustered.
    pub clustered_border: bool,
}

pub fn container_id(cluster_id: ClusterId) -> String {
    format!("{CONTAINER_PREFIX}{cluster_id}")
}

pub fn is_container_id(id: &str) -> bool {
    id.starts_with(CONTAINER_PREFIX)
}

pub fn palette_color(cluster_id: ClusterId, palette: &[String]) -> &str {
    if palette.is_empty() {
        return NEUTRAL_GRAY;
    }
    let slot = cluster_id.rem_euclid(palette.len() as i64) as usize;
    &palette[slot]
}

/// Reversible structural and style layer on top of a snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterOverlay {
    active: bool,
    containers: BTreeMap<ClusterId, ClusterContainer>,
    parents: BTreeMap<NodeId, ClusterId>,
    styles: BTreeMap<NodeId, ClusterStyle>,
    layout: LayoutConfig,
    saved_layout: Option<LayoutConfig>,
}

impl ClusterOverlay {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn layout(&self) -> LayoutConfig {
        self.layout
    }

    pub fn containers(&self) -> impl Iterator<Item = &ClusterContainer> {
        self.containers.values()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn parent_of(&self, node_id: &str) -> Option<&ClusterContainer> {
        self.parents
            .get(node_id)
            .and_then(|cluster_id| self.containers.get(cluster_id))
    }

    pub fn style_override(&self, node_id: &str) -> Option<&ClusterStyle> {
        self.styles.get(node_id)
    }

    fn tear_down(&mut self) {
        self.parents.clear();
        self.containers.clear();
        self.styles.clear();
    }

    /// Replaces any previous overlay with one container per cluster that has
    /// at least one member in the snapshot.
    pub fn apply(
        &mut self,
        snapshot: &GraphSnapshot,
        assignment: &ClusterAssignment,
        palette: &[String],
    ) -> usize {
        self.tear_down();

        for (node_id, &cluster_id) in assignment {
            let Some(node) = snapshot.node(node_id) else {
                warn!("cluster assignment for unknown node {node_id} ignored");
                continue;
            };

            let container = self
                .containers
                .entry(cluster_id)
                .or_insert_with(|| ClusterContainer {
                    id: container_id(cluster_id),
                    cluster_id,
                    members: BTreeSet::new(),
                });
            container.members.insert(node.id.clone());
            self.parents.insert(node.id.clone(), cluster_id);

            let color = palette_color(cluster_id, palette);
            self.styles.insert(
                node.id.clone(),
                ClusterStyle {
                    cluster_color: color.to_owned(),
                    gradient: triad(color),
                    border_color: shade(color, CLUSTER_BORDER_DELTA),
                    border_width: 0.0,
                    clustered_border: matches!(node.kind, NodeKind::Bot | NodeKind::Domain),
                },
            );
        }

        if self.saved_layout.is_none() {
            self.saved_layout = Some(self.layout);
        }
        self.layout = LayoutConfig::Clustered;
        self.active = true;

        debug!(
            "cluster overlay applied: {} containers, {} members",
            self.containers.len(),
            self.parents.len()
        );
        self.containers.len()
    }

    pub fn reset(&mut self) {
        self.tear_down();
        self.layout = self.saved_layout.take().unwrap_or_default();
        self.active = false;
        debug!("cluster overlay reset");
    }
}
