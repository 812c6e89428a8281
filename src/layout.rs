use std::collections::BTreeMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::engine::{ClusterOverlay, LayoutConfig};
use crate::graph::{ClusterId, GraphSnapshot, NodeId, NodeKind};
use crate::util::stable_pair;

const GOLDEN_ANGLE: f32 = 2.399_963;
const RING_GAP: f32 = 150.0;
const NODE_SPACING: f32 = 54.0;
const JITTER: f32 = 14.0;

/// Kinds from the centre outwards in the spread layout.
const RING_ORDER: [NodeKind; 6] = [
    NodeKind::Domain,
    NodeKind::Bot,
    NodeKind::FeatureGroup,
    NodeKind::Feature,
    NodeKind::User,
    NodeKind::Unknown,
];

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerShape {
    pub id: String,
    pub cluster_id: ClusterId,
    pub center: Vec2,
    pub radius: f32,
}

/// World-space positions for one layout pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    pub positions: BTreeMap<NodeId, Vec2>,
    pub containers: Vec<ContainerShape>,
}

impl Placement {
    pub fn position(&self, node_id: &str) -> Option<Vec2> {
        self.positions.get(node_id).copied()
    }

    pub fn extent(&self) -> f32 {
        let nodes = self.positions.values().map(|position| position.length());
        let containers = self
            .containers
            .iter()
            .map(|container| container.center.length() + container.radius);
        nodes.chain(containers).fold(0.0, f32::max)
    }
}

fn ring_radius(previous: f32, count: usize) -> f32 {
    let circumference = count as f32 * NODE_SPACING;
    (previous + RING_GAP).max(circumference / TAU)
}

fn jitter(id: &str) -> Vec2 {
    let (jx, jy) = stable_pair(id);
    vec2(jx, jy) * JITTER
}

fn place_ring<'a>(
    positions: &mut BTreeMap<NodeId, Vec2>,
    ids: impl ExactSizeIterator<Item = &'a str>,
    radius: f32,
) {
    let count = ids.len().max(1) as f32;
    for (slot, id) in ids.enumerate() {
        let angle = (slot as f32 / count) * TAU;
        positions.insert(
            id.to_owned(),
            vec2(angle.cos(), angle.sin()) * radius + jitter(id),
        );
    }
}

/// Concentric rings, one per node kind.
pub fn spread_layout(snapshot: &GraphSnapshot) -> Placement {
    let mut positions = BTreeMap::new();
    let mut radius = 0.0;

    for kind in RING_ORDER {
        let ids = snapshot
            .nodes()
            .iter()
            .filter(|node| node.kind == kind)
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        if ids.is_empty() {
            continue;
        }

        radius = ring_radius(radius, ids.len());
        place_ring(&mut positions, ids.into_iter(), radius);
    }

    Placement {
        positions,
        containers: Vec::new(),
    }
}

fn container_radius(members: usize) -> f32 {
    36.0 + (members as f32).sqrt() * NODE_SPACING * 0.6
}

/// Each cluster packed into a disc; nodes outside every cluster go on an
/// outer ring.
pub fn clustered_layout(snapshot: &GraphSnapshot, overlay: &ClusterOverlay) -> Placement {
    let discs = overlay
        .containers()
        .map(|container| (container, container_radius(container.members.len())))
        .collect::<Vec<_>>();

    let perimeter = discs.iter().map(|(_, radius)| radius * 2.4).sum::<f32>();
    let orbit = if discs.len() <= 1 {
        0.0
    } else {
        (perimeter / TAU).max(RING_GAP)
    };

    let mut positions = BTreeMap::new();
    let mut containers = Vec::with_capacity(discs.len());
    let mut angle = 0.0_f32;

    for (container, radius) in &discs {
        let share = if perimeter > 0.0 {
            (radius * 2.4 / perimeter) * TAU
        } else {
            0.0
        };
        angle += share * 0.5;
        let center = vec2(angle.cos(), angle.sin()) * orbit;
        angle += share * 0.5;

        let count = container.members.len() as f32;
        for (slot, member) in container.members.iter().enumerate() {
            let spiral = slot as f32 * GOLDEN_ANGLE;
            let distance = radius * 0.8 * ((slot as f32 + 0.5) / count).sqrt();
            positions.insert(
                member.clone(),
                center + vec2(spiral.cos(), spiral.sin()) * distance,
            );
        }

        containers.push(ContainerShape {
            id: container.id.clone(),
            cluster_id: container.cluster_id,
            center,
            radius: *radius,
        });
    }

    let outer = discs
        .iter()
        .map(|(_, radius)| orbit + radius)
        .fold(0.0, f32::max);
    let loose = snapshot
        .nodes()
        .iter()
        .filter(|node| overlay.parent_of(&node.id).is_none())
        .map(|node| node.id.as_str())
        .collect::<Vec<_>>();
    if !loose.is_empty() {
        let radius = ring_radius(outer, loose.len());
        place_ring(&mut positions, loose.into_iter(), radius);
    }

    Placement {
        positions,
        containers,
    }
}

pub fn place_nodes(snapshot: &GraphSnapshot, overlay: &ClusterOverlay) -> Placement {
    match overlay.layout() {
        LayoutConfig::Spread => spread_layout(snapshot),
        LayoutConfig::Clustered => clustered_layout(snapshot, overlay),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineSettings;
    use crate::graph::ClusterAssignment;
    use crate::graph::fixtures::sample_snapshot;

    fn palette() -> Vec<String> {
        EngineSettings::default().palette
    }

    #[test]
    fn spread_places_every_node_once() {
        let snapshot = sample_snapshot();
        let placement = spread_layout(&snapshot);

        assert_eq!(placement.positions.len(), snapshot.node_count());
        assert!(placement.containers.is_empty());
        assert_eq!(placement, spread_layout(&snapshot));
    }

    #[test]
    fn rings_grow_outwards_by_kind() {
        let snapshot = sample_snapshot();
        let placement = spread_layout(&snapshot);
        let distance = |id: &str| placement.position(id).map(|p| p.length()).unwrap_or_default();

        assert!(distance("d1") < distance("b1"));
        assert!(distance("b1") < distance("g1"));
        assert!(distance("g1") < distance("f1"));
        assert!(distance("f1") < distance("u1"));
    }

    #[test]
    fn cluster_members_sit_inside_their_container() {
        let snapshot = sample_snapshot();
        let mut overlay = ClusterOverlay::default();
        let assignment = [("b1", 0), ("b2", 0), ("f1", 0), ("b3", 1)]
            .into_iter()
            .map(|(id, cluster)| (id.to_owned(), cluster))
            .collect::<ClusterAssignment>();
        overlay.apply(&snapshot, &assignment, &palette());

        let placement = place_nodes(&snapshot, &overlay);
        assert_eq!(placement.containers.len(), 2);
        assert_eq!(placement.positions.len(), snapshot.node_count());

        for shape in &placement.containers {
            let members = &overlay
                .containers()
                .find(|container| container.id == shape.id)
                .unwrap()
                .members;
            for member in members {
                let offset = placement.position(member).unwrap() - shape.center;
                assert!(offset.length() <= shape.radius);
            }
        }
    }

    #[test]
    fn reset_returns_to_the_spread_layout() {
        let snapshot = sample_snapshot();
        let mut overlay = ClusterOverlay::default();
        let assignment = ClusterAssignment::from([("b1".to_owned(), 2)]);
        overlay.apply(&snapshot, &assignment, &palette());
        overlay.reset();

        assert_eq!(place_nodes(&snapshot, &overlay), spread_layout(&snapshot));
    }
}
