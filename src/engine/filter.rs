use std::collections::BTreeSet;

use log::debug;

use crate::graph::{GraphIndex, GraphSnapshot, NodeId, NodeKind};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterGroupKey {
    Bots,
    Domains,
    FeatureGroup(NodeId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterToggle {
    NodeKind(NodeKind, bool),
    Id(NodeId, bool),
    Group(FilterGroupKey, bool),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterMember {
    pub id: NodeId,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct GroupLayout {
    key: FilterGroupKey,
    title: String,
    members: Vec<FilterMember>,
}

/// Read-only view of one checkbox group, projected from [`FilterState`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterGroup {
    pub key: FilterGroupKey,
    pub title: String,
    pub items: Vec<FilterItem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterItem {
    pub id: NodeId,
    pub label: String,
    pub checked: bool,
}

/// Fixed layout of the filter controls for one snapshot.
///
/// The union of all members is the controlled-id universe. A feature in
/// several groups shows up once per group, bound to the same id.
#[derive(Clone, Debug, Default)]
pub struct FilterCatalog {
    groups: Vec<GroupLayout>,
}

fn sorted_members<'a>(
    snapshot: &'a GraphSnapshot,
    ids: impl Iterator<Item = &'a str>,
) -> Vec<FilterMember> {
    let mut members = ids
        .filter_map(|id| snapshot.node(id))
        .map(|node| FilterMember {
            id: node.id.clone(),
            label: node.display_label().to_owned(),
        })
        .collect::<Vec<_>>();
    members.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    members.dedup_by(|a, b| a.id == b.id);
    members
}

impl FilterCatalog {
    pub fn build(snapshot: &GraphSnapshot, index: &GraphIndex) -> Self {
        let of_kind = |kind: NodeKind| {
            snapshot
                .nodes()
                .iter()
                .filter(move |node| node.kind == kind)
                .map(|node| node.id.as_str())
        };

        let mut groups = vec![
            GroupLayout {
                key: FilterGroupKey::Bots,
                title: "Bots".to_owned(),
                members: sorted_members(snapshot, of_kind(NodeKind::Bot)),
            },
            GroupLayout {
                key: FilterGroupKey::Domains,
                title: "Domains".to_owned(),
                members: sorted_members(snapshot, of_kind(NodeKind::Domain)),
            },
        ];

        let mut feature_groups = snapshot
            .nodes()
            .iter()
            .filter(|node| node.kind == NodeKind::FeatureGroup)
            .filter(|node| !index.features_of_group(&node.id).is_empty())
            .collect::<Vec<_>>();
        feature_groups.sort_by(|a, b| {
            a.display_label()
                .cmp(b.display_label())
                .then_with(|| a.id.cmp(&b.id))
        });

        for group in feature_groups {
            groups.push(GroupLayout {
                key: FilterGroupKey::FeatureGroup(group.id.clone()),
                title: group.display_label().to_owned(),
                members: sorted_members(
                    snapshot,
                    index.features_of_group(&group.id).iter().map(String::as_str),
                ),
            });
        }

        Self { groups }
    }

    pub fn controlled_ids(&self) -> BTreeSet<NodeId> {
        self.groups
            .iter()
            .flat_map(|group| group.members.iter().map(|member| member.id.clone()))
            .collect()
    }

    pub fn members(&self, key: &FilterGroupKey) -> &[FilterMember] {
        self.groups
            .iter()
            .find(|group| &group.key == key)
            .map(|group| group.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn project(&self, state: &FilterState) -> Vec<FilterGroup> {
        self.groups
            .iter()
            .map(|group| FilterGroup {
                key: group.key.clone(),
                title: group.title.clone(),
                items: group
                    .members
                    .iter()
                    .map(|member| FilterItem {
                        id: member.id.clone(),
                        label: member.label.clone(),
                        checked: state.is_active(&member.id),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// User-controlled toggles. `active_ids` is the single source of truth every
/// checkbox reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    node_type_enabled: BTreeSet<NodeKind>,
    active_ids: BTreeSet<NodeId>,
    controlled_ids: BTreeSet<NodeId>,
}

impl FilterState {
    /// Every kind enabled and every controlled id on.
    pub fn new(catalog: &FilterCatalog) -> Self {
        let controlled_ids = catalog.controlled_ids();
        Self {
            node_type_enabled: NodeKind::ALL.into_iter().collect(),
            active_ids: controlled_ids.clone(),
            controlled_ids,
        }
    }

    pub fn is_kind_enabled(&self, kind: NodeKind) -> bool {
        self.node_type_enabled.contains(&kind)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_ids.contains(id)
    }

    pub fn is_controlled(&self, id: &str) -> bool {
        self.controlled_ids.contains(id)
    }

    pub fn set_node_type_enabled(&mut self, kind: NodeKind, enabled: bool) -> bool {
        if enabled {
            self.node_type_enabled.insert(kind)
        } else {
            self.node_type_enabled.remove(&kind)
        }
    }

    fn set_membership(&mut self, id: &str, on: bool) -> bool {
        if on {
            self.active_ids.insert(id.to_owned())
        } else {
            self.active_ids.remove(id)
        }
    }

    /// Sets `id` and, for a domain, every bot under it. Returns the ids
    /// whose membership changed.
    pub fn set_id(
        &mut self,
        id: &str,
        on: bool,
        snapshot: &GraphSnapshot,
        index: &GraphIndex,
    ) -> Vec<NodeId> {
        let Some(kind) = snapshot.kind_of(id) else {
            debug!("ignoring toggle for unknown id {id}");
            return Vec::new();
        };

        let mut changed = Vec::new();
        if self.set_membership(id, on) {
            changed.push(id.to_owned());
        }

        if kind == NodeKind::Domain {
            for bot_id in index.bots_of_domain(id) {
                if self.set_membership(bot_id, on) {
                    changed.push(bot_id.clone());
                }
            }
        }

        debug!("toggle {id} -> {on}: {} ids changed", changed.len());
        changed
    }

    /// Bulk membership update for every member of a group, no cascade.
    pub fn set_group(&mut self, catalog: &FilterCatalog, key: &FilterGroupKey, on: bool) -> usize {
        catalog
            .members(key)
            .iter()
            .filter(|member| self.set_membership(&member.id, on))
            .count()
    }
}
