use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub type NodeId = String;
pub type ClusterId = i64;

/// Node id to cluster id, as returned by a clustering run.
pub type ClusterAssignment = BTreeMap<NodeId, ClusterId>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Bot,
    Domain,
    Feature,
    FeatureGroup,
    User,
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        Self::Bot,
        Self::Domain,
        Self::Feature,
        Self::FeatureGroup,
        Self::User,
        Self::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bot => "bot",
            Self::Domain => "domain",
            Self::Feature => "feature",
            Self::FeatureGroup => "feature_group",
            Self::User => "user",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bot => "Bots",
            Self::Domain => "Domains",
            Self::Feature => "Features",
            Self::FeatureGroup => "Feature groups",
            Self::User => "Users",
            Self::Unknown => "Other nodes",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    PartOf,
    HasFeature,
    Category,
    #[default]
    #[serde(other)]
    Other,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartOf => "partOf",
            Self::HasFeature => "hasFeature",
            Self::Category => "category",
            Self::Other => "other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "nodeType", default = "unknown_kind")]
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "groupId", default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Bot id to image references. Always non-empty per entry.
    #[serde(default, deserialize_with = "lenient_screenshots")]
    pub screenshots: BTreeMap<NodeId, Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn unknown_kind() -> NodeKind {
    NodeKind::Unknown
}

fn lenient_screenshots<'de, D>(deserializer: D) -> Result<BTreeMap<NodeId, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(entries)) = value else {
        return Ok(BTreeMap::new());
    };

    let mut screenshots = BTreeMap::new();
    for (bot_id, refs) in entries {
        let refs = match refs {
            Value::String(single) => vec![single],
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(path) => Some(path),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let refs = refs
            .into_iter()
            .filter(|path| !path.trim().is_empty())
            .collect::<Vec<_>>();

        if refs.is_empty() {
            warn!("dropping malformed screenshot entry for bot {bot_id}");
            continue;
        }
        screenshots.insert(bot_id, refs);
    }

    Ok(screenshots)
}

impl Node {
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub relation: Relation,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    pub fn key(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("{}->{}:{}", self.source, self.target, self.relation.as_str()),
        }
    }
}

/// Immutable node and edge set of one loaded graph document.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<NodeId, usize>,
}

impl GraphSnapshot {
    /// Duplicate node ids keep their first occurrence; edges with an unknown
    /// endpoint are dropped.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut unique_nodes = Vec::with_capacity(nodes.len());
        let mut index_by_id = HashMap::with_capacity(nodes.len());

        for node in nodes {
            if index_by_id.contains_key(&node.id) {
                warn!("duplicate node id {} ignored", node.id);
                continue;
            }
            index_by_id.insert(node.id.clone(), unique_nodes.len());
            unique_nodes.push(node);
        }

        let edges = edges
            .into_iter()
            .filter(|edge| {
                let known = index_by_id.contains_key(&edge.source)
                    && index_by_id.contains_key(&edge.target);
                if !known {
                    warn!(
                        "edge {} references an unknown node and was ignored",
                        edge.key()
                    );
                }
                known
            })
            .collect();

        Self {
            nodes: unique_nodes,
            edges,
            index_by_id,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<NodeKind> {
        self.node(id).map(|node| node.kind)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
