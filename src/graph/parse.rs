use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::model::{ClusterAssignment, Edge, GraphSnapshot, Node};

fn upstream_error(object: &Map<String, Value>) -> Option<String> {
    object
        .get("error")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn element_list<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a [Value]> {
    match object.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(anyhow!("graph document field `{key}` is not a list")),
        None => Ok(&[]),
    }
}

fn element_data<T>(element: &Value, what: &str, position: usize) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    let data = element.get("data").unwrap_or(element);
    match T::deserialize(data) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!("skipping malformed {what} #{position}: {error}");
            None
        }
    }
}

/// Parses a `{nodes: [{data}], edges: [{data}]}` document, or reports the
/// document's `{error}` payload.
pub fn parse_graph_document(raw: &str) -> Result<GraphSnapshot> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in graph document")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for graph document"))?;

    if let Some(message) = upstream_error(object) {
        return Err(anyhow!("graph source reported an error: {message}"));
    }

    let nodes = element_list(object, "nodes")?
        .iter()
        .enumerate()
        .filter_map(|(position, element)| element_data::<Node>(element, "node", position))
        .collect::<Vec<_>>();
    let edges = element_list(object, "edges")?
        .iter()
        .enumerate()
        .filter_map(|(position, element)| element_data::<Edge>(element, "edge", position))
        .collect::<Vec<_>>();

    if nodes.is_empty() {
        return Err(anyhow!("graph document contains no nodes"));
    }

    Ok(GraphSnapshot::new(nodes, edges))
}

/// Parses a `{nodeId: clusterId}` document, or reports its `{error}` payload.
pub fn parse_cluster_document(raw: &str) -> Result<ClusterAssignment> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in cluster document")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for cluster document"))?;

    if let Some(message) = upstream_error(object) {
        return Err(anyhow!("cluster source reported an error: {message}"));
    }

    let mut assignment = ClusterAssignment::new();
    for (node_id, value) in object {
        match value.as_i64() {
            Some(cluster_id) => {
                assignment.insert(node_id.clone(), cluster_id);
            }
            None => warn!("ignoring non-integer cluster id for {node_id}: {value}"),
        }
    }

    Ok(assignment)
}
