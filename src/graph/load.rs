use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::info;

use super::model::{ClusterAssignment, GraphSnapshot};
use super::parse::{parse_cluster_document, parse_graph_document};

pub fn load_snapshot(path: &Path) -> Result<GraphSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph document {}", path.display()))?;
    let snapshot = parse_graph_document(&raw)
        .with_context(|| format!("failed to load graph from {}", path.display()))?;

    info!(
        "loaded graph {}: {} nodes, {} edges",
        path.display(),
        snapshot.node_count(),
        snapshot.edge_count()
    );
    Ok(snapshot)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterAlgorithm {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

impl ClusterAlgorithm {
    pub const KNOWN: [ClusterAlgorithm; 3] = [
        ClusterAlgorithm {
            name: "domain",
            title: "Domain",
            description: "Groups nodes strictly by the domain structure relative to bots. \
                Features are assigned to the domain with the most connected bots.",
        },
        ClusterAlgorithm {
            name: "agglomerative",
            title: "Bot Types (Agglomerative)",
            description: "Groups bots by feature similarity. Reveals hidden structures like \
                generalist assistants versus specialized tools.",
        },
        ClusterAlgorithm {
            name: "spectral",
            title: "Spectral",
            description: "Partitions the whole graph by its connectivity structure.",
        },
    ];

    pub fn find(name: &str) -> Option<ClusterAlgorithm> {
        Self::KNOWN
            .iter()
            .copied()
            .find(|algorithm| algorithm.name == name)
    }
}

/// Reads precomputed partitions from `<dir>/<algorithm>.json`.
#[derive(Clone, Debug)]
pub struct ClusterSource {
    dir: PathBuf,
}

impl ClusterSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn fetch(&self, algorithm: &str) -> Result<ClusterAssignment> {
        if ClusterAlgorithm::find(algorithm).is_none() {
            return Err(anyhow!("Unknown algorithm: {algorithm}"));
        }

        let path = self.dir.join(format!("{algorithm}.json"));
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read cluster document {}", path.display()))?;
        let assignment = parse_cluster_document(&raw)
            .with_context(|| format!("failed to run clustering `{algorithm}`"))?;

        info!(
            "loaded {} cluster assignments for `{algorithm}`",
            assignment.len()
        );
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn snapshot_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(
            &path,
            r#"{"nodes": [{"data": {"id": "u", "nodeType": "user", "label": "User"}}], "edges": []}"#,
        )
        .unwrap();

        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.node_count(), 1);
    }

    #[test]
    fn missing_snapshot_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_snapshot(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{error:#}").contains("absent.json"));
    }

    #[test]
    fn cluster_source_reads_per_algorithm_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("domain.json"), r#"{"b1": 0, "b2": 1}"#).unwrap();
        let source = ClusterSource::new(dir.path());

        let assignment = source.fetch("domain").unwrap();
        assert_eq!(assignment.get("b2"), Some(&1));

        let error = source.fetch("kmeans").unwrap_err().to_string();
        assert_eq!(error, "Unknown algorithm: kmeans");
    }

    #[test]
    fn cluster_source_surfaces_error_payload() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("spectral.json"),
            r#"{"error": "Spectral error: graph is disconnected"}"#,
        )
        .unwrap();

        let error = ClusterSource::new(dir.path()).fetch("spectral").unwrap_err();
        assert!(format!("{error:#}").contains("graph is disconnected"));
    }
}
