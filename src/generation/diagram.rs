//! Architecture diagrams: folders become groups, files become nodes and
//! inferred references become edges.

use serde::{Deserialize, Serialize};

use crate::architecture::role::{basename, file_stem, parent_dir};
use crate::architecture::{Architecture, FileRole};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FileRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagramGroup {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub nodes: Vec<DiagramNode>,
    #[serde(default)]
    pub edges: Vec<DiagramEdge>,
    #[serde(default)]
    pub groups: Vec<DiagramGroup>,
}

impl Diagram {
    pub fn from_architecture(architecture: &Architecture) -> Self {
        let groups: Vec<DiagramGroup> = architecture
            .folders
            .iter()
            .map(|folder| DiagramGroup {
                id: folder.path.clone(),
                label: basename(&folder.path).to_string(),
                description: folder.description.clone(),
            })
            .collect();

        let nodes: Vec<DiagramNode> = architecture
            .files
            .iter()
            .map(|file| DiagramNode {
                id: file.path.clone(),
                label: basename(&file.path).to_string(),
                description: file.description.clone(),
                kind: FileRole::classify(&file.path),
                parent: enclosing_group(&groups, &file.path),
            })
            .collect();

        let edges = infer_edges(&nodes);
        Self {
            nodes,
            edges,
            groups,
        }
    }
}

/// Nearest declared folder containing `path`
fn enclosing_group(groups: &[DiagramGroup], path: &str) -> Option<String> {
    let mut dir = parent_dir(path);
    while !dir.is_empty() {
        if groups.iter().any(|g| g.id == dir) {
            return Some(dir.to_string());
        }
        dir = parent_dir(dir);
    }
    None
}

fn infer_edges(nodes: &[DiagramNode]) -> Vec<DiagramEdge> {
    let of_kind = |kind: FileRole| nodes.iter().filter(move |n| n.kind == kind);
    let mut edges = Vec::new();

    for model in of_kind(FileRole::Model) {
        let stem = file_stem(&model.id).to_lowercase();
        for controller in of_kind(FileRole::Controller) {
            if !stem.is_empty() && controller.label.to_lowercase().contains(&stem) {
                edges.push(edge(&model.id, &controller.id, "uses"));
            }
        }
    }

    for controller in of_kind(FileRole::Controller) {
        let stem = controller_entity(&controller.id);
        for route in of_kind(FileRole::Route) {
            if !stem.is_empty() && route.label.to_lowercase().contains(&stem) {
                edges.push(edge(&controller.id, &route.id, "handles"));
            }
        }
    }

    for middleware in of_kind(FileRole::Middleware) {
        for route in of_kind(FileRole::Route) {
            edges.push(edge(&middleware.id, &route.id, "protects"));
        }
    }

    edges
}

/// Lower-case entity stem of a controller file, e.g. `postController.js` -> `post`
fn controller_entity(path: &str) -> String {
    let stem = file_stem(path).to_lowercase();
    stem.strip_suffix(".controller")
        .or_else(|| stem.strip_suffix("controller"))
        .map(|s| s.trim_end_matches(['.', '_', '-']).to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(stem)
}

fn edge(source: &str, target: &str, label: &str) -> DiagramEdge {
    DiagramEdge {
        id: format!("{source}->{target}"),
        source: source.to_string(),
        target: target.to_string(),
        label: label.to_string(),
    }
}
