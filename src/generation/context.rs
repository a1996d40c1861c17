//! Generation context: the per-run view passed to every file generation call

use serde::{Deserialize, Serialize};

use crate::architecture::role::{file_stem, parent_dir};
use crate::architecture::{Architecture, FileRole, FileSpec, FolderSpec};
use crate::core::utils::{capitalize_first, to_kebab_case};
use crate::generation::GenerationOptions;

/// A model file known to the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    pub path: String,
    pub description: String,
    pub use_template: bool,
}

/// A route module and the mount path it is registered under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    /// Kebab-case mount path below `/api/`
    pub path: String,
    /// Module path relative to `routes/`, without extension
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    pub description: String,
    pub project_name: String,
    pub language: String,
    pub database: String,
    pub framework: String,
    pub auth: String,
    pub folders: Vec<FolderSpec>,
    pub files: Vec<FileSpec>,
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub routes: Vec<RouteInfo>,
}

impl GenerationContext {
    /// Build the context and classify models and routes up front, so every
    /// file sees the complete route table.
    pub fn new(
        description: &str,
        project_name: &str,
        options: &GenerationOptions,
        architecture: &Architecture,
    ) -> Self {
        let mut context = Self {
            description: description.to_string(),
            project_name: project_name.to_string(),
            language: options.language.clone(),
            database: options.database.clone(),
            framework: options.framework.clone(),
            auth: options.auth.clone(),
            folders: architecture.folders.clone(),
            files: architecture.files.clone(),
            models: Vec::new(),
            routes: Vec::new(),
        };
        context.classify();
        context
    }

    /// Rebuild `models` and `routes` from `files`
    pub fn classify(&mut self) {
        self.models = self
            .files
            .iter()
            .filter(|f| FileRole::classify(&f.path) == FileRole::Model)
            .map(|f| ModelInfo {
                name: model_name_from_path(&f.path),
                path: f.path.clone(),
                description: f.description.clone(),
                use_template: f.use_template,
            })
            .collect();

        self.routes = self
            .files
            .iter()
            .filter(|f| FileRole::classify(&f.path) == FileRole::Route)
            .filter_map(|f| route_info(&f.path))
            .collect();
    }

    /// Register a file produced outside the architecture (post-phases)
    pub fn add_file(&mut self, file: FileSpec) {
        if !self.files.iter().any(|f| f.path == file.path) {
            self.files.push(file);
            self.classify();
        }
    }
}

/// Model name from a model file path: the stem with its first character
/// upper-cased as-is. `models/2fa.js` stays `2fa`.
pub fn model_name_from_path(path: &str) -> String {
    let name = capitalize_first(file_stem(path));
    if name.is_empty() {
        "Model".to_string()
    } else {
        name
    }
}

/// Route entry for a file the classifier treats as a route; `None` otherwise.
/// `file` and `path` are relative to the `routes/` (or `route/`) directory.
pub fn route_info(path: &str) -> Option<RouteInfo> {
    if FileRole::classify(path) != FileRole::Route {
        return None;
    }
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let root = segments[..segments.len().saturating_sub(1)]
        .iter()
        .position(|s| matches!(*s, "routes" | "route"))?;
    let relative = segments[root + 1..].join("/");
    let relative = relative.as_str();
    let dir = parent_dir(relative);
    let stem = file_stem(relative);
    let file = if dir.is_empty() {
        stem.to_string()
    } else {
        format!("{dir}/{stem}")
    };

    let base = stem
        .strip_suffix(".routes")
        .or_else(|| stem.strip_suffix("Routes"))
        .or_else(|| stem.strip_suffix(".route"))
        .or_else(|| stem.strip_suffix("Route"))
        .or_else(|| stem.strip_suffix("Webhook"))
        .filter(|s| !s.is_empty())
        .unwrap_or(stem);
    let mount = to_kebab_case(base);
    let path = if dir.is_empty() {
        mount
    } else {
        format!("{dir}/{mount}")
    };
    Some(RouteInfo { path, file })
}
