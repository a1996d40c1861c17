//! The architecture document: folders and files with per-file generation strategy

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::architecture::role::parent_dir;

/// Template selector a file may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Model,
    Controller,
    Route,
    Middleware,
    Config,
    Main,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Controller => "controller",
            Self::Route => "route",
            Self::Middleware => "middleware",
            Self::Config => "config",
            Self::Main => "main",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "model" => Ok(Self::Model),
            "controller" => Ok(Self::Controller),
            "route" | "routes" => Ok(Self::Route),
            "middleware" => Ok(Self::Middleware),
            "config" => Ok(Self::Config),
            "main" | "app" => Ok(Self::Main),
            _ => Err(format!("Unknown template type: {s}")),
        }
    }
}

/// Unknown `templateType` strings become `None` so the file falls back to synthesis
fn deserialize_template_type<'de, D>(deserializer: D) -> Result<Option<TemplateType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSpec {
    pub path: String,
    #[serde(default)]
    pub description: String,
}

impl FolderSpec {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_template: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_template_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub template_type: Option<TemplateType>,
}

impl FileSpec {
    /// A file the LLM writes from scratch
    pub fn custom(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            use_template: false,
            template_type: None,
        }
    }

    /// A file rendered from a template
    pub fn templated(
        path: impl Into<String>,
        description: impl Into<String>,
        template_type: TemplateType,
    ) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            use_template: true,
            template_type: Some(template_type),
        }
    }
}

/// Totals derived from the file list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationInfo {
    pub total_files: usize,
    pub template_files: usize,
    pub custom_files: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Architecture {
    #[serde(default)]
    pub folders: Vec<FolderSpec>,
    #[serde(default)]
    pub files: Vec<FileSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimization_info: Option<OptimizationInfo>,
}

impl Architecture {
    pub fn new(folders: Vec<FolderSpec>, files: Vec<FileSpec>) -> Self {
        let mut architecture = Self {
            folders,
            files,
            optimization_info: None,
        };
        architecture.refresh_optimization_info();
        architecture
    }

    /// Recompute `optimization_info` from the current file list
    pub fn refresh_optimization_info(&mut self) {
        let template_files = self.files.iter().filter(|f| f.use_template).count();
        self.optimization_info = Some(OptimizationInfo {
            total_files: self.files.len(),
            template_files,
            custom_files: self.files.len() - template_files,
        });
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.folders.iter().any(|f| f.path == path)
    }

    pub fn file(&self, path: &str) -> Option<&FileSpec> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Whether `dir` is declared, either directly or as a prefix of a deeper folder
    pub fn covers_dir(&self, dir: &str) -> bool {
        if dir.is_empty() {
            return true;
        }
        let prefix = format!("{dir}/");
        self.folders
            .iter()
            .any(|f| f.path == dir || f.path.starts_with(&prefix))
    }

    /// Clean paths, drop duplicate files and declare folders implied by files.
    ///
    /// A document that already satisfies the invariants is left as-is.
    pub fn normalize(&mut self) {
        for folder in &mut self.folders {
            folder.path = clean_path(&folder.path);
        }
        self.folders.retain(|f| !f.path.is_empty());
        let mut seen_folders = HashSet::new();
        self.folders.retain(|f| seen_folders.insert(f.path.clone()));

        for file in &mut self.files {
            file.path = clean_path(&file.path);
        }
        self.files.retain(|f| !f.path.is_empty());
        let mut seen_files = HashSet::new();
        self.files.retain(|f| seen_files.insert(f.path.clone()));

        let missing: Vec<String> = self
            .files
            .iter()
            .map(|f| parent_dir(&f.path).to_string())
            .filter(|dir| !self.covers_dir(dir))
            .collect();
        for dir in missing {
            if !self.has_folder(&dir) {
                self.folders.push(FolderSpec::new(dir, ""));
            }
        }
    }

    /// Describe invariant violations; an empty list means the document is valid
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for file in &self.files {
            if !seen.insert(file.path.as_str()) {
                issues.push(format!("duplicate file path: {}", file.path));
            }
            let dir = parent_dir(&file.path);
            if !self.covers_dir(dir) {
                issues.push(format!("folder not declared for {}: {dir}", file.path));
            }
            if file.use_template && file.template_type.is_none() {
                issues.push(format!("{} uses a template without a known templateType", file.path));
            }
        }
        issues
    }
}

fn clean_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let mut path = path.as_str();
    loop {
        let stripped = path.trim_start_matches('/').trim_start_matches("./");
        if stripped == path {
            break;
        }
        path = stripped;
    }
    path.trim_end_matches('/').to_string()
}
