//! Recovery checkpoints.
//!
//! A run keeps a JSON snapshot at `<output>/.recovery.json`, rewritten after
//! every file and phase boundary and removed on success. Its presence means
//! the run is incomplete; the next invocation with the same output resumes
//! from it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::architecture::{Architecture, Category};
use crate::core::{Error, Result};
use crate::generation::{GenerationContext, GenerationOptions};

pub const RECOVERY_FILE: &str = ".recovery.json";
const RECOVERY_TMP_FILE: &str = ".recovery.json.tmp";

/// Last phase boundary a run crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ArchitectureReady,
    ModelsAnalyzed,
    GeneratingFiles,
    FilesGenerated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryState {
    pub project_name: String,
    pub description: String,
    pub architecture: Architecture,
    pub total_files: usize,
    /// Files processed so far, generated or skipped
    pub file_counter: usize,
    pub options: GenerationOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<GenerationContext>,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_category: Option<Category>,
    /// Index within `current_category` of the last completed file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_category_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Absolute paths of written files
    #[serde(default)]
    pub generated_files: Vec<String>,
    /// Relative paths of files given up on under `continueOnError`
    #[serde(default)]
    pub skipped_files: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl RecoveryState {
    /// Snapshot taken right after the architecture is settled
    pub fn new(
        project_name: impl Into<String>,
        description: impl Into<String>,
        architecture: Architecture,
        options: GenerationOptions,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            description: description.into(),
            total_files: architecture.files.len(),
            architecture,
            file_counter: 0,
            options,
            context: None,
            phase: Phase::ArchitectureReady,
            current_category: None,
            current_category_index: None,
            last_error: None,
            generated_files: Vec::new(),
            skipped_files: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// `(category position, index)` of the first file still to produce.
    ///
    /// Only meaningful once file generation has started; earlier phases start
    /// at the first category.
    pub fn resume_point(&self) -> (usize, usize) {
        match (self.phase, self.current_category) {
            (Phase::GeneratingFiles, Some(category)) => (
                category.position(),
                self.current_category_index.map_or(0, |i| i + 1),
            ),
            (Phase::FilesGenerated, _) => (Category::ORDER.len(), 0),
            _ => (0, 0),
        }
    }

    /// Record a finished file at `index` of `category`
    pub fn mark_progress(&mut self, category: Category, index: usize) {
        self.phase = Phase::GeneratingFiles;
        self.current_category = Some(category);
        self.current_category_index = Some(index);
    }

    /// Record entering `category` before any of its files completed
    pub fn enter_category(&mut self, category: Category) {
        self.phase = Phase::GeneratingFiles;
        self.current_category = Some(category);
        self.current_category_index = None;
    }
}

/// Reads and writes the snapshot for one output directory
#[derive(Debug, Clone)]
pub struct RecoveryStore {
    path: PathBuf,
}

impl RecoveryStore {
    pub fn for_output(output: &Path) -> Self {
        Self {
            path: output.join(RECOVERY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// The stored snapshot, `None` when there is none.
    ///
    /// An unreadable or mismatched file is `InvalidRecoveryState`.
    pub async fn load(&self) -> Result<Option<RecoveryState>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::InvalidRecoveryState(e.to_string())),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::InvalidRecoveryState(e.to_string()))
    }

    /// Replace the snapshot, stamping the current time.
    ///
    /// Written to a sibling file and renamed into place, so a reader never
    /// sees a partial snapshot.
    pub async fn save(&self, state: &mut RecoveryState) -> Result<()> {
        state.timestamp = Utc::now();
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_file_name(RECOVERY_TMP_FILE);
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::filesystem(parent, e))?;
        }
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::filesystem(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::filesystem(&self.path, e))?;
        debug!(phase = ?state.phase, counter = state.file_counter, "Recovery state saved");
        Ok(())
    }

    /// Remove the snapshot; a missing file is fine
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::filesystem(&self.path, e)),
        }
    }
}

/// Whether `name` is one of the checkpoint files
pub fn is_recovery_file(name: &str) -> bool {
    name == RECOVERY_FILE || name == RECOVERY_TMP_FILE
}
