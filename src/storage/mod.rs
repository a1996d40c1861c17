//! Diagram persistence: the repository seam and its SQLite implementation.

pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::architecture::Architecture;
use crate::core::Result;
use crate::generation::GenerationOptions;
use crate::generation::diagram::Diagram;

pub use sqlite::SqliteDiagramRepository;

/// A generated project's design, stored under a unique name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub architecture: Architecture,
    pub diagram: Diagram,
    pub output_path: String,
    pub options: GenerationOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiagramRecord {
    /// New record with a fresh id and both timestamps set to now
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        architecture: Architecture,
        diagram: Diagram,
        output_path: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            architecture,
            diagram,
            output_path: output_path.into(),
            options,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage for diagram records, unique by name
#[async_trait]
pub trait DiagramRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<DiagramRecord>>;

    /// Create or replace by name.
    ///
    /// Replacing keeps the stored `id` and `created_at`; the returned record
    /// carries the values actually persisted.
    async fn save(&self, record: DiagramRecord) -> Result<DiagramRecord>;

    /// Most recently created first
    async fn find_recent(&self, limit: usize) -> Result<Vec<DiagramRecord>>;

    /// Whether a record was removed
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}
