//! Saved configurations: named description + options + architecture snapshots
//! under `saved-projects/`, regenerable later without asking the oracle for an
//! architecture.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::architecture::Architecture;
use crate::core::{Error, Result};
use crate::generation::GenerationOptions;

pub const SAVED_PROJECTS_DIR: &str = "saved-projects";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    pub name: String,
    pub description: String,
    pub options: GenerationOptions,
    pub architecture: Architecture,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SavedConfigStore {
    dir: PathBuf,
}

impl SavedConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<cwd>/saved-projects`
    pub fn in_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?.join(SAVED_PROJECTS_DIR)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed.contains(['/', '\\'])
            || trimmed.starts_with('.')
        {
            return Err(Error::config(format!("Invalid configuration name: {name:?}")));
        }
        Ok(self.dir.join(format!("{trimmed}.json")))
    }

    /// Store a new configuration; an existing one with the same name is kept
    /// and `AlreadyExists` returned.
    pub async fn save(&self, config: &SavedConfiguration) -> Result<PathBuf> {
        let path = self.path_for(&config.name)?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::AlreadyExists(format!(
                "Saved configuration '{}' at {}",
                config.name,
                path.display()
            )));
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::filesystem(&self.dir, e))?;
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| Error::filesystem(&path, e))?;
        debug!(name = %config.name, path = %path.display(), "Saved configuration");
        Ok(path)
    }

    pub async fn load(&self, name: &str) -> Result<SavedConfiguration> {
        let path = self.path_for(name)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("Saved configuration '{name}'")));
            }
            Err(e) => return Err(Error::filesystem(&path, e)),
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Every readable configuration, newest first. Unparseable files are skipped.
    pub async fn list(&self) -> Result<Vec<SavedConfiguration>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::filesystem(&self.dir, e)),
        };

        let mut configs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::filesystem(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = tokio::fs::read_to_string(&path)
                .await
                .map_err(Error::from)
                .and_then(|text| Ok(serde_json::from_str::<SavedConfiguration>(&text)?));
            match parsed {
                Ok(config) => configs.push(config),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable saved configuration"),
            }
        }
        configs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::{FileSpec, FolderSpec};
    use tempfile::TempDir;

    fn config(name: &str, age_hours: i64) -> SavedConfiguration {
        SavedConfiguration {
            name: name.to_string(),
            description: "Shop API".to_string(),
            options: GenerationOptions::default(),
            architecture: Architecture::new(
                vec![FolderSpec::new("models", "")],
                vec![FileSpec::custom("models/product.js", "Products")],
            ),
            created_at: Utc::now() - chrono::Duration::hours(age_hours),
        }
    }

    #[tokio::test]
    async fn test_save_load_and_refuse_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = SavedConfigStore::new(dir.path().join(SAVED_PROJECTS_DIR));

        let path = store.save(&config("shop", 0)).await.unwrap();
        assert!(path.ends_with("saved-projects/shop.json"));
        let loaded = store.load("shop").await.unwrap();
        assert_eq!(loaded.name, "shop");
        assert_eq!(loaded.architecture, config("shop", 0).architecture);

        let err = store.save(&config("shop", 0)).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first_skipping_garbage() {
        let dir = TempDir::new().unwrap();
        let store = SavedConfigStore::new(dir.path());
        store.save(&config("old", 5)).await.unwrap();
        store.save(&config("new", 0)).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_names() {
        let dir = TempDir::new().unwrap();
        let store = SavedConfigStore::new(dir.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(store.load("nope").await.unwrap_err(), Error::NotFound(_)));
        assert!(matches!(store.load("../etc").await.unwrap_err(), Error::Config(_)));
    }
}
