//! Process-local cache for generic, cross-project files

use std::collections::HashMap;

use tracing::debug;

use crate::architecture::FileRole;
use crate::architecture::role::{basename, file_stem, parent_dir};

/// `(parent directory basename, file name, database kind)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dir: String,
    pub file_name: String,
    pub database: String,
}

impl CacheKey {
    /// Key for `path` when its role is cacheable, otherwise `None`
    pub fn for_path(path: &str, database: &str) -> Option<Self> {
        if !is_cacheable(path) {
            return None;
        }
        Some(Self {
            dir: basename(parent_dir(path)).to_string(),
            file_name: basename(path).to_string(),
            database: database.to_lowercase(),
        })
    }
}

/// Auth middleware, database configuration and shared helpers do not depend
/// on the project they are generated for.
pub fn is_cacheable(path: &str) -> bool {
    let stem = file_stem(path).to_lowercase();
    let in_shared_dir = path
        .split('/')
        .rev()
        .skip(1)
        .any(|dir| dir == "utils" || dir == "helpers");
    match FileRole::classify(path) {
        FileRole::Middleware => stem.contains("auth"),
        FileRole::Config => stem.contains("db") || stem.contains("database"),
        _ => in_shared_dir,
    }
}

#[derive(Debug, Default)]
pub struct CodeCache {
    entries: HashMap<CacheKey, String>,
}

impl CodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&String> {
        let hit = self.entries.get(key);
        if hit.is_some() {
            debug!(file = %key.file_name, dir = %key.dir, "Oracle cache hit");
        }
        hit
    }

    pub fn insert(&mut self, key: CacheKey, code: String) {
        self.entries.insert(key, code);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
