//! Architecture repair: guarantee the essentials a runnable project needs.
//!
//! The repairer only appends. It never removes or reorders what the oracle
//! proposed.

use tracing::{debug, info, warn};

use crate::architecture::fallback::entity_files;
use crate::architecture::role::{ENTRY_POINTS, FileRole, file_stem};
use crate::architecture::{Architecture, FileSpec, FolderSpec, TemplateType};
use crate::oracle::Oracle;

/// Folders every generated project has
pub const CANONICAL_FOLDERS: [(&str, &str); 4] = [
    ("models", "Data models"),
    ("controllers", "Request handlers"),
    ("routes", "API route definitions"),
    ("config", "Configuration files"),
];

/// Repair using entities extracted from the description by the oracle.
///
/// Entity extraction failures are logged and skipped; the structural
/// guarantees still hold.
pub async fn repair(
    architecture: Architecture,
    description: &str,
    oracle: &dyn Oracle,
) -> Architecture {
    let entities = match oracle.extract_entities(description).await {
        Ok(entities) => entities,
        Err(e) => {
            warn!(error = %e, "Entity extraction failed; repairing without entities");
            Vec::new()
        }
    };
    repair_with_entities(architecture, &entities)
}

/// Pure repair step over a known entity list
pub fn repair_with_entities(mut architecture: Architecture, entities: &[String]) -> Architecture {
    architecture.normalize();
    let before = architecture.files.len() + architecture.folders.len();

    for (path, description) in CANONICAL_FOLDERS {
        if !architecture.has_folder(path) {
            debug!(folder = path, "Adding canonical folder");
            architecture.folders.push(FolderSpec::new(path, description));
        }
    }

    let has_entry_point = architecture
        .files
        .iter()
        .any(|f| FileRole::classify(&f.path) == FileRole::Main);
    if !has_entry_point {
        architecture.files.push(FileSpec::templated(
            ENTRY_POINTS[0],
            "Application entry point",
            TemplateType::Main,
        ));
    }

    if !architecture.has_file("package.json") {
        architecture.files.push(FileSpec::templated(
            "package.json",
            "Project manifest with dependencies and scripts",
            TemplateType::Config,
        ));
    }

    if !architecture.has_file(".env.example") {
        architecture.files.push(FileSpec::templated(
            ".env.example",
            "Example environment variables",
            TemplateType::Config,
        ));
    }

    for entity in entities {
        let entity = entity.trim().to_lowercase();
        if entity.is_empty() {
            continue;
        }
        let [model, controller, route] = entity_files(&entity);
        if !has_entity_file(&architecture, FileRole::Model, &entity, "") {
            architecture.files.push(model);
        }
        if !has_entity_file(&architecture, FileRole::Controller, &entity, "controller") {
            architecture.files.push(controller);
        }
        if !has_entity_file(&architecture, FileRole::Route, &entity, "route") {
            architecture.files.push(route);
        }
    }

    let added = architecture.files.len() + architecture.folders.len() - before;
    if added > 0 {
        info!(added, "Repaired architecture");
    }
    architecture.refresh_optimization_info();
    architecture
}

/// Whether a file for `entity` with the given role already exists.
///
/// Matches `user.js`, `User.js`, `userController.js`, `user.controller.js`,
/// `userRoutes.js`, `user.routes.js` and their plurals.
fn has_entity_file(architecture: &Architecture, role: FileRole, entity: &str, suffix: &str) -> bool {
    let entity: String = entity.chars().filter(|c| c.is_alphanumeric()).collect();
    architecture.files.iter().any(|f| {
        if FileRole::classify(&f.path) != role {
            return false;
        }
        let stem: String = file_stem(&f.path)
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        let name = stem
            .strip_suffix(&format!("{suffix}s"))
            .or_else(|| stem.strip_suffix(suffix))
            .unwrap_or(&stem);
        name == entity || name.strip_suffix('s') == Some(entity.as_str())
    })
}
