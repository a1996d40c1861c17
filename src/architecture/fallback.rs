//! Keyword-driven default architecture used when the oracle cannot propose one.
//!
//! This is the only place where intent is inferred locally.

use tracing::info;

use crate::architecture::{Architecture, FileSpec, FolderSpec, TemplateType};
use crate::core::utils::to_camel_case;

/// Relative path of the aggregate query route
pub const GLOBAL_QUERY_PATH: &str = "routes/globalQuery.js";

/// Keyword groups and the entity sets they imply, checked in order
const DOMAINS: &[(&[&str], &[&str])] = &[
    (
        &["ecommerce", "e-commerce", "tienda", "shop", "store"],
        &["producto", "usuario", "pedido", "categoria", "carrito"],
    ),
    (&["blog"], &["articulo", "usuario", "comentario", "categoria"]),
    (&["cms"], &["pagina", "usuario", "medio", "categoria"]),
    (
        &["booking", "reserva", "reservation"],
        &["reserva", "usuario", "servicio", "disponibilidad"],
    ),
    (
        &["inventory", "inventario"],
        &["producto", "almacen", "proveedor", "movimiento"],
    ),
];

/// Entities implied by the description's keywords; `usuario` when nothing matches
pub fn default_entities(description: &str) -> Vec<String> {
    let lower = description.to_lowercase();
    DOMAINS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| starts_word(&lower, k)))
        .map(|(_, entities)| entities.iter().map(|e| e.to_string()).collect())
        .unwrap_or_else(|| vec!["usuario".to_string()])
}

/// Whether `keyword` occurs at the start of a word, so `stores` and
/// `blogging` count but `restore` and `datastore` do not
fn starts_word(text: &str, keyword: &str) -> bool {
    text.match_indices(keyword).any(|(i, _)| {
        text[..i]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

/// Build a complete, template-heavy architecture from the description alone
pub fn default_architecture(description: &str, include_global_query: bool) -> Architecture {
    let entities = default_entities(description);
    info!(entities = ?entities, "Using default architecture");

    let folders = vec![
        FolderSpec::new("config", "Configuration files"),
        FolderSpec::new("models", "Data models"),
        FolderSpec::new("controllers", "Request handlers"),
        FolderSpec::new("routes", "API route definitions"),
        FolderSpec::new("middleware", "Express middleware"),
        FolderSpec::new("utils", "Shared helpers"),
    ];

    let mut files = vec![
        FileSpec::templated(
            "config/database.js",
            "Database connection setup",
            TemplateType::Config,
        ),
        FileSpec::templated(
            "middleware/auth.js",
            "Authentication middleware",
            TemplateType::Middleware,
        ),
        FileSpec::templated("app.js", "Application entry point", TemplateType::Main),
        FileSpec::templated("package.json", "Project manifest", TemplateType::Config),
        FileSpec::templated(".env.example", "Environment variables", TemplateType::Config),
    ];

    for entity in &entities {
        files.extend(entity_files(entity));
    }

    if include_global_query {
        files.push(FileSpec::templated(
            GLOBAL_QUERY_PATH,
            "Cross-model search endpoint",
            TemplateType::Route,
        ));
    }

    Architecture::new(folders, files)
}

/// The `{model, controller, route}` triple for one entity
pub fn entity_files(entity: &str) -> [FileSpec; 3] {
    let stem = to_camel_case(entity);
    [
        FileSpec::templated(
            format!("models/{stem}.js"),
            format!("Data model for {entity}"),
            TemplateType::Model,
        ),
        FileSpec::templated(
            format!("controllers/{stem}Controller.js"),
            format!("CRUD controller for {entity}"),
            TemplateType::Controller,
        ),
        FileSpec::templated(
            format!("routes/{stem}Routes.js"),
            format!("REST routes for {entity}"),
            TemplateType::Route,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_keyword() {
        let entities = default_entities("A personal BLOG platform");
        assert_eq!(entities, vec!["articulo", "usuario", "comentario", "categoria"]);
    }

    #[test]
    fn test_keywords_match_word_starts_only() {
        assert_eq!(default_entities("nightly backup and restore service"), vec!["usuario"]);
        assert_eq!(default_entities("metrics over a key-value datastore"), vec!["usuario"]);
        assert_eq!(default_entities("Bike STORES chain")[0], "producto");
        assert_eq!(default_entities("e-commerce backend")[0], "producto");
        assert_eq!(default_entities("blogging engine")[0], "articulo");
    }

    #[test]
    fn test_unknown_domain_defaults_to_user() {
        assert_eq!(default_entities("weather station telemetry"), vec!["usuario"]);
    }

    #[test]
    fn test_default_architecture_is_valid() {
        let arch = default_architecture("online shop", true);
        assert!(arch.validate().is_empty());
        assert!(arch.has_file("models/producto.js"));
        assert!(arch.has_file("controllers/productoController.js"));
        assert!(arch.has_file("routes/productoRoutes.js"));
        assert!(arch.has_file(GLOBAL_QUERY_PATH));
        assert!(arch.has_file("package.json"));
    }

    #[test]
    fn test_global_query_only_when_requested() {
        let arch = default_architecture("blog", false);
        assert!(!arch.has_file(GLOBAL_QUERY_PATH));
    }
}
