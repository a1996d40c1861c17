//! Tera-backed template loading and rendering

use std::path::PathBuf;

use rust_embed::RustEmbed;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

use crate::core::{Error, Result};

/// Built-in templates shipped inside the binary
#[derive(RustEmbed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Loads `<root>/<kind>/<name>.tera`, falling back to the embedded copy
#[derive(Debug, Clone)]
pub struct TemplateEngine {
    root: Option<PathBuf>,
    use_embedded: bool,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::embedded()
    }
}

impl TemplateEngine {
    /// Engine that only uses the embedded templates
    pub fn embedded() -> Self {
        Self {
            root: None,
            use_embedded: true,
        }
    }

    /// Engine that prefers templates under `root`.
    ///
    /// An unreadable root is a configuration error.
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::config(format!(
                "Template directory {} does not exist or is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root: Some(root),
            use_embedded: true,
        })
    }

    /// Ignore the built-in set; templates must come from the root
    pub fn without_embedded(mut self) -> Self {
        self.use_embedded = false;
        self
    }

    /// Template source for `kind/name`.
    ///
    /// Fails with `TemplateMissing` when neither the root nor the embedded set
    /// has it.
    pub async fn load(&self, kind: &str, name: &str) -> Result<String> {
        let relative = format!("{kind}/{name}.tera");

        if let Some(root) = &self.root {
            let path = root.join(&relative);
            match tokio::fs::read_to_string(&path).await {
                Ok(source) => {
                    debug!(template = %path.display(), "Loaded template from disk");
                    return Ok(source);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::filesystem(path, e)),
            }
        }

        let file = self
            .use_embedded
            .then(|| EmbeddedTemplates::get(&relative))
            .flatten()
            .ok_or_else(|| Error::TemplateMissing(format!("{kind}/{name}")))?;
        String::from_utf8(file.data.into_owned())
            .map_err(|e| Error::TemplateMissing(format!("{kind}/{name} is not UTF-8: {e}")))
    }

    /// Render `template` against `data`, which must serialize to an object.
    ///
    /// Output is not HTML-escaped.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        let context = Context::from_serialize(data)?;
        Ok(Tera::one_off(template, &context, false)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_render_loops_conditionals_and_fields() {
        let engine = TemplateEngine::embedded();
        let out = engine
            .render(
                "{% for f in fields %}{{ f.name }}{% if f.required %}!{% endif %};{% endfor %}<{{ raw }}>",
                &json!({"fields": [{"name": "a", "required": true}, {"name": "b"}], "raw": "<x>"}),
            )
            .unwrap();
        assert_eq!(out, "a!;b;<<x>>");
    }

    #[tokio::test]
    async fn test_load_prefers_root_then_embedded() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("controller")).unwrap();
        std::fs::write(dir.path().join("controller/crud.tera"), "custom {{ modelName }}").unwrap();

        let engine = TemplateEngine::with_root(dir.path()).unwrap();
        assert_eq!(engine.load("controller", "crud").await.unwrap(), "custom {{ modelName }}");

        let app = engine.load("app", "express").await.unwrap();
        assert!(app.contains("// <routes:autogen>"));
    }

    #[tokio::test]
    async fn test_missing_template() {
        let err = TemplateEngine::embedded()
            .load("model", "does_not_exist")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TemplateMissing(_)));
    }

    #[tokio::test]
    async fn test_without_embedded() {
        let dir = TempDir::new().unwrap();
        let engine = TemplateEngine::with_root(dir.path()).unwrap().without_embedded();
        let err = engine.load("app", "express").await.unwrap_err();
        assert!(matches!(err, Error::TemplateMissing(_)));
    }

    #[test]
    fn test_unreadable_root_is_config_error() {
        let err = TemplateEngine::with_root("/definitely/not/here").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
