//! Template engine: Tera rendering, injection markers and per-kind generators.

pub mod engine;
pub mod generators;
pub mod inject;

pub use engine::TemplateEngine;
pub use generators::{TemplateGenerator, TemplateKind};
pub use inject::{MARKERS, has_marker, inject};
