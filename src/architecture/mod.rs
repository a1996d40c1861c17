//! Architecture documents, path classification and repair.

pub mod fallback;
pub mod repair;
pub mod role;
pub mod types;

pub use fallback::{GLOBAL_QUERY_PATH, default_architecture, default_entities};
pub use repair::{repair, repair_with_entities};
pub use role::{Category, FileRole};
pub use types::{Architecture, FileSpec, FolderSpec, OptimizationInfo, TemplateType};
