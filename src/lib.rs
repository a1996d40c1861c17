//! apiforge: scaffold backend API projects from a natural-language description.
//!
//! The [`generation::ProjectGenerator`] asks an [`oracle::Oracle`] for an
//! architecture, repairs it with [`architecture::repair`], and materializes
//! every file either from a [`templates`] template (with oracle-written
//! fragments spliced in) or by full oracle synthesis. Runs are checkpointed
//! and resumable; finished designs are stored in a [`storage`] repository.
#![deny(unsafe_code)]

pub mod architecture;
pub mod core;
pub mod generation;
pub mod oracle;
pub mod storage;
pub mod templates;

pub use crate::core::{Config, Error, Result};
