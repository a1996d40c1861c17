//! Generation pipeline: orchestrates a run from description to project tree.
//!
//! A run acquires and repairs an architecture, creates its folders, produces
//! files category by category (templates where available, oracle synthesis
//! otherwise), wires optional subsystems into the entry point, records a
//! diagram and optionally archives the result. Progress is checkpointed so an
//! interrupted run resumes where it stopped.

pub mod archive;
pub mod context;
pub mod diagram;
pub mod options;
pub mod orchestrator;
pub mod output;
pub mod recovery;
pub mod saved;
pub mod wiring;

pub use context::{GenerationContext, ModelInfo, RouteInfo};
pub use diagram::Diagram;
pub use options::{GenerationOptions, SignatureMethod, WebhookEventType, WebhookSpec};
pub use orchestrator::{
    GenerationOutcome, GenerationRequest, GenerationResult, PausedRun, ProjectGenerator,
};
pub use output::{FileSystemOutputService, OutputService};
pub use recovery::{Phase, RecoveryState, RecoveryStore};
pub use saved::{SavedConfigStore, SavedConfiguration};
