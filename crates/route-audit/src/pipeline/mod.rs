//! Pipeline module.
//!
//! The audit pipeline, its builder and progress reporting.

mod builder;
pub mod progress;

pub use builder::{AuditPipeline, AuditPipelineBuilder};
pub use progress::{AuditStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
