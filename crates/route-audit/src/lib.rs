//! Route Audit Library
//!
//! Reconciles two extracts of the same flight population, an operational
//! on-time reporting view and a marketing-carrier view, and reports where
//! they disagree.
//!
//! # Overview
//!
//! - **Profiling**: row counts, distinct routes and airports, null cells
//! - **Route reconciliation**: marketing routes absent from the reporting view
//! - **Airport reconciliation**: airports that only appear in marketing routes
//! - **Overcounting detection**: routes whose marketing count dwarfs the
//!   reporting count
//! - **Reporting**: four CSV exception files and a text/Markdown narrative,
//!   byte-identical across reruns on the same inputs
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use route_audit::{AuditConfig, AuditPipeline};
//!
//! let config = AuditConfig::builder()
//!     .reporting_path("data/T_ONTIME_REPORTING.csv")
//!     .marketing_path("data/T_ONTIME_MARKETING.csv")
//!     .output_dir("data/output")
//!     .min_ratio(3.0)
//!     .build()?;
//! std::fs::create_dir_all(&config.output_dir)?;
//!
//! let result = AuditPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! for flag in &result.flags {
//!     println!("{}", flag);
//! }
//! ```
//!
//! # Building blocks
//!
//! The pipeline is a thin sequence over pure functions that can be used on
//! their own:
//!
//! ```rust,ignore
//! use route_audit::loader::FlightTable;
//! use route_audit::reconcile::{OvercountRule, Reconciliation};
//! use route_audit::types::{RouteKey, TableKind};
//!
//! let rep = FlightTable::from_keys(TableKind::Reporting, vec![RouteKey::new(1, 2); 25]);
//! let mkt = FlightTable::from_keys(TableKind::Marketing, vec![RouteKey::new(1, 2); 80]);
//! let recon = Reconciliation::compute(&rep, &mkt, &OvercountRule::default());
//! assert_eq!(recon.flags.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reconcile;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AuditConfig, AuditConfigBuilder, ConfigValidationError, WritePolicy};
pub use error::{AuditError, ResultExt};
pub use loader::{FlightTable, load_table};
pub use pipeline::{
    AuditPipeline, AuditPipelineBuilder, AuditStage, ClosureProgressReporter, ProgressReporter,
    ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use reconcile::{OvercountRule, ReconcileStep, Reconciliation, RouteUniverse};
pub use reporting::{AuditFindings, AuditOutputs, AuditReport, ReportWriter};
pub use types::{
    AuditResult, OvercountFlag, ProfileSummary, RouteCount, RouteKey, TableKind, TableProfile,
};
