//! Audit outputs.
//!
//! The six files every run produces:
//! - `audit_kpi_summary.csv`: one-row profile of both extracts
//! - `exceptions_routes_marketing_only.csv`
//! - `exceptions_airports_marketing_only.csv`
//! - `exceptions_overcounting_flags.csv`
//! - `audit_findings_for_report.txt` and `.md`: narrative summaries
//!
//! Outputs are fully rendered in memory by [`AuditOutputs`] and then
//! committed by [`ReportWriter`]. [`AuditReport`] is the JSON view printed
//! by the CLI and is not one of the six files.

mod findings;
mod narrative;
mod report;
mod writer;

pub use findings::AuditFindings;
pub use narrative::{render_markdown, render_text};
pub use report::AuditReport;
pub use writer::{
    AuditOutputs, FINDINGS_MARKDOWN_FILE, FINDINGS_TEXT_FILE, KPI_SUMMARY_FILE,
    MARKETING_ONLY_AIRPORTS_FILE, MARKETING_ONLY_ROUTES_FILE, OUTPUT_FILES,
    OVERCOUNTING_FLAGS_FILE, RenderedOutput, ReportWriter, airports_frame, flags_frame,
    routes_frame, summary_frame,
};
