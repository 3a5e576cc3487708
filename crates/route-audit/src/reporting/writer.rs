//! Rendering of the six audit outputs and committing them to disk.
//!
//! Every output is rendered to bytes before the first file is touched, so a
//! failure while building outputs never leaves anything on disk.

use super::findings::AuditFindings;
use super::narrative::{render_markdown, render_text};
use crate::config::WritePolicy;
use crate::error::{AuditError, Result, ResultExt};
use crate::reconcile::Reconciliation;
use crate::types::{DEST_COLUMN, ORIGIN_COLUMN, OvercountFlag, ProfileSummary, RouteKey};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const KPI_SUMMARY_FILE: &str = "audit_kpi_summary.csv";
pub const MARKETING_ONLY_ROUTES_FILE: &str = "exceptions_routes_marketing_only.csv";
pub const MARKETING_ONLY_AIRPORTS_FILE: &str = "exceptions_airports_marketing_only.csv";
pub const OVERCOUNTING_FLAGS_FILE: &str = "exceptions_overcounting_flags.csv";
pub const FINDINGS_TEXT_FILE: &str = "audit_findings_for_report.txt";
pub const FINDINGS_MARKDOWN_FILE: &str = "audit_findings_for_report.md";

/// Output file names, in write order.
pub const OUTPUT_FILES: [&str; 6] = [
    KPI_SUMMARY_FILE,
    MARKETING_ONLY_ROUTES_FILE,
    MARKETING_ONLY_AIRPORTS_FILE,
    OVERCOUNTING_FLAGS_FILE,
    FINDINGS_TEXT_FILE,
    FINDINGS_MARKDOWN_FILE,
];

const AIRPORT_COLUMN: &str = "AIRPORT_ID_only_in_marketing";
const STAGING_PREFIX: &str = ".route-audit-staging";
const BACKUP_DIR: &str = "previous";

/// One fully rendered output file.
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    pub file_name: &'static str,
    pub contents: Vec<u8>,
}

/// All six outputs of a run, rendered and ready to write.
#[derive(Debug, Clone)]
pub struct AuditOutputs {
    files: Vec<RenderedOutput>,
}

impl AuditOutputs {
    /// Render every output in memory.
    pub fn render(
        profile: &ProfileSummary,
        recon: &Reconciliation,
        findings: &AuditFindings,
    ) -> Result<Self> {
        let files = vec![
            RenderedOutput {
                file_name: KPI_SUMMARY_FILE,
                contents: csv_bytes(&mut summary_frame(profile)?).context("Rendering KPI summary")?,
            },
            RenderedOutput {
                file_name: MARKETING_ONLY_ROUTES_FILE,
                contents: csv_bytes(&mut routes_frame(&recon.marketing_only_routes)?)
                    .context("Rendering marketing-only routes")?,
            },
            RenderedOutput {
                file_name: MARKETING_ONLY_AIRPORTS_FILE,
                contents: csv_bytes(&mut airports_frame(&recon.airports_only_in_marketing)?)
                    .context("Rendering marketing-only airports")?,
            },
            RenderedOutput {
                file_name: OVERCOUNTING_FLAGS_FILE,
                contents: csv_bytes(&mut flags_frame(&recon.flags)?)
                    .context("Rendering overcounting flags")?,
            },
            RenderedOutput {
                file_name: FINDINGS_TEXT_FILE,
                contents: render_text(findings).into_bytes(),
            },
            RenderedOutput {
                file_name: FINDINGS_MARKDOWN_FILE,
                contents: render_markdown(findings).into_bytes(),
            },
        ];

        Ok(Self { files })
    }

    pub fn files(&self) -> &[RenderedOutput] {
        &self.files
    }

    /// Rendered contents of one output.
    pub fn get(&self, file_name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| f.contents.as_slice())
    }
}

/// One-row KPI summary in the fixed column order.
pub fn summary_frame(profile: &ProfileSummary) -> PolarsResult<DataFrame> {
    let rep = &profile.reporting;
    let mkt = &profile.marketing;
    df!(
        "reporting_rows" => [rep.rows as u64],
        "marketing_rows" => [mkt.rows as u64],
        "reporting_unique_routes" => [rep.unique_routes as u64],
        "marketing_unique_routes" => [mkt.unique_routes as u64],
        "reporting_unique_origin_airports" => [rep.unique_origin_airports as u64],
        "marketing_unique_origin_airports" => [mkt.unique_origin_airports as u64],
        "reporting_unique_dest_airports" => [rep.unique_dest_airports as u64],
        "marketing_unique_dest_airports" => [mkt.unique_dest_airports as u64],
        "reporting_null_cells" => [rep.null_cells as u64],
        "marketing_null_cells" => [mkt.null_cells as u64]
    )
}

pub fn routes_frame(routes: &[RouteKey]) -> PolarsResult<DataFrame> {
    let origins: Vec<i64> = routes.iter().map(|k| k.origin).collect();
    let dests: Vec<i64> = routes.iter().map(|k| k.dest).collect();
    df!(ORIGIN_COLUMN => origins, DEST_COLUMN => dests)
}

pub fn airports_frame(airports: &[i64]) -> PolarsResult<DataFrame> {
    df!(AIRPORT_COLUMN => airports.to_vec())
}

pub fn flags_frame(flags: &[OvercountFlag]) -> PolarsResult<DataFrame> {
    df!(
        ORIGIN_COLUMN => flags.iter().map(|f| f.key.origin).collect::<Vec<i64>>(),
        DEST_COLUMN => flags.iter().map(|f| f.key.dest).collect::<Vec<i64>>(),
        "reporting_count" => flags.iter().map(|f| f.reporting_count as u64).collect::<Vec<u64>>(),
        "marketing_count" => flags.iter().map(|f| f.marketing_count as u64).collect::<Vec<u64>>(),
        "ratio_mkt_vs_rep" => flags.iter().map(|f| f.ratio).collect::<Vec<f64>>()
    )
}

fn csv_bytes(df: &mut DataFrame) -> PolarsResult<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;
    Ok(buf)
}

/// Writes rendered outputs into the output directory under a
/// [`WritePolicy`].
pub struct ReportWriter {
    output_dir: PathBuf,
    policy: WritePolicy,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, policy: WritePolicy) -> Self {
        Self {
            output_dir: output_dir.into(),
            policy,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Final paths the outputs land at, in write order.
    pub fn planned_paths(&self) -> Vec<PathBuf> {
        OUTPUT_FILES.iter().map(|name| self.output_dir.join(name)).collect()
    }

    /// Write every output. Returns the final paths in write order.
    ///
    /// The output directory must already exist.
    pub fn write(&self, outputs: &AuditOutputs) -> Result<Vec<PathBuf>> {
        if !self.output_dir.is_dir() {
            return Err(AuditError::OutputFailed {
                file: self.output_dir.display().to_string(),
                reason: "output directory does not exist".to_string(),
            });
        }

        let written = match self.policy {
            WritePolicy::AllOrNothing => self.write_all_or_nothing(outputs)?,
            WritePolicy::Incremental => self.write_incremental(outputs)?,
        };

        info!(
            "Audit outputs created under: {} ({} files)",
            self.output_dir.display(),
            written.len()
        );
        Ok(written)
    }

    fn write_incremental(&self, outputs: &AuditOutputs) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(outputs.files().len());
        for output in outputs.files() {
            let path = self.output_dir.join(output.file_name);
            fs::write(&path, &output.contents).map_err(|e| output_failed(output.file_name, e))?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Stage every file in a hidden directory, then rename each into place.
    /// Outputs of an earlier run are moved aside first; on failure every
    /// file moved in by this run is removed and the earlier outputs are
    /// restored.
    fn write_all_or_nothing(&self, outputs: &AuditOutputs) -> Result<Vec<PathBuf>> {
        let staging = self
            .output_dir
            .join(format!("{}-{}", STAGING_PREFIX, std::process::id()));
        fs::create_dir_all(&staging).context(format!("Creating staging directory {}", staging.display()))?;

        let result = self
            .stage(outputs, &staging)
            .and_then(|()| self.commit(outputs, &staging));

        if let Err(e) = fs::remove_dir_all(&staging) {
            warn!("Could not remove staging directory {}: {}", staging.display(), e);
        }
        result
    }

    fn stage(&self, outputs: &AuditOutputs, staging: &Path) -> Result<()> {
        for output in outputs.files() {
            fs::write(staging.join(output.file_name), &output.contents)
                .map_err(|e| output_failed(output.file_name, e))?;
        }
        debug!("Staged {} outputs in {}", outputs.files().len(), staging.display());
        Ok(())
    }

    fn commit(&self, outputs: &AuditOutputs, staging: &Path) -> Result<Vec<PathBuf>> {
        let backup_dir = staging.join(BACKUP_DIR);
        fs::create_dir(&backup_dir).context(format!("Creating backup directory {}", backup_dir.display()))?;

        let mut committed: Vec<PathBuf> = Vec::with_capacity(outputs.files().len());
        let mut backed_up: Vec<(PathBuf, PathBuf)> = Vec::new();
        for output in outputs.files() {
            let target = self.output_dir.join(output.file_name);
            let moved = Self::back_up(&target, &backup_dir.join(output.file_name), &mut backed_up)
                .and_then(|()| fs::rename(staging.join(output.file_name), &target));
            if let Err(e) = moved {
                Self::roll_back(&committed, &backed_up);
                return Err(output_failed(output.file_name, e));
            }
            committed.push(target);
        }
        Ok(committed)
    }

    /// Move an existing output out of the way, remembering where it went.
    fn back_up(
        target: &Path,
        backup: &Path,
        backed_up: &mut Vec<(PathBuf, PathBuf)>,
    ) -> std::io::Result<()> {
        if target.is_file() {
            fs::rename(target, backup)?;
            backed_up.push((backup.to_path_buf(), target.to_path_buf()));
        }
        Ok(())
    }

    fn roll_back(committed: &[PathBuf], backed_up: &[(PathBuf, PathBuf)]) {
        for path in committed {
            if let Err(e) = fs::remove_file(path) {
                warn!("Could not roll back {}: {}", path.display(), e);
            }
        }
        for (backup, target) in backed_up {
            if let Err(e) = fs::rename(backup, target) {
                warn!("Could not restore {}: {}", target.display(), e);
            }
        }
    }
}

fn output_failed(file_name: &str, err: std::io::Error) -> AuditError {
    AuditError::OutputFailed {
        file: file_name.to_string(),
        reason: err.to_string(),
    }
}
