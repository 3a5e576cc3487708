//! The audit pipeline and its builder.

use crate::config::{AuditConfig, ConfigValidationError};
use crate::error::Result;
use crate::loader::{FlightTable, load_table};
use crate::pipeline::progress::{
    AuditStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::reconcile::{ReconcileStep, Reconciliation};
use crate::reporting::{AuditFindings, AuditOutputs, ReportWriter};
use crate::types::{AuditResult, ProfileSummary, TableKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs the route audit for one [`AuditConfig`].
///
/// # Example
///
/// ```rust,ignore
/// use route_audit::{AuditConfig, AuditPipeline};
///
/// let config = AuditConfig::builder().base_dir("data").build()?;
/// std::fs::create_dir_all(&config.output_dir)?;
///
/// let result = AuditPipeline::builder().config(config).build()?.run()?;
/// println!("{} routes flagged", result.flags.len());
/// ```
pub struct AuditPipeline {
    config: AuditConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    writer: ReportWriter,
}

static_assertions::assert_impl_all!(AuditPipeline: Send, Sync);

impl AuditPipeline {
    pub fn builder() -> AuditPipelineBuilder {
        AuditPipelineBuilder::default()
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Run the full audit and write all six outputs.
    ///
    /// Nothing is written unless every computation succeeds.
    pub fn run(&self) -> Result<AuditResult> {
        match self.run_internal() {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Audit completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Audit error: {}", e);
                Err(e)
            }
        }
    }

    /// Load and profile both tables without reconciling or writing anything.
    pub fn profile(&self) -> Result<ProfileSummary> {
        let (reporting, marketing) = self.load_tables()?;
        self.report_progress(ProgressUpdate::new(AuditStage::Profiling, 0.0, "Profiling tables..."));
        Ok(DataProfiler::profile_tables(&reporting, &marketing))
    }

    /// Paths the outputs of a successful run land at.
    pub fn planned_outputs(&self) -> Vec<PathBuf> {
        self.writer.planned_paths()
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn load_tables(&self) -> Result<(FlightTable, FlightTable)> {
        self.report_progress(ProgressUpdate::new(AuditStage::Loading, 0.0, "Loading reporting table..."));
        let reporting = load_table(
            TableKind::Reporting,
            &self.config.reporting_path,
            self.config.infer_schema_length,
        )?;

        self.report_progress(ProgressUpdate::new(AuditStage::Loading, 0.5, "Loading marketing table..."));
        let marketing = load_table(
            TableKind::Marketing,
            &self.config.marketing_path,
            self.config.infer_schema_length,
        )?;

        info!(
            "Loaded {} reporting rows and {} marketing rows",
            reporting.rows, marketing.rows
        );
        Ok((reporting, marketing))
    }

    fn run_internal(&self) -> Result<AuditResult> {
        let start_time = Instant::now();
        info!("Starting route audit...");

        // Step 1: Load both extracts
        let (reporting, marketing) = self.load_tables()?;

        // Step 2: Profile
        self.report_progress(ProgressUpdate::new(AuditStage::Profiling, 0.0, "Profiling tables..."));
        let profile = DataProfiler::profile_tables(&reporting, &marketing);

        // Steps 3-5: Routes, airports, overcounting
        let rule = self.config.overcount_rule();
        let recon = Reconciliation::compute_with_progress(&reporting, &marketing, &rule, |step| {
            let (stage, message) = match step {
                ReconcileStep::Routes => (AuditStage::RouteReconciliation, "Reconciling route universes..."),
                ReconcileStep::Airports => {
                    (AuditStage::AirportReconciliation, "Reconciling airport universes...")
                }
                ReconcileStep::Overcount => (AuditStage::OvercountDetection, "Comparing per-route counts..."),
            };
            self.report_progress(ProgressUpdate::new(stage, 0.0, message));
        });
        info!(
            "Marketing-only routes: {} of {}",
            recon.marketing_only_routes.len(),
            recon.marketing_routes.len()
        );
        info!("Airports only in marketing: {}", recon.airports_only_in_marketing.len());
        info!("Overcounting flags: {}", recon.flags.len());

        // Step 6: Render everything, then write
        self.report_progress(ProgressUpdate::new(
            AuditStage::ReportGeneration,
            0.0,
            "Rendering outputs...",
        ));
        let findings = AuditFindings::from_reconciliation(&recon, &rule, self.config.sample_size);
        let outputs = AuditOutputs::render(&profile, &recon, &findings)?;

        self.report_progress(ProgressUpdate::new(
            AuditStage::ReportGeneration,
            0.5,
            "Writing outputs...",
        ));
        let written_files = self.writer.write(&outputs)?;

        info!("Audit finished in {:.2?}", start_time.elapsed());

        Ok(AuditResult {
            profile,
            marketing_only_routes: recon.marketing_only_routes,
            airports_only_in_marketing: recon.airports_only_in_marketing,
            flags: recon.flags,
            findings,
            written_files,
        })
    }
}

/// Builder for [`AuditPipeline`].
#[derive(Default)]
pub struct AuditPipelineBuilder {
    config: Option<AuditConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(AuditPipelineBuilder: Send);

impl AuditPipelineBuilder {
    pub fn config(mut self, config: AuditConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure to receive progress updates.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<AuditPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let writer = ReportWriter::new(config.output_dir.clone(), config.write_policy);

        Ok(AuditPipeline {
            config,
            progress_reporter: self.progress_reporter,
            writer,
        })
    }
}
