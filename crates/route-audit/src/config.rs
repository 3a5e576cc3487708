//! Configuration types for the route audit pipeline.
//!
//! The pipeline never parses arguments or environment variables itself; it
//! receives a fully resolved [`AuditConfig`]. Use the builder for
//! programmatic setup.

use crate::reconcile::OvercountRule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name of the reporting table inside a base directory.
pub const DEFAULT_REPORTING_FILE: &str = "T_ONTIME_REPORTING.csv";
/// Default file name of the marketing table inside a base directory.
pub const DEFAULT_MARKETING_FILE: &str = "T_ONTIME_MARKETING.csv";
/// Default output sub-directory inside a base directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Minimum reporting count for a route to be eligible for an overcounting flag.
pub const DEFAULT_MIN_REPORTING_COUNT: usize = 20;
/// Minimum marketing/reporting ratio for a route to be flagged.
pub const DEFAULT_MIN_RATIO: f64 = 3.0;
/// Number of sample rows quoted in the narrative.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;
/// Rows scanned for schema inference on the first load attempt.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// How the output files are committed to the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WritePolicy {
    /// Stage every file, then move them into place. A failure leaves no
    /// file from this run behind.
    #[default]
    AllOrNothing,
    /// Write each file directly, in order. A failure leaves the files
    /// written before it on disk.
    Incremental,
}

/// Configuration for an audit run.
///
/// Use [`AuditConfig::builder()`] to create a new configuration.
///
/// # Example
///
/// ```rust,ignore
/// use route_audit::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .reporting_path("data/T_ONTIME_REPORTING.csv")
///     .marketing_path("data/T_ONTIME_MARKETING.csv")
///     .output_dir("data/output")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Path to the operational reporting table.
    pub reporting_path: PathBuf,

    /// Path to the marketing table.
    pub marketing_path: PathBuf,

    /// Directory receiving the six audit outputs. Must exist before the
    /// pipeline writes.
    pub output_dir: PathBuf,

    /// Routes with fewer reporting records are never flagged.
    /// Default: 20
    pub min_reporting_count: usize,

    /// Routes are flagged when marketing/reporting is at least this value.
    /// Default: 3.0
    pub min_ratio: f64,

    /// Number of sample routes and flags quoted in the narrative.
    /// Default: 5
    pub sample_size: usize,

    /// Rows used for schema inference on the first load attempt.
    /// Default: 10 000
    pub infer_schema_length: usize,

    /// Default: AllOrNothing
    pub write_policy: WritePolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::from_base_dir(".")
    }
}

impl AuditConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Configuration rooted at a single base directory holding both extracts,
    /// with outputs under `<base>/output`.
    pub fn from_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            reporting_path: base_dir.join(DEFAULT_REPORTING_FILE),
            marketing_path: base_dir.join(DEFAULT_MARKETING_FILE),
            output_dir: base_dir.join(DEFAULT_OUTPUT_DIR),
            min_reporting_count: DEFAULT_MIN_REPORTING_COUNT,
            min_ratio: DEFAULT_MIN_RATIO,
            sample_size: DEFAULT_SAMPLE_SIZE,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
            write_policy: WritePolicy::default(),
        }
    }

    /// Flagging thresholds of this configuration.
    pub fn overcount_rule(&self) -> OvercountRule {
        OvercountRule {
            min_reporting_count: self.min_reporting_count,
            min_ratio: self.min_ratio,
        }
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, path) in [
            ("reporting_path", &self.reporting_path),
            ("marketing_path", &self.marketing_path),
            ("output_dir", &self.output_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath(field.to_string()));
            }
        }

        if !self.min_ratio.is_finite() || self.min_ratio <= 0.0 {
            return Err(ConfigValidationError::InvalidRatio(self.min_ratio));
        }

        if self.sample_size == 0 {
            return Err(ConfigValidationError::InvalidSampleSize(self.sample_size));
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::InvalidInferSchemaLength);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Path for '{0}' must not be empty")]
    EmptyPath(String),

    #[error("Invalid minimum ratio: {0} (must be a finite number above 0.0)")]
    InvalidRatio(f64),

    #[error("Invalid sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),

    #[error("Schema inference length must be at least 1")]
    InvalidInferSchemaLength,
}

/// Builder for [`AuditConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    base_dir: Option<PathBuf>,
    reporting_path: Option<PathBuf>,
    marketing_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    min_reporting_count: Option<usize>,
    min_ratio: Option<f64>,
    sample_size: Option<usize>,
    infer_schema_length: Option<usize>,
    write_policy: Option<WritePolicy>,
}

impl AuditConfigBuilder {
    /// Set the base directory used for any path not set explicitly.
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(path.into());
        self
    }

    /// Set the reporting table path.
    pub fn reporting_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.reporting_path = Some(path.into());
        self
    }

    /// Set the marketing table path.
    pub fn marketing_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.marketing_path = Some(path.into());
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the reporting-count floor for overcounting flags.
    pub fn min_reporting_count(mut self, count: usize) -> Self {
        self.min_reporting_count = Some(count);
        self
    }

    /// Set the marketing/reporting ratio threshold for overcounting flags.
    pub fn min_ratio(mut self, ratio: f64) -> Self {
        self.min_ratio = Some(ratio);
        self
    }

    /// Set how many samples the narrative quotes.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Set the schema inference window for the first load attempt.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the output write policy.
    pub fn write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AuditConfig` or an error if validation fails.
    pub fn build(self) -> Result<AuditConfig, ConfigValidationError> {
        let defaults = AuditConfig::from_base_dir(self.base_dir.unwrap_or_else(|| PathBuf::from(".")));

        let config = AuditConfig {
            reporting_path: self.reporting_path.unwrap_or(defaults.reporting_path),
            marketing_path: self.marketing_path.unwrap_or(defaults.marketing_path),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            min_reporting_count: self.min_reporting_count.unwrap_or(DEFAULT_MIN_REPORTING_COUNT),
            min_ratio: self.min_ratio.unwrap_or(DEFAULT_MIN_RATIO),
            sample_size: self.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE),
            infer_schema_length: self.infer_schema_length.unwrap_or(DEFAULT_INFER_SCHEMA_LENGTH),
            write_policy: self.write_policy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.min_reporting_count, 20);
        assert_eq!(config.min_ratio, 3.0);
        assert_eq!(config.sample_size, 5);
        assert_eq!(config.write_policy, WritePolicy::AllOrNothing);
        assert!(config.reporting_path.ends_with(DEFAULT_REPORTING_FILE));
    }

    #[test]
    fn test_builder_base_dir() {
        let config = AuditConfig::builder().base_dir("/data/flights").build().unwrap();
        assert_eq!(
            config.reporting_path,
            PathBuf::from("/data/flights/T_ONTIME_REPORTING.csv")
        );
        assert_eq!(
            config.marketing_path,
            PathBuf::from("/data/flights/T_ONTIME_MARKETING.csv")
        );
        assert_eq!(config.output_dir, PathBuf::from("/data/flights/output"));
    }

    #[test]
    fn test_builder_explicit_paths_override_base_dir() {
        let config = AuditConfig::builder()
            .base_dir("/data/flights")
            .marketing_path("/elsewhere/mkt.csv")
            .output_dir("/tmp/audit")
            .min_reporting_count(50)
            .min_ratio(2.5)
            .write_policy(WritePolicy::Incremental)
            .build()
            .unwrap();

        assert_eq!(
            config.reporting_path,
            PathBuf::from("/data/flights/T_ONTIME_REPORTING.csv")
        );
        assert_eq!(config.marketing_path, PathBuf::from("/elsewhere/mkt.csv"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/audit"));
        assert_eq!(config.min_reporting_count, 50);
        assert_eq!(config.min_ratio, 2.5);
        assert_eq!(config.write_policy, WritePolicy::Incremental);
    }

    #[test]
    fn test_validation_invalid_ratio() {
        let result = AuditConfig::builder().min_ratio(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidRatio(_)
        ));

        let result = AuditConfig::builder().min_ratio(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_sample_size() {
        let result = AuditConfig::builder().sample_size(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSampleSize(0)
        ));
    }

    #[test]
    fn test_validation_empty_path() {
        let result = AuditConfig::builder().output_dir("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyPath(field) if field == "output_dir"
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "reporting_path": "rep.csv",
            "marketing_path": "mkt.csv",
            "output_dir": "out",
            "min_reporting_count": 30,
            "min_ratio": 4.0,
            "sample_size": 10,
            "infer_schema_length": 500,
            "write_policy": "Incremental"
        }"#;

        let config: AuditConfig = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(config.reporting_path, PathBuf::from("rep.csv"));
        assert_eq!(config.min_reporting_count, 30);
        assert_eq!(config.min_ratio, 4.0);
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.write_policy, WritePolicy::Incremental);
        assert!(config.validate().is_ok());
    }
}
