use super::findings::AuditFindings;
use crate::config::AuditConfig;
use crate::types::{AuditResult, OvercountFlag, ProfileSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Machine-readable summary of one run, printed by `--json`.
///
/// Carries a generation timestamp, so it is never written alongside the
/// six deterministic outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub reporting_file: String,
    pub marketing_file: String,
    pub output_dir: String,
    pub profile: ProfileSummary,
    pub findings: AuditFindings,
    /// Every flagged route, ratio descending.
    pub flags: Vec<OvercountFlag>,
    /// Output paths, empty for a dry run.
    pub written_files: Vec<String>,
}

impl AuditReport {
    pub fn from_result(config: &AuditConfig, result: &AuditResult) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            reporting_file: config.reporting_path.display().to_string(),
            marketing_file: config.marketing_path.display().to_string(),
            output_dir: config.output_dir.display().to_string(),
            profile: result.profile,
            findings: result.findings.clone(),
            flags: result.flags.clone(),
            written_files: result
                .written_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::FlightTable;
    use crate::reconcile::{OvercountRule, Reconciliation};
    use crate::types::{RouteKey, TableKind};
    use std::path::PathBuf;

    #[test]
    fn test_report_serializes_findings_and_paths() {
        let rep = FlightTable::from_keys(TableKind::Reporting, vec![RouteKey::new(1, 2); 25]);
        let mkt = FlightTable::from_keys(TableKind::Marketing, vec![RouteKey::new(1, 2); 80]);
        let rule = OvercountRule::default();
        let recon = Reconciliation::compute(&rep, &mkt, &rule);

        let result = AuditResult {
            profile: ProfileSummary::default(),
            marketing_only_routes: Vec::new(),
            airports_only_in_marketing: Vec::new(),
            flags: recon.flags.clone(),
            findings: AuditFindings::from_reconciliation(&recon, &rule, 5),
            written_files: vec![PathBuf::from("out/audit_kpi_summary.csv")],
        };
        let config = AuditConfig::from_base_dir("data");

        let report = AuditReport::from_result(&config, &result);
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["findings"]["flagged_routes"], 1);
        assert_eq!(json["flags"][0]["marketing_count"], 80);
        assert_eq!(json["written_files"][0], "out/audit_kpi_summary.csv");
        assert!(json["generated_at"].as_str().is_some_and(|s| !s.is_empty()));
    }
}
