use crate::reconcile::{OvercountRule, Reconciliation};
use crate::types::{OvercountFlag, RouteKey};
use crate::utils::{fraction, max_value, median};
use serde::{Deserialize, Serialize};

/// Headline numbers of an audit, as quoted in the narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFindings {
    /// Distinct routes in the reporting view.
    pub reporting_routes: usize,
    /// Distinct routes in the marketing view.
    pub marketing_routes: usize,
    /// Routes present in both views.
    pub shared_routes: usize,
    /// `shared_routes / marketing_routes`, 0.0 for an empty marketing view.
    pub coverage: f64,
    pub marketing_only_routes: usize,
    /// `marketing_only_routes / marketing_routes`, 0.0 for an empty marketing view.
    pub marketing_only_share: f64,
    pub airports_only_in_marketing: usize,
    pub flagged_routes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_ratio_median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_ratio_max: Option<f64>,
    /// Thresholds the flags were computed with.
    pub rule: OvercountRule,
    /// Maximum number of routes and flags quoted.
    pub sample_size: usize,
    /// First marketing-only routes, marketing order.
    pub sample_marketing_only: Vec<RouteKey>,
    /// Highest-ratio flags.
    pub sample_flags: Vec<OvercountFlag>,
}

impl AuditFindings {
    /// Summarise a reconciliation, quoting at most `sample_size` routes and
    /// flags.
    pub fn from_reconciliation(
        recon: &Reconciliation,
        rule: &OvercountRule,
        sample_size: usize,
    ) -> Self {
        let marketing_routes = recon.marketing_routes.len();
        let ratios: Vec<f64> = recon.flags.iter().map(|f| f.ratio).collect();

        Self {
            reporting_routes: recon.reporting_routes.len(),
            marketing_routes,
            shared_routes: recon.intersection_count(),
            coverage: recon.coverage(),
            marketing_only_routes: recon.marketing_only_routes.len(),
            marketing_only_share: fraction(recon.marketing_only_routes.len(), marketing_routes),
            airports_only_in_marketing: recon.airports_only_in_marketing.len(),
            flagged_routes: recon.flags.len(),
            flag_ratio_median: median(&ratios),
            flag_ratio_max: max_value(&ratios),
            rule: *rule,
            sample_size,
            sample_marketing_only: recon
                .marketing_only_routes
                .iter()
                .take(sample_size)
                .copied()
                .collect(),
            sample_flags: recon.flags.iter().take(sample_size).copied().collect(),
        }
    }
}
