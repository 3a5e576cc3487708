//! Overcounting detection: routes whose marketing record count is far above
//! the operational reporting count.

use crate::types::{OvercountFlag, RouteCount, RouteKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Thresholds a route must meet to be flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OvercountRule {
    /// Reporting records needed before a ratio is considered meaningful.
    pub min_reporting_count: usize,
    /// Marketing/reporting ratio at or above which a route is flagged.
    pub min_ratio: f64,
}

impl Default for OvercountRule {
    fn default() -> Self {
        Self {
            min_reporting_count: crate::config::DEFAULT_MIN_REPORTING_COUNT,
            min_ratio: crate::config::DEFAULT_MIN_RATIO,
        }
    }
}

impl OvercountRule {
    /// The flag for `count`, if it passes both thresholds. Routes without
    /// reporting records have no ratio and never pass.
    pub fn evaluate(&self, count: &RouteCount) -> Option<OvercountFlag> {
        let ratio = count.ratio?;
        if count.reporting_count >= self.min_reporting_count && ratio >= self.min_ratio {
            Some(OvercountFlag {
                key: count.key,
                reporting_count: count.reporting_count,
                marketing_count: count.marketing_count,
                ratio,
            })
        } else {
            None
        }
    }
}

/// Number of records per route.
pub fn route_counts(keys: &[RouteKey]) -> HashMap<RouteKey, usize> {
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(*key).or_insert(0) += 1;
    }
    counts
}

/// Outer join of both count tables, routes ascending. A route missing from
/// one side counts zero there.
pub fn join_counts(
    reporting: &HashMap<RouteKey, usize>,
    marketing: &HashMap<RouteKey, usize>,
) -> Vec<RouteCount> {
    let mut joined: BTreeMap<RouteKey, (usize, usize)> = BTreeMap::new();
    for (key, count) in reporting {
        joined.entry(*key).or_default().0 = *count;
    }
    for (key, count) in marketing {
        joined.entry(*key).or_default().1 = *count;
    }

    joined
        .into_iter()
        .map(|(key, (reporting_count, marketing_count))| RouteCount {
            key,
            reporting_count,
            marketing_count,
            ratio: (reporting_count > 0).then(|| marketing_count as f64 / reporting_count as f64),
        })
        .collect()
}

/// Flagged routes, ratio descending; equal ratios keep route order.
pub fn flag_overcounting(counts: &[RouteCount], rule: &OvercountRule) -> Vec<OvercountFlag> {
    let mut flags: Vec<OvercountFlag> = counts.iter().filter_map(|c| rule.evaluate(c)).collect();
    flags.sort_by(|a, b| {
        b.ratio
            .partial_cmp(&a.ratio)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    flags
}
