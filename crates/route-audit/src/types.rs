use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::reporting::AuditFindings;

/// Column holding the origin airport id in both extracts.
pub const ORIGIN_COLUMN: &str = "ORIGIN_AIRPORT_ID";
/// Column holding the destination airport id in both extracts.
pub const DEST_COLUMN: &str = "DEST_AIRPORT_ID";

/// Which of the two extracts a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// The operational on-time reporting view.
    Reporting,
    /// The marketing-carrier view.
    Marketing,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reporting => "reporting",
            Self::Marketing => "marketing",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route: the (origin airport, destination airport) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey {
    pub origin: i64,
    pub dest: i64,
}

impl RouteKey {
    pub fn new(origin: i64, dest: i64) -> Self {
        Self { origin, dest }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ORIGIN={}, DEST={}", self.origin, self.dest)
    }
}

// ============================================================================
// Profiling
// ============================================================================

/// Basic profile of one extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableProfile {
    pub rows: usize,
    pub unique_routes: usize,
    pub unique_origin_airports: usize,
    pub unique_dest_airports: usize,
    pub null_cells: usize,
}

/// Side-by-side profile of both extracts; one row of `audit_kpi_summary.csv`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub reporting: TableProfile,
    pub marketing: TableProfile,
}

// ============================================================================
// Overcounting
// ============================================================================

/// One row of the outer join of both count tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteCount {
    pub key: RouteKey,
    pub reporting_count: usize,
    pub marketing_count: usize,
    /// `marketing_count / reporting_count`; `None` when the route has no
    /// reporting records.
    pub ratio: Option<f64>,
}

/// A route whose marketing count is disproportionately larger than its
/// reporting count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OvercountFlag {
    pub key: RouteKey,
    pub reporting_count: usize,
    pub marketing_count: usize,
    pub ratio: f64,
}

impl fmt::Display for OvercountFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | rep={}, mkt={}, ratio={:.2}",
            self.key, self.reporting_count, self.marketing_count, self.ratio
        )
    }
}

// ============================================================================
// Pipeline Result
// ============================================================================

/// Everything an audit run computed, plus the files it wrote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub profile: ProfileSummary,
    /// Marketing routes absent from reporting, in marketing first-appearance order.
    pub marketing_only_routes: Vec<RouteKey>,
    /// Airport ids present only in marketing routes, ascending.
    pub airports_only_in_marketing: Vec<i64>,
    /// Flagged routes, ratio descending.
    pub flags: Vec<OvercountFlag>,
    pub findings: AuditFindings,
    /// Paths of the outputs written by this run, in write order.
    pub written_files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_key_display() {
        assert_eq!(RouteKey::new(10397, 12478).to_string(), "ORIGIN=10397, DEST=12478");
    }

    #[test]
    fn test_route_key_ordering() {
        let mut keys = vec![RouteKey::new(3, 1), RouteKey::new(1, 9), RouteKey::new(1, 2)];
        keys.sort();
        assert_eq!(
            keys,
            vec![RouteKey::new(1, 2), RouteKey::new(1, 9), RouteKey::new(3, 1)]
        );
    }

    #[test]
    fn test_flag_display() {
        let flag = OvercountFlag {
            key: RouteKey::new(1, 2),
            reporting_count: 25,
            marketing_count: 80,
            ratio: 3.2,
        };
        assert_eq!(flag.to_string(), "ORIGIN=1, DEST=2 | rep=25, mkt=80, ratio=3.20");
    }

    #[test]
    fn test_table_kind_serialization() {
        let json = serde_json::to_string(&TableKind::Marketing).unwrap();
        assert_eq!(json, "\"marketing\"");
    }
}
