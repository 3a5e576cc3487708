//! Basic profiling of the two extracts.
//!
//! Row counts, distinct route/origin/destination counts and null cells for
//! each table. Empty tables profile to all zeros.

use crate::loader::FlightTable;
use crate::reconcile::RouteUniverse;
use crate::types::{ProfileSummary, TableProfile};
use tracing::debug;

/// Profiler for the audit's input tables.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile one table.
    ///
    /// Distinct routes are taken over rows with a complete route key;
    /// distinct origins and destinations over each column's non-null values.
    pub fn profile_table(table: &FlightTable) -> TableProfile {
        let routes = RouteUniverse::from_keys(&table.keys);

        let profile = TableProfile {
            rows: table.rows,
            unique_routes: routes.len(),
            unique_origin_airports: table.distinct_origins,
            unique_dest_airports: table.distinct_dests,
            null_cells: table.null_cells,
        };

        debug!("{} profile: {:?}", table.kind, profile);
        profile
    }

    /// Profile both tables side by side.
    pub fn profile_tables(reporting: &FlightTable, marketing: &FlightTable) -> ProfileSummary {
        ProfileSummary {
            reporting: Self::profile_table(reporting),
            marketing: Self::profile_table(marketing),
        }
    }
}
