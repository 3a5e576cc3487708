//! Reconciliation of the reporting and marketing extracts.
//!
//! Three comparisons, all computed from the loaded tables with plain maps
//! and sets:
//! - route universes: marketing routes the reporting view never mentions
//! - airport universes: airports seen only in marketing routes
//! - overcounting: routes where marketing records far outnumber reporting ones

mod airports;
mod overcount;
mod routes;

pub use airports::{airport_universe, airports_missing_from};
pub use overcount::{OvercountRule, flag_overcounting, join_counts, route_counts};
pub use routes::{RouteUniverse, coverage, intersection_count, routes_missing_from};

use crate::loader::FlightTable;
use crate::types::{OvercountFlag, RouteKey};

/// Phases of a reconciliation, announced as each one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStep {
    Routes,
    Airports,
    Overcount,
}

/// Every derived set of one audit run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub reporting_routes: RouteUniverse,
    pub marketing_routes: RouteUniverse,
    /// Marketing routes absent from reporting, marketing order.
    pub marketing_only_routes: Vec<RouteKey>,
    /// Airports of marketing routes absent from reporting routes, ascending.
    pub airports_only_in_marketing: Vec<i64>,
    /// Flagged routes, ratio descending.
    pub flags: Vec<OvercountFlag>,
}

impl Reconciliation {
    /// Compare the two tables.
    pub fn compute(reporting: &FlightTable, marketing: &FlightTable, rule: &OvercountRule) -> Self {
        Self::compute_with_progress(reporting, marketing, rule, |_| {})
    }

    /// Compare the two tables, calling `on_step` as each phase starts.
    pub fn compute_with_progress(
        reporting: &FlightTable,
        marketing: &FlightTable,
        rule: &OvercountRule,
        mut on_step: impl FnMut(ReconcileStep),
    ) -> Self {
        on_step(ReconcileStep::Routes);
        let reporting_routes = RouteUniverse::from_keys(&reporting.keys);
        let marketing_routes = RouteUniverse::from_keys(&marketing.keys);
        let marketing_only_routes = routes_missing_from(&marketing_routes, &reporting_routes);

        on_step(ReconcileStep::Airports);
        let airports_only_in_marketing = airports_missing_from(&marketing_routes, &reporting_routes);

        on_step(ReconcileStep::Overcount);
        let counts = join_counts(&route_counts(&reporting.keys), &route_counts(&marketing.keys));
        let flags = flag_overcounting(&counts, rule);

        Self {
            reporting_routes,
            marketing_routes,
            marketing_only_routes,
            airports_only_in_marketing,
            flags,
        }
    }

    /// Routes present in both universes.
    pub fn intersection_count(&self) -> usize {
        intersection_count(&self.reporting_routes, &self.marketing_routes)
    }

    /// Share of the marketing universe also present in reporting.
    pub fn coverage(&self) -> f64 {
        coverage(&self.reporting_routes, &self.marketing_routes)
    }
}
