use super::routes::RouteUniverse;
use std::collections::BTreeSet;

/// Every airport id used as origin or destination in `routes`.
pub fn airport_universe(routes: &RouteUniverse) -> BTreeSet<i64> {
    routes.iter().flat_map(|k| [k.origin, k.dest]).collect()
}

/// Airports of `source` routes that never appear in `other` routes, ascending.
pub fn airports_missing_from(source: &RouteUniverse, other: &RouteUniverse) -> Vec<i64> {
    let other_airports = airport_universe(other);
    airport_universe(source)
        .into_iter()
        .filter(|id| !other_airports.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteKey;

    fn universe(pairs: &[(i64, i64)]) -> RouteUniverse {
        let keys: Vec<RouteKey> = pairs.iter().map(|&(o, d)| RouteKey::new(o, d)).collect();
        RouteUniverse::from_keys(&keys)
    }

    #[test]
    fn test_airport_universe_unions_origins_and_dests() {
        let airports = airport_universe(&universe(&[(1, 2), (2, 3), (3, 1)]));
        assert_eq!(airports.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_airports_missing_from_is_sorted_set_difference() {
        let rep = universe(&[(10, 20), (20, 30)]);
        let mkt = universe(&[(99, 10), (20, 50), (50, 99), (30, 40)]);

        assert_eq!(airports_missing_from(&mkt, &rep), vec![40, 50, 99]);
    }

    #[test]
    fn test_airport_seen_only_as_destination_counts_as_present() {
        let rep = universe(&[(1, 7)]);
        let mkt = universe(&[(7, 1)]);
        assert!(airports_missing_from(&mkt, &rep).is_empty());
    }

    #[test]
    fn test_airports_missing_from_empty() {
        let rep = universe(&[(1, 2)]);
        assert!(airports_missing_from(&RouteUniverse::default(), &rep).is_empty());
        assert_eq!(airports_missing_from(&rep, &RouteUniverse::default()), vec![1, 2]);
    }
}
