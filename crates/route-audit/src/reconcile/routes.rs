//! Route universes and their differences.

use crate::types::RouteKey;
use crate::utils::fraction;
use std::collections::HashSet;

/// The distinct routes of one table, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct RouteUniverse {
    routes: Vec<RouteKey>,
    index: HashSet<RouteKey>,
}

impl RouteUniverse {
    /// Deduplicate `keys`, keeping the first occurrence of each route.
    pub fn from_keys(keys: &[RouteKey]) -> Self {
        let mut universe = Self::default();
        for key in keys {
            if universe.index.insert(*key) {
                universe.routes.push(*key);
            }
        }
        universe
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn contains(&self, key: &RouteKey) -> bool {
        self.index.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteKey> {
        self.routes.iter()
    }

    pub fn as_slice(&self) -> &[RouteKey] {
        &self.routes
    }
}

/// Routes of `source` that `other` never mentions (left anti-join), in
/// `source` order.
pub fn routes_missing_from(source: &RouteUniverse, other: &RouteUniverse) -> Vec<RouteKey> {
    source.iter().filter(|k| !other.contains(k)).copied().collect()
}

/// Number of routes present in both universes.
pub fn intersection_count(a: &RouteUniverse, b: &RouteUniverse) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|k| large.contains(k)).count()
}

/// Share of `target` routes also present in `covering`. Zero for an empty
/// target.
pub fn coverage(covering: &RouteUniverse, target: &RouteUniverse) -> f64 {
    fraction(intersection_count(covering, target), target.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(i64, i64)]) -> Vec<RouteKey> {
        pairs.iter().map(|&(o, d)| RouteKey::new(o, d)).collect()
    }

    #[test]
    fn test_universe_dedups_and_keeps_first_appearance() {
        let universe = RouteUniverse::from_keys(&keys(&[(5, 6), (1, 2), (5, 6), (3, 4), (1, 2)]));
        assert_eq!(universe.len(), 3);
        assert_eq!(universe.as_slice(), keys(&[(5, 6), (1, 2), (3, 4)]).as_slice());
    }

    #[test]
    fn test_universe_size_independent_of_order_and_duplicates() {
        let a = RouteUniverse::from_keys(&keys(&[(1, 2), (3, 4), (1, 2), (1, 2)]));
        let b = RouteUniverse::from_keys(&keys(&[(3, 4), (3, 4), (1, 2)]));
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_reverse_direction_is_a_different_route() {
        let universe = RouteUniverse::from_keys(&keys(&[(1, 2), (2, 1)]));
        assert_eq!(universe.len(), 2);
        assert!(universe.contains(&RouteKey::new(2, 1)));
    }

    #[test]
    fn test_routes_missing_from() {
        let rep = RouteUniverse::from_keys(&keys(&[(1, 2), (3, 4)]));
        let mkt = RouteUniverse::from_keys(&keys(&[(7, 8), (1, 2), (5, 6), (3, 4)]));

        let only = routes_missing_from(&mkt, &rep);
        assert_eq!(only, keys(&[(7, 8), (5, 6)]));
        for key in &only {
            assert!(mkt.contains(key));
            assert!(!rep.contains(key));
        }
    }

    #[test]
    fn test_routes_missing_from_empty_source() {
        let rep = RouteUniverse::from_keys(&keys(&[(1, 2)]));
        let mkt = RouteUniverse::default();
        assert!(routes_missing_from(&mkt, &rep).is_empty());
    }

    #[test]
    fn test_missing_plus_intersection_is_whole_universe() {
        let rep = RouteUniverse::from_keys(&keys(&[(1, 2), (3, 4), (9, 9)]));
        let mkt = RouteUniverse::from_keys(&keys(&[(1, 2), (5, 6), (3, 4), (7, 7)]));
        assert_eq!(
            routes_missing_from(&mkt, &rep).len() + intersection_count(&rep, &mkt),
            mkt.len()
        );
    }

    #[test]
    fn test_coverage() {
        let rep = RouteUniverse::from_keys(&keys(&[(1, 2), (3, 4)]));
        let mkt = RouteUniverse::from_keys(&keys(&[(1, 2), (3, 4), (5, 6), (7, 8)]));
        assert_eq!(coverage(&rep, &mkt), 0.5);

        let subset = RouteUniverse::from_keys(&keys(&[(3, 4)]));
        assert_eq!(coverage(&rep, &subset), 1.0);

        assert_eq!(coverage(&rep, &RouteUniverse::default()), 0.0);
    }
}
