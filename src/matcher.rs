use fnv::FnvHashMap;
use ordered_float::OrderedFloat;

use crate::geo::{spherical_distance_km, Coordinate};

/// Approximate kilometers per degree of latitude, used to turn the best
/// distance so far into a latitude band worth scanning.
const KM_PER_DEG_LAT: f64 = 111.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PruneMode {
    /// Scan the latitude-sorted references from the lowest latitude upward and
    /// stop at the first candidate outside the current threshold band.
    Ascending,
    /// Start at the query's position in the sorted order and expand outward,
    /// pruning each direction independently.
    Bidirectional,
}

impl PruneMode {
    pub fn from(string: &str) -> Self {
        match string {
            "ascending" => PruneMode::Ascending,
            "bidirectional" => PruneMode::Bidirectional,
            _ => panic!("Prune mode not found for input string: {}, possible options are: (\"ascending\", \"bidirectional\")", string),
        }
    }

    fn nearest(&self, query: Coordinate, sorted: &[Coordinate]) -> Option<Coordinate> {
        match self {
            PruneMode::Ascending => nearest_ascending(query, sorted),
            PruneMode::Bidirectional => nearest_bidirectional(query, sorted),
        }
    }
}

/// Match every query point to its nearest reference point, preserving input
/// order. Duplicate queries each get their own entry. `None` means the
/// reference set was empty; matching never fails.
pub fn match_pairs(
    queries: &[Coordinate],
    references: &[Coordinate],
    mode: PruneMode,
) -> Vec<(Coordinate, Option<Coordinate>)> {
    if references.is_empty() {
        return queries.iter().map(|&q| (q, None)).collect();
    }

    // Local working copy; the caller's slice is left untouched. Stable sort
    // keeps the input order among equal latitudes, which pins tie-breaks.
    let mut sorted = references.to_vec();
    sorted.sort_by_key(|c| OrderedFloat(c.lat()));

    queries
        .iter()
        .map(|&q| (q, mode.nearest(q, &sorted)))
        .collect()
}

/// Map form of [`match_pairs`]. Later duplicate queries overwrite earlier
/// ones; use `match_pairs` when duplicates must keep distinct results.
pub fn match_points(
    queries: &[Coordinate],
    references: &[Coordinate],
    mode: PruneMode,
) -> FnvHashMap<Coordinate, Option<Coordinate>> {
    match_pairs(queries, references, mode).into_iter().collect()
}

fn nearest_ascending(query: Coordinate, sorted: &[Coordinate]) -> Option<Coordinate> {
    let mut best_dist = f64::INFINITY;
    let mut best = None;
    let mut thresh_deg = best_dist / KM_PER_DEG_LAT;

    for &cand in sorted {
        if (cand.lat() - query.lat()).abs() > thresh_deg {
            // Every remaining candidate is even further away in latitude.
            break;
        }
        let d = spherical_distance_km(query, cand);
        if d < best_dist {
            best_dist = d;
            best = Some(cand);
            thresh_deg = best_dist / KM_PER_DEG_LAT;
        }
    }
    best
}

fn nearest_bidirectional(query: Coordinate, sorted: &[Coordinate]) -> Option<Coordinate> {
    let mut best_dist = f64::INFINITY;
    let mut best = None;
    let mut thresh_deg = best_dist / KM_PER_DEG_LAT;

    // Cursors expand outward from the query's insertion point; sorted[below-1]
    // and sorted[above] are the next candidates on each side.
    let split = sorted.partition_point(|c| c.lat() < query.lat());
    let mut below = split;
    let mut above = split;

    loop {
        let below_delta = below
            .checked_sub(1)
            .map(|i| (query.lat() - sorted[i].lat()).abs());
        let above_delta = sorted
            .get(above)
            .map(|c| (c.lat() - query.lat()).abs());

        // Visit the side closer in latitude first, lower side on equal deltas,
        // so the strict-< tie-break stays deterministic.
        let take_below = match (below_delta, above_delta) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(b), Some(a)) => b <= a,
        };

        let cand = if take_below {
            below -= 1;
            sorted[below]
        } else {
            let c = sorted[above];
            above += 1;
            c
        };

        if (cand.lat() - query.lat()).abs() > thresh_deg {
            // The rest of this side is even further away in latitude.
            if take_below {
                below = 0;
            } else {
                above = sorted.len();
            }
            continue;
        }
        let d = spherical_distance_km(query, cand);
        if d < best_dist {
            best_dist = d;
            best = Some(cand);
            thresh_deg = best_dist / KM_PER_DEG_LAT;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pairs: &[(f64, f64)]) -> Vec<Coordinate> {
        pairs.iter().map(|&(lat, lon)| Coordinate::new(lat, lon)).collect()
    }

    #[test]
    fn empty_queries_give_empty_result() {
        let refs = coords(&[(0.0, 1.0), (9.0, 9.0)]);
        assert!(match_points(&[], &refs, PruneMode::Ascending).is_empty());
        assert!(match_pairs(&[], &refs, PruneMode::Ascending).is_empty());
    }

    #[test]
    fn empty_references_map_to_sentinel() {
        let queries = coords(&[(0.0, 0.0), (10.0, 10.0)]);
        let result = match_points(&queries, &[], PruneMode::Ascending);
        assert_eq!(result.len(), 2);
        assert_eq!(result[&queries[0]], None);
        assert_eq!(result[&queries[1]], None);
    }

    #[test]
    fn matches_each_query_to_closest_reference() {
        let queries = coords(&[(0.0, 0.0), (10.0, 10.0)]);
        let refs = coords(&[(0.0, 1.0), (9.0, 9.0), (20.0, 20.0)]);
        for mode in [PruneMode::Ascending, PruneMode::Bidirectional] {
            let result = match_points(&queries, &refs, mode);
            assert_eq!(result[&queries[0]], Some(Coordinate::new(0.0, 1.0)));
            assert_eq!(result[&queries[1]], Some(Coordinate::new(9.0, 9.0)));
        }
    }

    #[test]
    fn references_are_not_mutated_and_calls_are_idempotent() {
        let queries = coords(&[(5.0, 5.0), (-30.0, 100.0)]);
        let refs = coords(&[(40.0, -70.0), (-30.0, 99.0), (4.0, 5.0), (6.0, 6.0)]);
        let refs_before = refs.clone();
        let first = match_pairs(&queries, &refs, PruneMode::Ascending);
        let second = match_pairs(&queries, &refs, PruneMode::Ascending);
        assert_eq!(first, second);
        assert_eq!(refs, refs_before);
    }

    #[test]
    fn modes_agree_when_no_ties() {
        let queries = coords(&[(0.0, 0.0), (10.0, 10.0), (-45.0, 170.0), (60.0, -120.0)]);
        let refs = coords(&[
            (0.0, 1.0),
            (9.0, 9.0),
            (20.0, 20.0),
            (-44.0, 168.0),
            (61.0, -121.0),
            (-90.0, 0.0),
        ]);
        assert_eq!(
            match_pairs(&queries, &refs, PruneMode::Ascending),
            match_pairs(&queries, &refs, PruneMode::Bidirectional)
        );
    }

    #[test]
    fn ascending_tie_break_takes_first_in_latitude_order() {
        // Both candidates are one degree of latitude from the query along the
        // same meridian, so they are exactly equidistant.
        let queries = coords(&[(0.0, 0.0)]);
        let refs = coords(&[(1.0, 0.0), (-1.0, 0.0)]);
        let result = match_points(&queries, &refs, PruneMode::Ascending);
        assert_eq!(result[&queries[0]], Some(Coordinate::new(-1.0, 0.0)));
    }

    #[test]
    fn bidirectional_tie_break_takes_lower_side_on_equal_deltas() {
        let queries = coords(&[(0.0, 0.0)]);
        let refs = coords(&[(1.0, 0.0), (-1.0, 0.0)]);
        let result = match_points(&queries, &refs, PruneMode::Bidirectional);
        assert_eq!(result[&queries[0]], Some(Coordinate::new(-1.0, 0.0)));
    }

    #[test]
    fn duplicate_queries_overwrite_in_map_but_not_in_pairs() {
        let queries = coords(&[(0.0, 0.0), (0.0, 0.0)]);
        let refs = coords(&[(0.0, 1.0)]);
        let pairs = match_pairs(&queries, &refs, PruneMode::Ascending);
        assert_eq!(pairs.len(), 2);
        let map = match_points(&queries, &refs, PruneMode::Ascending);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&queries[0]], Some(Coordinate::new(0.0, 1.0)));
    }

    #[test]
    fn single_reference_always_wins() {
        let queries = coords(&[(89.0, 0.0), (-89.0, 180.0), (0.0, 0.0)]);
        let refs = coords(&[(12.3, -45.6)]);
        for mode in [PruneMode::Ascending, PruneMode::Bidirectional] {
            for (_, matched) in match_pairs(&queries, &refs, mode) {
                assert_eq!(matched, Some(Coordinate::new(12.3, -45.6)));
            }
        }
    }

    #[test]
    #[should_panic(expected = "Prune mode not found")]
    fn unknown_mode_string_panics() {
        PruneMode::from("kdtree");
    }

    #[test]
    fn mode_strings_parse() {
        assert_eq!(PruneMode::from("ascending"), PruneMode::Ascending);
        assert_eq!(PruneMode::from("bidirectional"), PruneMode::Bidirectional);
    }
}
