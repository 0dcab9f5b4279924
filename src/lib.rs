//! Match each point in a query set of geographic coordinates to its nearest
//! neighbor in a reference set, using great-circle distance and a
//! latitude-sort pruned scan. One-shot batch matching; both sets live in
//! memory and nothing persists across calls.

pub mod geo;
pub mod ingest;
pub mod input;
pub mod matcher;

pub use geo::{dms_to_decimal, spherical_distance_km, Coordinate};
pub use ingest::{read_csv_coordinates, IngestOutcome};
pub use matcher::{match_pairs, match_points, PruneMode};
