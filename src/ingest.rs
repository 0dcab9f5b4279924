use csv::ReaderBuilder;
use log::warn;

use crate::geo::Coordinate;

/// Outcome of reading a coordinate CSV. An absent or unreadable source is a
/// distinct case, not an error; malformed rows are skipped and counted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Loaded {
        coords: Vec<Coordinate>,
        skipped_rows: usize,
    },
    SourceMissing,
}

impl IngestOutcome {
    /// Collapse to the plain coordinate sequence; a missing source is empty.
    pub fn into_coords(self) -> Vec<Coordinate> {
        match self {
            IngestOutcome::Loaded { coords, .. } => coords,
            IngestOutcome::SourceMissing => Vec::new(),
        }
    }

    pub fn skipped_rows(&self) -> usize {
        match self {
            IngestOutcome::Loaded { skipped_rows, .. } => *skipped_rows,
            IngestOutcome::SourceMissing => 0,
        }
    }
}

/// Read (lat, lon) pairs from a CSV with named header columns. Rows whose
/// lat/lon cell is missing or non-numeric are skipped, never fatal.
pub fn read_csv_coordinates(path: &str, lat_field: &str, lon_field: &str) -> IngestOutcome {
    let mut rdr = match ReaderBuilder::new().has_headers(true).from_path(path) {
        Ok(rdr) => rdr,
        Err(e) => {
            warn!("could not open {}: {}", path, e);
            return IngestOutcome::SourceMissing;
        }
    };

    let (lat_idx, lon_idx) = match rdr.headers() {
        Ok(headers) => (
            headers.iter().position(|h| h == lat_field),
            headers.iter().position(|h| h == lon_field),
        ),
        Err(e) => {
            warn!("could not read headers of {}: {}", path, e);
            return IngestOutcome::SourceMissing;
        }
    };

    let mut coords = Vec::new();
    let mut skipped_rows = 0;
    for (row, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: skipping row {}: {}", path, row, e);
                skipped_rows += 1;
                continue;
            }
        };
        let parsed = lat_idx
            .zip(lon_idx)
            .and_then(|(i, j)| record.get(i).zip(record.get(j)))
            .and_then(|(lat, lon)| {
                lat.trim()
                    .parse::<f64>()
                    .ok()
                    .zip(lon.trim().parse::<f64>().ok())
            });
        match parsed {
            Some((lat, lon)) => coords.push(Coordinate::new(lat, lon)),
            None => {
                warn!("{}: skipping row {}: missing or non-numeric lat/lon", path, row);
                skipped_rows += 1;
            }
        }
    }

    IngestOutcome::Loaded {
        coords,
        skipped_rows,
    }
}
