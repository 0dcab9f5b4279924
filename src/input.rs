use std::io::BufRead;

use log::warn;

use crate::geo::Coordinate;

/// Sentinel token that ends interactive coordinate entry.
const END_TOKEN: &str = "done";

/// Read "lat,lon" lines until the end token or EOF. Malformed lines are
/// skipped with a warning, mirroring how CSV ingestion treats bad rows.
pub fn read_coordinate_lines<R: BufRead>(reader: R) -> Vec<Coordinate> {
    let mut coords = Vec::new();
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("stopping interactive entry: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case(END_TOKEN) {
            break;
        }
        match parse_lat_lon(line) {
            Some(coord) => coords.push(coord),
            None => warn!("invalid line {:?}, expected e.g. 37.77,-122.42", line),
        }
    }
    coords
}

fn parse_lat_lon(line: &str) -> Option<Coordinate> {
    let (lat, lon) = line.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lon = lon.trim().parse::<f64>().ok()?;
    Some(Coordinate::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_until_end_token() {
        let input = Cursor::new("0,1\n9.5, -9.5\nDONE\n37.0,122.0\n");
        let coords = read_coordinate_lines(input);
        assert_eq!(
            coords,
            vec![Coordinate::new(0.0, 1.0), Coordinate::new(9.5, -9.5)]
        );
    }

    #[test]
    fn skips_malformed_lines() {
        let input = Cursor::new("nonsense\n1,2,3\n4.0,5.0\n");
        let coords = read_coordinate_lines(input);
        // "1,2,3" splits as lat 1, lon "2,3" which fails to parse
        assert_eq!(coords, vec![Coordinate::new(4.0, 5.0)]);
    }

    #[test]
    fn eof_terminates_without_end_token() {
        let input = Cursor::new("");
        assert!(read_coordinate_lines(input).is_empty());
    }
}
