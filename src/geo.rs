use std::fmt;

use ordered_float::OrderedFloat;

/// Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the sphere in decimal degrees. Fields are total-ordered floats
/// so coordinates can key hash maps and sort by latitude; out-of-range values
/// are the caller's problem, not validated here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    lat: OrderedFloat<f64>,
    lon: OrderedFloat<f64>,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: OrderedFloat(lat),
            lon: OrderedFloat(lon),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat.0
    }

    pub fn lon(&self) -> f64 {
        self.lon.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat.0, self.lon.0)
    }
}

/// Great-circle distance using the spherical law of cosines.
/// Input lat/lon in degrees. Output in kilometers.
#[inline]
pub fn spherical_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = (a.lat().to_radians(), a.lon().to_radians());
    let (lat2, lon2) = (b.lat().to_radians(), b.lon().to_radians());

    // Rounding can push the argument fractionally outside [-1, 1] for
    // identical or antipodal points, where acos is undefined.
    let cos_angle = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos())
        .clamp(-1.0, 1.0);

    EARTH_RADIUS_KM * cos_angle.acos()
}

/// Convert degrees/minutes/seconds to decimal degrees. "S" and "W"
/// (case-insensitive) negate; any other direction leaves the sign alone.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, direction: &str) -> f64 {
    let dec = degrees + minutes / 60.0 + seconds / 3600.0;
    if direction.eq_ignore_ascii_case("s") || direction.eq_ignore_ascii_case("w") {
        -dec
    } else {
        dec
    }
}
