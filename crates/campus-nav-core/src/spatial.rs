//! Spatial math for walking distances, headings and blockage tests.

use crate::models::Coordinate;

/// Mean Earth radius used by every distance calculation, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using Haversine formula.
///
/// This is the standard formula for calculating great-circle distance
/// between two points on a sphere given their latitudes and longitudes.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Haversine distance between two `{lng, lat}` coordinates.
pub fn coordinate_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_distance(a.lat, a.lng, b.lat, b.lng)
}

/// Calculate bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Initial compass bearing from point 1 to point 2 in degrees.
///
/// 0 = north, clockwise positive. Always within `[0, 360)`.
pub fn bearing_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let degrees = bearing(lat1, lon1, lat2, lon2).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_rad` - Bearing in radians (0 = north, π/2 = east)
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Check if a point is inside a polygon using ray casting.
///
/// Vertices are `{lng, lat}` pairs and the ring may be open or closed.
/// Polygons with fewer than 3 vertices contain nothing. Points exactly on an
/// edge or vertex get whatever the crossing test yields.
pub fn point_in_polygon(lng: f64, lat: f64, polygon: &[Coordinate]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    // Ray casting: count intersections with polygon edges
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let yi = polygon[i].lat;
        let xi = polygon[i].lng;
        let yj = polygon[j].lat;
        let xj = polygon[j].lng;

        if ((yi > lat) != (yj > lat)) && (lng < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Linear interpolation between two coordinates in degree space.
pub fn interpolate(start: &Coordinate, end: &Coordinate, t: f64) -> Coordinate {
    Coordinate {
        lng: start.lng + t * (end.lng - start.lng),
        lat: start.lat + t * (end.lat - start.lat),
    }
}

/// Total length of a coordinate path in meters.
pub fn path_length_m(path: &[Coordinate]) -> f64 {
    path.windows(2)
        .map(|pair| coordinate_distance(&pair[0], &pair[1]))
        .sum()
}
