//! Formatting route results for map drawing, camera framing and ETAs.

use crate::models::Coordinate;
use crate::rules::DEFAULT_WALKING_SPEED_MPS;
use crate::spatial::bearing_degrees;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Offset used to stretch a single point into a drawable line.
const SINGLE_POINT_EPSILON_DEG: f64 = 1e-6;
const TURN_THRESHOLD_DEG: f64 = 45.0;
const SLIGHT_TURN_THRESHOLD_DEG: f64 = 20.0;

/// GeoJSON `Feature` wrapping a `LineString`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFeature {
    #[serde(rename = "type")]
    pub feature_type: &'static str,
    pub properties: Map<String, Value>,
    pub geometry: LineGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGeometry {
    #[serde(rename = "type")]
    pub geometry_type: &'static str,
    /// `[lng, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

/// Axis-aligned box used for camera framing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub northeast: Coordinate,
    pub southwest: Coordinate,
}

impl Bounds {
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lng >= self.southwest.lng
            && point.lng <= self.northeast.lng
            && point.lat >= self.southwest.lat
            && point.lat <= self.northeast.lat
    }
}

/// Direction change at a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnKind {
    Straight,
    SlightLeft,
    SlightRight,
    Left,
    Right,
}

impl TurnKind {
    /// Classify a signed bearing change in degrees (positive = clockwise).
    pub fn from_angle(delta_deg: f64) -> Self {
        if delta_deg > TURN_THRESHOLD_DEG {
            TurnKind::Right
        } else if delta_deg < -TURN_THRESHOLD_DEG {
            TurnKind::Left
        } else if delta_deg > SLIGHT_TURN_THRESHOLD_DEG {
            TurnKind::SlightRight
        } else if delta_deg < -SLIGHT_TURN_THRESHOLD_DEG {
            TurnKind::SlightLeft
        } else {
            TurnKind::Straight
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TurnKind::Straight => "straight",
            TurnKind::SlightLeft => "slight-left",
            TurnKind::SlightRight => "slight-right",
            TurnKind::Left => "left",
            TurnKind::Right => "right",
        }
    }
}

/// Wrap a coordinate path as a drawable line.
///
/// A lone point gets a second point a hair to the north-east so the line
/// never has zero length.
pub fn to_line_feature(path: &[Coordinate]) -> LineFeature {
    let mut coordinates: Vec<[f64; 2]> = path.iter().map(Coordinate::to_lng_lat).collect();
    if let [only] = path {
        coordinates.push([
            only.lng + SINGLE_POINT_EPSILON_DEG,
            only.lat + SINGLE_POINT_EPSILON_DEG,
        ]);
    }

    LineFeature {
        feature_type: "Feature",
        properties: Map::new(),
        geometry: LineGeometry {
            geometry_type: "LineString",
            coordinates,
        },
    }
}

/// Bounding box of `path` grown by `padding` degrees on every side.
pub fn bounds_with_padding(path: &[Coordinate], padding: f64) -> Option<Bounds> {
    let first = path.first()?;
    let mut southwest = *first;
    let mut northeast = *first;
    for point in &path[1..] {
        southwest.lng = southwest.lng.min(point.lng);
        southwest.lat = southwest.lat.min(point.lat);
        northeast.lng = northeast.lng.max(point.lng);
        northeast.lat = northeast.lat.max(point.lat);
    }

    Some(Bounds {
        northeast: Coordinate::new(northeast.lng + padding, northeast.lat + padding),
        southwest: Coordinate::new(southwest.lng - padding, southwest.lat - padding),
    })
}

/// Signed change of heading at `current`, normalized into (-180, 180].
pub fn heading_change(prev: &Coordinate, current: &Coordinate, next: &Coordinate) -> f64 {
    let incoming = bearing_degrees(prev.lat, prev.lng, current.lat, current.lng);
    let outgoing = bearing_degrees(current.lat, current.lng, next.lat, next.lng);
    normalize_angle(outgoing - incoming)
}

fn normalize_angle(mut delta: f64) -> f64 {
    while delta > 180.0 {
        delta -= 360.0;
    }
    while delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

/// Classify the turn made at `current`. `None` when any waypoint is missing.
pub fn detect_turn(
    prev: Option<&Coordinate>,
    current: Option<&Coordinate>,
    next: Option<&Coordinate>,
) -> Option<TurnKind> {
    let (prev, current, next) = (prev?, current?, next?);
    Some(TurnKind::from_angle(heading_change(prev, current, next)))
}

fn walking_seconds(distance_m: f64, walking_speed_mps: f64) -> u64 {
    let speed = if walking_speed_mps.is_finite() && walking_speed_mps > 0.0 {
        walking_speed_mps
    } else {
        DEFAULT_WALKING_SPEED_MPS
    };
    let seconds = (distance_m.max(0.0) / speed).round();
    if seconds.is_finite() {
        seconds as u64
    } else {
        0
    }
}

/// Walking time as `"Xm Ys"`, or `"Ys"` under a minute.
pub fn estimate_eta(distance_m: f64, walking_speed_mps: f64) -> String {
    let seconds = walking_seconds(distance_m, walking_speed_mps);
    if seconds >= 60 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Expected arrival time when leaving at `departure`.
pub fn estimate_arrival(
    distance_m: f64,
    walking_speed_mps: f64,
    departure: DateTime<Utc>,
) -> DateTime<Utc> {
    let seconds = walking_seconds(distance_m, walking_speed_mps);
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|walk| departure.checked_add_signed(walk))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Straight line drawn when no route could be computed.
pub fn straight_line_preview(start: Coordinate, end: Coordinate) -> Vec<Coordinate> {
    vec![start, end]
}
