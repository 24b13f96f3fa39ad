//! Turn-by-turn steps derived from a route's coordinate path.

use crate::models::Coordinate;
use crate::presentation::{detect_turn, estimate_eta, TurnKind};
use crate::spatial::{bearing_degrees, coordinate_distance};
use serde::Serialize;

/// Consecutive points closer than this are treated as one waypoint.
const DUPLICATE_POINT_M: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Maneuver {
    Depart,
    Turn,
    Arrive,
}

/// One instruction for the guidance overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidanceStep {
    pub maneuver: Maneuver,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<TurnKind>,
    pub location: Coordinate,
    /// Meters walked since the previous step.
    pub distance_m: f64,
    /// Heading when leaving this step, degrees from north.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing_deg: Option<f64>,
}

impl GuidanceStep {
    /// Short human-readable instruction.
    pub fn instruction(&self) -> String {
        match (self.maneuver, self.turn) {
            (Maneuver::Depart, _) => match self.bearing_deg {
                Some(bearing) => format!("Head {}", compass_direction(bearing)),
                None => "Depart".to_string(),
            },
            (Maneuver::Turn, Some(TurnKind::Left)) => "Turn left".to_string(),
            (Maneuver::Turn, Some(TurnKind::Right)) => "Turn right".to_string(),
            (Maneuver::Turn, Some(TurnKind::SlightLeft)) => "Bear left".to_string(),
            (Maneuver::Turn, Some(TurnKind::SlightRight)) => "Bear right".to_string(),
            (Maneuver::Turn, _) => "Continue straight".to_string(),
            (Maneuver::Arrive, _) => "Arrive at destination".to_string(),
        }
    }
}

/// Eight-point compass name for a bearing in degrees.
pub fn compass_direction(bearing_deg: f64) -> &'static str {
    const NAMES: [&str; 8] = [
        "north",
        "northeast",
        "east",
        "southeast",
        "south",
        "southwest",
        "west",
        "northwest",
    ];
    let sector = (bearing_deg.rem_euclid(360.0) / 45.0).round() as usize % NAMES.len();
    NAMES[sector]
}

/// Build depart, turn and arrive steps for `path`.
///
/// Straight-ahead waypoints are folded into the surrounding leg. Paths with
/// fewer than two distinct points produce no steps.
pub fn build_guidance(path: &[Coordinate]) -> Vec<GuidanceStep> {
    let mut points: Vec<Coordinate> = Vec::with_capacity(path.len());
    for point in path {
        match points.last() {
            Some(last) if coordinate_distance(last, point) < DUPLICATE_POINT_M => {}
            _ => points.push(*point),
        }
    }
    if points.len() < 2 {
        return Vec::new();
    }

    let heading = |from: &Coordinate, to: &Coordinate| bearing_degrees(from.lat, from.lng, to.lat, to.lng);

    let mut steps = vec![GuidanceStep {
        maneuver: Maneuver::Depart,
        turn: None,
        location: points[0],
        distance_m: 0.0,
        bearing_deg: Some(heading(&points[0], &points[1])),
    }];

    let mut leg_m = 0.0;
    for i in 1..points.len() - 1 {
        leg_m += coordinate_distance(&points[i - 1], &points[i]);
        match detect_turn(points.get(i - 1), points.get(i), points.get(i + 1)) {
            Some(TurnKind::Straight) | None => {}
            Some(turn) => {
                steps.push(GuidanceStep {
                    maneuver: Maneuver::Turn,
                    turn: Some(turn),
                    location: points[i],
                    distance_m: leg_m,
                    bearing_deg: Some(heading(&points[i], &points[i + 1])),
                });
                leg_m = 0.0;
            }
        }
    }

    let last = points.len() - 1;
    leg_m += coordinate_distance(&points[last - 1], &points[last]);
    steps.push(GuidanceStep {
        maneuver: Maneuver::Arrive,
        turn: None,
        location: points[last],
        distance_m: leg_m,
        bearing_deg: None,
    });

    steps
}

/// One line per step, e.g. `"Turn left in 40 m"`, with a trailing ETA.
pub fn describe_route(steps: &[GuidanceStep], walking_speed_mps: f64) -> Vec<String> {
    let mut lines = Vec::with_capacity(steps.len() + 1);
    for (idx, step) in steps.iter().enumerate() {
        if idx == 0 {
            lines.push(step.instruction());
        } else {
            lines.push(format!("{} in {:.0} m", step.instruction(), step.distance_m));
        }
    }
    let total: f64 = steps.iter().map(|step| step.distance_m).sum();
    if !steps.is_empty() {
        lines.push(format!(
            "Total {:.0} m, about {}",
            total,
            estimate_eta(total, walking_speed_mps)
        ));
    }
    lines
}
