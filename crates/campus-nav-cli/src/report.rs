//! Rendering path results for the terminal or as JSON.

use campus_nav_core::{
    bounds_with_padding, build_guidance, describe_route, estimate_arrival, estimate_eta,
    straight_line_preview, to_line_feature, Bounds, Coordinate, GuidanceStep, LineFeature,
    NavigationRules, PathResult,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything the map and guidance layers need from one route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport<'a> {
    pub ok: bool,
    pub result: &'a PathResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<DateTime<Utc>>,
    pub line: LineFeature,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    pub guidance: Vec<GuidanceStep>,
}

impl<'a> RouteReport<'a> {
    /// Build a report. Failed routes fall back to a straight line between
    /// the requested coordinates when both are known.
    pub fn new(
        result: &'a PathResult,
        requested: Option<(Coordinate, Coordinate)>,
        rules: &NavigationRules,
        departure: DateTime<Utc>,
    ) -> Self {
        let drawn: Vec<Coordinate> = match (result.is_ok(), requested) {
            (true, _) => result.path.clone(),
            (false, Some((start, end))) => straight_line_preview(start, end),
            (false, None) => Vec::new(),
        };
        let (eta, arrival, guidance) = if result.is_ok() {
            (
                Some(estimate_eta(result.distance_m, rules.walking_speed_mps)),
                Some(estimate_arrival(
                    result.distance_m,
                    rules.walking_speed_mps,
                    departure,
                )),
                build_guidance(&result.path),
            )
        } else {
            (None, None, Vec::new())
        };

        Self {
            ok: result.is_ok(),
            result,
            eta,
            arrival,
            line: to_line_feature(&drawn),
            bounds: bounds_with_padding(&drawn, rules.bounds_padding_deg),
            guidance,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary, optionally with turn-by-turn lines.
    pub fn to_text(&self, rules: &NavigationRules, with_guidance: bool) -> String {
        let mut lines = Vec::new();
        if let Some(message) = self.result.error_message() {
            lines.push("Result: FAIL".to_string());
            lines.push(format!("Error: {message}"));
            if let Some(node) = &self.result.start_node {
                lines.push(format!("Start node: {}", node.id));
            }
            if let Some(node) = &self.result.end_node {
                lines.push(format!("End node: {}", node.id));
            }
            if !self.line.geometry.coordinates.is_empty() {
                lines.push("Showing straight-line preview instead".to_string());
            }
        } else {
            lines.push(format!(
                "Result: OK | distance={:.0}m eta={} nodes={} visited={}",
                self.result.distance_m,
                self.eta.as_deref().unwrap_or("-"),
                self.result.path_nodes.len(),
                self.result.nodes_visited
            ));
            if let Some(arrival) = self.arrival {
                lines.push(format!("Arrival: {}", arrival.format("%H:%M:%S UTC")));
            }
            let ids: Vec<&str> = self.result.path_nodes.iter().map(|n| n.id.as_str()).collect();
            lines.push(format!("Via: {}", ids.join(" -> ")));
            if with_guidance {
                lines.extend(
                    describe_route(&self.guidance, rules.walking_speed_mps)
                        .into_iter()
                        .map(|line| format!(" - {line}")),
                );
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
