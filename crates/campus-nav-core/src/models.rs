//! Core data models for the navigation engine.

use crate::error::{IngestError, RouteError};
use crate::spatial::{haversine_distance, point_in_polygon};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ========== IDENTIFIERS ==========

/// Identifier of a graph node.
///
/// The data source stores ids as either strings or integers; both are
/// normalized to their string form so `7` and `"7"` name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_flexible_id(deserializer).map(NodeId)
    }
}

/// Accept a JSON string or integer id and return its string form.
fn deserialize_flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Signed(value) => value.to_string(),
        RawId::Unsigned(value) => value.to_string(),
    })
}

// ========== GEOMETRY ==========

/// A `{lng, lat}` pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
    #[serde(alias = "latitude")]
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// `[lng, lat]`, the order map renderers expect.
    pub fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

// ========== GRAPH INPUTS ==========

/// A point in the walkable network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            name: None,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lng, self.lat)
    }

    /// Distance in meters from this node to `(lng, lat)`.
    pub fn distance_to(&self, lng: f64, lat: f64) -> f64 {
        haversine_distance(self.lat, self.lng, lat, lng)
    }

    /// Distance in meters between two nodes.
    pub fn distance_to_node(&self, other: &Node) -> f64 {
        haversine_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Canonical undirected connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Explicit traversal cost. Defaults to the Haversine length when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Edge {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Edge row as materialized by the data-sync layer.
///
/// Older tables name the endpoints `from_node`/`to_node`; newer ones use
/// `from`/`to`. Only this adapter knows about both spellings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    #[serde(alias = "from_node")]
    pub from: NodeId,
    #[serde(alias = "to_node")]
    pub to: NodeId,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl RawEdge {
    /// Normalize into the canonical edge, discarding unusable weights.
    pub fn into_edge(self) -> Edge {
        let weight = match self.weight {
            Some(weight) if weight.is_finite() && weight >= 0.0 => Some(weight),
            Some(weight) => {
                tracing::warn!(
                    from = %self.from,
                    to = %self.to,
                    weight,
                    "ignoring invalid edge weight, falling back to distance"
                );
                None
            }
            None => None,
        };
        Edge {
            from: self.from,
            to: self.to,
            weight,
        }
    }
}

impl From<RawEdge> for Edge {
    fn from(raw: RawEdge) -> Self {
        raw.into_edge()
    }
}

/// A polygonal area that is temporarily impassable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockage {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    /// Rows without the flag are treated as active.
    #[serde(default = "default_active", alias = "is_active")]
    pub active: bool,
    /// Polygon vertices as `{lng, lat}` pairs.
    #[serde(alias = "coordinates")]
    pub polygon: Vec<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Blockage {
    pub fn new(id: impl Into<String>, polygon: Vec<Coordinate>) -> Self {
        Self {
            id: id.into(),
            active: true,
            polygon,
            reason: None,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether this blockage can block anything at all.
    pub fn is_effective(&self) -> bool {
        self.active && self.polygon.len() >= 3
    }

    /// Check if a point lies inside the polygon, ignoring the active flag.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point_in_polygon(point.lng, point.lat, &self.polygon)
    }
}

/// A named campus destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    pub name: String,
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

impl Building {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lng, self.lat)
    }
}

// ========== INGESTION ==========

/// Rows handed over by the data-sync layer, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    #[serde(default)]
    pub blockages: Vec<Blockage>,
    #[serde(default)]
    pub buildings: Vec<Building>,
}

impl NetworkSnapshot {
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate coordinates and normalize edges into a [`CampusNetwork`].
    pub fn into_network(self) -> Result<CampusNetwork, IngestError> {
        for node in &self.nodes {
            if !valid_lat_lng(node.lat, node.lng) {
                return Err(IngestError::InvalidCoordinate {
                    kind: "node",
                    id: node.id.to_string(),
                });
            }
        }
        for blockage in &self.blockages {
            if blockage
                .polygon
                .iter()
                .any(|vertex| !valid_lat_lng(vertex.lat, vertex.lng))
            {
                return Err(IngestError::InvalidCoordinate {
                    kind: "blockage",
                    id: blockage.id.clone(),
                });
            }
        }
        for building in &self.buildings {
            if !valid_lat_lng(building.lat, building.lng) {
                return Err(IngestError::InvalidCoordinate {
                    kind: "building",
                    id: building.id.clone(),
                });
            }
        }

        Ok(CampusNetwork {
            nodes: self.nodes,
            edges: self.edges.into_iter().map(Edge::from).collect(),
            blockages: self.blockages,
            buildings: self.buildings,
        })
    }
}

fn valid_lat_lng(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && lat.abs() <= 90.0 && lng.abs() <= 180.0
}

/// Normalized, validated network ready for routing.
#[derive(Debug, Clone, Default)]
pub struct CampusNetwork {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub blockages: Vec<Blockage>,
    pub buildings: Vec<Building>,
}

impl CampusNetwork {
    /// Case-insensitive building lookup by name.
    pub fn find_building(&self, name: &str) -> Option<&Building> {
        let needle = name.trim();
        self.buildings
            .iter()
            .find(|building| building.name.trim().eq_ignore_ascii_case(needle))
    }

    pub fn find_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn active_blockages(&self) -> usize {
        self.blockages.iter().filter(|b| b.active).count()
    }
}

// ========== PATH REQUEST / RESULT ==========

/// Everything a single path computation needs.
#[derive(Debug, Clone, Copy)]
pub struct PathRequest<'a> {
    pub start: Option<Coordinate>,
    pub end: Option<Coordinate>,
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    pub blockages: &'a [Blockage],
    /// Splice the literal start/end coordinates onto the path.
    pub include_endpoints: bool,
}

impl<'a> PathRequest<'a> {
    pub fn new(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        Self {
            start: None,
            end: None,
            nodes,
            edges,
            blockages: &[],
            include_endpoints: true,
        }
    }

    pub fn origin(mut self, start: Coordinate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn destination(mut self, end: Coordinate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_blockages(mut self, blockages: &'a [Blockage]) -> Self {
        self.blockages = blockages;
        self
    }

    pub fn include_endpoints(mut self, include: bool) -> Self {
        self.include_endpoints = include;
        self
    }

    /// Request over every collection in a normalized network.
    pub fn for_network(network: &'a CampusNetwork) -> Self {
        Self::new(&network.nodes, &network.edges).with_blockages(&network.blockages)
    }
}

/// Outcome of a path computation.
///
/// Failures are reported through `error` rather than a `Result`: routing
/// failures are an expected outcome that callers render, not an exception.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub path: Vec<Coordinate>,
    pub path_nodes: Vec<Node>,
    /// Total walking distance, rounded to whole meters.
    pub distance_m: f64,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<RouteError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_node: Option<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_node: Option<Node>,
    pub nodes_visited: usize,
}

impl PathResult {
    pub fn failure(error: RouteError) -> Self {
        Self {
            path: Vec::new(),
            path_nodes: Vec::new(),
            distance_m: 0.0,
            error: Some(error),
            start_node: None,
            end_node: None,
            nodes_visited: 0,
        }
    }

    /// Attach whichever endpoints were resolved before the failure.
    pub fn with_endpoints(mut self, start: Option<&Node>, end: Option<&Node>) -> Self {
        self.start_node = start.cloned();
        self.end_node = end.cloned();
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

fn serialize_error<S: Serializer>(error: &Option<RouteError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_edge_accepts_both_field_spellings() {
        let modern: RawEdge = serde_json::from_value(json!({"from": "a", "to": "b"})).unwrap();
        let legacy: RawEdge =
            serde_json::from_value(json!({"from_node": "a", "to_node": "b", "weight": 12.5}))
                .unwrap();

        assert_eq!(modern.into_edge(), Edge::new("a", "b"));
        assert_eq!(legacy.into_edge(), Edge::new("a", "b").with_weight(12.5));
    }

    #[test]
    fn raw_edge_drops_negative_weight() {
        let raw: RawEdge =
            serde_json::from_value(json!({"from": 1, "to": 2, "weight": -4.0})).unwrap();
        let edge = raw.into_edge();
        assert_eq!(edge.from, NodeId::from("1"));
        assert_eq!(edge.weight, None);
    }

    #[test]
    fn node_ids_normalize_numbers_and_strings() {
        let node: Node =
            serde_json::from_value(json!({"id": 42, "lat": 1.0, "lng": 2.0})).unwrap();
        assert_eq!(node.id, NodeId::from("42"));
        assert_eq!(node.id, NodeId::from(42));
    }

    #[test]
    fn blockage_defaults_to_active() {
        let blockage: Blockage = serde_json::from_value(json!({
            "id": 3,
            "polygon": [{"lng": 0.0, "lat": 0.0}, {"lng": 1.0, "lat": 0.0}, {"lng": 1.0, "lat": 1.0}]
        }))
        .unwrap();
        assert!(blockage.active);
        assert!(blockage.is_effective());
        assert_eq!(blockage.id, "3");
    }

    #[test]
    fn snapshot_rejects_out_of_range_node() {
        let snapshot = NetworkSnapshot::from_json(
            r#"{"nodes": [{"id": "bad", "lat": 95.0, "lng": 0.0}], "edges": []}"#,
        )
        .unwrap();
        let err = snapshot.into_network().unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn snapshot_finds_buildings_case_insensitively() {
        let snapshot = NetworkSnapshot::from_json(
            r#"{
                "nodes": [{"id": "n1", "lat": 33.0, "lng": -117.0}],
                "edges": [{"from_node": "n1", "to_node": "n1"}],
                "buildings": [{"id": 9, "name": "Science Library", "lat": 33.0, "lng": -117.0}]
            }"#,
        )
        .unwrap();
        let network = snapshot.into_network().unwrap();
        assert_eq!(network.edges.len(), 1);
        assert_eq!(
            network.find_building("science library").map(|b| b.id.as_str()),
            Some("9")
        );
        assert!(network.find_building("Gym").is_none());
    }

    #[test]
    fn failure_result_serializes_error_as_text() {
        let result = PathResult::failure(RouteError::DestinationUnresolved);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["path"], json!([]));
        assert_eq!(value["distance_m"], json!(0.0));
        assert!(value["error"].as_str().unwrap().contains("destination"));
    }
}
