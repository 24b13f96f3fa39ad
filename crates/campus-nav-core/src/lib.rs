//! Campus navigation graph engine.
//!
//! Builds a walking graph from nodes and edges, drops edges crossing active
//! blockages, snaps GPS fixes to usable nodes and runs A* between them.

pub mod error;
pub mod graph;
pub mod guidance;
pub mod locator;
pub mod models;
pub mod presentation;
pub mod route_engine;
pub mod rules;
pub mod spatial;

pub use error::{Endpoint, IngestError, MissingInput, RouteError};
pub use graph::{build_graph, can_reach, Graph, GraphEntry, Neighbor};
pub use guidance::{build_guidance, describe_route, GuidanceStep, Maneuver};
pub use locator::{find_nearest_connected_node, find_nearest_node, find_nearest_reachable_node};
pub use models::{
    Blockage, Building, CampusNetwork, Coordinate, Edge, NetworkSnapshot, Node, NodeId,
    PathRequest, PathResult, RawEdge,
};
pub use presentation::{
    bounds_with_padding, detect_turn, estimate_arrival, estimate_eta, straight_line_preview,
    to_line_feature, Bounds, LineFeature, TurnKind,
};
pub use route_engine::{find_path, find_path_default, route_between_nodes, search, SearchOutcome};
pub use rules::NavigationRules;
pub use spatial::{bearing_degrees, haversine_distance, point_in_polygon};
