//! Error types for routing and ingestion.

use crate::models::NodeId;
use std::fmt;
use thiserror::Error;

/// Why a path request could not produce a route.
///
/// These are expected outcomes and travel inside
/// [`PathResult`](crate::models::PathResult) instead of being raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("{0}")]
    InputMissing(MissingInput),

    #[error("no connected node found near the destination")]
    DestinationUnresolved,

    #[error("no connected node found near the origin")]
    OriginUnresolved,

    #[error("{which} node {node} has no connections")]
    Isolated { which: Endpoint, node: NodeId },

    #[error("start node {start} and end node {end} are not connected")]
    Disconnected { start: NodeId, end: NodeId },

    #[error("no path found after {iterations} iterations")]
    SearchExhausted { iterations: usize },
}

/// Which required input was absent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    #[error("no nodes available")]
    NoNodes,

    #[error("no edges available")]
    NoEdges,

    #[error("start and end coordinates are required")]
    MissingCoordinates,
}

impl From<MissingInput> for RouteError {
    fn from(missing: MissingInput) -> Self {
        RouteError::InputMissing(missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// Malformed rows rejected at the ingestion boundary.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("invalid network JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} {id} has an invalid coordinate")]
    InvalidCoordinate { kind: &'static str, id: String },
}
