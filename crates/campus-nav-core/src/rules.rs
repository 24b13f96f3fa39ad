//! Tunable thresholds for graph building, snapping and search.

use serde::{Deserialize, Serialize};

/// Assumed average walking speed, meters per second.
pub const DEFAULT_WALKING_SPEED_MPS: f64 = 1.4;
/// Map framing padding in degrees (~50 m).
pub const DEFAULT_BOUNDS_PADDING_DEG: f64 = 0.0005;
pub const DEFAULT_CONNECTED_CANDIDATES: usize = 10;
pub const DEFAULT_REACHABLE_CANDIDATES: usize = 20;

/// Configuration for the navigation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationRules {
    /// Walking speed used for ETA estimates (m/s)
    pub walking_speed_mps: f64,
    /// Padding added on each side of a route's bounding box (degrees)
    pub bounds_padding_deg: f64,
    /// Nearest nodes considered when snapping to a connected node
    pub connected_candidates: usize,
    /// Nearest nodes considered when snapping to a node that reaches the goal
    pub reachable_candidates: usize,
    /// A* iteration budget as a multiple of the node count
    pub iteration_factor: usize,
    /// Evenly spaced points tested against blockages along each edge
    pub blockage_samples: usize,
}

impl Default for NavigationRules {
    fn default() -> Self {
        Self {
            walking_speed_mps: DEFAULT_WALKING_SPEED_MPS,
            bounds_padding_deg: DEFAULT_BOUNDS_PADDING_DEG,
            connected_candidates: DEFAULT_CONNECTED_CANDIDATES,
            reachable_candidates: DEFAULT_REACHABLE_CANDIDATES,
            iteration_factor: 3,
            blockage_samples: 5,
        }
    }
}

impl NavigationRules {
    /// Iteration cap for a graph of `node_count` nodes.
    pub fn max_iterations(&self, node_count: usize) -> usize {
        self.iteration_factor.saturating_mul(node_count)
    }

    /// Sample positions along an edge, endpoints included.
    pub fn blockage_sample_fractions(&self) -> Vec<f64> {
        let samples = self.blockage_samples.max(2);
        let last = (samples - 1) as f64;
        (0..samples).map(|i| i as f64 / last).collect()
    }
}
