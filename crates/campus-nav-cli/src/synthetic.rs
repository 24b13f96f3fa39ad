//! Synthetic campus grids for stress runs.

use campus_nav_core::spatial::{offset_by_bearing, point_in_polygon};
use campus_nav_core::{Blockage, CampusNetwork, Coordinate, Edge, Node};
use rand::Rng;
use std::f64::consts::FRAC_PI_2;

const IRVINE_LAT: f64 = 33.6405;
const IRVINE_LON: f64 = -117.8443;

#[derive(Debug, Clone)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub spacing_m: f64,
    /// Fraction of grid edges left out to mimic missing walkways
    pub missing_edge_ratio: f64,
    pub blockages: usize,
    /// Share of generated blockages flagged active
    pub active_ratio: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: 30,
            cols: 30,
            spacing_m: 25.0,
            missing_edge_ratio: 0.1,
            blockages: 6,
            active_ratio: 0.5,
        }
    }
}

fn node_id(row: usize, col: usize) -> String {
    format!("r{row}c{col}")
}

/// Lay out a rows x cols walkway grid anchored at the campus origin.
pub fn generate_grid_campus<R: Rng>(spec: &GridSpec, rng: &mut R) -> CampusNetwork {
    let mut nodes = Vec::with_capacity(spec.rows * spec.cols);
    for row in 0..spec.rows {
        let (row_lat, row_lon) =
            offset_by_bearing(IRVINE_LAT, IRVINE_LON, row as f64 * spec.spacing_m, 0.0);
        for col in 0..spec.cols {
            let (lat, lon) =
                offset_by_bearing(row_lat, row_lon, col as f64 * spec.spacing_m, FRAC_PI_2);
            nodes.push(Node::new(node_id(row, col), lat, lon));
        }
    }

    let mut edges = Vec::new();
    let keep = (1.0 - spec.missing_edge_ratio).clamp(0.0, 1.0);
    for row in 0..spec.rows {
        for col in 0..spec.cols {
            if col + 1 < spec.cols && rng.random_bool(keep) {
                edges.push(Edge::new(node_id(row, col), node_id(row, col + 1)));
            }
            if row + 1 < spec.rows && rng.random_bool(keep) {
                edges.push(Edge::new(node_id(row, col), node_id(row + 1, col)));
            }
        }
    }

    let blockages = (0..spec.blockages)
        .filter_map(|idx| {
            let center = nodes.get(rng.random_range(0..nodes.len().max(1)))?;
            let half_deg = rng.random_range(0.5..2.0) * spec.spacing_m / 111_320.0;
            let mut blockage = Blockage::new(
                format!("blockage-{idx}"),
                vec![
                    Coordinate::new(center.lng - half_deg, center.lat - half_deg),
                    Coordinate::new(center.lng + half_deg, center.lat - half_deg),
                    Coordinate::new(center.lng + half_deg, center.lat + half_deg),
                    Coordinate::new(center.lng - half_deg, center.lat + half_deg),
                ],
            );
            blockage.active = rng.random_bool(spec.active_ratio.clamp(0.0, 1.0));
            Some(blockage)
        })
        .collect();

    CampusNetwork {
        nodes,
        edges,
        blockages,
        buildings: Vec::new(),
    }
}

/// Random coordinate inside the grid's footprint and outside active blockages.
pub fn random_point<R: Rng>(network: &CampusNetwork, rng: &mut R) -> Option<Coordinate> {
    let (min_lat, max_lat, min_lng, max_lng) = network.nodes.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(a, b, c, d), node| (a.min(node.lat), b.max(node.lat), c.min(node.lng), d.max(node.lng)),
    );
    if network.nodes.is_empty() {
        return None;
    }

    for _ in 0..32 {
        let candidate = Coordinate::new(
            rng.random_range(min_lng..=max_lng),
            rng.random_range(min_lat..=max_lat),
        );
        let blocked = network
            .blockages
            .iter()
            .filter(|b| b.is_effective())
            .any(|b| point_in_polygon(candidate.lng, candidate.lat, &b.polygon));
        if !blocked {
            return Some(candidate);
        }
    }
    None
}
