//! Loading network snapshots exported by the data-sync layer.

use anyhow::{Context, Result};
use campus_nav_core::{build_graph, CampusNetwork, Coordinate, NavigationRules, NetworkSnapshot};
use serde::Serialize;
use std::path::Path;

pub fn load_network(path: &Path) -> Result<CampusNetwork> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading network snapshot {}", path.display()))?;
    parse_network(&raw).with_context(|| format!("loading network snapshot {}", path.display()))
}

pub fn parse_network(raw: &str) -> Result<CampusNetwork> {
    let network = NetworkSnapshot::from_json(raw)?.into_network()?;
    tracing::info!(
        nodes = network.nodes.len(),
        edges = network.edges.len(),
        blockages = network.blockages.len(),
        active_blockages = network.active_blockages(),
        buildings = network.buildings.len(),
        "loaded campus network"
    );
    Ok(network)
}

/// Parse `"lat,lng"` into a coordinate.
pub fn parse_lat_lng(value: &str) -> Result<Coordinate, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG but got '{value}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinate out of range: {lat},{lng}"));
    }
    Ok(Coordinate::new(lng, lat))
}

/// Structural overview of a network under its current blockages.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    pub nodes: usize,
    pub edges_supplied: usize,
    pub edges_usable: usize,
    pub isolated_nodes: usize,
    pub components: usize,
    pub largest_component: usize,
    pub active_blockages: usize,
    pub buildings: usize,
}

pub fn summarize(network: &CampusNetwork, rules: &NavigationRules) -> NetworkSummary {
    let graph = build_graph(&network.nodes, &network.edges, &network.blockages, rules);
    let components = graph.connected_components();
    NetworkSummary {
        nodes: graph.len(),
        edges_supplied: network.edges.len(),
        edges_usable: graph.edge_count(),
        isolated_nodes: graph.isolated_nodes().count(),
        components: components.len(),
        largest_component: components.first().map(Vec::len).unwrap_or(0),
        active_blockages: network.active_blockages(),
        buildings: network.buildings.len(),
    }
}
