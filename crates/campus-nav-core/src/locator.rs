//! Snapping GPS fixes to usable graph nodes.
//!
//! A fix rarely lands on a node, and the literal nearest node may be isolated
//! or cut off by a blockage. Each locator relaxes "nearest" a little further
//! toward "nearest that can actually be routed from".

use crate::graph::{can_reach, Graph};
use crate::models::{Node, NodeId};

/// Nodes ordered by distance to `(lng, lat)`, closest first.
fn nodes_by_distance(lng: f64, lat: f64, nodes: &[Node]) -> Vec<(&Node, f64)> {
    let mut ranked: Vec<(&Node, f64)> = nodes
        .iter()
        .map(|node| (node, node.distance_to(lng, lat)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

/// Like [`nodes_by_distance`], limited to the rows the graph kept.
///
/// With duplicate ids the graph holds the last occurrence; earlier rows carry
/// stale data and are skipped.
fn graph_nodes_by_distance<'a>(
    lng: f64,
    lat: f64,
    nodes: &'a [Node],
    graph: &Graph,
) -> Vec<(&'a Node, f64)> {
    let mut ranked = nodes_by_distance(lng, lat, nodes);
    ranked.retain(|(node, _)| graph.node(&node.id) == Some(*node));
    ranked
}

/// Plain nearest node by Haversine distance.
pub fn find_nearest_node(lng: f64, lat: f64, nodes: &[Node]) -> Option<&Node> {
    nodes
        .iter()
        .map(|node| (node, node.distance_to(lng, lat)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(node, _)| node)
}

/// Nearest node with at least one neighbor among the `max_candidates` closest.
///
/// Falls back to the nearest node overall, even if it is disconnected.
pub fn find_nearest_connected_node<'a>(
    lng: f64,
    lat: f64,
    nodes: &'a [Node],
    graph: &Graph,
    max_candidates: usize,
) -> Option<&'a Node> {
    let ranked = graph_nodes_by_distance(lng, lat, nodes, graph);
    ranked
        .iter()
        .take(max_candidates)
        .find(|(node, _)| graph.is_connected(&node.id))
        .or_else(|| ranked.first())
        .map(|(node, _)| *node)
}

/// Nearest connected node that can also reach `target`.
///
/// Falls back to [`find_nearest_connected_node`] over `connected_candidates`
/// when none of the `max_candidates` closest nodes qualifies.
pub fn find_nearest_reachable_node<'a>(
    lng: f64,
    lat: f64,
    target: &NodeId,
    nodes: &'a [Node],
    graph: &Graph,
    max_candidates: usize,
    connected_candidates: usize,
) -> Option<&'a Node> {
    let ranked = graph_nodes_by_distance(lng, lat, nodes, graph);
    let reachable = ranked
        .iter()
        .take(max_candidates)
        .find(|(node, _)| graph.is_connected(&node.id) && can_reach(&node.id, target, graph))
        .map(|(node, _)| *node);

    match reachable {
        Some(node) => Some(node),
        None => {
            tracing::debug!(
                target = %target,
                max_candidates,
                "no nearby node reaches target, falling back to nearest connected"
            );
            find_nearest_connected_node(lng, lat, nodes, graph, connected_candidates)
        }
    }
}
