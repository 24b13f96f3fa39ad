//! Walking route engine: endpoint resolution and A* over the campus graph.
//!
//! Every call rebuilds the graph from the supplied snapshot, so results never
//! depend on earlier requests.

use crate::error::{Endpoint, MissingInput, RouteError};
use crate::graph::{build_graph, can_reach, Graph};
use crate::locator::{find_nearest_connected_node, find_nearest_reachable_node};
use crate::models::{Coordinate, Node, NodeId, PathRequest, PathResult};
use crate::rules::NavigationRules;
use crate::spatial::{coordinate_distance, haversine_distance};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenNode {
    id: NodeId,
    g_score: FloatOrd,
    f_score: FloatOrd,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Node sequence found by [`search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub path_nodes: Vec<Node>,
    /// Sum of Haversine distances between consecutive nodes (unrounded).
    pub distance_m: f64,
    pub nodes_visited: usize,
}

/// Compute a walking route using default rules.
pub fn find_path_default(request: &PathRequest<'_>) -> PathResult {
    find_path(request, &NavigationRules::default())
}

/// Compute a walking route between two arbitrary coordinates.
///
/// Never panics on routing failures; check [`PathResult::error`] first.
pub fn find_path(request: &PathRequest<'_>, rules: &NavigationRules) -> PathResult {
    if request.nodes.is_empty() {
        return PathResult::failure(MissingInput::NoNodes.into());
    }
    if request.edges.is_empty() {
        return PathResult::failure(MissingInput::NoEdges.into());
    }
    let (Some(start), Some(end)) = (request.start, request.end) else {
        return PathResult::failure(MissingInput::MissingCoordinates.into());
    };
    if !start.is_finite() || !end.is_finite() {
        return PathResult::failure(MissingInput::MissingCoordinates.into());
    }

    let graph = build_graph(request.nodes, request.edges, request.blockages, rules);

    let end_node = find_nearest_connected_node(
        end.lng,
        end.lat,
        request.nodes,
        &graph,
        rules.connected_candidates,
    );
    let start_node = match end_node {
        Some(end_node) => find_nearest_reachable_node(
            start.lng,
            start.lat,
            &end_node.id,
            request.nodes,
            &graph,
            rules.reachable_candidates,
            rules.connected_candidates,
        ),
        None => find_nearest_connected_node(
            start.lng,
            start.lat,
            request.nodes,
            &graph,
            rules.connected_candidates,
        ),
    };

    tracing::debug!(
        start = ?start_node.map(|n| n.id.as_str()),
        end = ?end_node.map(|n| n.id.as_str()),
        "resolved route endpoints"
    );

    let Some(end_node) = end_node else {
        return PathResult::failure(RouteError::DestinationUnresolved)
            .with_endpoints(start_node, None);
    };
    let Some(start_node) = start_node else {
        return PathResult::failure(RouteError::OriginUnresolved)
            .with_endpoints(None, Some(end_node));
    };
    if let Err(error) = validate_endpoints(&graph, start_node, end_node) {
        tracing::debug!(%error, "route endpoints rejected");
        return PathResult::failure(error).with_endpoints(Some(start_node), Some(end_node));
    }

    if start_node.id == end_node.id {
        return direct_result(start, end, start_node, request.include_endpoints);
    }

    let outcome = match search(&graph, &start_node.id, &end_node.id, rules) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::warn!(%error, start = %start_node.id, end = %end_node.id, "route search failed");
            return PathResult::failure(error).with_endpoints(Some(start_node), Some(end_node));
        }
    };

    let mut distance_m = outcome.distance_m;
    let mut path: Vec<Coordinate> = outcome.path_nodes.iter().map(Node::coordinate).collect();
    if request.include_endpoints {
        if let (Some(first), Some(last)) = (path.first(), path.last()) {
            distance_m += coordinate_distance(&start, first) + coordinate_distance(last, &end);
        }
        path.insert(0, start);
        path.push(end);
    }

    tracing::debug!(
        distance_m,
        nodes = outcome.path_nodes.len(),
        visited = outcome.nodes_visited,
        "route found"
    );

    PathResult {
        path,
        path_nodes: outcome.path_nodes,
        distance_m: distance_m.round(),
        error: None,
        start_node: Some(start_node.clone()),
        end_node: Some(end_node.clone()),
        nodes_visited: outcome.nodes_visited,
    }
}

/// Route between two known node ids without coordinate snapping.
///
/// Used by operator tools that pick exact nodes. The path contains only graph
/// node coordinates.
pub fn route_between_nodes(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
    rules: &NavigationRules,
) -> PathResult {
    let start_node = graph.node(start);
    let end_node = graph.node(end);
    let Some(end_node) = end_node else {
        return PathResult::failure(RouteError::DestinationUnresolved)
            .with_endpoints(start_node, None);
    };
    let Some(start_node) = start_node else {
        return PathResult::failure(RouteError::OriginUnresolved)
            .with_endpoints(None, Some(end_node));
    };
    if let Err(error) = validate_endpoints(graph, start_node, end_node) {
        return PathResult::failure(error).with_endpoints(Some(start_node), Some(end_node));
    }

    match search(graph, start, end, rules) {
        Ok(outcome) => PathResult {
            path: outcome.path_nodes.iter().map(Node::coordinate).collect(),
            path_nodes: outcome.path_nodes,
            distance_m: outcome.distance_m.round(),
            error: None,
            start_node: Some(start_node.clone()),
            end_node: Some(end_node.clone()),
            nodes_visited: outcome.nodes_visited,
        },
        Err(error) => {
            PathResult::failure(error).with_endpoints(Some(start_node), Some(end_node))
        }
    }
}

fn validate_endpoints(graph: &Graph, start: &Node, end: &Node) -> Result<(), RouteError> {
    if !graph.is_connected(&start.id) {
        return Err(RouteError::Isolated {
            which: Endpoint::Start,
            node: start.id.clone(),
        });
    }
    if !graph.is_connected(&end.id) {
        return Err(RouteError::Isolated {
            which: Endpoint::End,
            node: end.id.clone(),
        });
    }
    if !can_reach(&start.id, &end.id, graph) {
        return Err(RouteError::Disconnected {
            start: start.id.clone(),
            end: end.id.clone(),
        });
    }
    Ok(())
}

/// Both coordinates snapped to the same node: walk straight there.
fn direct_result(start: Coordinate, end: Coordinate, node: &Node, include_endpoints: bool) -> PathResult {
    let path = if include_endpoints {
        vec![start, node.coordinate(), end]
    } else {
        vec![node.coordinate(), end]
    };
    PathResult {
        path,
        path_nodes: vec![node.clone()],
        distance_m: coordinate_distance(&start, &end).round(),
        error: None,
        start_node: Some(node.clone()),
        end_node: Some(node.clone()),
        nodes_visited: 0,
    }
}

/// A* search between two graph nodes.
///
/// The heuristic is the straight-line distance to `end`. The search gives up
/// after `iteration_factor * graph.len()` expansions.
pub fn search(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
    rules: &NavigationRules,
) -> Result<SearchOutcome, RouteError> {
    let max_iterations = rules.max_iterations(graph.len());
    let (Some(start_node), Some(end_node)) = (graph.node(start), graph.node(end)) else {
        return Err(RouteError::SearchExhausted { iterations: 0 });
    };
    let heuristic = |node: &Node| node.distance_to_node(end_node);

    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
    open_set.push(Reverse(OpenNode {
        id: start.clone(),
        g_score: FloatOrd(0.0),
        f_score: FloatOrd(heuristic(start_node)),
    }));
    let mut closed_set: HashSet<NodeId> = HashSet::new();
    let mut g_score: HashMap<NodeId, f64> = HashMap::new();
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    g_score.insert(start.clone(), 0.0);

    let mut iterations = 0usize;
    let mut reached = false;

    while let Some(Reverse(current)) = open_set.pop() {
        if closed_set.contains(&current.id) {
            continue;
        }
        let best_g = g_score.get(&current.id).copied().unwrap_or(f64::INFINITY);
        if current.g_score.0 > best_g + 1e-9 {
            continue;
        }
        if iterations >= max_iterations {
            break;
        }
        iterations += 1;

        if &current.id == end {
            reached = true;
            break;
        }

        for neighbor in graph.neighbors(&current.id) {
            if closed_set.contains(&neighbor.id) {
                continue;
            }
            let tentative_g = best_g + neighbor.cost;
            if tentative_g < g_score.get(&neighbor.id).copied().unwrap_or(f64::INFINITY) {
                let Some(next_node) = graph.node(&neighbor.id) else {
                    continue;
                };
                came_from.insert(neighbor.id.clone(), current.id.clone());
                g_score.insert(neighbor.id.clone(), tentative_g);
                open_set.push(Reverse(OpenNode {
                    id: neighbor.id.clone(),
                    g_score: FloatOrd(tentative_g),
                    f_score: FloatOrd(tentative_g + heuristic(next_node)),
                }));
            }
        }
        closed_set.insert(current.id);
    }

    if !reached {
        return Err(RouteError::SearchExhausted { iterations });
    }

    let mut ids = vec![end.clone()];
    let mut cursor = end;
    while let Some(previous) = came_from.get(cursor) {
        ids.push(previous.clone());
        cursor = previous;
    }
    ids.reverse();

    let path_nodes: Vec<Node> = ids
        .iter()
        .filter_map(|id| graph.node(id).cloned())
        .collect();
    let distance_m = path_nodes
        .windows(2)
        .map(|pair| haversine_distance(pair[0].lat, pair[0].lng, pair[1].lat, pair[1].lng))
        .sum();

    Ok(SearchOutcome {
        path_nodes,
        distance_m,
        nodes_visited: iterations,
    })
}
