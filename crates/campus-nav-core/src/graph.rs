//! Adjacency-list walking graph, rebuilt for every path request.

use crate::models::{Blockage, Edge, Node, NodeId};
use crate::rules::NavigationRules;
use crate::spatial::interpolate;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// A traversable link out of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: NodeId,
    pub cost: f64,
}

/// A node together with its outgoing links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEntry {
    pub node: Node,
    pub neighbors: Vec<Neighbor>,
}

/// Mapping from node id to its entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    entries: HashMap<NodeId, GraphEntry>,
}

impl Graph {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&GraphEntry> {
        self.entries.get(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.entries.get(id).map(|entry| &entry.node)
    }

    /// Neighbors of `id`; empty for unknown ids.
    pub fn neighbors(&self, id: &NodeId) -> &[Neighbor] {
        self.entries
            .get(id)
            .map(|entry| entry.neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn degree(&self, id: &NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Whether `id` exists and has at least one neighbor.
    pub fn is_connected(&self, id: &NodeId) -> bool {
        self.degree(id) > 0
    }

    /// Number of undirected edges kept in the graph.
    pub fn edge_count(&self) -> usize {
        self.entries
            .values()
            .map(|entry| entry.neighbors.len())
            .sum::<usize>()
            / 2
    }

    /// Nodes without any neighbor.
    pub fn isolated_nodes(&self) -> impl Iterator<Item = &Node> {
        self.entries
            .values()
            .filter(|entry| entry.neighbors.is_empty())
            .map(|entry| &entry.node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &GraphEntry)> {
        self.entries.iter()
    }

    /// Groups of mutually reachable node ids, largest first.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut ids: Vec<&NodeId> = self.entries.keys().collect();
        ids.sort();

        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut components = Vec::new();
        for root in ids {
            if !seen.insert(root) {
                continue;
            }
            let mut component = vec![root.clone()];
            let mut queue = VecDeque::from([root]);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.neighbors(current) {
                    if seen.insert(&neighbor.id) {
                        component.push(neighbor.id.clone());
                        queue.push_back(&neighbor.id);
                    }
                }
            }
            components.push(component);
        }
        components.sort_by(|a, b| b.len().cmp(&a.len()));
        components
    }

    fn link(&mut self, from: &NodeId, to: &NodeId, cost: f64) {
        if let Some(entry) = self.entries.get_mut(from) {
            entry.neighbors.push(Neighbor {
                id: to.clone(),
                cost,
            });
        }
    }
}

/// Build the walking graph for one request.
///
/// Every node gets an entry, even without neighbors. Edges naming an unknown
/// node are dropped. Edges crossing an active blockage are left out entirely.
pub fn build_graph(
    nodes: &[Node],
    edges: &[Edge],
    blockages: &[Blockage],
    rules: &NavigationRules,
) -> Graph {
    let mut graph = Graph {
        entries: HashMap::with_capacity(nodes.len()),
    };
    for node in nodes {
        graph.entries.insert(
            node.id.clone(),
            GraphEntry {
                node: node.clone(),
                neighbors: Vec::new(),
            },
        );
    }

    let active_blockages: Vec<&Blockage> = blockages
        .iter()
        .filter(|blockage| blockage.is_effective())
        .collect();
    let fractions = rules.blockage_sample_fractions();

    let mut kept = 0usize;
    let mut blocked = 0usize;
    let mut dangling = 0usize;

    for edge in edges {
        let (Some(from), Some(to)) = (graph.node(&edge.from), graph.node(&edge.to)) else {
            dangling += 1;
            continue;
        };

        if !active_blockages.is_empty()
            && edge_is_blocked(from, to, &active_blockages, &fractions)
        {
            blocked += 1;
            continue;
        }

        let cost = edge.weight.unwrap_or_else(|| from.distance_to_node(to));
        graph.link(&edge.from, &edge.to, cost);
        graph.link(&edge.to, &edge.from, cost);
        kept += 1;
    }

    tracing::debug!(
        nodes = graph.len(),
        edges_kept = kept,
        edges_blocked = blocked,
        edges_dangling = dangling,
        active_blockages = active_blockages.len(),
        "built navigation graph"
    );

    graph
}

/// Check whether any sample point along `from -> to` falls inside a blockage.
pub fn edge_is_blocked(
    from: &Node,
    to: &Node,
    blockages: &[&Blockage],
    fractions: &[f64],
) -> bool {
    let start = from.coordinate();
    let end = to.coordinate();
    fractions.iter().any(|&t| {
        let sample = interpolate(&start, &end, t);
        blockages.iter().any(|blockage| blockage.contains(&sample))
    })
}

/// Breadth-first connectivity test between two graph nodes.
pub fn can_reach(start: &NodeId, end: &NodeId, graph: &Graph) -> bool {
    if !graph.contains(start) || !graph.contains(end) {
        return false;
    }
    if start == end {
        return true;
    }

    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut queue: VecDeque<&NodeId> = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == end {
            return true;
        }
        for neighbor in graph.neighbors(current) {
            if visited.insert(&neighbor.id) {
                queue.push_back(&neighbor.id);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("a", 0.0, 0.0),
            Node::new("b", 0.0, 0.001),
            Node::new("c", 0.001, 0.001),
            Node::new("lonely", 0.002, 0.002),
        ]
    }

    /// Square around the midpoint of the a-b edge.
    fn midpoint_blockage() -> Blockage {
        Blockage::new(
            "works",
            vec![
                Coordinate::new(0.0004, -0.0001),
                Coordinate::new(0.0006, -0.0001),
                Coordinate::new(0.0006, 0.0001),
                Coordinate::new(0.0004, 0.0001),
            ],
        )
    }

    #[test]
    fn every_node_gets_an_entry() {
        let graph = build_graph(&nodes(), &[Edge::new("a", "b")], &[], &NavigationRules::default());
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.degree(&NodeId::from("lonely")), 0);
        assert_eq!(graph.isolated_nodes().count(), 2);
    }

    #[test]
    fn edges_are_symmetric_with_equal_cost() {
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c").with_weight(42.0)];
        let graph = build_graph(&nodes(), &edges, &[], &NavigationRules::default());

        for edge in &edges {
            let forward = graph
                .neighbors(&edge.from)
                .iter()
                .find(|n| n.id == edge.to)
                .expect("forward link");
            let backward = graph
                .neighbors(&edge.to)
                .iter()
                .find(|n| n.id == edge.from)
                .expect("backward link");
            assert_eq!(forward.cost, backward.cost);
        }

        let bc = &graph.neighbors(&NodeId::from("c"))[0];
        assert_eq!(bc.cost, 42.0);
        let ab = &graph.neighbors(&NodeId::from("a"))[0];
        assert!((ab.cost - 111.19).abs() < 0.1, "default weight {}", ab.cost);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn unknown_endpoints_are_dropped() {
        let edges = vec![Edge::new("a", "ghost"), Edge::new("ghost", "b")];
        let graph = build_graph(&nodes(), &edges, &[], &NavigationRules::default());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn active_blockage_removes_edge() {
        let edges = vec![Edge::new("a", "b")];
        let graph = build_graph(
            &nodes(),
            &edges,
            &[midpoint_blockage()],
            &NavigationRules::default(),
        );
        assert!(graph.neighbors(&NodeId::from("a")).is_empty());
        assert!(graph.neighbors(&NodeId::from("b")).is_empty());
    }

    #[test]
    fn inactive_blockage_is_ignored() {
        let edges = vec![Edge::new("a", "b")];
        let graph = build_graph(
            &nodes(),
            &edges,
            &[midpoint_blockage().inactive()],
            &NavigationRules::default(),
        );
        assert_eq!(graph.neighbors(&NodeId::from("a"))[0].id, NodeId::from("b"));
        assert_eq!(graph.neighbors(&NodeId::from("b"))[0].id, NodeId::from("a"));
    }

    #[test]
    fn degenerate_blockage_never_blocks() {
        let sliver = Blockage::new(
            "sliver",
            vec![Coordinate::new(-1.0, -1.0), Coordinate::new(1.0, 1.0)],
        );
        let graph = build_graph(
            &nodes(),
            &[Edge::new("a", "b")],
            &[sliver],
            &NavigationRules::default(),
        );
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn reachability_is_symmetric() {
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
        let graph = build_graph(&nodes(), &edges, &[], &NavigationRules::default());
        let ids: Vec<NodeId> = nodes().into_iter().map(|n| n.id).collect();

        for x in &ids {
            for y in &ids {
                assert_eq!(can_reach(x, y, &graph), can_reach(y, x, &graph), "{x} <-> {y}");
            }
        }
        assert!(can_reach(&NodeId::from("a"), &NodeId::from("c"), &graph));
        assert!(!can_reach(&NodeId::from("a"), &NodeId::from("lonely"), &graph));
    }

    #[test]
    fn components_group_reachable_nodes() {
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
        let graph = build_graph(&nodes(), &edges, &[], &NavigationRules::default());
        let components = graph.connected_components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 3);
        assert_eq!(components[1], vec![NodeId::from("lonely")]);
    }

    #[test]
    fn reachability_terminates_on_cycles_and_unknown_ids() {
        let edges = vec![
            Edge::new("a", "b"),
            Edge::new("b", "c"),
            Edge::new("c", "a"),
        ];
        let graph = build_graph(&nodes(), &edges, &[], &NavigationRules::default());
        assert!(!can_reach(&NodeId::from("a"), &NodeId::from("lonely"), &graph));
        assert!(!can_reach(&NodeId::from("a"), &NodeId::from("ghost"), &graph));
        assert!(can_reach(&NodeId::from("lonely"), &NodeId::from("lonely"), &graph));
    }

    #[test]
    fn co_located_nodes_link_at_zero_cost() {
        let nodes = vec![
            Node::new("door", 0.0, 0.0),
            Node::new("ramp", 0.0, 0.0),
            Node::new("yard", 0.0, 0.001),
        ];
        let edges = vec![Edge::new("door", "ramp"), Edge::new("ramp", "yard")];
        let graph = build_graph(&nodes, &edges, &[], &NavigationRules::default());

        assert_eq!(graph.edge_count(), 2);
        let forward = graph
            .neighbors(&NodeId::from("door"))
            .iter()
            .find(|n| n.id == NodeId::from("ramp"))
            .expect("door -> ramp");
        let backward = graph
            .neighbors(&NodeId::from("ramp"))
            .iter()
            .find(|n| n.id == NodeId::from("door"))
            .expect("ramp -> door");
        assert_eq!(forward.cost, 0.0);
        assert_eq!(backward.cost, 0.0);
    }
}
