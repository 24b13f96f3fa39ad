//! End-to-end routing over snapshots shaped like the data-sync layer's rows.

use campus_nav_core::{
    build_graph, can_reach, find_path, find_path_default, haversine_distance, Coordinate,
    NavigationRules, NetworkSnapshot, Node, NodeId, PathRequest, RouteError,
};
use serde_json::json;

fn snapshot(value: serde_json::Value) -> campus_nav_core::CampusNetwork {
    NetworkSnapshot::from_json(&value.to_string())
        .expect("valid json")
        .into_network()
        .expect("valid network")
}

/// A 3x3 grid of walkways with ~55 m spacing and mixed edge naming.
fn quad() -> serde_json::Value {
    let mut nodes = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            nodes.push(json!({
                "id": row * 3 + col,
                "lat": 33.6400 + row as f64 * 0.0005,
                "lng": -117.8400 + col as f64 * 0.0005,
            }));
        }
    }
    let mut edges = Vec::new();
    for row in 0..3 {
        for col in 0..3 {
            let id = row * 3 + col;
            if col < 2 {
                edges.push(json!({"from": id, "to": id + 1}));
            }
            if row < 2 {
                edges.push(json!({"from_node": id.to_string(), "to_node": (id + 3).to_string()}));
            }
        }
    }
    json!({"nodes": nodes, "edges": edges, "blockages": []})
}

fn corner(network: &campus_nav_core::CampusNetwork, id: &str) -> Coordinate {
    network
        .find_node(&NodeId::from(id))
        .map(Node::coordinate)
        .expect("node exists")
}

#[test]
fn grid_route_is_manhattan_length() {
    let network = snapshot(quad());
    let request = PathRequest::for_network(&network)
        .origin(corner(&network, "0"))
        .destination(corner(&network, "8"))
        .include_endpoints(false);

    let result = find_path_default(&request);
    assert!(result.is_ok(), "{:?}", result.error_message());
    assert_eq!(result.path_nodes.first().map(|n| n.id.as_str()), Some("0"));
    assert_eq!(result.path_nodes.last().map(|n| n.id.as_str()), Some("8"));
    assert_eq!(result.path_nodes.len(), 5);

    // Four legs of ~55 m; which corner is taken on ties is unspecified.
    let leg_lat = haversine_distance(33.64, -117.84, 33.6405, -117.84);
    let leg_lng = haversine_distance(33.64, -117.84, 33.64, -117.8395);
    let expected = 2.0 * leg_lat + 2.0 * leg_lng;
    assert!((result.distance_m - expected).abs() <= 2.0, "{} vs {expected}", result.distance_m);
}

#[test]
fn active_blockage_closes_the_centre() {
    let mut value = quad();
    // Covers node 4 and the midpoints of all four edges touching it.
    value["blockages"] = json!([{
        "id": "construction",
        "active": true,
        "polygon": [
            {"lng": -117.83965, "lat": 33.64035},
            {"lng": -117.83935, "lat": 33.64035},
            {"lng": -117.83935, "lat": 33.64065},
            {"lng": -117.83965, "lat": 33.64065}
        ]
    }]);
    let network = snapshot(value.clone());
    let rules = NavigationRules::default();
    let graph = build_graph(&network.nodes, &network.edges, &network.blockages, &rules);
    assert_eq!(graph.degree(&NodeId::from("4")), 0);
    assert_eq!(graph.len(), 9);

    let request = PathRequest::for_network(&network)
        .origin(corner(&network, "1"))
        .destination(corner(&network, "7"))
        .include_endpoints(false);
    let result = find_path(&request, &rules);
    assert!(result.is_ok());
    assert!(result.path_nodes.iter().all(|n| n.id.as_str() != "4"));
    assert_eq!(result.path_nodes.len(), 5);

    value["blockages"][0]["active"] = json!(false);
    let network = snapshot(value);
    let graph = build_graph(&network.nodes, &network.edges, &network.blockages, &rules);
    assert_eq!(graph.degree(&NodeId::from("4")), 4);
}

#[test]
fn blockage_straddling_an_edge_removes_both_directions() {
    let network = snapshot(json!({
        "nodes": [
            {"id": "west", "lat": 33.64, "lng": -117.841},
            {"id": "east", "lat": 33.64, "lng": -117.839}
        ],
        "edges": [{"from": "west", "to": "east"}],
        "blockages": [{
            "id": 1,
            "active": true,
            "polygon": [
                {"lng": -117.8402, "lat": 33.6398},
                {"lng": -117.8398, "lat": 33.6398},
                {"lng": -117.8398, "lat": 33.6402},
                {"lng": -117.8402, "lat": 33.6402}
            ]
        }]
    }));
    let graph = build_graph(
        &network.nodes,
        &network.edges,
        &network.blockages,
        &NavigationRules::default(),
    );
    let west = NodeId::from("west");
    let east = NodeId::from("east");
    assert!(graph.neighbors(&west).iter().all(|n| n.id != east));
    assert!(graph.neighbors(&east).iter().all(|n| n.id != west));
    assert!(!can_reach(&west, &east, &graph));
}

#[test]
fn disconnected_clusters_report_an_error() {
    // A chain of 21 nodes around the origin and a separate pair far away, so
    // none of the origin's nearest candidates can reach the destination.
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for i in 0..21 {
        nodes.push(Node::new(format!("west-{i}"), 33.64, -117.85 + i as f64 * 0.0001));
        if i > 0 {
            edges.push(campus_nav_core::Edge::new(
                format!("west-{}", i - 1),
                format!("west-{i}"),
            ));
        }
    }
    nodes.push(Node::new("east-a", 33.65, -117.80));
    nodes.push(Node::new("east-b", 33.6505, -117.80));
    edges.push(campus_nav_core::Edge::new("east-a", "east-b"));

    let request = PathRequest::new(&nodes, &edges)
        .origin(Coordinate::new(-117.85, 33.64))
        .destination(Coordinate::new(-117.80, 33.6502));
    let result = find_path_default(&request);

    assert!(matches!(result.error, Some(RouteError::Disconnected { .. })));
    assert!(result.path.is_empty());
    assert!(result.path_nodes.is_empty());
    assert_eq!(result.distance_m, 0.0);
    assert_eq!(result.start_node.map(|n| n.id), Some(NodeId::from("west-0")));
    assert!(result.end_node.is_some());
}

#[test]
fn reachability_bias_jumps_to_the_destination_component() {
    // Same shape as above but the candidate window is wide enough to see
    // the far component, so the start snaps there instead of failing.
    let nodes = vec![
        Node::new("here-a", 33.64, -117.85),
        Node::new("here-b", 33.64, -117.8499),
        Node::new("there-a", 33.641, -117.85),
        Node::new("there-b", 33.6415, -117.85),
    ];
    let edges = vec![
        campus_nav_core::Edge::new("here-a", "here-b"),
        campus_nav_core::Edge::new("there-a", "there-b"),
    ];
    let request = PathRequest::new(&nodes, &edges)
        .origin(Coordinate::new(-117.85, 33.64))
        .destination(Coordinate::new(-117.85, 33.6415));
    let result = find_path_default(&request);
    assert!(result.is_ok());
    assert_eq!(result.start_node.map(|n| n.id), Some(NodeId::from("there-a")));
}

#[test]
fn same_node_shortcut_uses_literal_distance() {
    let nodes = vec![Node::new("gate", 33.64, -117.84), Node::new("hall", 33.641, -117.84)];
    let edges = vec![campus_nav_core::Edge::new("gate", "hall")];
    let start = Coordinate::new(-117.84002, 33.63998);
    let end = Coordinate::new(-117.83998, 33.64002);

    let result = find_path_default(&PathRequest::new(&nodes, &edges).origin(start).destination(end));
    assert!(result.is_ok());
    assert_eq!(result.path.len(), 3);
    assert_eq!(result.path[0], start);
    assert_eq!(result.path[2], end);
    assert_eq!(result.path_nodes.len(), 1);
    let literal = haversine_distance(start.lat, start.lng, end.lat, end.lng).round();
    assert_eq!(result.distance_m, literal);

    let result = find_path_default(
        &PathRequest::new(&nodes, &edges)
            .origin(start)
            .destination(end)
            .include_endpoints(false),
    );
    let gate = nodes[0].coordinate();
    assert_eq!(result.path, vec![gate, end]);
    assert_eq!(result.path_nodes[0].coordinate(), result.path[0]);
    assert_eq!(result.distance_m, literal);
}

#[test]
fn endpoint_legs_are_added_to_distance() {
    let network = snapshot(quad());
    let start = Coordinate::new(-117.8401, 33.6399);
    let end = Coordinate::new(-117.8389, 33.6411);

    let without = find_path_default(
        &PathRequest::for_network(&network)
            .origin(start)
            .destination(end)
            .include_endpoints(false),
    );
    let with = find_path_default(
        &PathRequest::for_network(&network).origin(start).destination(end),
    );
    assert!(without.is_ok() && with.is_ok());
    assert_eq!(with.path.len(), without.path.len() + 2);
    assert_eq!(with.path.first(), Some(&start));
    assert_eq!(with.path.last(), Some(&end));

    let legs = haversine_distance(start.lat, start.lng, 33.64, -117.84)
        + haversine_distance(33.641, -117.839, end.lat, end.lng);
    assert!((with.distance_m - without.distance_m - legs).abs() <= 1.0);
}
