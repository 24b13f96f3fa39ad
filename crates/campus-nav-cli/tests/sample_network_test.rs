use campus_nav_cli::network::{load_network, summarize};
use campus_nav_cli::report::RouteReport;
use campus_nav_core::{
    build_graph, can_reach, find_path, CampusNetwork, NavigationRules, NodeId, PathRequest,
};
use chrono::Utc;
use std::path::PathBuf;

fn sample() -> CampusNetwork {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/campus_sample.json");
    load_network(&path).unwrap()
}

#[test]
fn sample_snapshot_loads_with_mixed_field_names() {
    let network = sample();
    assert_eq!(network.nodes.len(), 10);
    assert_eq!(network.edges.len(), 12);
    assert_eq!(network.blockages.len(), 2);
    assert_eq!(network.active_blockages(), 1);
    assert!(network.find_building("langson library").is_some());
}

#[test]
fn aldrich_closure_isolates_center_node() {
    let network = sample();
    let rules = NavigationRules::default();
    let summary = summarize(&network, &rules);
    assert_eq!(summary.edges_usable, 8);
    assert_eq!(summary.isolated_nodes, 2);
    assert_eq!(summary.components, 3);
    assert_eq!(summary.largest_component, 8);

    let graph = build_graph(&network.nodes, &network.edges, &network.blockages, &rules);
    assert!(!can_reach(&NodeId::from(1), &NodeId::from(5), &graph));
    assert!(can_reach(&NodeId::from(1), &NodeId::from(9), &graph));
}

#[test]
fn gate_to_library_walks_around_closure() {
    let network = sample();
    let rules = NavigationRules::default();
    let gate = network.find_node(&NodeId::from(1)).unwrap().coordinate();
    let library = network.find_building("Langson Library").unwrap().coordinate();

    let request = PathRequest::for_network(&network)
        .origin(gate)
        .destination(library);
    let result = find_path(&request, &rules);

    assert!(result.is_ok(), "{:?}", result.error);
    let ids: Vec<&str> = result.path_nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.first(), Some(&"1"));
    assert_eq!(ids.last(), Some(&"9"));
    assert_eq!(ids.len(), 5);
    assert!(!ids.contains(&"5"));
    assert!(result.distance_m > 380.0 && result.distance_m < 410.0);

    let report = RouteReport::new(&result, Some((gate, library)), &rules, Utc::now());
    assert!(report.to_text(&rules, true).contains("Arrive"));
}
