use anyhow::{bail, Context, Result};
use campus_nav_cli::config::Config;
use campus_nav_cli::logging::init_tracing;
use campus_nav_cli::network::{load_network, parse_lat_lng, summarize};
use campus_nav_cli::report::RouteReport;
use campus_nav_core::{
    build_graph, can_reach, find_path, route_between_nodes, CampusNetwork, Coordinate,
    NavigationRules, NodeId, PathRequest, PathResult,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Walking routes over a campus network snapshot", long_about = None)]
struct Args {
    /// Network snapshot JSON (falls back to CAMPUS_NAV_NETWORK)
    #[arg(long, global = true)]
    network: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route between two GPS coordinates
    Route {
        /// Origin as LAT,LNG
        #[arg(long, value_parser = parse_lat_lng)]
        from: Coordinate,

        /// Destination as LAT,LNG
        #[arg(long, value_parser = parse_lat_lng, conflicts_with = "to_building")]
        to: Option<Coordinate>,

        /// Destination building name
        #[arg(long)]
        to_building: Option<String>,

        /// Leave the literal coordinates off the path
        #[arg(long)]
        no_endpoints: bool,

        /// Print turn-by-turn guidance
        #[arg(long)]
        guidance: bool,
    },
    /// Route between two node ids
    Nodes {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        guidance: bool,
    },
    /// Check whether one node can reach another under current blockages
    Reach {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Summarize the network structure
    Inspect,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json)?;

    let config = Config::from_env();
    let rules = config.rules()?;
    let network_path = args
        .network
        .clone()
        .or_else(|| config.network_path.clone())
        .context("no network snapshot given; pass --network or set CAMPUS_NAV_NETWORK")?;
    let network = load_network(&network_path)?;

    match args.command {
        Command::Route {
            from,
            to,
            to_building,
            no_endpoints,
            guidance,
        } => {
            let destination = resolve_destination(&network, to, to_building.as_deref())?;
            tracing::info!(
                from_lat = from.lat,
                from_lng = from.lng,
                to_lat = destination.lat,
                to_lng = destination.lng,
                "routing"
            );
            let request = PathRequest::for_network(&network)
                .origin(from)
                .destination(destination)
                .include_endpoints(!no_endpoints);
            let result = find_path(&request, &rules);
            print_result(&result, Some((from, destination)), &rules, args.json, guidance)?;
        }
        Command::Nodes {
            start,
            end,
            guidance,
        } => {
            let graph = build_graph(&network.nodes, &network.edges, &network.blockages, &rules);
            let start = NodeId::from(start);
            let end = NodeId::from(end);
            let result = route_between_nodes(&graph, &start, &end, &rules);
            let requested = network
                .find_node(&start)
                .zip(network.find_node(&end))
                .map(|(a, b)| (a.coordinate(), b.coordinate()));
            print_result(&result, requested, &rules, args.json, guidance)?;
        }
        Command::Reach { start, end } => {
            let graph = build_graph(&network.nodes, &network.edges, &network.blockages, &rules);
            let start = NodeId::from(start);
            let end = NodeId::from(end);
            for id in [&start, &end] {
                if !graph.contains(id) {
                    bail!("unknown node id {id}");
                }
            }
            let reachable = can_reach(&start, &end, &graph);
            if args.json {
                let body = serde_json::json!({
                    "start": start,
                    "end": end,
                    "reachable": reachable,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!(
                    "{start} -> {end}: {}",
                    if reachable { "reachable" } else { "unreachable" }
                );
            }
        }
        Command::Inspect => {
            let summary = summarize(&network, &rules);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Network: {}", network_path.display());
                println!(
                    "Nodes: {} ({} isolated)",
                    summary.nodes, summary.isolated_nodes
                );
                println!(
                    "Edges: {} usable of {} supplied",
                    summary.edges_usable, summary.edges_supplied
                );
                println!(
                    "Components: {} (largest {})",
                    summary.components, summary.largest_component
                );
                println!("Active blockages: {}", summary.active_blockages);
                println!("Buildings: {}", summary.buildings);
            }
        }
    }

    Ok(())
}

fn resolve_destination(
    network: &CampusNetwork,
    to: Option<Coordinate>,
    to_building: Option<&str>,
) -> Result<Coordinate> {
    match (to, to_building) {
        (Some(coordinate), _) => Ok(coordinate),
        (None, Some(name)) => network
            .find_building(name)
            .map(|building| building.coordinate())
            .with_context(|| format!("no building named '{name}'")),
        (None, None) => bail!("pass --to or --to-building"),
    }
}

fn print_result(
    result: &PathResult,
    requested: Option<(Coordinate, Coordinate)>,
    rules: &NavigationRules,
    json: bool,
    guidance: bool,
) -> Result<()> {
    let report = RouteReport::new(result, requested, rules, Utc::now());
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text(rules, guidance));
    }
    if let Some(message) = result.error_message() {
        tracing::warn!(error = %message, "route failed");
    }
    Ok(())
}
