//! Campus Nav CLI - Command line tools for the campus pathfinding engine.
//!
//! This crate provides the CLI binaries:
//! - campus-nav: route, reach and inspect against a network snapshot
//! - nav_stress: timed A* runs over synthetic campus grids

pub mod config;
pub mod logging;
pub mod network;
pub mod report;
pub mod synthetic;

pub use config::Config;
pub use network::{load_network, parse_lat_lng, summarize, NetworkSummary};
pub use report::RouteReport;
