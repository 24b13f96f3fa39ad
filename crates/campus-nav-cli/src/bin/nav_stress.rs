use anyhow::Result;
use campus_nav_cli::config::Config;
use campus_nav_cli::logging::init_tracing;
use campus_nav_cli::synthetic::{generate_grid_campus, random_point, GridSpec};
use campus_nav_core::{find_path, PathRequest};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Time A* over synthetic campus grids", long_about = None)]
struct Args {
    /// Grid rows and columns of the largest campus
    #[arg(long, default_value_t = 60)]
    size: usize,

    /// Random routes per campus size
    #[arg(long, default_value_t = 25)]
    routes: usize,

    /// Blockages per campus
    #[arg(long, default_value_t = 8)]
    blockages: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

struct StressCampus {
    name: String,
    spec: GridSpec,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(false)?;
    let rules = Config::from_env().rules()?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let campuses: Vec<StressCampus> = [args.size / 4, args.size / 2, args.size]
        .into_iter()
        .filter(|size| *size >= 2)
        .map(|size| StressCampus {
            name: format!("{size}x{size} grid"),
            spec: GridSpec {
                rows: size,
                cols: size,
                blockages: args.blockages,
                ..GridSpec::default()
            },
        })
        .collect();

    for campus in campuses {
        println!("\n=== {} ===", campus.name);
        let network = generate_grid_campus(&campus.spec, &mut rng);
        println!(
            "Network: nodes={} edges={} active_blockages={}",
            network.nodes.len(),
            network.edges.len(),
            network.active_blockages()
        );

        let mut ok = 0usize;
        let mut failures = 0usize;
        let mut total_time = Duration::ZERO;
        let mut slowest = Duration::ZERO;
        let mut visited = 0usize;
        let mut distance = 0.0;

        for _ in 0..args.routes {
            let (Some(from), Some(to)) = (
                random_point(&network, &mut rng),
                random_point(&network, &mut rng),
            ) else {
                continue;
            };
            let request = PathRequest::for_network(&network)
                .origin(from)
                .destination(to);

            let started = Instant::now();
            let result = find_path(&request, &rules);
            let elapsed = started.elapsed();
            total_time += elapsed;
            slowest = slowest.max(elapsed);

            if result.is_ok() {
                ok += 1;
                visited += result.nodes_visited;
                distance += result.distance_m;
            } else {
                failures += 1;
                if let Some(message) = result.error_message() {
                    println!(" - {message}");
                }
            }
        }

        let runs = (ok + failures).max(1) as u32;
        if ok == 0 {
            println!("Result: FAIL | routes={} failures={}", ok + failures, failures);
            continue;
        }
        println!(
            "Result: OK | routes={} failures={} avg_visited={} avg_distance={:.0}m",
            ok + failures,
            failures,
            visited / ok,
            distance / ok as f64
        );
        println!(
            "Timing: avg={:.2}ms max={:.2}ms",
            (total_time / runs).as_secs_f64() * 1000.0,
            slowest.as_secs_f64() * 1000.0
        );
    }

    Ok(())
}
