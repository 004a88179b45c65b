//! route-cli: load a CSV road network, route one request, print the JSON
//! response body.
//!
//! ```text
//! route-cli [--config router.json] [NODES_CSV EDGES_CSV] \
//!           [--from LON,LAT] [--to LON,LAT] [--boost X] [--prefer ID;ID;...]
//! ```
//!
//! Without network paths the bundled sample in `data/` is used.  Set
//! `RUST_LOG=info` (or `debug`) to see what the router is doing.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use br_core::RouterConfig;
use br_network::{load_network_csv, loader::parse_external_ids};
use br_routing::{RouteRequest, RoutingGraph, RoutingService};

// ── Defaults for the bundled sample ───────────────────────────────────────────

const SAMPLE_FROM: (f64, f64) = (-3.2050, 55.9500);
const SAMPLE_TO:   (f64, f64) = (-3.1870, 55.9480);

/// Route one request over a CSV road network and print the GeoJSON response.
#[derive(Parser, Debug)]
#[command(name = "route-cli", version)]
struct Cli {
    /// Nodes CSV (`id,lon,lat`); defaults to the bundled sample
    #[arg(requires = "edges")]
    nodes: Option<PathBuf>,

    /// Edges CSV; defaults to the bundled sample
    edges: Option<PathBuf>,

    /// Router config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start coordinate as LON,LAT
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    from: Option<(f64, f64)>,

    /// End coordinate as LON,LAT
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    to: Option<(f64, f64)>,

    /// Boost multiplier for preferred segments
    #[arg(long)]
    boost: Option<f64>,

    /// Preferred segment ids, `7;8` or `[7, 8]`
    #[arg(long, value_parser = parse_external_ids)]
    prefer: Option<::std::vec::Vec<i64>>,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = s.split_once(',').ok_or_else(|| format!("expected LON,LAT, got {s:?}"))?;
    let lon = lon.trim().parse().map_err(|_| format!("invalid longitude in {s:?}"))?;
    let lat = lat.trim().parse().map_err(|_| format!("invalid latitude in {s:?}"))?;
    Ok((lon, lat))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let args = Cli::parse();
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let nodes = args.nodes.unwrap_or_else(|| data.join("nodes.csv"));
    let edges = args.edges.unwrap_or_else(|| data.join("edges.csv"));

    let config = match &args.config {
        Some(path) => RouterConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RouterConfig::default(),
    };

    // ── Load ──────────────────────────────────────────────────────────────
    let t0 = Instant::now();
    let network = load_network_csv(&nodes, &edges, config.fallback_speed_kph)
        .context("loading network")?;
    let graph = RoutingGraph::build(network).context("indexing network")?;
    info!("Network ready in {:.1} ms", t0.elapsed().as_secs_f64() * 1000.0);

    let service = RoutingService::new(config, graph)?;

    // ── Route ─────────────────────────────────────────────────────────────
    let request = RouteRequest {
        start: args.from.unwrap_or(SAMPLE_FROM),
        end: args.to.unwrap_or(SAMPLE_TO),
        boost_multiplier: args.boost,
        preferred_segment_ids: args.prefer,
    };
    let t1 = Instant::now();
    let outcome = service.route(&request)?;
    info!("Routed in {:.2} ms", t1.elapsed().as_secs_f64() * 1000.0);

    println!("{}", serde_json::to_string_pretty(&outcome.to_response())?);
    Ok(())
}
