//! grid — parking search on a synthetic street grid.
//!
//! ```text
//! cargo run -p grid --release -- [config.json] [output_dir]
//! ```
//!
//! Without a config file the built-in defaults below are used.  With an
//! output directory every parked vehicle and every step is written as CSV.
//! Set `RUST_LOG=info` (or `debug`) to follow the runs.

mod network;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use ps_core::{SearchConfig, Step};
use ps_output::{CsvWriter, SearchOutputObserver};
use ps_sim::{
    ConstantSpeedEngine, NoopObserver, RunSummary, Runner, SearchObserver, SessionBuilder, TripGenerator,
};
use ps_spatial::RoadGraph;

use network::{avoid_avenues, build_network};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Metres per step, about 30 km/h with one-second steps.
const SPEED_M_PER_STEP: f64 = 8.0;
/// Departures are spread over this many steps.
const DEPARTURE_WINDOW: u64 = 60;

fn default_config() -> SearchConfig {
    SearchConfig {
        available_spaces:  40,
        vehicles:          50,
        cooperation_ratio: 0.5,
        seed:              Some(42),
        runs:              5,
        max_steps:         3_600,
        ..SearchConfig::default()
    }
}

fn load_config(path: &Path) -> Result<SearchConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: SearchConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Run every configured run and fold the summaries together.
fn run_all<O: SearchObserver>(
    graph:    &RoadGraph,
    config:   &SearchConfig,
    observer: &mut O,
    on_run:   impl Fn(&mut O, u32),
) -> Result<RunSummary> {
    let demand = TripGenerator::entries(graph)?.departures(Step(1), DEPARTURE_WINDOW);
    let mut total = RunSummary::default();
    for run in 0..config.runs {
        on_run(&mut *observer, run);
        let session = SessionBuilder::new(graph, config.clone())
            .demand(demand.clone())
            .cooperative_weights(avoid_avenues)
            .run(run)
            .build()?;
        let engine = ConstantSpeedEngine::new(graph, SPEED_M_PER_STEP, session.trips())?;
        let summary = Runner::new(session, engine).run(&mut *observer)?;
        println!(
            "  run {run:>3}: {:>4} parked / {:>4} departed  ({} removed, {} unreachable, {} dead ends)",
            summary.parked, summary.departed, summary.removed, summary.unreachable, summary.dead_ends
        );
        total.absorb(&summary);
    }
    Ok(total)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => default_config(),
    };
    config.validate()?;
    let output_dir = args.next().map(PathBuf::from);

    println!("=== grid — parking search ===");
    println!(
        "Vehicles: {}  |  Available spaces: {}  |  Cooperation: {:.0}%  |  Runs: {}",
        config.vehicles,
        config.available_spaces,
        config.cooperation_ratio * 100.0,
        config.runs
    );
    if config.available_spaces < config.vehicles {
        warn!(
            "fewer available spaces ({}) than vehicles ({}); some searches cannot succeed",
            config.available_spaces, config.vehicles
        );
    }

    let graph = build_network()?;
    println!("Road network: {} nodes, {} edges", graph.node_count(), graph.edge_count());
    println!();

    let t0 = Instant::now();
    let total = match &output_dir {
        Some(dir) => {
            let mut obs = SearchOutputObserver::new(CsvWriter::new(dir)?);
            let total = run_all(&graph, &config, &mut obs, |o, run| o.set_run(run))?;
            obs.finish().context("writing CSV output")?;
            info!("CSV output written to {}", dir.display());
            total
        }
        None => run_all(&graph, &config, &mut NoopObserver, |_, _| {})?,
    };
    let elapsed = t0.elapsed();

    println!();
    println!("Completed {} runs in {:.3} s", config.runs, elapsed.as_secs_f64());
    println!("  departed            : {}", total.departed);
    println!("  parked              : {}", total.parked);
    println!("  success rate        : {:.1}%", total.success_rate() * 100.0);
    match (total.mean_search_steps(), total.mean_search_distance()) {
        (Some(steps), Some(distance)) => {
            println!("  mean search time    : {steps:.1} steps");
            println!("  mean search distance: {distance:.1} m");
        }
        _ => println!("  no vehicle parked"),
    }
    println!(
        "  cooperative parked  : {} / {} departed",
        total.cooperative_parked, total.cooperative_departed
    );
    if total.still_searching > 0 {
        println!("  still searching at max_steps: {}", total.still_searching);
    }

    Ok(())
}
