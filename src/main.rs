// Slatecraft entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to stderr, stdout carries the report)
// 2. Parse arguments, load settings
// 3. Load the player pool CSV
// 4. Build lineups
// 5. Simulate outcomes, attach metrics to lineups
// 6. Aggregate portfolio exposure
// 7. Export the upload CSV
// 8. Print the run summary

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use slatecraft::config;
use slatecraft::export;
use slatecraft::optimizer;
use slatecraft::pool;
use slatecraft::portfolio;
use slatecraft::roster::{RosterTemplate, Site};
use slatecraft::sim;

const EXPORT_PATH: &str = "lineups.csv";

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("slatecraft starting up");

    // 2. Parse arguments, load settings
    let mut args = std::env::args().skip(1);
    let players_path = match args.next() {
        Some(p) => PathBuf::from(p),
        None => {
            eprintln!("usage: slatecraft <players.csv> [settings.toml]");
            std::process::exit(2);
        }
    };
    let settings = match args.next() {
        Some(p) => config::load_settings(Path::new(&p))
            .with_context(|| format!("failed to load settings from {p}"))?,
        None => {
            info!("no settings file given, using defaults");
            config::Settings::default()
        }
    };
    info!(
        "settings: {} lineups, exposure cap {}, {} trials, sport {}",
        settings.optimizer.max_lineups,
        settings.optimizer.max_exposure,
        settings.simulation.trials,
        settings.optimizer.sport
    );

    // 3. Load the player pool
    let pool = pool::load_pool(&players_path)
        .with_context(|| format!("failed to load player pool from {}", players_path.display()))?;
    info!(
        "loaded {} players ({} active)",
        pool.len(),
        pool.active().count()
    );

    // 4. Build lineups
    let result = optimizer::build_lineups(&pool, &settings.optimizer)
        .context("lineup optimization failed")?;
    match &result.message {
        Some(msg) => info!("optimizer: {:?} ({msg})", result.status),
        None => info!("optimizer: {:?}", result.status),
    }
    if !result.is_usable() {
        anyhow::bail!(
            "no lineups produced: {}",
            result.message.as_deref().unwrap_or("infeasible")
        );
    }
    let mut lineups = result.lineups.clone();

    // 5. Simulate outcomes
    let sim_result = sim::simulate(&pool, &lineups, &settings.simulation)
        .context("simulation failed")?;
    sim::apply_metrics(&sim_result, &mut lineups);

    // 6. Aggregate portfolio exposure
    let summary = portfolio::aggregate(&lineups, &pool);
    for (id, exposure) in summary.over_exposed(settings.optimizer.max_exposure) {
        warn!("player {id} exposure {:.0}% is at or above the cap", exposure * 100.0);
    }

    // 7. Export the upload CSV
    let template = RosterTemplate::lookup(settings.optimizer.sport, Site::DraftKings);
    export::export_upload_csv(&result, &pool, &template, Path::new(EXPORT_PATH))
        .context("failed to export upload CSV")?;

    // 8. Print the run summary
    print_summary(&lineups, &sim_result, &summary);
    info!("slatecraft finished");
    Ok(())
}

fn print_summary(
    lineups: &[optimizer::Lineup],
    sim_result: &sim::SimulationResult,
    summary: &portfolio::PortfolioSummary,
) {
    println!(
        "built {} lineups, simulated {} trials each",
        lineups.len(),
        sim_result.trials
    );
    for (i, lineup) in lineups.iter().enumerate() {
        let metrics = &sim_result.lineup_metrics[i];
        println!(
            "  #{:<3} salary {:>6}  proj {:>6.1}  sim {:>6.1}  cash {:>5.1}%  boom {:>5.1}%",
            i + 1,
            lineup.total_salary,
            lineup.projected_points,
            metrics.score,
            metrics.cash_percentage * 100.0,
            metrics.boom_percentage * 100.0,
        );
    }
    println!(
        "portfolio: avg pairwise overlap {:.2} players, {} stacked teams",
        summary.average_overlap,
        summary.team_stack_exposure.len()
    );
    println!("upload file written to {EXPORT_PATH}");
}

/// Log to stderr so stdout stays clean for the run summary.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("slatecraft=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
