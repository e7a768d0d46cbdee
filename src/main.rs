//! soc-sim entry point: CLI wiring and config-driven runs.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soc_sim::cli::{Args, Command, OfferArgs, OverlayArgs, ScenarioArgs, SimulateArgs, WindowArgs};
use soc_sim::config::ScenarioConfig;
use soc_sim::io::{export, load_csv};
use soc_sim::offer::{compute_offer, summarize};
use soc_sim::series::overlay::{aggregate, overlay_price_full_year};
use soc_sim::series::{build_slots, price_cells};
use soc_sim::sim::{RunReport, derive_costs};
use soc_sim::table::{Table, day_window};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match args.command {
        Command::Simulate(args) => simulate(&args),
        Command::Offer(args) => offer(&args),
        Command::Overlay(args) => overlay(&args),
    }
}

/// Loads the scenario, applies command-line overrides and rejects invalid
/// settings.
fn load_scenario(
    source: &ScenarioArgs,
    window: &WindowArgs,
    overrides: impl FnOnce(&mut ScenarioConfig),
) -> anyhow::Result<ScenarioConfig> {
    let mut cfg = source.load().context("loading scenario")?;
    cfg.schedule.start_date = window.start.or(cfg.schedule.start_date);
    cfg.schedule.end_date = window.end.or(cfg.schedule.end_date);
    overrides(&mut cfg);

    let errors = cfg.validate();
    if !errors.is_empty() {
        let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("invalid scenario:\n  {}", listed.join("\n  "));
    }
    Ok(cfg)
}

fn load_window(input: &Path, cfg: &ScenarioConfig) -> anyhow::Result<Table> {
    let table = load_csv(input).with_context(|| format!("reading {}", input.display()))?;
    let (start, end) = day_window(cfg.schedule.start_date, cfg.schedule.end_date);
    Ok(table.select_range(start, end))
}

fn simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    let cfg = load_scenario(&args.scenario, &args.window, |cfg| {
        if let Some(strategy) = args.strategy {
            cfg.schedule.strategy = strategy;
        }
    })?;

    let table = load_window(&args.input, &cfg)?;
    let slots = build_slots(&table, &cfg.column_overrides()).context("resolving series")?;
    let params = cfg.battery_params();
    let strategy = cfg.schedule.strategy;
    info!(%strategy, slots = slots.len(), "simulating");

    let steps = strategy.simulate_from(params, cfg.schedule.start_date, &slots);
    let costs = derive_costs(&steps, &price_cells(&table));
    let report = RunReport::from_run(strategy, &params, &slots, &steps, &costs);
    println!("{report}");

    if let Some(path) = &args.out {
        export::export_trajectory(&steps, strategy, path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "trajectory written");
    }
    if let Some(path) = &args.cost_out {
        export::export_costs(&costs, path).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "costs written");
    }
    if let Some(path) = &args.report_json {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn offer(args: &OfferArgs) -> anyhow::Result<()> {
    let cfg = load_scenario(&args.scenario, &args.window, |cfg| {
        if args.export_cap_kw.is_some() {
            cfg.offer.export_cap_kw = args.export_cap_kw;
        }
    })?;

    let table = load_window(&args.input, &cfg)?;
    let rows = compute_offer(
        &table,
        cfg.battery.pcs_kw,
        cfg.offer.export_cap_kw,
        &cfg.column_overrides(),
    )
    .context("resolving series")?;

    match summarize(&rows) {
        Some(summary) => println!(
            "Minimum offer: {:.2} kW at {}",
            summary.min_kw, summary.min_at
        ),
        None => println!("Minimum offer: (empty window)"),
    }

    if let Some(path) = &args.out {
        export::export_offer(&rows, path).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "offer written");
    }
    Ok(())
}

fn overlay(args: &OverlayArgs) -> anyhow::Result<()> {
    let table = load_csv(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let overlay = overlay_price_full_year(&table);
    println!("Price overlay: {} dates", overlay.dates.len());

    if let Some(path) = &args.out {
        export::export_overlay(&overlay, path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "overlay written");
    }

    let Some(period) = args.aggregate else {
        return Ok(());
    };
    if !table.has_column(&args.column) {
        warn!(column = %args.column, "aggregation column not found");
    }
    let buckets = aggregate(&table, &args.column, period, args.reduce);
    println!("Aggregated {}: {} buckets", args.column, buckets.len());

    if let Some(path) = &args.aggregate_out {
        export::export_aggregate(&buckets, &args.column, path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "aggregate written");
    }
    Ok(())
}
