#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Bastion sessions headlessly.

mod layout_transfer;
mod report;
mod scenario;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use bastion_core::Event;
use bastion_simulation::{query, Simulation};
use bastion_system_map_generation::digest;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use layout_transfer::{LayoutTower, TowerLayout};
use report::Summary;
use scenario::Scenario;

/// Headless Bastion tower-defence runner.
#[derive(Parser, Debug)]
#[command(name = "bastion", version)]
struct Args {
    /// TOML scenario describing the map, waves, balance and towers.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Seed for map generation.
    #[arg(long)]
    seed: Option<u32>,

    /// Number of map rows.
    #[arg(long)]
    rows: Option<u32>,

    /// Number of map columns.
    #[arg(long)]
    cols: Option<u32>,

    /// Wall-clock seconds to simulate.
    #[arg(long)]
    duration: Option<f32>,

    /// Simulation speed multiplier.
    #[arg(long)]
    speed: Option<f32>,

    /// Play procedurally generated waves without end.
    #[arg(long)]
    endless: bool,

    /// Tower layout string to build before the first wave.
    #[arg(long)]
    layout: Option<String>,

    /// Print the layout string of the towers built before the run.
    #[arg(long)]
    export_layout: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// Log filter, overriding `RUST_LOG`.
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn apply_overrides(&self, scenario: &mut Scenario) {
        if let Some(seed) = self.seed {
            scenario.map.seed = seed;
        }
        if let Some(rows) = self.rows {
            scenario.map.rows = rows;
        }
        if let Some(cols) = self.cols {
            scenario.map.cols = cols;
        }
        if let Some(duration) = self.duration {
            scenario.duration = duration;
        }
        if let Some(speed) = self.speed {
            scenario.speed = speed;
        }
        if self.endless {
            scenario.endless = true;
        }
    }
}

/// Entry point for the Bastion command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    args.apply_overrides(&mut scenario);

    let map = scenario.map.generate();
    let mut summary = Summary {
        seed: scenario.map.seed,
        rows: map.rows(),
        cols: map.cols(),
        map_digest: digest(&map),
        ..Summary::default()
    };

    let mut simulation = Simulation::new(map, scenario.wave_source(), scenario.balance.clone());
    simulation.clock_mut().set_speed(scenario.speed);
    summary.waypoints = bastion_world::query::waypoints(query::world(&simulation)).len();

    let mut events = Vec::new();
    for tower in &scenario.towers {
        let _ = simulation.place_tower(tower.kind, tower.cell(), &mut events);
    }
    if let Some(layout) = &args.layout {
        let layout = TowerLayout::decode(layout).context("decode --layout")?;
        build_layout(&mut simulation, &layout, &mut events)?;
    }
    report_rejections(&events);
    summary.record(&events);

    if args.export_layout {
        println!("{}", export_layout(&simulation)?);
    }

    run(&mut simulation, &scenario, &mut summary);
    summary.finish(&simulation);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serialise summary")?
        );
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => {
            EnvFilter::try_new(directives).with_context(|| format!("invalid --log '{directives}'"))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(simulation: &mut Simulation, scenario: &Scenario, summary: &mut Summary) {
    let tick_rate = scenario.tick_rate.max(1);
    let frame = Duration::from_secs_f64(1.0 / f64::from(tick_rate));
    let frames = (f64::from(scenario.duration.max(0.0)) * f64::from(tick_rate)).ceil() as u64;
    debug!(frames, tick_rate, "running headless session");

    let mut events = Vec::new();
    for _ in 0..frames {
        if scenario.auto_start && query::waves(simulation).is_idle() {
            let _ = simulation.start_wave(&mut events);
        }
        summary.simulated_seconds += f64::from(query::clock(simulation).effective_delta(frame));
        simulation.advance(frame, &mut events);
        summary.record(&events);
        events.clear();

        if query::ledger(simulation).is_over() {
            break;
        }
    }
}

fn build_layout(
    simulation: &mut Simulation,
    layout: &TowerLayout,
    out: &mut Vec<Event>,
) -> Result<()> {
    let map = bastion_world::query::map(query::world(simulation));
    if (layout.columns, layout.rows) != (map.cols(), map.rows()) {
        bail!(
            "layout was built for a {}x{} map but the map is {}x{}",
            layout.columns,
            layout.rows,
            map.cols(),
            map.rows()
        );
    }

    for tower in &layout.towers {
        let Some(id) = simulation.place_tower(tower.kind, tower.cell, out) else {
            continue;
        };
        for _ in 1..tower.level {
            if !simulation.upgrade_tower(id, out) {
                break;
            }
        }
    }
    Ok(())
}

fn export_layout(simulation: &Simulation) -> Result<String> {
    let world = query::world(simulation);
    let map = bastion_world::query::map(world);
    let layout = TowerLayout {
        columns: map.cols(),
        rows: map.rows(),
        towers: bastion_world::query::towers(world)
            .iter()
            .map(|tower| LayoutTower {
                kind: tower.kind(),
                cell: tower.cell(),
                level: tower.level(),
            })
            .collect(),
    };
    Ok(layout.encode()?)
}

fn report_rejections(events: &[Event]) {
    for event in events {
        match event {
            Event::TowerPlacementRejected { kind, cell, reason } => {
                warn!(?kind, ?cell, %reason, "tower not placed");
            }
            Event::TowerActionRejected { tower, reason } => {
                warn!(tower = tower.get(), %reason, "tower not upgraded");
            }
            _ => {}
        }
    }
}
