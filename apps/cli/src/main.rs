#![deny(warnings)]

//! Headless CLI: runs a scripted farm session and reports the outcome.

mod autopilot;

use anyhow::{Context, Result};
use farm_core::{FarmConfig, GameSpeed};
use farm_runtime::{ClockDriver, SharedEconomy, Snapshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    days: Option<u32>,
    seed: Option<u64>,
    speed: Option<f64>,
    realtime: bool,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next(),
            "--days" => args.days = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--speed" => args.speed = it.next().and_then(|s| s.parse().ok()),
            "--realtime" => args.realtime = true,
            "--json" => args.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn load_config(args: &Args) -> Result<FarmConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            FarmConfig::load(path).with_context(|| format!("loading config from {path}"))?
        }
        None => FarmConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.rng_seed = seed;
    }
    if let Some(speed) = args.speed {
        cfg.clock.speed = GameSpeed::try_from(speed).map_err(anyhow::Error::msg)?;
    }
    Ok(cfg)
}

/// Step through days back to back, without a timer.
fn run_stepwise(economy: &SharedEconomy, days: u32) {
    for _ in 0..days {
        economy.with(autopilot::play_turn);
        economy.advance_day();
    }
}

/// Let the clock drive day advances in real time, playing a turn after each.
async fn run_realtime(economy: &SharedEconomy, cfg: &FarmConfig, days: u32) -> Result<()> {
    let mut clock = ClockDriver::new(economy.clone(), &cfg.clock);
    let mut reports = clock.subscribe();
    economy.with(autopilot::play_turn);
    clock.start()?;
    let mut seen = 0;
    while seen < days {
        let report = reports.recv().await.context("clock stopped unexpectedly")?;
        seen += 1;
        info!(day = report.day, weather = %report.weather, "tick");
        economy.with(autopilot::play_turn);
    }
    clock.pause().await?;
    Ok(())
}

fn print_summary(snap: &Snapshot) {
    let planted = snap.fields.iter().filter(|f| f.is_some()).count();
    let units: u32 = snap.inventory.iter().map(|l| l.count).sum();
    println!(
        "Farm | day: {} | weather: {} | money: ${} | energy: {} | fields: {}/{} | animals: {} | items held: {}",
        snap.day,
        snap.weather,
        snap.currency,
        snap.energy,
        planted,
        snap.fields.len(),
        snap.animals.len(),
        units
    );
    for line in &snap.inventory {
        println!("  {:<12} x{}", line.name, line.count);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    let cfg = load_config(&args)?;
    let days = args.days.unwrap_or(30);
    info!(?args, seed = cfg.rng_seed, speed = %cfg.clock.speed, "starting farm session");

    let economy = SharedEconomy::from_config(&cfg)?;
    if args.realtime {
        run_realtime(&economy, &cfg, days).await?;
    } else {
        run_stepwise(&economy, days);
    }

    let snap = economy.snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print_summary(&snap);
    }
    Ok(())
}
