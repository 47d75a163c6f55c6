//! sim-runner: headless runner for the gridmarket simulation.
//!
//! Usage:
//!   sim-runner --seed 42 --ticks 100
//!   sim-runner --seed 42 --ticks 500 --config world.json --report-every 50
//!   sim-runner --seed 42 --ticks 100 --random --summary-json

use anyhow::Result;
use gridmarket_core::{config::SimConfig, engine::Simulation};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 100u64);
    let report_every = parse_arg(&args, "--report-every", 10u64);
    let random_mode = args.iter().any(|a| a == "--random");
    let summary_json = args.iter().any(|a| a == "--summary-json");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if !summary_json {
        println!("gridmarket — sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  world:     {}x{}", config.world.width, config.world.height);
        println!(
            "  agents:    {} consumers / {} producers / {} traders",
            config.population.consumers, config.population.producers, config.population.traders
        );
        println!("  decisions: {}", if random_mode { "random" } else { "rule-based" });
        println!();
    }

    let mut sim = Simulation::new(config, seed)?;
    log::debug!("simulation built, running {ticks} ticks");

    for _ in 0..ticks {
        if random_mode {
            sim.step_random();
        } else {
            sim.step();
        }

        if report_every > 0 && sim.tick() % report_every == 0 {
            report(&sim, summary_json)?;
        }
    }

    if summary_json {
        // Always end with the final state, even off the report grid.
        if report_every == 0 || sim.tick() % report_every != 0 {
            report(&sim, true)?;
        }
    } else {
        print_final_summary(&sim);
    }

    Ok(())
}

fn report(sim: &Simulation, as_json: bool) -> Result<()> {
    let summary = sim.summary();
    if as_json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "tick {:>5} | agents {:>3} | wealth {:>9.1} | food {:.3} | ore {:.3} | tools {:.3}",
            summary.tick,
            summary.live_agent_count,
            summary.total_wealth,
            summary.prices.food,
            summary.prices.ore,
            summary.prices.tools,
        );
    }
    Ok(())
}

fn print_final_summary(sim: &Simulation) {
    let summary = sim.summary();
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  final tick:   {}", summary.tick);
    println!("  live agents:  {}", summary.live_agent_count);
    println!("  total wealth: {:.1}", summary.total_wealth);
    println!("  prices:       food={:.3} ore={:.3} tools={:.3}",
        summary.prices.food, summary.prices.ore, summary.prices.tools);
    println!("  stock:        food={:.1} ore={:.1} tools={:.1}",
        summary.quantities.food, summary.quantities.ore, summary.quantities.tools);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
