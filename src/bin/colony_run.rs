//! Headless Colony Runner
//!
//! Runs the colony for a fixed number of ticks with an optional scripted
//! keeper that builds every unlocked site, assigns purposes to built sites
//! and answers role picks. Prints a summary as text or JSON.

use bee_hive::core::config::SimulationConfig;
use bee_hive::core::error::Result;
use bee_hive::entity::role::JobKind;
use bee_hive::hive::coordinator::RolePickOutcome;
use bee_hive::hive::ledger::ResourceKind;
use bee_hive::hive::site::{SiteState, SiteType};
use bee_hive::simulation::colony::Colony;
use bee_hive::simulation::events::SimulationEvent;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Headless colony runner
#[derive(Parser, Debug)]
#[command(name = "colony_run")]
#[command(about = "Run the colony headless and report how it fared")]
struct Args {
    /// Maximum ticks to run
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Let the scripted keeper issue build, site and role commands
    #[arg(long)]
    auto: bool,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

/// JSON output structure
#[derive(Serialize, Default)]
struct RunSummary {
    ticks_run: u64,
    failed: Option<String>,
    final_agents: usize,
    births: u32,
    deaths: u32,
    sites_built: u32,
    sites_unlocked: u32,
    honey_produced: u32,
    bee_bread_produced: u32,
    final_honey: u32,
    final_bee_bread: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bee_hive=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut colony = Colony::new(config)?;
    let mut summary = RunSummary::default();

    for _ in 0..args.ticks {
        if args.auto {
            keeper_turn(&mut colony);
        }
        for event in colony.tick() {
            record(&mut summary, &event);
        }
        if colony.is_failed() {
            break;
        }
    }

    let snapshot = colony.snapshot();
    summary.ticks_run = snapshot.tick;
    summary.failed = snapshot.failure.map(|cause| format!("{:?}", cause));
    summary.final_agents = snapshot.agents.len();
    summary.final_honey = snapshot.amount(ResourceKind::Honey);
    summary.final_bee_bread = snapshot.amount(ResourceKind::BeeBread);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Ran {} ticks", summary.ticks_run);
        match &summary.failed {
            Some(cause) => println!("Colony failed: {}", cause),
            None => println!("Colony survived"),
        }
        println!(
            "Agents: {} (born {}, died {})",
            summary.final_agents, summary.births, summary.deaths
        );
        println!(
            "Sites: {} built, {} unlocked",
            summary.sites_built, summary.sites_unlocked
        );
        println!(
            "Honey: {} (produced {}), bee bread: {} (produced {})",
            summary.final_honey,
            summary.honey_produced,
            summary.final_bee_bread,
            summary.bee_bread_produced
        );
    }
    Ok(())
}

/// One round of keeper decisions against the current snapshot
fn keeper_turn(colony: &mut Colony) {
    let snapshot = colony.snapshot();

    for site in &snapshot.sites {
        match site.state {
            SiteState::Unbuilt => {
                colony.click_site(site.coord);
            }
            SiteState::Ready => {
                // Alternate purposes so both resources and brood get covered
                let options = SiteType::configurable();
                let pick = options[(site.coord.row + site.coord.col).rem_euclid(3) as usize];
                colony.configure_site(site.coord, pick);
            }
            _ => {}
        }
    }

    // Answer the head of the role queue with the first role its pool allows
    for kind in [JobKind::Nurse, JobKind::Producer, JobKind::Cleaner, JobKind::Builder] {
        if let RolePickOutcome::Assigned { .. } = colony.pick_role(kind) {
            break;
        }
    }
}

fn record(summary: &mut RunSummary, event: &SimulationEvent) {
    match event {
        SimulationEvent::AgentBorn { .. } => summary.births += 1,
        SimulationEvent::AgentDied { .. } => summary.deaths += 1,
        SimulationEvent::SiteBuilt { .. } => summary.sites_built += 1,
        SimulationEvent::SiteUnlocked { .. } => summary.sites_unlocked += 1,
        SimulationEvent::ResourceProduced { resource, added, .. } => match resource {
            ResourceKind::Honey => summary.honey_produced += added,
            ResourceKind::BeeBread => summary.bee_bread_produced += added,
        },
        _ => {}
    }
}
