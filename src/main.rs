//! Bee Hive - Entry Point
//!
//! Interactive front end for the colony simulation. It owns no pixels: every
//! command goes through the colony's command surface and every status line is
//! read from its snapshot.

use bee_hive::core::config::SimulationConfig;
use bee_hive::core::error::Result;
use bee_hive::core::types::AgentId;
use bee_hive::entity::role::JobKind;
use bee_hive::hive::site::SiteType;
use bee_hive::hive::topology::SiteCoord;
use bee_hive::simulation::colony::{ClickOutcome, Colony};
use bee_hive::simulation::events::SimulationEvent;
use clap::Parser;

use std::io::{self, Write};
use std::path::PathBuf;

/// Bee colony simulation
#[derive(Parser, Debug)]
#[command(name = "bee-hive")]
#[command(about = "Run a bee colony simulation from the terminal")]
struct Args {
    /// TOML config file; defaults are used for missing keys
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the PRNG seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bee_hive=info")),
        )
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

    println!("\n=== BEE HIVE ===");
    println!();
    println!("Commands:");
    println!("  tick / t              - Advance simulation by one tick");
    println!("  run <n>               - Run n simulation ticks");
    println!("  status / s            - Show detailed status");
    println!("  json                  - Dump the full snapshot as JSON");
    println!("  click <row> <col>     - Click a site (build / open site menu)");
    println!("  site <row> <col> <t>  - Turn a ready site into nursery|honey|bread");
    println!("  agent <id>            - Click an agent waiting for a role");
    println!("  pick <role>           - Give the waiting agent nurse|cleaner|producer|builder");
    println!("  pause / resume        - Stop or restart ticking");
    println!("  reset                 - Start over from the seed layout");
    println!("  quit / q              - Exit");
    println!();

    loop {
        display_status(&colony);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let words: Vec<&str> = input.split_whitespace().collect();

        match words.as_slice() {
            [] => continue,
            ["quit"] | ["q"] => break,
            ["tick"] | ["t"] => {
                let events = colony.tick();
                print_events(&events);
            }
            ["run", n] => match n.parse::<u32>() {
                Ok(n) => {
                    let mut notable = Vec::new();
                    for _ in 0..n {
                        notable.extend(colony.tick().into_iter().filter(is_notable));
                    }
                    print_events(&notable);
                    println!("Now at tick {}.", colony.hive().current_tick);
                }
                Err(_) => println!("Usage: run <number>"),
            },
            ["status"] | ["s"] => display_detailed_status(&colony),
            ["json"] => println!("{}", colony.snapshot().to_json()?),
            ["click", row, col] => match parse_coord(row, col) {
                Some(coord) => match colony.click_site(coord) {
                    ClickOutcome::WorkerRequested(kind) => {
                        println!("Site {} requested a {:?}", coord, kind)
                    }
                    ClickOutcome::SiteMenu(options) => {
                        println!("Site {} is ready. Options: {:?}", coord, options);
                        println!("Use: site {} {} <nursery|honey|bread>", coord.row, coord.col);
                    }
                    _ => println!("Nothing to do at {}", coord),
                },
                None => println!("Usage: click <row> <col>"),
            },
            ["site", row, col, kind] => {
                match (parse_coord(row, col), kind.parse::<SiteType>()) {
                    (Some(coord), Ok(site_type)) => {
                        if colony.configure_site(coord, site_type) {
                            println!("Site {} is now {:?}", coord, site_type);
                        } else {
                            println!("Site {} is not ready", coord);
                        }
                    }
                    (_, Err(e)) => println!("{}", e),
                    _ => println!("Usage: site <row> <col> <nursery|honey|bread>"),
                }
            }
            ["agent", id] => match id.trim_start_matches('#').parse::<u64>() {
                Ok(id) => match colony.click_agent(AgentId(id)) {
                    ClickOutcome::RoleMenu { agent, options } => {
                        println!("Agent {} awaits a role: {:?}", agent, options)
                    }
                    _ => println!("Agent #{} is not next in line for a role", id),
                },
                Err(_) => println!("Usage: agent <id>"),
            },
            ["pick", role] => match role.parse::<JobKind>() {
                Ok(kind) => println!("{:?}", colony.pick_role(kind)),
                Err(e) => println!("{}", e),
            },
            ["pause"] => colony.pause(),
            ["resume"] => colony.resume(),
            ["reset"] => colony.reset(),
            _ => println!("Unknown command."),
        }
    }

    println!(
        "\nGoodbye! Final state: {} agents, {} ticks elapsed.",
        colony.hive().agent_count(),
        colony.hive().current_tick
    );
    Ok(())
}

fn parse_coord(row: &str, col: &str) -> Option<SiteCoord> {
    Some(SiteCoord::new(row.parse().ok()?, col.parse().ok()?))
}

fn is_notable(event: &SimulationEvent) -> bool {
    !matches!(
        event,
        SimulationEvent::MealTaken { .. } | SimulationEvent::WorkerRequested { .. }
    )
}

fn print_events(events: &[SimulationEvent]) {
    for event in events {
        println!("  * {:?}", event);
    }
}

/// Display a brief status summary
fn display_status(colony: &Colony) {
    let snapshot = colony.snapshot();
    let ledger: Vec<String> = snapshot
        .ledger
        .iter()
        .map(|entry| format!("{} {}/{}", entry.resource.name(), entry.amount, entry.capacity))
        .collect();

    println!();
    println!(
        "--- Tick {} | Agents: {} | {}{}{} ---",
        snapshot.tick,
        snapshot.agents.len(),
        ledger.join(", "),
        if snapshot.paused { " | PAUSED" } else { "" },
        match snapshot.failure {
            Some(cause) => format!(" | FAILED ({:?})", cause),
            None => String::new(),
        }
    );
    if let Some(head) = snapshot.pending_role_picks.first() {
        println!("  Agent {} is waiting for a role", head);
    }
}

/// Display detailed status of agents and developed sites
fn display_detailed_status(colony: &Colony) {
    let snapshot = colony.snapshot();

    println!();
    println!("=== Detailed Status (Tick {}) ===", snapshot.tick);
    for agent in &snapshot.agents {
        println!(
            "  {} {:?} at ({:.0}, {:.0}) meals {} - {}",
            agent.id,
            agent.role,
            agent.position.x,
            agent.position.y,
            agent.meals,
            agent.task.unwrap_or("idle")
        );
    }
    println!();
    for site in snapshot.sites.iter().filter(|s| s.site_type != SiteType::Empty) {
        println!(
            "  {} {:?} {:?} {:.0}%",
            site.coord,
            site.site_type,
            site.state,
            site.progress * 100.0
        );
    }
    for (kind, waiting) in &snapshot.pending_jobs {
        if *waiting > 0 {
            println!("  {} site(s) waiting for a {:?}", waiting, kind);
        }
    }
    println!();
}
