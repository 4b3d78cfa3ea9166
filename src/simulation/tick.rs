//! Simulation tick - the only caller of the per-tick update entry points

use crate::hive::coordinator::Hive;
use crate::simulation::events::{FailureCause, SimulationEvent};

/// Run a single simulation tick
///
/// Order:
/// 1. Update every agent (meals, lifecycle, task polling, job requests)
/// 2. Update every site (idle working sites request workers)
/// 3. Advance tick counter
///
/// Returns the events that occurred during this tick.
pub fn run_simulation_tick(hive: &mut Hive) -> Vec<SimulationEvent> {
    hive.tick();
    hive.drain_events()
}

/// The colony-failure condition: an empty ledger counter or no live agents
pub fn check_failure(hive: &Hive) -> Option<FailureCause> {
    if let Some(resource) = hive.ledger().exhausted() {
        return Some(FailureCause::ResourceExhausted(resource));
    }
    if hive.agent_count() == 0 {
        return Some(FailureCause::NoAgents);
    }
    None
}
