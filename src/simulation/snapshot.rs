//! Read-only views of colony state for front ends

use crate::core::types::{AgentId, Tick, Vec2};
use crate::entity::role::{JobKind, Role};
use crate::hive::coordinator::Hive;
use crate::hive::ledger::ResourceKind;
use crate::hive::site::{SiteState, SiteType};
use crate::hive::topology::SiteCoord;
use crate::simulation::events::FailureCause;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub role: Role,
    pub position: Vec2,
    pub busy: bool,
    pub meals: u32,
    pub task: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteView {
    pub coord: SiteCoord,
    pub center: Vec2,
    pub site_type: SiteType,
    pub state: SiteState,
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerView {
    pub resource: ResourceKind,
    pub amount: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColonySnapshot {
    pub tick: Tick,
    pub paused: bool,
    pub failure: Option<FailureCause>,
    pub agents: Vec<AgentView>,
    pub sites: Vec<SiteView>,
    pub ledger: Vec<LedgerView>,
    /// Waiting site requests per job kind
    pub pending_jobs: Vec<(JobKind, usize)>,
    /// Agents waiting for a role pick, head first
    pub pending_role_picks: Vec<AgentId>,
}

impl ColonySnapshot {
    pub fn capture(hive: &Hive, paused: bool, failure: Option<FailureCause>) -> Self {
        let agents = hive
            .agents()
            .map(|agent| AgentView {
                id: agent.id,
                role: agent.role,
                position: agent.position,
                busy: agent.is_busy(),
                meals: agent.meals_taken,
                task: agent.tasks.current().map(|task| task.name()),
            })
            .collect();

        let sites = hive
            .sites()
            .map(|site| SiteView {
                coord: site.coord,
                center: hive.site_center(site.coord),
                site_type: site.site_type,
                state: site.state,
                progress: site.progress,
            })
            .collect();

        let ledger = ResourceKind::all()
            .into_iter()
            .map(|resource| LedgerView {
                resource,
                amount: hive.ledger().get(resource),
                capacity: hive.ledger().capacity(resource),
            })
            .collect();

        let pending_jobs = JobKind::all()
            .into_iter()
            .map(|kind| (kind, hive.pending_sites(kind).len()))
            .collect();

        Self {
            tick: hive.current_tick,
            paused,
            failure,
            agents,
            sites,
            ledger,
            pending_jobs,
            pending_role_picks: hive.pending_agents().collect(),
        }
    }

    pub fn amount(&self, resource: ResourceKind) -> u32 {
        self.ledger
            .iter()
            .find(|entry| entry.resource == resource)
            .map(|entry| entry.amount)
            .unwrap_or(0)
    }

    pub fn site(&self, coord: SiteCoord) -> Option<&SiteView> {
        self.sites.iter().find(|site| site.coord == coord)
    }

    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    #[test]
    fn test_snapshot_of_seed_colony() {
        let hive = Hive::new(SimulationConfig::default());
        let snapshot = ColonySnapshot::capture(&hive, false, None);

        assert_eq!(snapshot.agents.len(), 4);
        assert!(snapshot.agents.iter().all(|a| !a.busy && a.task.is_none()));
        assert_eq!(snapshot.amount(ResourceKind::Honey), 20);
        assert_eq!(snapshot.site(SiteCoord::new(0, 0)).unwrap().state, SiteState::Unbuilt);
        assert!(snapshot.pending_role_picks.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let hive = Hive::new(SimulationConfig::default());
        let json = ColonySnapshot::capture(&hive, true, None).to_json().unwrap();
        assert!(json.contains("\"paused\": true"));
        assert!(json.contains("Honey"));
    }
}
