//! Colony - the simulation loop and the command surface front ends talk to
//!
//! Commands never fail: anything that does not apply to the current state
//! comes back as `ClickOutcome::Ignored` or a rejected role pick.

use crate::core::config::SimulationConfig;
use crate::core::error::{HiveError, Result};
use crate::core::types::AgentId;
use crate::entity::role::JobKind;
use crate::hive::coordinator::{Hive, RolePickOutcome};
use crate::hive::site::{SiteState, SiteType};
use crate::hive::topology::SiteCoord;
use crate::simulation::events::{FailureCause, SimulationEvent};
use crate::simulation::snapshot::ColonySnapshot;
use crate::simulation::tick::{check_failure, run_simulation_tick};

/// What a click did, so the front end can show the follow-up menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    WorkerRequested(JobKind),
    /// A built site awaits a purpose; choose one with `configure_site`
    SiteMenu(Vec<SiteType>),
    /// The head of the role queue awaits a pick; choose one with `pick_role`
    RoleMenu { agent: AgentId, options: Vec<JobKind> },
    Ignored,
}

pub struct Colony {
    config: SimulationConfig,
    hive: Hive,
    paused: bool,
    failure: Option<FailureCause>,
}

impl Colony {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate().map_err(HiveError::InvalidConfig)?;
        tracing::info!("Starting colony with seed {}", config.seed);
        Ok(Self {
            hive: Hive::new(config.clone()),
            config,
            paused: false,
            failure: None,
        })
    }

    pub fn hive(&self) -> &Hive {
        &self.hive
    }

    pub fn hive_mut(&mut self) -> &mut Hive {
        &mut self.hive
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advance by one step; no-op while paused or after failure
    pub fn tick(&mut self) -> Vec<SimulationEvent> {
        if self.paused || self.failure.is_some() {
            return Vec::new();
        }
        if let Some(cause) = check_failure(&self.hive) {
            self.failure = Some(cause);
            return Vec::new();
        }

        let mut events = run_simulation_tick(&mut self.hive);

        if let Some(cause) = check_failure(&self.hive) {
            tracing::info!("Colony failed at tick {}: {:?}", self.hive.current_tick, cause);
            self.failure = Some(cause);
            events.push(SimulationEvent::ColonyFailed { tick: self.hive.current_tick, cause });
        }
        events
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn failure(&self) -> Option<FailureCause> {
        self.failure
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Rebuild topology, agents and ledger from the seed layout
    pub fn reset(&mut self) {
        self.hive = Hive::new(self.config.clone());
        self.paused = false;
        self.failure = None;
        tracing::info!("Colony reset");
    }

    pub fn click_site(&mut self, coord: SiteCoord) -> ClickOutcome {
        let Some(state) = self.hive.site(coord).map(|site| site.state) else {
            return ClickOutcome::Ignored;
        };
        match state {
            SiteState::Unbuilt => {
                self.hive.request_worker(JobKind::Builder, coord);
                ClickOutcome::WorkerRequested(JobKind::Builder)
            }
            SiteState::Ready => ClickOutcome::SiteMenu(SiteType::configurable().to_vec()),
            _ => ClickOutcome::Ignored,
        }
    }

    pub fn configure_site(&mut self, coord: SiteCoord, site_type: SiteType) -> bool {
        self.hive.configure_site(coord, site_type)
    }

    /// Only the agent at the head of the role queue can be picked for
    pub fn click_agent(&mut self, id: AgentId) -> ClickOutcome {
        if self.hive.role_queue_head() != Some(id) {
            return ClickOutcome::Ignored;
        }
        match self.hive.agent(id) {
            Some(agent) => ClickOutcome::RoleMenu {
                agent: id,
                options: agent.role.permitted_picks().to_vec(),
            },
            None => ClickOutcome::Ignored,
        }
    }

    pub fn pick_role(&mut self, kind: JobKind) -> RolePickOutcome {
        self.hive.assign_role(kind)
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot::capture(&self.hive, self.paused, self.failure)
    }
}
