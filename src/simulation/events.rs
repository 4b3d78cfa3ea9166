//! Events emitted during a tick, for log views and tests

use crate::core::types::{AgentId, Tick};
use crate::entity::role::{JobKind, Role};
use crate::hive::ledger::ResourceKind;
use crate::hive::site::SiteType;
use crate::hive::topology::SiteCoord;
use serde::Serialize;

/// Why the colony stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureCause {
    ResourceExhausted(ResourceKind),
    NoAgents,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimulationEvent {
    AgentBorn {
        agent: AgentId,
        site: SiteCoord,
    },
    AgentDied {
        agent: AgentId,
        meals: u32,
    },
    MealTaken {
        agent: AgentId,
        honey_left: u32,
    },
    RoleAssigned {
        agent: AgentId,
        role: Role,
    },
    /// A nurse or cleaner aged into the secondary role pool
    RoleReassigned {
        agent: AgentId,
        previous: Role,
    },
    /// A site asked for a worker; `matched` is None when it was queued
    WorkerRequested {
        site: SiteCoord,
        kind: JobKind,
        matched: Option<AgentId>,
    },
    /// A waiting site request was handed to an agent asking for work
    JobAssigned {
        agent: AgentId,
        site: SiteCoord,
        kind: JobKind,
    },
    SiteBuilt {
        site: SiteCoord,
    },
    SiteUnlocked {
        site: SiteCoord,
    },
    SiteConfigured {
        site: SiteCoord,
        site_type: SiteType,
    },
    ResourceProduced {
        site: SiteCoord,
        resource: ResourceKind,
        added: u32,
    },
    ColonyFailed {
        tick: Tick,
        cause: FailureCause,
    },
}
