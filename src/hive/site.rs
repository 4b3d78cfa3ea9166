//! Sites - fixed comb cells with a persistent type and a transient work state

use crate::core::types::AgentId;
use crate::entity::role::JobKind;
use crate::hive::ledger::ResourceKind;
use crate::hive::topology::SiteCoord;
use serde::{Deserialize, Serialize};

/// What a site is, independent of what is happening on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteType {
    /// Not yet reachable; becomes Unbuilt once neighbors are developed
    Empty,
    Unbuilt,
    /// Constructed but not yet given a purpose
    Built,
    Nursery,
    Producer(ResourceKind),
}

impl SiteType {
    /// The resting state for this type
    pub fn idle_state(&self) -> SiteState {
        match self {
            SiteType::Empty => SiteState::Locked,
            SiteType::Unbuilt => SiteState::Unbuilt,
            SiteType::Built => SiteState::Ready,
            SiteType::Nursery | SiteType::Producer(_) => SiteState::Idle,
        }
    }

    /// Work this type requests on its own while idle
    pub fn work_kind(&self) -> Option<JobKind> {
        match self {
            SiteType::Nursery => Some(JobKind::Nurse),
            SiteType::Producer(_) => Some(JobKind::Producer),
            _ => None,
        }
    }

    /// Developed sites count toward unlocking their neighbors
    pub fn is_developed(&self) -> bool {
        !matches!(self, SiteType::Empty | SiteType::Unbuilt)
    }

    /// Types a ready site may be turned into
    pub fn configurable() -> [SiteType; 3] {
        [
            SiteType::Nursery,
            SiteType::Producer(ResourceKind::Honey),
            SiteType::Producer(ResourceKind::BeeBread),
        ]
    }
}

impl std::str::FromStr for SiteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nursery" => Ok(SiteType::Nursery),
            "honey" => Ok(SiteType::Producer(ResourceKind::Honey)),
            "bread" | "beebread" | "bee_bread" => Ok(SiteType::Producer(ResourceKind::BeeBread)),
            other => Err(format!("unknown site type '{}'", other)),
        }
    }
}

/// Current work state of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteState {
    Locked,
    Unbuilt,
    BuildRequested,
    Building,
    Ready,
    Idle,
    NurseRequested,
    Incubating,
    ProducerRequested,
    Producing,
    CleanerRequested,
    Cleaning,
}

impl SiteState {
    /// State a site enters while waiting for a worker of `kind`
    pub fn requested(kind: JobKind) -> Self {
        match kind {
            JobKind::Builder => SiteState::BuildRequested,
            JobKind::Nurse => SiteState::NurseRequested,
            JobKind::Producer => SiteState::ProducerRequested,
            JobKind::Cleaner => SiteState::CleanerRequested,
        }
    }

    pub fn is_requested(&self) -> bool {
        matches!(
            self,
            SiteState::BuildRequested
                | SiteState::NurseRequested
                | SiteState::ProducerRequested
                | SiteState::CleanerRequested
        )
    }
}

/// A comb cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub coord: SiteCoord,
    pub site_type: SiteType,
    pub state: SiteState,
    /// 0..1 completion of the current working state, for display only
    pub progress: f32,
    /// Agent whose task is bound to this site
    pub worker: Option<AgentId>,
}

impl Site {
    pub fn new(coord: SiteCoord, site_type: SiteType) -> Self {
        Self {
            coord,
            site_type,
            state: site_type.idle_state(),
            progress: 0.0,
            worker: None,
        }
    }

    /// Return to the resting state of the current type
    pub fn settle(&mut self) {
        self.state = self.site_type.idle_state();
        self.progress = 0.0;
        self.worker = None;
    }

    /// Per-tick check: an idle working site asks for its next worker
    pub fn update(&self) -> Option<JobKind> {
        if self.state == SiteState::Idle && self.worker.is_none() {
            self.site_type.work_kind()
        } else {
            None
        }
    }
}
