//! Agent roles and the job kinds they map to

use serde::{Deserialize, Serialize};

/// Kind of work a site can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobKind {
    Builder,
    Nurse,
    Producer,
    Cleaner,
}

impl JobKind {
    pub fn all() -> [JobKind; 4] {
        [JobKind::Builder, JobKind::Nurse, JobKind::Producer, JobKind::Cleaner]
    }

    pub fn role(&self) -> Role {
        match self {
            JobKind::Builder => Role::Builder,
            JobKind::Nurse => Role::Nurse,
            JobKind::Producer => Role::Producer,
            JobKind::Cleaner => Role::Cleaner,
        }
    }
}

impl std::str::FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "builder" | "build" => Ok(JobKind::Builder),
            "nurse" => Ok(JobKind::Nurse),
            "producer" | "food maker" | "food_maker" => Ok(JobKind::Producer),
            "cleaner" | "clean" => Ok(JobKind::Cleaner),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Current role of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Newborn waiting for a pick among nurse/cleaner
    UnassignedPrimary,
    /// Veteran waiting for a pick among producer/builder
    UnassignedSecondary,
    Nurse,
    Cleaner,
    Producer,
    Builder,
    /// On the way out; never matched again
    Dying,
}

impl Role {
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Role::UnassignedPrimary | Role::UnassignedSecondary)
    }

    /// The job kind this role serves, if it works at all
    pub fn job_kind(&self) -> Option<JobKind> {
        match self {
            Role::Nurse => Some(JobKind::Nurse),
            Role::Cleaner => Some(JobKind::Cleaner),
            Role::Producer => Some(JobKind::Producer),
            Role::Builder => Some(JobKind::Builder),
            _ => None,
        }
    }

    /// Roles an unassigned agent may be given
    pub fn permitted_picks(&self) -> &'static [JobKind] {
        match self {
            Role::UnassignedPrimary => &[JobKind::Nurse, JobKind::Cleaner],
            Role::UnassignedSecondary => &[JobKind::Producer, JobKind::Builder],
            _ => &[],
        }
    }

    pub fn permits(&self, kind: JobKind) -> bool {
        self.permitted_picks().contains(&kind)
    }

    /// Nurses and cleaners graduate to the secondary pool as they age
    pub fn is_junior(&self) -> bool {
        matches!(self, Role::Nurse | Role::Cleaner)
    }
}
