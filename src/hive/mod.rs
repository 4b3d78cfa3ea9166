//! Hive layer - comb topology, sites, ledger and the coordinator

pub mod coordinator;
pub mod ledger;
pub mod site;
pub mod topology;

pub use coordinator::{Hive, RolePickOutcome};
pub use ledger::{Ledger, ResourceKind};
pub use site::{Site, SiteState, SiteType};
pub use topology::SiteCoord;
