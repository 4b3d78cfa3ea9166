//! Ledger - colony-level storage for the two consumable resources

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Consumable resources tracked by the colony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Honey,
    BeeBread,
}

impl ResourceKind {
    pub fn all() -> [ResourceKind; 2] {
        [ResourceKind::Honey, ResourceKind::BeeBread]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Honey => "honey",
            ResourceKind::BeeBread => "bee bread",
        }
    }
}

/// Named counters, each held within `[0, capacity]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Resources stored: kind -> (current, capacity)
    resources: AHashMap<ResourceKind, (u32, u32)>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger entry with a starting amount, clamped to capacity
    pub fn with_entry(mut self, resource: ResourceKind, initial: u32, capacity: u32) -> Self {
        self.resources.insert(resource, (initial.min(capacity), capacity));
        self
    }

    /// Get current amount of a resource
    pub fn get(&self, resource: ResourceKind) -> u32 {
        self.resources.get(&resource).map(|(c, _)| *c).unwrap_or(0)
    }

    /// Get capacity for a resource
    pub fn capacity(&self, resource: ResourceKind) -> u32 {
        self.resources.get(&resource).map(|(_, cap)| *cap).unwrap_or(0)
    }

    /// Add up to the remaining capacity, returns amount actually added
    pub fn add(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        self.resources
            .get_mut(&resource)
            .map_or(0, |(current, capacity)| {
                let added = amount.min(capacity.saturating_sub(*current));
                *current += added;
                added
            })
    }

    /// Remove unconditionally down to zero, returns amount actually removed
    pub fn consume(&mut self, resource: ResourceKind, amount: u32) -> u32 {
        self.resources.get_mut(&resource).map_or(0, |(current, _)| {
            let removed = amount.min(*current);
            *current -= removed;
            removed
        })
    }

    /// First tracked resource that has run out, if any
    pub fn exhausted(&self) -> Option<ResourceKind> {
        ResourceKind::all()
            .into_iter()
            .find(|kind| self.resources.contains_key(kind) && self.get(*kind) == 0)
    }
}
