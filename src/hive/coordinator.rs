//! Hive - owns the comb topology, the ledger, the agents and the matching
//! queues, and pairs idle workers with sites that need them
//!
//! Matching is strictly first-come first-served in both directions:
//! - sites waiting for a job kind are served oldest first
//! - agents waiting for a role pick are served head-only, never skipped

use crate::core::config::SimulationConfig;
use crate::core::types::{AgentId, Tick, Vec2, Zone};
use crate::entity::agent::Agent;
use crate::entity::role::{JobKind, Role};
use crate::entity::tasks::Task;
use crate::hive::ledger::{Ledger, ResourceKind};
use crate::hive::site::{Site, SiteState, SiteType};
use crate::hive::topology::{self, SiteCoord, SEED_SITES};
use crate::simulation::events::SimulationEvent;
use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, VecDeque};

/// Starting workers: one per role, lined up in the idle zone
pub const SEED_AGENTS: [(f32, f32, Role); 4] = [
    (100.0, 100.0, Role::Nurse),
    (200.0, 100.0, Role::Builder),
    (300.0, 100.0, Role::Cleaner),
    (400.0, 100.0, Role::Producer),
];

/// Result of a role pick against the head of the waiting queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePickOutcome {
    Assigned { agent: AgentId, role: Role },
    /// The head agent's pool does not include the requested role
    NotPermitted { agent: AgentId, waiting_as: Role },
    NobodyWaiting,
}

/// The colony coordinator
pub struct Hive {
    config: SimulationConfig,
    rng: ChaCha8Rng,
    pub current_tick: Tick,
    sites: BTreeMap<SiteCoord, Site>,
    agents: BTreeMap<AgentId, Agent>,
    ledger: Ledger,
    pending_site_requests: AHashMap<JobKind, VecDeque<SiteCoord>>,
    pending_agent_requests: VecDeque<AgentId>,
    next_agent_id: u64,
    /// Agent currently detached for its own update
    updating: Option<AgentId>,
    /// Set when the detached agent removed itself
    departed: bool,
    events: Vec<SimulationEvent>,
}

impl Hive {
    /// Build a fresh colony from the seed layout
    pub fn new(config: SimulationConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let ledger = Ledger::new()
            .with_entry(ResourceKind::Honey, config.initial_honey, config.honey_capacity)
            .with_entry(ResourceKind::BeeBread, config.initial_bee_bread, config.bee_bread_capacity);

        let mut sites = BTreeMap::new();
        for coord in topology::grid(config.topology_radius) {
            sites.insert(coord, Site::new(coord, SiteType::Empty));
        }
        for coord in SEED_SITES {
            sites.insert(coord, Site::new(coord, SiteType::Unbuilt));
        }

        let mut hive = Self {
            config,
            rng,
            current_tick: 0,
            sites,
            agents: BTreeMap::new(),
            ledger,
            pending_site_requests: AHashMap::new(),
            pending_agent_requests: VecDeque::new(),
            next_agent_id: 1,
            updating: None,
            departed: false,
            events: Vec::new(),
        };

        for (x, y, role) in SEED_AGENTS {
            hive.spawn_agent(Vec2::new(x, y), role, []);
        }
        tracing::debug!(
            "Hive seeded with {} sites and {} agents",
            hive.sites.len(),
            hive.agents.len()
        );
        hive
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // === AGENTS ===

    pub fn spawn_agent(
        &mut self,
        position: Vec2,
        role: Role,
        tasks: impl IntoIterator<Item = Task>,
    ) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;

        let mut agent = Agent::new(id, role, position);
        agent.enqueue(tasks);
        self.agents.insert(id, agent);
        id
    }

    /// Remove an agent for good, whether stored or detached for its update
    pub fn remove_agent(&mut self, id: AgentId, meals: u32) {
        if self.agents.remove(&id).is_none() {
            if self.updating != Some(id) {
                return;
            }
            self.departed = true;
        }
        self.withdraw_role_request(id);
        tracing::info!("Agent {} died after {} meals", id, meals);
        self.emit(SimulationEvent::AgentDied { agent: id, meals });
    }

    /// Remove every agent and role request
    pub fn clear_agents(&mut self) {
        self.agents.clear();
        self.pending_agent_requests.clear();
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn idle_agent_count(&self) -> usize {
        self.agents.values().filter(|a| a.is_idle()).count()
    }

    // === SITES ===

    pub fn site(&self, coord: SiteCoord) -> Option<&Site> {
        self.sites.get(&coord)
    }

    pub fn site_mut(&mut self, coord: SiteCoord) -> Option<&mut Site> {
        self.sites.get_mut(&coord)
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    pub fn site_center(&self, coord: SiteCoord) -> Vec2 {
        coord.center(self.config.origin, self.config.cell_size)
    }

    /// Bind a working agent to a site and enter the working state
    pub fn begin_work(&mut self, coord: SiteCoord, agent: AgentId, state: SiteState) {
        if let Some(site) = self.sites.get_mut(&coord) {
            site.state = state;
            site.worker = Some(agent);
            site.progress = 0.0;
        }
    }

    pub fn set_progress(&mut self, coord: SiteCoord, progress: f32) {
        if let Some(site) = self.sites.get_mut(&coord) {
            site.progress = progress.clamp(0.0, 1.0);
        }
    }

    /// Turn a ready site into a nursery or producer
    pub fn configure_site(&mut self, coord: SiteCoord, site_type: SiteType) -> bool {
        if !SiteType::configurable().contains(&site_type) {
            return false;
        }
        let Some(site) = self.sites.get_mut(&coord) else {
            return false;
        };
        if site.state != SiteState::Ready {
            return false;
        }
        site.site_type = site_type;
        site.settle();
        tracing::info!("Site {} configured as {:?}", coord, site_type);
        self.emit(SimulationEvent::SiteConfigured { site: coord, site_type });
        true
    }

    /// Promote empty sites that sit between two developed neighbors
    ///
    /// Returns the number of sites unlocked. Repeating the call is a no-op.
    pub fn reevaluate_unlocks(&mut self) -> usize {
        let unlocked: Vec<SiteCoord> = self
            .sites
            .values()
            .filter(|site| site.site_type == SiteType::Empty)
            .filter(|site| {
                site.coord.neighbor_pairs().iter().any(|(a, b)| {
                    self.is_developed(*a) && self.is_developed(*b)
                })
            })
            .map(|site| site.coord)
            .collect();

        for coord in &unlocked {
            if let Some(site) = self.sites.get_mut(coord) {
                site.site_type = SiteType::Unbuilt;
                site.settle();
            }
            tracing::info!("Site {} unlocked", coord);
            self.emit(SimulationEvent::SiteUnlocked { site: *coord });
        }
        unlocked.len()
    }

    fn is_developed(&self, coord: SiteCoord) -> bool {
        self.sites
            .get(&coord)
            .map(|site| site.site_type.is_developed())
            .unwrap_or(false)
    }

    // === MATCHING ===

    /// A site asks for a worker of `kind`
    ///
    /// The site joins the back of the kind's queue. If an agent with that
    /// role is idle, it takes the oldest waiting site right away, which is
    /// this one only when nothing older is queued.
    pub fn request_worker(&mut self, kind: JobKind, coord: SiteCoord) {
        match self.sites.get_mut(&coord) {
            Some(site) if !site.state.is_requested() && site.worker.is_none() => {
                site.state = SiteState::requested(kind);
            }
            _ => return,
        }
        self.pending_site_requests.entry(kind).or_default().push_back(coord);

        let role = kind.role();
        let idle_worker = self
            .agents
            .values()
            .find(|agent| agent.role == role && agent.is_idle())
            .map(|agent| agent.id);
        let Some(id) = idle_worker else {
            tracing::debug!("Site {} requested {:?}, queued", coord, kind);
            self.emit(SimulationEvent::WorkerRequested { site: coord, kind, matched: None });
            return;
        };

        let Some(oldest) = self
            .pending_site_requests
            .get_mut(&kind)
            .and_then(|queue| queue.pop_front())
        else {
            return;
        };
        let center = self.site_center(oldest);
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.enqueue([Task::move_to(center), Task::job(kind, oldest)]);
        }

        if oldest == coord {
            tracing::debug!("Site {} requested {:?}, matched {}", coord, kind, id);
            self.emit(SimulationEvent::WorkerRequested { site: coord, kind, matched: Some(id) });
        } else {
            tracing::debug!("Site {} requested {:?}, queued behind {}", coord, kind, oldest);
            self.emit(SimulationEvent::WorkerRequested { site: coord, kind, matched: None });
            self.emit(SimulationEvent::JobAssigned { agent: id, site: oldest, kind });
        }
    }

    /// An idle, role-holding agent asks for work; returns true on a match
    pub fn request_job(&mut self, agent: &mut Agent) -> bool {
        let Some(kind) = agent.role.job_kind() else {
            return false;
        };
        let Some(coord) = self
            .pending_site_requests
            .get_mut(&kind)
            .and_then(|queue| queue.pop_front())
        else {
            return false;
        };

        let center = self.site_center(coord);
        agent.enqueue([Task::move_to(center), Task::job(kind, coord)]);
        tracing::debug!("Agent {} takes {:?} job at {}", agent.id, kind, coord);
        self.emit(SimulationEvent::JobAssigned { agent: agent.id, site: coord, kind });
        true
    }

    /// Sites waiting for `kind`, oldest first
    pub fn pending_sites(&self, kind: JobKind) -> Vec<SiteCoord> {
        self.pending_site_requests
            .get(&kind)
            .map(|queue| queue.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Agents waiting for a role pick, head first
    pub fn pending_agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.pending_agent_requests.iter().copied()
    }

    pub fn role_queue_head(&self) -> Option<AgentId> {
        self.pending_agent_requests.front().copied()
    }

    /// Put an unassigned agent in line for a role pick (at most once)
    pub fn enqueue_for_role(&mut self, id: AgentId) {
        if !self.pending_agent_requests.contains(&id) {
            self.pending_agent_requests.push_back(id);
        }
    }

    pub fn withdraw_role_request(&mut self, id: AgentId) {
        self.pending_agent_requests.retain(|waiting| *waiting != id);
    }

    /// Give the head of the waiting line a role, if its pool allows it
    pub fn assign_role(&mut self, kind: JobKind) -> RolePickOutcome {
        let Some(head) = self.pending_agent_requests.front().copied() else {
            return RolePickOutcome::NobodyWaiting;
        };
        let Some(agent) = self.agents.get_mut(&head) else {
            self.pending_agent_requests.pop_front();
            return RolePickOutcome::NobodyWaiting;
        };
        if !agent.role.permits(kind) {
            tracing::warn!("Agent {} waiting as {:?} cannot become {:?}", head, agent.role, kind);
            return RolePickOutcome::NotPermitted { agent: head, waiting_as: agent.role };
        }

        let role = kind.role();
        agent.role = role;
        self.pending_agent_requests.pop_front();
        tracing::info!("Agent {} becomes {:?}", head, role);
        self.emit(SimulationEvent::RoleAssigned { agent: head, role });
        RolePickOutcome::Assigned { agent: head, role }
    }

    // === ECONOMY ===

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// One meal: a unit of honey, returns what is left
    pub fn feed(&mut self) -> u32 {
        self.ledger.consume(ResourceKind::Honey, 1);
        self.ledger.get(ResourceKind::Honey)
    }

    pub fn random_point(&mut self, zone: Zone) -> Vec2 {
        if zone.is_empty() {
            return zone.min;
        }
        Vec2::new(
            self.rng.gen_range(zone.min.x..=zone.max.x),
            self.rng.gen_range(zone.min.y..=zone.max.y),
        )
    }

    // === TICK ===

    pub fn emit(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Update every agent in id order; agents born this tick wait for the next
    pub fn update_agents(&mut self) {
        let ids: Vec<AgentId> = self.agents.keys().copied().collect();
        for id in ids {
            let Some(mut agent) = self.agents.remove(&id) else {
                continue;
            };
            self.updating = Some(id);
            agent.update(self);
            self.updating = None;
            if !std::mem::take(&mut self.departed) {
                self.agents.insert(id, agent);
            }
        }
    }

    /// Idle working sites ask for their next worker, in (row, col) order
    pub fn update_sites(&mut self) {
        let requests: Vec<(SiteCoord, JobKind)> = self
            .sites
            .values()
            .filter_map(|site| site.update().map(|kind| (site.coord, kind)))
            .collect();
        for (coord, kind) in requests {
            self.request_worker(kind, coord);
        }
    }

    /// Advance agents then sites by one tick
    pub fn tick(&mut self) {
        self.update_agents();
        self.update_sites();
        self.current_tick += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            idle_wandering: false,
            ..Default::default()
        }
    }

    fn build(hive: &mut Hive, coord: SiteCoord) {
        let site = hive.site_mut(coord).unwrap();
        site.site_type = SiteType::Built;
        site.settle();
    }

    #[test]
    fn test_seed_layout() {
        let hive = Hive::new(SimulationConfig::default());
        assert_eq!(hive.agent_count(), 4);
        assert_eq!(hive.sites().count(), 49);
        let unbuilt: Vec<_> = hive
            .sites()
            .filter(|s| s.site_type == SiteType::Unbuilt)
            .map(|s| s.coord)
            .collect();
        assert_eq!(unbuilt.len(), 3);
        for coord in SEED_SITES {
            assert!(unbuilt.contains(&coord));
        }
        assert_eq!(hive.ledger().get(ResourceKind::Honey), 20);
    }

    #[test]
    fn test_request_worker_matches_idle_agent() {
        let mut hive = Hive::new(quiet_config());
        let coord = SiteCoord::new(0, 0);
        hive.request_worker(JobKind::Builder, coord);

        assert_eq!(hive.site(coord).unwrap().state, SiteState::BuildRequested);
        assert!(hive.pending_sites(JobKind::Builder).is_empty());
        let builder = hive.agents().find(|a| a.role == Role::Builder).unwrap();
        assert!(builder.is_busy());
        let queued: Vec<_> = builder.tasks.queued().collect();
        assert!(matches!(queued[0], Task::MoveTo { .. }));
        assert!(matches!(queued[1], Task::Construct { .. }));
    }

    #[test]
    fn test_request_worker_queues_without_idle_agent() {
        let mut hive = Hive::new(quiet_config());
        hive.clear_agents();
        hive.request_worker(JobKind::Builder, SiteCoord::new(0, 0));
        hive.request_worker(JobKind::Builder, SiteCoord::new(1, 0));
        assert_eq!(
            hive.pending_sites(JobKind::Builder),
            vec![SiteCoord::new(0, 0), SiteCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_site_appears_in_one_queue_only() {
        let mut hive = Hive::new(quiet_config());
        hive.clear_agents();
        let coord = SiteCoord::new(0, 0);
        hive.request_worker(JobKind::Builder, coord);
        hive.request_worker(JobKind::Builder, coord);
        hive.request_worker(JobKind::Cleaner, coord);

        assert_eq!(hive.pending_sites(JobKind::Builder), vec![coord]);
        assert!(hive.pending_sites(JobKind::Cleaner).is_empty());
    }

    #[test]
    fn test_request_job_serves_oldest_first() {
        let mut hive = Hive::new(quiet_config());
        hive.clear_agents();
        hive.request_worker(JobKind::Builder, SiteCoord::new(1, 0));
        hive.request_worker(JobKind::Builder, SiteCoord::new(0, 0));

        let mut agent = Agent::new(AgentId(99), Role::Builder, Vec2::new(0.0, 0.0));
        assert!(hive.request_job(&mut agent));
        let job = agent.tasks.queued().nth(1).unwrap();
        assert_eq!(job.site(), Some(SiteCoord::new(1, 0)));
        assert_eq!(hive.pending_sites(JobKind::Builder), vec![SiteCoord::new(0, 0)]);
    }

    #[test]
    fn test_request_job_without_match_is_noop() {
        let mut hive = Hive::new(quiet_config());
        let mut agent = Agent::new(AgentId(99), Role::Nurse, Vec2::new(0.0, 0.0));
        assert!(!hive.request_job(&mut agent));
        assert!(agent.is_idle());

        let mut waiting = Agent::new(AgentId(100), Role::UnassignedPrimary, Vec2::new(0.0, 0.0));
        assert!(!hive.request_job(&mut waiting));
    }

    #[test]
    fn test_assign_role_is_head_only() {
        let mut hive = Hive::new(quiet_config());
        hive.clear_agents();
        let veteran = hive.spawn_agent(Vec2::new(0.0, 0.0), Role::UnassignedSecondary, []);
        let newborn = hive.spawn_agent(Vec2::new(0.0, 0.0), Role::UnassignedPrimary, []);
        hive.enqueue_for_role(veteran);
        hive.enqueue_for_role(newborn);

        // Nurse fits the newborn, but the veteran is at the head
        assert_eq!(
            hive.assign_role(JobKind::Nurse),
            RolePickOutcome::NotPermitted { agent: veteran, waiting_as: Role::UnassignedSecondary }
        );
        assert_eq!(hive.agent(newborn).unwrap().role, Role::UnassignedPrimary);

        assert_eq!(
            hive.assign_role(JobKind::Builder),
            RolePickOutcome::Assigned { agent: veteran, role: Role::Builder }
        );
        assert_eq!(
            hive.assign_role(JobKind::Nurse),
            RolePickOutcome::Assigned { agent: newborn, role: Role::Nurse }
        );
        assert_eq!(hive.assign_role(JobKind::Nurse), RolePickOutcome::NobodyWaiting);
    }

    #[test]
    fn test_enqueue_for_role_at_most_once() {
        let mut hive = Hive::new(quiet_config());
        let id = hive.spawn_agent(Vec2::new(0.0, 0.0), Role::UnassignedPrimary, []);
        hive.enqueue_for_role(id);
        hive.enqueue_for_role(id);
        assert_eq!(hive.pending_agents().count(), 1);
    }

    #[test]
    fn test_unlock_requires_adjacent_developed_pair() {
        let mut hive = Hive::new(quiet_config());
        build(&mut hive, SiteCoord::new(1, -1));
        assert_eq!(hive.reevaluate_unlocks(), 0);

        build(&mut hive, SiteCoord::new(1, 0));
        let unlocked = hive.reevaluate_unlocks();
        assert_eq!(unlocked, 1);
        let site = hive.site(SiteCoord::new(2, 0)).unwrap();
        assert_eq!(site.site_type, SiteType::Unbuilt);
        assert_eq!(site.state, SiteState::Unbuilt);
        // (0, 0) is adjacent to both but was already unbuilt
        assert_eq!(hive.site(SiteCoord::new(0, 0)).unwrap().site_type, SiteType::Unbuilt);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut hive = Hive::new(quiet_config());
        for coord in SEED_SITES {
            build(&mut hive, coord);
        }
        hive.reevaluate_unlocks();
        let once: Vec<Site> = hive.sites().cloned().collect();
        assert_eq!(hive.reevaluate_unlocks(), 0);
        let twice: Vec<Site> = hive.sites().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_configure_site_only_when_ready() {
        let mut hive = Hive::new(quiet_config());
        let coord = SiteCoord::new(0, 0);
        assert!(!hive.configure_site(coord, SiteType::Nursery));

        build(&mut hive, coord);
        assert!(!hive.configure_site(coord, SiteType::Built));
        assert!(hive.configure_site(coord, SiteType::Nursery));
        assert_eq!(hive.site(coord).unwrap().state, SiteState::Idle);
        assert!(!hive.configure_site(coord, SiteType::Producer(ResourceKind::Honey)));
    }

    #[test]
    fn test_random_point_is_deterministic_and_inside_zone() {
        let zone = SimulationConfig::default().idle_zone;
        let mut a = Hive::new(quiet_config());
        let mut b = Hive::new(quiet_config());
        for _ in 0..10 {
            let p = a.random_point(zone);
            assert!(zone.contains(p));
            assert_eq!(p, b.random_point(zone));
        }
    }

    #[test]
    fn test_request_worker_serves_older_queued_site_first() {
        let mut hive = Hive::new(quiet_config());
        hive.clear_agents();
        let older = SiteCoord::new(1, 0);
        let newer = SiteCoord::new(0, 0);
        hive.request_worker(JobKind::Builder, older);

        // A builder turns up idle without having asked for work yet
        let id = hive.spawn_agent(Vec2::new(0.0, 0.0), Role::Builder, []);
        hive.request_worker(JobKind::Builder, newer);

        let job = hive.agent(id).unwrap().tasks.queued().nth(1).and_then(Task::site);
        assert_eq!(job, Some(older));
        assert_eq!(hive.pending_sites(JobKind::Builder), vec![newer]);
    }

    #[test]
    fn test_remove_unknown_agent_is_noop() {
        let mut hive = Hive::new(quiet_config());
        hive.drain_events();
        hive.remove_agent(AgentId(999), 0);
        assert!(hive.drain_events().is_empty());

        hive.update_agents();
        assert_eq!(hive.agent_count(), 4);
    }

    #[test]
    fn test_agent_ids_never_reused() {
        let mut hive = Hive::new(quiet_config());
        let first = hive.spawn_agent(Vec2::new(0.0, 0.0), Role::Nurse, []);
        hive.remove_agent(first, 0);
        let second = hive.spawn_agent(Vec2::new(0.0, 0.0), Role::Nurse, []);
        assert!(second > first);
    }
}
