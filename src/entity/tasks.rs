//! Task queue and execution
//!
//! A task is polled by its agent once per tick: `start` runs once when the
//! task becomes current, `is_done` is checked before every `update`, and a
//! task that reports done is never updated again.

use crate::core::types::Vec2;
use crate::entity::agent::Agent;
use crate::entity::role::{JobKind, Role};
use crate::hive::coordinator::Hive;
use crate::hive::ledger::ResourceKind;
use crate::hive::site::{SiteState, SiteType};
use crate::hive::topology::SiteCoord;
use crate::simulation::events::SimulationEvent;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One bounded unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task {
    /// Travel in a straight line to `target`
    MoveTo { target: Vec2, step: Vec2 },
    Construct { site: SiteCoord, remaining: u32 },
    Incubate { site: SiteCoord, remaining: u32 },
    Sanitize { site: SiteCoord, remaining: u32 },
    Produce { site: SiteCoord, remaining: u32 },
    Expire { remaining: u32 },
    /// Joins the role-pick queue and finishes immediately
    AwaitAssignment,
}

impl Task {
    pub fn move_to(target: Vec2) -> Self {
        Task::MoveTo { target, step: Vec2::default() }
    }

    /// The work task a site of the given kind needs
    pub fn job(kind: JobKind, site: SiteCoord) -> Self {
        match kind {
            JobKind::Builder => Task::Construct { site, remaining: 0 },
            JobKind::Nurse => Task::Incubate { site, remaining: 0 },
            JobKind::Producer => Task::Produce { site, remaining: 0 },
            JobKind::Cleaner => Task::Sanitize { site, remaining: 0 },
        }
    }

    pub fn expire() -> Self {
        Task::Expire { remaining: 0 }
    }

    /// Site this task is bound to, if any
    pub fn site(&self) -> Option<SiteCoord> {
        match self {
            Task::Construct { site, .. }
            | Task::Incubate { site, .. }
            | Task::Sanitize { site, .. }
            | Task::Produce { site, .. } => Some(*site),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::MoveTo { .. } => "move",
            Task::Construct { .. } => "construct",
            Task::Incubate { .. } => "incubate",
            Task::Sanitize { .. } => "sanitize",
            Task::Produce { .. } => "produce",
            Task::Expire { .. } => "expire",
            Task::AwaitAssignment => "await assignment",
        }
    }

    /// One-time setup when the task becomes current
    pub fn start(&mut self, agent: &mut Agent, hive: &mut Hive) {
        let config = hive.config();
        let (speed, epsilon) = (config.agent_speed, config.arrival_epsilon);
        // A zero duration still completes on the first update
        let durations = (
            config.construct_ticks.max(1),
            config.incubate_ticks.max(1),
            config.sanitize_ticks.max(1),
            config.produce_ticks.max(1),
            config.expire_ticks.max(1),
        );
        let brood_food_cost = config.brood_food_cost;

        tracing::debug!("Agent {} starts {}", agent.id, self.name());

        match self {
            Task::MoveTo { target, step } => {
                let delta = *target - agent.position;
                // Zero-distance targets are already reached; leave the step at zero
                *step = if delta.length() < epsilon {
                    Vec2::default()
                } else {
                    delta.normalize() * speed
                };
            }
            Task::Construct { site, remaining } => {
                *remaining = durations.0;
                hive.begin_work(*site, agent.id, SiteState::Building);
            }
            Task::Incubate { site, remaining } => {
                *remaining = durations.1;
                hive.ledger_mut().consume(ResourceKind::BeeBread, brood_food_cost);
                hive.begin_work(*site, agent.id, SiteState::Incubating);
            }
            Task::Sanitize { site, remaining } => {
                *remaining = durations.2;
                hive.begin_work(*site, agent.id, SiteState::Cleaning);
            }
            Task::Produce { site, remaining } => {
                *remaining = durations.3;
                hive.begin_work(*site, agent.id, SiteState::Producing);
            }
            Task::Expire { remaining } => {
                *remaining = durations.4;
                agent.role = Role::Dying;
                hive.withdraw_role_request(agent.id);
            }
            Task::AwaitAssignment => {
                hive.enqueue_for_role(agent.id);
            }
        }
    }

    /// Advance by exactly one tick
    pub fn update(&mut self, agent: &mut Agent, hive: &mut Hive) {
        match self {
            Task::MoveTo { target, step } => {
                let distance = agent.position.distance(target);
                if distance <= step.length() {
                    agent.position = *target;
                } else {
                    agent.position = agent.position + *step;
                }
            }
            Task::Construct { site, remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    finish_construct(*site, hive);
                }
            }
            Task::Incubate { site, remaining } => {
                let duration = hive.config().incubate_ticks.max(1);
                *remaining = remaining.saturating_sub(1);
                hive.set_progress(*site, 1.0 - *remaining as f32 / duration as f32);
                if *remaining == 0 {
                    finish_incubate(*site, hive);
                }
            }
            Task::Sanitize { site, remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    if let Some(s) = hive.site_mut(*site) {
                        s.settle();
                    }
                    tracing::debug!("Site {} sanitized by {}", site, agent.id);
                }
            }
            Task::Produce { site, remaining } => {
                let duration = hive.config().produce_ticks.max(1);
                *remaining = remaining.saturating_sub(1);
                hive.set_progress(*site, 1.0 - *remaining as f32 / duration as f32);
                if *remaining == 0 {
                    finish_produce(*site, hive);
                }
            }
            Task::Expire { remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    hive.remove_agent(agent.id, agent.meals_taken);
                }
            }
            Task::AwaitAssignment => {}
        }
    }

    /// Pure completion predicate
    pub fn is_done(&self, agent: &Agent, arrival_epsilon: f32) -> bool {
        match self {
            Task::MoveTo { target, .. } => agent.position.distance(target) < arrival_epsilon,
            Task::Construct { remaining, .. }
            | Task::Incubate { remaining, .. }
            | Task::Sanitize { remaining, .. }
            | Task::Produce { remaining, .. }
            | Task::Expire { remaining } => *remaining == 0,
            Task::AwaitAssignment => true,
        }
    }
}

fn finish_construct(coord: SiteCoord, hive: &mut Hive) {
    if let Some(site) = hive.site_mut(coord) {
        site.site_type = SiteType::Built;
        site.settle();
    }
    tracing::info!("Site {} built", coord);
    hive.emit(SimulationEvent::SiteBuilt { site: coord });
    hive.reevaluate_unlocks();
}

fn finish_incubate(coord: SiteCoord, hive: &mut Hive) {
    if let Some(site) = hive.site_mut(coord) {
        site.progress = 0.0;
        site.worker = None;
    }
    hive.request_worker(JobKind::Cleaner, coord);

    let birthplace = hive.site_center(coord);
    let zone = hive.config().job_selection_zone;
    let waiting_point = hive.random_point(zone);
    let id = hive.spawn_agent(
        birthplace,
        Role::UnassignedPrimary,
        [Task::move_to(waiting_point), Task::AwaitAssignment],
    );
    tracing::info!("Agent {} hatched at {}", id, coord);
    hive.emit(SimulationEvent::AgentBorn { agent: id, site: coord });
}

fn finish_produce(coord: SiteCoord, hive: &mut Hive) {
    let amount = hive.config().produce_amount;
    let resource = match hive.site_mut(coord) {
        Some(site) => {
            site.progress = 0.0;
            site.worker = None;
            match site.site_type {
                SiteType::Producer(resource) => Some(resource),
                _ => None,
            }
        }
        None => None,
    };

    if let Some(resource) = resource {
        let added = hive.ledger_mut().add(resource, amount);
        tracing::debug!("Site {} produced {} {}", coord, added, resource.name());
        hive.emit(SimulationEvent::ResourceProduced { site: coord, resource, added });
    }
    hive.request_worker(JobKind::Cleaner, coord);
}

/// Queue of tasks for an agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskQueue {
    current: Option<Task>,
    queued: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            current: None,
            queued: VecDeque::new(),
        }
    }

    pub fn current(&self) -> Option<&Task> {
        self.current.as_ref()
    }

    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.queued.extend(tasks);
    }

    /// Detach the current task so it can borrow its agent mutably
    pub fn take_current(&mut self) -> Option<Task> {
        self.current.take()
    }

    pub fn set_current(&mut self, task: Task) {
        self.current = Some(task);
    }

    pub fn pop_next(&mut self) -> Option<Task> {
        self.queued.pop_front()
    }

    pub fn queued(&self) -> impl Iterator<Item = &Task> {
        self.queued.iter()
    }

    pub fn has_queued(&self) -> bool {
        !self.queued.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queued.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentId;

    fn agent_at(x: f32, y: f32) -> Agent {
        Agent::new(AgentId(1), Role::Builder, Vec2::new(x, y))
    }

    #[test]
    fn test_task_queue_fifo() {
        let mut queue = TaskQueue::new();
        assert!(queue.is_idle());

        queue.extend([Task::move_to(Vec2::new(1.0, 1.0)), Task::AwaitAssignment]);
        assert!(!queue.is_idle());
        assert_eq!(queue.queued().count(), 2);

        assert!(matches!(queue.pop_next(), Some(Task::MoveTo { .. })));
        assert_eq!(queue.pop_next(), Some(Task::AwaitAssignment));
        assert!(queue.is_idle());
    }

    #[test]
    fn test_current_counts_as_busy() {
        let mut queue = TaskQueue::new();
        queue.set_current(Task::expire());
        assert!(!queue.is_idle());
        queue.take_current();
        assert!(queue.is_idle());
    }

    #[test]
    fn test_timed_tasks_done_at_zero_remaining() {
        let agent = agent_at(0.0, 0.0);
        let task = Task::Construct { site: SiteCoord::new(0, 0), remaining: 3 };
        assert!(!task.is_done(&agent, 2.0));
        let task = Task::Construct { site: SiteCoord::new(0, 0), remaining: 0 };
        assert!(task.is_done(&agent, 2.0));
        assert!(Task::AwaitAssignment.is_done(&agent, 2.0));
    }

    #[test]
    fn test_move_to_done_within_epsilon() {
        let agent = agent_at(10.0, 10.0);
        assert!(Task::move_to(Vec2::new(11.0, 10.0)).is_done(&agent, 2.0));
        assert!(!Task::move_to(Vec2::new(20.0, 10.0)).is_done(&agent, 2.0));
    }

    #[test]
    fn test_zero_duration_job_still_completes() {
        let mut hive = Hive::new(crate::core::config::SimulationConfig {
            construct_ticks: 0,
            idle_wandering: false,
            ..Default::default()
        });
        hive.clear_agents();
        let coord = SiteCoord::new(0, 0);
        let mut agent = agent_at(0.0, 0.0);

        let mut task = Task::job(JobKind::Builder, coord);
        task.start(&mut agent, &mut hive);
        assert!(!task.is_done(&agent, 2.0));
        task.update(&mut agent, &mut hive);
        assert!(task.is_done(&agent, 2.0));

        let site = hive.site(coord).unwrap();
        assert_eq!(site.site_type, SiteType::Built);
        assert_eq!(site.state, SiteState::Ready);
        assert_eq!(site.worker, None);
    }

    #[test]
    fn test_job_task_for_each_kind() {
        let site = SiteCoord::new(1, 0);
        assert!(matches!(Task::job(JobKind::Builder, site), Task::Construct { .. }));
        assert!(matches!(Task::job(JobKind::Nurse, site), Task::Incubate { .. }));
        assert!(matches!(Task::job(JobKind::Producer, site), Task::Produce { .. }));
        assert!(matches!(Task::job(JobKind::Cleaner, site), Task::Sanitize { .. }));
        assert_eq!(Task::job(JobKind::Cleaner, site).site(), Some(site));
        assert_eq!(Task::expire().site(), None);
    }
}
