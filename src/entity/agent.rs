//! Agents - workers that run a private task queue and age by meals

use crate::core::types::{AgentId, Vec2};
use crate::entity::role::Role;
use crate::entity::tasks::{Task, TaskQueue};
use crate::hive::coordinator::Hive;
use crate::simulation::events::SimulationEvent;
use serde::{Deserialize, Serialize};

/// A worker bee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub role: Role,
    pub position: Vec2,
    pub tasks: TaskQueue,
    pub meals_taken: u32,
    pub ticks_since_meal: u32,
    /// Set once the death itinerary has been queued
    expiry_scheduled: bool,
}

impl Agent {
    pub fn new(id: AgentId, role: Role, position: Vec2) -> Self {
        Self {
            id,
            role,
            position,
            tasks: TaskQueue::new(),
            meals_taken: 0,
            ticks_since_meal: 0,
            expiry_scheduled: false,
        }
    }

    /// Idle agents have nothing current and nothing queued
    pub fn is_idle(&self) -> bool {
        self.tasks.is_idle()
    }

    pub fn is_busy(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_expiring(&self) -> bool {
        self.expiry_scheduled
    }

    pub fn enqueue(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    /// Advance one tick. The agent must not be stored in `hive` while this runs.
    pub fn update(&mut self, hive: &mut Hive) {
        self.eat(hive);

        let epsilon = hive.config().arrival_epsilon;
        let finished = match self.tasks.current() {
            Some(task) => task.is_done(self, epsilon),
            None => true,
        };

        if !finished {
            if let Some(mut task) = self.tasks.take_current() {
                task.update(self, hive);
                self.tasks.set_current(task);
            }
            return;
        }

        self.tasks.take_current();
        self.check_lifecycle(hive);

        if !self.tasks.has_queued() {
            if self.role.is_unassigned() || self.role == Role::Dying {
                return;
            }
            if !hive.request_job(self) {
                self.wander(hive);
                return;
            }
        }

        if let Some(mut task) = self.tasks.pop_next() {
            task.start(self, hive);
            self.tasks.set_current(task);
        }
    }

    /// Meals are taken on schedule whether or not honey remains
    fn eat(&mut self, hive: &mut Hive) {
        self.ticks_since_meal += 1;
        if self.ticks_since_meal < hive.config().meal_interval_ticks {
            return;
        }
        self.ticks_since_meal = 0;
        self.meals_taken += 1;
        let honey_left = hive.feed();
        tracing::debug!("Agent {} ate meal {} ({} honey left)", self.id, self.meals_taken, honey_left);
        hive.emit(SimulationEvent::MealTaken { agent: self.id, honey_left });
    }

    /// Role reassignment and death, checked only between tasks so queued
    /// work always runs to completion first
    fn check_lifecycle(&mut self, hive: &mut Hive) {
        let config = hive.config();
        let (reassign_at, death_at) = (config.reassign_after_meals, config.death_after_meals);
        let (job_zone, death_zone) = (config.job_selection_zone, config.death_zone);

        if self.meals_taken >= death_at && !self.expiry_scheduled {
            self.expiry_scheduled = true;
            hive.withdraw_role_request(self.id);
            let resting_place = hive.random_point(death_zone);
            self.enqueue([Task::move_to(resting_place), Task::expire()]);
            tracing::info!("Agent {} is old and leaves the comb", self.id);
            return;
        }

        if self.meals_taken >= reassign_at && self.role.is_junior() && !self.tasks.has_queued() {
            let previous = self.role;
            self.role = Role::UnassignedSecondary;
            let waiting_point = hive.random_point(job_zone);
            self.enqueue([Task::move_to(waiting_point), Task::AwaitAssignment]);
            tracing::info!("Agent {} retires from {:?} and awaits a new role", self.id, previous);
            hive.emit(SimulationEvent::RoleReassigned { agent: self.id, previous });
        }
    }

    /// Filler movement when no work is available; started immediately
    fn wander(&mut self, hive: &mut Hive) {
        if !hive.config().idle_wandering {
            return;
        }
        let zone = hive.config().idle_zone;
        let target = hive.random_point(zone);
        let mut task = Task::move_to(target);
        task.start(self, hive);
        self.tasks.set_current(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    fn quiet_hive(config: SimulationConfig) -> Hive {
        let mut hive = Hive::new(SimulationConfig {
            idle_wandering: false,
            ..config
        });
        hive.clear_agents();
        hive
    }

    #[test]
    fn test_new_agent_is_idle() {
        let agent = Agent::new(AgentId(1), Role::Nurse, Vec2::new(0.0, 0.0));
        assert!(agent.is_idle());
        assert!(!agent.is_busy());
    }

    #[test]
    fn test_meal_consumes_honey_on_schedule() {
        let mut hive = quiet_hive(SimulationConfig {
            meal_interval_ticks: 3,
            initial_honey: 10,
            ..Default::default()
        });
        let mut agent = Agent::new(AgentId(1), Role::Nurse, Vec2::new(100.0, 100.0));

        for _ in 0..2 {
            agent.update(&mut hive);
        }
        assert_eq!(agent.meals_taken, 0);
        agent.update(&mut hive);
        assert_eq!(agent.meals_taken, 1);
        assert_eq!(agent.ticks_since_meal, 0);
        assert_eq!(hive.ledger().get(crate::hive::ledger::ResourceKind::Honey), 9);
    }

    #[test]
    fn test_move_to_zero_distance_finishes_without_moving() {
        let mut hive = quiet_hive(SimulationConfig::default());
        let mut agent = Agent::new(AgentId(1), Role::UnassignedPrimary, Vec2::new(5.0, 5.0));
        agent.enqueue([Task::move_to(Vec2::new(5.0, 5.0))]);

        agent.update(&mut hive); // start
        assert!(agent.is_busy());
        agent.update(&mut hive); // done, queue empty, unassigned stays idle
        assert_eq!(agent.position, Vec2::new(5.0, 5.0));
        assert!(agent.is_idle());
    }

    #[test]
    fn test_move_to_reaches_target() {
        let mut hive = quiet_hive(SimulationConfig::default());
        let mut agent = Agent::new(AgentId(1), Role::UnassignedPrimary, Vec2::new(0.0, 0.0));
        agent.enqueue([Task::move_to(Vec2::new(30.0, 40.0))]);

        for _ in 0..20 {
            agent.update(&mut hive);
        }
        assert!(agent.position.distance(&Vec2::new(30.0, 40.0)) < 2.0);
        assert!(agent.is_idle());
    }

    #[test]
    fn test_junior_reassigned_after_threshold() {
        let mut hive = quiet_hive(SimulationConfig {
            meal_interval_ticks: 1,
            reassign_after_meals: 2,
            death_after_meals: 50,
            ..Default::default()
        });
        let mut agent = Agent::new(AgentId(1), Role::Cleaner, Vec2::new(100.0, 100.0));

        agent.update(&mut hive);
        assert_eq!(agent.role, Role::Cleaner);
        agent.update(&mut hive);
        assert_eq!(agent.role, Role::UnassignedSecondary);
        assert!(matches!(agent.tasks.current(), Some(Task::MoveTo { .. })));
    }

    #[test]
    fn test_senior_roles_not_reassigned() {
        let mut hive = quiet_hive(SimulationConfig {
            meal_interval_ticks: 1,
            reassign_after_meals: 1,
            death_after_meals: 50,
            ..Default::default()
        });
        let mut agent = Agent::new(AgentId(1), Role::Builder, Vec2::new(100.0, 100.0));
        for _ in 0..5 {
            agent.update(&mut hive);
        }
        assert_eq!(agent.role, Role::Builder);
    }

    #[test]
    fn test_death_waits_for_queued_work() {
        let mut hive = quiet_hive(SimulationConfig {
            meal_interval_ticks: 1,
            reassign_after_meals: 1,
            death_after_meals: 2,
            ..Default::default()
        });
        let mut agent = Agent::new(AgentId(1), Role::Builder, Vec2::new(100.0, 100.0));
        let far = Vec2::new(100.0, 180.0);
        agent.enqueue([Task::move_to(far)]);

        agent.update(&mut hive); // start move
        agent.update(&mut hive); // meal 2 while moving
        assert!(agent.meals_taken >= 2);
        assert!(!agent.is_expiring(), "lifecycle waits for the current task");

        for _ in 0..40 {
            agent.update(&mut hive);
            if agent.is_expiring() {
                break;
            }
        }
        assert!(agent.is_expiring());
        assert!(agent.position.distance(&far) < 2.0);
    }
}
