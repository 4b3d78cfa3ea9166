//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Durations are in ticks; the
//! reference front end runs at 60 ticks per second.

use crate::core::error::{HiveError, Result};
use crate::core::types::{Vec2, Zone};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the colony simulation
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === RANDOMNESS ===
    /// Seed for the colony PRNG. `reset()` reseeds from this value, so a run
    /// is fully reproducible from config plus command sequence.
    pub seed: u64,

    // === MOVEMENT ===
    /// Distance an agent covers per tick (world units)
    pub agent_speed: f32,

    /// Distance below which a MoveTo counts as arrived
    pub arrival_epsilon: f32,

    // === TASK DURATIONS ===
    /// Ticks a builder spends constructing a site (2 seconds)
    pub construct_ticks: u32,

    /// Ticks a nurse spends incubating a brood
    pub incubate_ticks: u32,

    /// Ticks a cleaner spends sanitizing a used site
    pub sanitize_ticks: u32,

    /// Ticks a producer spends on one batch
    pub produce_ticks: u32,

    /// Ticks between the start of Expire and the agent's removal
    pub expire_ticks: u32,

    // === AGING ===
    /// Ticks between meals. Each meal consumes one unit of honey.
    pub meal_interval_ticks: u32,

    /// Meals after which nurses and cleaners graduate to the secondary
    /// role pool (producer/builder)
    pub reassign_after_meals: u32,

    /// Meals after which any agent heads to the death zone and expires.
    /// Must be greater than `reassign_after_meals`.
    pub death_after_meals: u32,

    // === ECONOMY ===
    /// Units added to the ledger by one completed Produce task
    pub produce_amount: u32,

    /// Bee bread consumed when an incubation starts
    pub brood_food_cost: u32,

    pub initial_honey: u32,
    pub honey_capacity: u32,
    pub initial_bee_bread: u32,
    pub bee_bread_capacity: u32,

    // === ZONES ===
    /// Where newborn and reassigned agents wait for a role pick
    pub job_selection_zone: Zone,

    /// Where agents without work wander
    pub idle_zone: Zone,

    /// Where agents go to expire
    pub death_zone: Zone,

    /// When false, agents without work stay put instead of wandering.
    /// Useful for headless tests that want to observe idleness.
    pub idle_wandering: bool,

    // === TOPOLOGY ===
    /// Hexagon size used to place site centers (world units)
    pub cell_size: f32,

    /// World position of site (0, 0)
    pub origin: Vec2,

    /// Rows and columns in `-radius..=radius` make up the site grid
    pub topology_radius: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,

            agent_speed: 4.0,
            arrival_epsilon: 2.0,

            construct_ticks: 120,
            incubate_ticks: 300,
            sanitize_ticks: 90,
            produce_ticks: 240,
            expire_ticks: 120,

            // 30 seconds per meal: reassignment after 1.5 min, death after 3 min
            meal_interval_ticks: 1800,
            reassign_after_meals: 3,
            death_after_meals: 6,

            produce_amount: 5,
            brood_food_cost: 1,
            initial_honey: 20,
            honey_capacity: 100,
            initial_bee_bread: 20,
            bee_bread_capacity: 100,

            job_selection_zone: Zone::new(Vec2::new(50.0, 650.0), Vec2::new(350.0, 850.0)),
            idle_zone: Zone::new(Vec2::new(50.0, 50.0), Vec2::new(450.0, 250.0)),
            death_zone: Zone::new(Vec2::new(1300.0, 700.0), Vec2::new(1550.0, 850.0)),
            idle_wandering: true,

            cell_size: 40.0,
            origin: Vec2::new(800.0, 450.0),
            topology_radius: 3,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate().map_err(HiveError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let durations = [
            ("construct_ticks", self.construct_ticks),
            ("incubate_ticks", self.incubate_ticks),
            ("sanitize_ticks", self.sanitize_ticks),
            ("produce_ticks", self.produce_ticks),
            ("expire_ticks", self.expire_ticks),
            ("meal_interval_ticks", self.meal_interval_ticks),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(format!("{} must be at least 1", name));
            }
        }

        if self.death_after_meals <= self.reassign_after_meals {
            return Err(format!(
                "death_after_meals ({}) should be > reassign_after_meals ({})",
                self.death_after_meals, self.reassign_after_meals
            ));
        }

        if self.agent_speed <= 0.0 || self.arrival_epsilon <= 0.0 {
            return Err("agent_speed and arrival_epsilon must be positive".into());
        }

        if self.initial_honey > self.honey_capacity
            || self.initial_bee_bread > self.bee_bread_capacity
        {
            return Err("initial resource values must not exceed their capacity".into());
        }

        let zones = [
            ("job_selection_zone", &self.job_selection_zone),
            ("idle_zone", &self.idle_zone),
            ("death_zone", &self.death_zone),
        ];
        for (name, zone) in zones {
            if zone.is_empty() {
                return Err(format!("{} has no area", name));
            }
        }

        if self.topology_radius < 1 {
            return Err("topology_radius must be at least 1".into());
        }

        Ok(())
    }
}
