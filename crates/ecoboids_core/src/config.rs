//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every tuning constant of the decision core lives
//! here so behaviour pacing can change without touching rule logic.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing sections fall back)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 800.0
//! height = 600.0
//! seed = 42
//! deterministic = true
//!
//! [behavior]
//! rest_enter_energy = 0.3
//! rest_exit_energy = 0.5
//!
//! [min_durations]
//! eating = 20
//! mating = 60
//! ```

use crate::forces::ForceTable;
use crate::stance::MinDurations;
use anyhow::Context;
use ecoboids_data::{Phenotype, Role, SpeciesConfig, Stance};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// World-level simulation configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub initial_prey: usize,
    pub initial_predators: usize,
    pub initial_food: usize,
    pub max_food: usize,
    pub obstacle_count: usize,
    /// Population the world can sustain; drives environment pressure.
    pub population_capacity: usize,
    pub seed: Option<u64>,
    pub deterministic: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            initial_prey: 120,
            initial_predators: 12,
            initial_food: 80,
            max_food: 150,
            obstacle_count: 6,
            population_capacity: 300,
            seed: None,
            deterministic: false,
        }
    }
}

/// Spatial query sizing.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Grid cell edge; should match the typical perception radius.
    pub cell_size: f64,
    pub max_neighbors: usize,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            cell_size: 120.0,
            max_neighbors: 24,
        }
    }
}

/// Shape of the continuous threat signal.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ThreatConfig {
    /// Distance at which a predator stops registering as a threat.
    pub max_threat_distance: f64,
    pub hunting_multiplier: f64,
    /// Idle, eating or any other non-distracted stance.
    pub resting_multiplier: f64,
    /// Seeking a mate or mating.
    pub distracted_multiplier: f64,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            max_threat_distance: 200.0,
            hunting_multiplier: 1.0,
            resting_multiplier: 0.5,
            distracted_multiplier: 0.25,
        }
    }
}

/// Thresholds read by the rule set.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BehaviorConfig {
    pub flee_base_score: f64,
    /// Below this distance from a hunting predator, fleeing is a panic.
    pub panic_distance_hunting: f64,
    /// Panic distance for a predator that is not hunting.
    pub panic_distance_other: f64,
    pub desperate_energy: f64,
    pub hungry_energy: f64,
    pub satiated_energy: f64,
    pub courtship_energy: f64,
    pub rest_enter_energy: f64,
    pub rest_exit_energy: f64,
    pub commitment_bonus_per_frame: f64,
    pub commitment_bonus_cap: f64,
    pub eat_range: f64,
    pub attack_range: f64,
    pub mating_range: f64,
    /// Per-frame lock strength retained while the target is out of sight.
    pub lock_decay: f32,
    /// Lock strength below which the target is dropped.
    pub lock_release: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            flee_base_score: 800.0,
            panic_distance_hunting: 50.0,
            panic_distance_other: 30.0,
            desperate_energy: 0.2,
            hungry_energy: 0.5,
            satiated_energy: 0.9,
            courtship_energy: 0.6,
            rest_enter_energy: 0.3,
            rest_exit_energy: 0.5,
            commitment_bonus_per_frame: 2.0,
            commitment_bonus_cap: 150.0,
            eat_range: 8.0,
            attack_range: 10.0,
            mating_range: 15.0,
            lock_decay: 0.9,
            lock_release: 0.1,
        }
    }
}

/// Resource bookkeeping owned by the lifecycle system.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LifecycleConfig {
    pub drain_per_frame: f64,
    pub rest_drain_factor: f64,
    pub sprint_drain_factor: f64,
    pub starvation_damage: f64,
    pub health_regen: f64,
    pub bite_size: f64,
    pub eating_cooldown: u32,
    pub attack_cooldown: u32,
    /// Share of a victim's max energy left behind as a carcass.
    pub carcass_fraction: f64,
    /// Energy a carcass loses per frame.
    pub carcass_decay: f64,
    pub maturity_age: u64,
    pub max_age: u64,
    pub seek_mate_energy: f64,
    pub mating_frames: u32,
    pub reproduction_cooldown: u32,
    /// Share of max energy each parent spends on offspring.
    pub birth_energy_cost: f64,
    pub marker_lifetime: u32,
    pub marker_strength: f64,
    pub plant_energy: f64,
    pub plant_regrowth: f64,
    pub plant_spawn_chance: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            drain_per_frame: 0.05,
            rest_drain_factor: 0.3,
            sprint_drain_factor: 1.8,
            starvation_damage: 0.5,
            health_regen: 0.05,
            bite_size: 4.0,
            eating_cooldown: 5,
            attack_cooldown: 20,
            carcass_fraction: 0.8,
            carcass_decay: 0.05,
            maturity_age: 300,
            max_age: 20_000,
            seek_mate_energy: 0.7,
            mating_frames: 60,
            reproduction_cooldown: 600,
            birth_energy_cost: 0.35,
            marker_lifetime: 300,
            marker_strength: 1.0,
            plant_energy: 40.0,
            plant_regrowth: 0.05,
            plant_spawn_chance: 0.05,
        }
    }
}

#[must_use]
pub fn default_species() -> Vec<SpeciesConfig> {
    vec![
        SpeciesConfig {
            name: "grazer".to_string(),
            role: Role::Prey,
            phenotype: Phenotype {
                max_energy: 100.0,
                max_health: 60.0,
                attack_damage: 0.0,
                max_speed: 2.2,
                vision_range: 90.0,
            },
        },
        SpeciesConfig {
            name: "stalker".to_string(),
            role: Role::Predator,
            phenotype: Phenotype {
                max_energy: 150.0,
                max_health: 120.0,
                attack_damage: 35.0,
                max_speed: 2.6,
                vision_range: 120.0,
            },
        },
    ]
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub perception: PerceptionConfig,
    pub threat: ThreatConfig,
    pub behavior: BehaviorConfig,
    pub min_durations: MinDurations,
    pub lifecycle: LifecycleConfig,
    pub forces: ForceTable,
    pub species: Vec<SpeciesConfig>,
    /// Ticks between periodic metrics summaries.
    pub metrics_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            perception: PerceptionConfig::default(),
            threat: ThreatConfig::default(),
            behavior: BehaviorConfig::default(),
            min_durations: MinDurations::default(),
            lifecycle: LifecycleConfig::default(),
            forces: ForceTable::default(),
            species: default_species(),
            metrics_interval: 1000,
        }
    }
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(
            self.world.width.is_finite() && self.world.width > 0.0,
            "World width must be positive"
        );
        anyhow::ensure!(
            self.world.height.is_finite() && self.world.height > 0.0,
            "World height must be positive"
        );
        anyhow::ensure!(
            self.world.population_capacity > 0,
            "Population capacity must be positive"
        );
        anyhow::ensure!(
            self.world.initial_food <= self.world.max_food,
            "Initial food exceeds max food"
        );

        // Perception validation
        anyhow::ensure!(
            self.perception.cell_size.is_finite() && self.perception.cell_size > 0.0,
            "Cell size must be positive"
        );
        anyhow::ensure!(
            self.perception.max_neighbors > 0,
            "Max neighbors must be positive"
        );

        // Threat validation
        anyhow::ensure!(
            self.threat.max_threat_distance > 0.0,
            "Max threat distance must be positive"
        );
        for (name, m) in [
            ("Hunting", self.threat.hunting_multiplier),
            ("Resting", self.threat.resting_multiplier),
            ("Distracted", self.threat.distracted_multiplier),
        ] {
            anyhow::ensure!(
                (0.0..=1.0).contains(&m),
                "{name} threat multiplier must be in [0.0, 1.0]"
            );
        }

        // Behavior validation
        let b = &self.behavior;
        for (name, v) in [
            ("Desperate energy", b.desperate_energy),
            ("Hungry energy", b.hungry_energy),
            ("Satiated energy", b.satiated_energy),
            ("Courtship energy", b.courtship_energy),
            ("Rest enter energy", b.rest_enter_energy),
            ("Rest exit energy", b.rest_exit_energy),
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&v), "{name} must be in [0.0, 1.0]");
        }
        anyhow::ensure!(
            b.rest_exit_energy >= b.rest_enter_energy,
            "Rest exit energy must not be below rest enter energy"
        );
        anyhow::ensure!(b.flee_base_score >= 0.0, "Flee score must be non-negative");
        anyhow::ensure!(
            b.commitment_bonus_per_frame >= 0.0 && b.commitment_bonus_cap >= 0.0,
            "Commitment bonus must be non-negative"
        );
        anyhow::ensure!(
            b.eat_range >= 0.0 && b.attack_range >= 0.0 && b.mating_range >= 0.0,
            "Interaction ranges must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&b.lock_decay) && (0.0..=1.0).contains(&b.lock_release),
            "Lock decay and release must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            b.panic_distance_hunting >= 0.0 && b.panic_distance_other >= 0.0,
            "Panic distances must be non-negative"
        );

        // Lifecycle validation
        let l = &self.lifecycle;
        anyhow::ensure!(l.drain_per_frame >= 0.0, "Drain must be non-negative");
        anyhow::ensure!(l.bite_size > 0.0, "Bite size must be positive");
        anyhow::ensure!(
            (0.0..=1.0).contains(&l.birth_energy_cost),
            "Birth energy cost must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&l.plant_spawn_chance),
            "Plant spawn chance must be in [0.0, 1.0]"
        );

        // Species validation
        anyhow::ensure!(!self.species.is_empty(), "At least one species is required");
        let mut seen = HashSet::new();
        for s in &self.species {
            anyhow::ensure!(seen.insert(s.name.as_str()), "Duplicate species '{}'", s.name);
            let p = &s.phenotype;
            anyhow::ensure!(
                p.max_energy > 0.0 && p.max_health > 0.0,
                "Species '{}' needs positive max energy and health",
                s.name
            );
            anyhow::ensure!(
                p.max_speed >= 0.0 && p.vision_range >= 0.0 && p.attack_damage >= 0.0,
                "Species '{}' has negative capabilities",
                s.name
            );
        }

        // Every stance a configured role can reach needs forces
        let roles: HashSet<Role> = self.species.iter().map(|s| s.role).collect();
        for role in roles {
            for &stance in Stance::vocabulary(role) {
                self.forces.validate_stance(stance)?;
            }
        }

        anyhow::ensure!(self.metrics_interval > 0, "Metrics interval must be positive");

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a `config.toml` file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    #[must_use]
    pub fn species_config(&self, name: &str) -> Option<&SpeciesConfig> {
        self.species.iter().find(|s| s.name == name)
    }
}
