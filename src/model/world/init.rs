use crate::model::config::AppConfig;
use crate::model::world::World;
use ecoboids_core::spatial_hash::WorldBounds;
use ecoboids_core::systems::lifecycle::{random_id, random_plant};
use ecoboids_core::systems::perception::PerceptionIndex;
use ecoboids_core::{ContextBuilder, Metrics, RuleSet};
use ecoboids_data::{Agent, Obstacle, Position, Role, SpeciesConfig, SpeciesRegistry, Velocity};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;
use std::sync::Arc;

const OBSTACLE_RADIUS: std::ops::Range<f64> = 10.0..30.0;

impl World {
    /// A world with the configured species but no agents, food or obstacles.
    pub fn empty(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let rng = if let Some(seed) = config.world.seed {
            ChaCha8Rng::seed_from_u64(seed)
        } else {
            ChaCha8Rng::from_entropy()
        };
        let bounds = WorldBounds::new(config.world.width, config.world.height);

        Ok(Self {
            bounds,
            frame: 0,
            ecs: hecs::World::new(),
            food: Vec::new(),
            obstacles: Vec::new(),
            markers: Vec::new(),
            registry: SpeciesRegistry::new(config.species.iter().cloned()),
            rules: RuleSet::standard(config.behavior.clone()),
            builder: ContextBuilder::new(config.threat.clone()),
            metrics: Arc::new(Metrics::new(config.metrics_interval)),
            rng,
            index: PerceptionIndex::new(config.perception.cell_size, bounds),
            snapshots: Vec::new(),
            config,
        })
    }

    /// Validates the config and populates a fresh world from it.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let mut world = Self::empty(config)?;

        let prey = world.species_with_role(Role::Prey);
        let predators = world.species_with_role(Role::Predator);
        world.populate(&prey, world.config.world.initial_prey);
        world.populate(&predators, world.config.world.initial_predators);

        for _ in 0..world.config.world.obstacle_count {
            let obstacle = Obstacle {
                position: random_position(world.bounds, &mut world.rng),
                radius: world.rng.gen_range(OBSTACLE_RADIUS),
            };
            world.obstacles.push(obstacle);
        }
        for _ in 0..world.config.world.initial_food {
            let plant = random_plant(
                world.bounds,
                world.config.lifecycle.plant_energy,
                &mut world.rng,
            );
            world.food.push(plant);
        }

        tracing::info!(
            agents = world.population(),
            food = world.food.len(),
            obstacles = world.obstacles.len(),
            "World initialized"
        );
        Ok(world)
    }

    fn species_with_role(&self, role: Role) -> Vec<SpeciesConfig> {
        self.config
            .species
            .iter()
            .filter(|s| s.role == role)
            .cloned()
            .collect()
    }

    /// Spawns `count` agents, cycling through `species` in order.
    fn populate(&mut self, species: &[SpeciesConfig], count: usize) {
        if species.is_empty() {
            if count > 0 {
                tracing::warn!(count, "No species configured for role; skipping spawn");
            }
            return;
        }
        let maturity = self.config.lifecycle.maturity_age;
        for i in 0..count {
            let s = &species[i % species.len()];
            let mut agent = Agent::new(
                random_id(&mut self.rng),
                s.name.clone(),
                s.role,
                random_position(self.bounds, &mut self.rng),
                s.phenotype.max_energy,
                s.phenotype.max_health,
                0,
            );
            let heading = self.rng.gen_range(0.0..TAU);
            let speed = s.phenotype.max_speed * 0.5;
            agent.velocity = Velocity {
                vx: heading.cos() * speed,
                vy: heading.sin() * speed,
            };
            agent.vitals.age = self.rng.gen_range(0..=maturity);
            self.spawn_agent(agent);
        }
    }
}

fn random_position<R: Rng>(bounds: WorldBounds, rng: &mut R) -> Position {
    Position::new(
        rng.gen_range(0.0..bounds.width),
        rng.gen_range(0.0..bounds.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.world.seed = Some(seed);
        config
    }

    #[test]
    fn test_new_spawns_configured_counts() {
        let config = seeded(1);
        let world = World::new(config.clone()).expect("valid config");
        assert_eq!(
            world.population(),
            config.world.initial_prey + config.world.initial_predators
        );
        assert_eq!(world.food.len(), config.world.initial_food);
        assert_eq!(world.obstacles.len(), config.world.obstacle_count);
        let stats = world.stats();
        assert_eq!(stats.population_of("grazer"), config.world.initial_prey);
        assert_eq!(stats.population_of("stalker"), config.world.initial_predators);
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = World::new(seeded(9)).expect("valid config");
        let b = World::new(seeded(9)).expect("valid config");
        assert_eq!(a.agents(), b.agents());
        assert_eq!(a.food, b.food);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.world.width = -5.0;
        assert!(World::new(config).is_err());
    }
}
