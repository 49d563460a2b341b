pub mod macros;

use ecoboids_data::{Agent, FoodKind, FoodSource, Obstacle, Position, Role, Stance};
use ecoboids_lib::model::config::AppConfig;
use ecoboids_lib::model::World;
use uuid::Uuid;

type WorldMod = Box<dyn FnOnce(&mut World)>;

#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    agents: Vec<AgentBuilder>,
    mods: Vec<WorldMod>,
}

#[allow(dead_code)]
impl WorldBuilder {
    /// An empty, deterministic world with no random plant growth.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.initial_prey = 0;
        config.world.initial_predators = 0;
        config.world.initial_food = 0;
        config.world.obstacle_count = 0;
        config.world.seed = Some(1);
        config.world.deterministic = true;
        config.lifecycle.plant_spawn_chance = 0.0;
        Self {
            config,
            agents: Vec::new(),
            mods: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_agent(mut self, agent: AgentBuilder) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn with_food(mut self, x: f64, y: f64, energy: f64, kind: FoodKind) -> Self {
        self.mods.push(Box::new(move |world| {
            let id = Uuid::from_u128(0xF00D_0000 + world.food.len() as u128);
            world
                .food
                .push(FoodSource::new(id, Position::new(x, y), energy, kind));
        }));
        self
    }

    pub fn with_obstacle(mut self, x: f64, y: f64, radius: f64) -> Self {
        self.mods.push(Box::new(move |world| {
            world.obstacles.push(Obstacle {
                position: Position::new(x, y),
                radius,
            });
        }));
        self
    }

    pub fn build(self) -> World {
        let mut world = World::empty(self.config).expect("Failed to create world in test builder");
        for modifier in self.mods {
            modifier(&mut world);
        }
        for builder in self.agents {
            let agent = builder.build(&world.config);
            world.spawn_agent(agent);
        }
        world
    }
}

#[allow(dead_code)]
pub struct AgentBuilder {
    id: u128,
    species: String,
    role: Role,
    x: f64,
    y: f64,
    energy_ratio: f64,
    age: u64,
    stance: Option<(Stance, Option<String>)>,
    seeking_mate: bool,
}

#[allow(dead_code)]
impl AgentBuilder {
    pub fn prey(id: u128) -> Self {
        Self::new(id, "grazer", Role::Prey)
    }

    pub fn predator(id: u128) -> Self {
        Self::new(id, "stalker", Role::Predator)
    }

    pub fn new(id: u128, species: &str, role: Role) -> Self {
        Self {
            id,
            species: species.to_string(),
            role,
            x: 100.0,
            y: 100.0,
            energy_ratio: 1.0,
            age: 0,
            stance: None,
            seeking_mate: false,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn energy(mut self, ratio: f64) -> Self {
        self.energy_ratio = ratio;
        self
    }

    pub fn age(mut self, age: u64) -> Self {
        self.age = age;
        self
    }

    pub fn stance(mut self, stance: Stance, substate: Option<&str>) -> Self {
        self.stance = Some((stance, substate.map(str::to_string)));
        self
    }

    pub fn seeking_mate(mut self) -> Self {
        self.seeking_mate = true;
        self
    }

    pub fn build(self, config: &AppConfig) -> Agent {
        let phenotype = config
            .species_config(&self.species)
            .map(|s| s.phenotype)
            .unwrap_or_default();
        let mut agent = Agent::new(
            Uuid::from_u128(self.id),
            self.species,
            self.role,
            Position::new(self.x, self.y),
            phenotype.max_energy,
            phenotype.max_health,
            0,
        );
        agent.vitals.energy = phenotype.max_energy * self.energy_ratio;
        agent.vitals.age = self.age;
        agent.vitals.seeking_mate = self.seeking_mate;
        if let Some((stance, substate)) = self.stance {
            agent.stance.current = stance;
            agent.stance.substate = substate;
        }
        agent
    }
}

#[allow(dead_code)]
pub fn id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}
