use crate::model::config::AppConfig;
use crate::model::stats::PopulationStats;
use ecoboids_core::context::AgentSnapshot;
use ecoboids_core::spatial_hash::WorldBounds;
use ecoboids_core::systems::perception::PerceptionIndex;
use ecoboids_core::{ContextBuilder, Metrics, RuleSet, TransitionRecord};
use ecoboids_data::{Agent, DeathMarker, FoodSource, Obstacle, SpeciesRegistry};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use uuid::Uuid;

pub mod init;
pub mod update;

/// What one call to [`World::update`] changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub frame: u64,
    pub transitions: Vec<TransitionRecord>,
    pub births: usize,
    pub deaths: usize,
    pub kills: usize,
    /// Agents whose species is missing from the registry.
    pub skipped: usize,
}

pub struct World {
    pub bounds: WorldBounds,
    pub frame: u64,
    /// Agent storage; every entity carries exactly one [`Agent`].
    pub ecs: hecs::World,
    pub food: Vec<FoodSource>,
    pub obstacles: Vec<Obstacle>,
    pub markers: Vec<DeathMarker>,
    pub registry: SpeciesRegistry,
    pub rules: RuleSet,
    pub builder: ContextBuilder,
    pub config: AppConfig,
    pub metrics: Arc<Metrics>,
    pub rng: ChaCha8Rng,

    index: PerceptionIndex,
    snapshots: Vec<AgentSnapshot>,
}

impl World {
    pub fn spawn_agent(&mut self, agent: Agent) -> hecs::Entity {
        self.ecs.spawn((agent,))
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.ecs.len() as usize
    }

    /// Copies of every agent, sorted by id.
    #[must_use]
    pub fn agents(&self) -> Vec<Agent> {
        let mut agents: Vec<Agent> = self
            .ecs
            .query::<&Agent>()
            .iter()
            .map(|(_, a)| a.clone())
            .collect();
        agents.sort_by_key(|a| a.identity.id);
        agents
    }

    #[must_use]
    pub fn agent(&self, id: Uuid) -> Option<Agent> {
        self.ecs
            .query::<&Agent>()
            .iter()
            .find(|(_, a)| a.identity.id == id)
            .map(|(_, a)| a.clone())
    }

    /// Edits one agent in place. Returns false if no agent has `id`.
    pub fn with_agent_mut(&mut self, id: Uuid, f: impl FnOnce(&mut Agent)) -> bool {
        match self
            .ecs
            .query_mut::<&mut Agent>()
            .into_iter()
            .find(|(_, a)| a.identity.id == id)
        {
            Some((_, agent)) => {
                f(agent);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn stats(&self) -> PopulationStats {
        let mut query = self.ecs.query::<&Agent>();
        PopulationStats::collect(query.iter().map(|(_, a)| a))
    }
}
