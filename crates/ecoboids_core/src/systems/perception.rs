//! Neighbor gathering and role partitioning.

use crate::context::{AgentSnapshot, Neighborhood, Sighted};
use crate::spatial_hash::{Neighbor, SpatialHash, WorldBounds};
use ecoboids_data::{Agent, DeathMarker, FoodSource, Obstacle, Role, SpeciesRegistry};

/// Frozen view of the world for one phase of a tick. Every index was built
/// from the slice next to it.
#[derive(Clone, Copy)]
pub struct PerceptionView<'a> {
    pub bounds: WorldBounds,
    pub registry: &'a SpeciesRegistry,
    pub agents: &'a [AgentSnapshot],
    pub agent_index: &'a SpatialHash,
    pub food: &'a [FoodSource],
    pub food_index: &'a SpatialHash,
    pub obstacles: &'a [Obstacle],
    pub obstacle_index: &'a SpatialHash,
    pub hazards: &'a [DeathMarker],
    pub hazard_index: &'a SpatialHash,
    pub max_neighbors: usize,
}

/// Owned indexes a [`PerceptionView`] borrows from.
#[derive(Debug, Clone)]
pub struct PerceptionIndex {
    pub agents: SpatialHash,
    pub food: SpatialHash,
    pub obstacles: SpatialHash,
    pub hazards: SpatialHash,
}

impl PerceptionIndex {
    #[must_use]
    pub fn new(cell_size: f64, bounds: WorldBounds) -> Self {
        Self {
            agents: SpatialHash::new(cell_size, bounds),
            food: SpatialHash::new(cell_size, bounds),
            obstacles: SpatialHash::new(cell_size, bounds),
            hazards: SpatialHash::new(cell_size, bounds),
        }
    }

    /// Rebuilds every index from the current state.
    pub fn rebuild(
        &mut self,
        agents: &[AgentSnapshot],
        food: &[FoodSource],
        obstacles: &[Obstacle],
        hazards: &[DeathMarker],
    ) {
        self.agents.insert(agents);
        self.food.insert(food);
        self.obstacles.insert(obstacles);
        self.hazards.insert(hazards);
    }

    #[must_use]
    pub fn view<'a>(
        &'a self,
        registry: &'a SpeciesRegistry,
        agents: &'a [AgentSnapshot],
        food: &'a [FoodSource],
        obstacles: &'a [Obstacle],
        hazards: &'a [DeathMarker],
        max_neighbors: usize,
    ) -> PerceptionView<'a> {
        PerceptionView {
            bounds: self.agents.bounds(),
            registry,
            agents,
            agent_index: &self.agents,
            food,
            food_index: &self.food,
            obstacles,
            obstacle_index: &self.obstacles,
            hazards,
            hazard_index: &self.hazards,
            max_neighbors,
        }
    }
}

/// Per-worker scratch lists, reused across agents to avoid reallocating.
#[derive(Debug, Default)]
pub struct NeighborBuffers<'a> {
    hits: Vec<Neighbor>,
    flock: Vec<Sighted<'a, AgentSnapshot>>,
    predators: Vec<Sighted<'a, AgentSnapshot>>,
    prey: Vec<Sighted<'a, AgentSnapshot>>,
    food: Vec<Sighted<'a, FoodSource>>,
    obstacles: Vec<Sighted<'a, Obstacle>>,
    hazards: Vec<Sighted<'a, DeathMarker>>,
}

impl<'a> NeighborBuffers<'a> {
    fn clear(&mut self) {
        self.hits.clear();
        self.flock.clear();
        self.predators.clear();
        self.prey.clear();
        self.food.clear();
        self.obstacles.clear();
        self.hazards.clear();
    }

    /// Queries every index around `agent` and sorts agents into flock,
    /// predators and prey. Same-role agents of another species are ignored.
    pub fn gather(
        &mut self,
        view: &PerceptionView<'a>,
        agent: &Agent,
        role: Role,
        vision: f64,
    ) -> Neighborhood<'_> {
        self.clear();
        let agents = view.agents;
        let position = agent.position;
        let radius = Some(vision);

        // One extra slot for the observer itself.
        view.agent_index.query_into(
            position,
            view.max_neighbors.saturating_add(1),
            radius,
            &mut self.hits,
        );
        for hit in &self.hits {
            let other = &agents[hit.index];
            if other.id == agent.identity.id {
                continue;
            }
            let Some(other_role) = other.role else {
                continue;
            };
            let sighted = Sighted::new(other, hit.distance);
            if other_role == role {
                if other.species == agent.identity.species {
                    self.flock.push(sighted);
                }
            } else if other_role == Role::Predator {
                self.predators.push(sighted);
            } else {
                self.prey.push(sighted);
            }
        }
        self.flock.truncate(view.max_neighbors);

        let food = view.food;
        view.food_index
            .query_into(position, view.max_neighbors, radius, &mut self.hits);
        self.food.extend(
            self.hits
                .iter()
                .map(|h| Sighted::new(&food[h.index], h.distance))
                .filter(|s| s.item.edible_by(role)),
        );

        let obstacles = view.obstacles;
        view.obstacle_index
            .query_into(position, view.max_neighbors, radius, &mut self.hits);
        self.obstacles.extend(
            self.hits
                .iter()
                .map(|h| Sighted::new(&obstacles[h.index], h.distance)),
        );

        if role == Role::Prey {
            let hazards = view.hazards;
            view.hazard_index
                .query_into(position, view.max_neighbors, radius, &mut self.hits);
            self.hazards.extend(
                self.hits
                    .iter()
                    .map(|h| Sighted::new(&hazards[h.index], h.distance)),
            );
        }

        Neighborhood {
            flock: &self.flock,
            predators: &self.predators,
            prey: &self.prey,
            food: &self.food,
            obstacles: &self.obstacles,
            hazards: &self.hazards,
        }
    }
}
