//! Energy, feeding, predation, pairing and reproduction.
//!
//! Interactions are planned against a read-only pass and applied in command
//! order afterwards, so conflicting claims (two predators on one prey, two
//! suitors for one mate) resolve the same way on every run.

use crate::config::{BehaviorConfig, LifecycleConfig};
use crate::context::ratio;
use crate::spatial_hash::{Neighbor, SpatialHash, WorldBounds};
use ecoboids_data::{
    Agent, DeathMarker, FoodKind, FoodSource, Phenotype, Position, Role, SpeciesRegistry, Stance,
    StanceState, Vitals,
};
use rand::Rng;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Health regenerates only above this energy ratio.
pub const REGEN_ENERGY_RATIO: f64 = 0.5;
/// Offspring spawn within this distance of the first parent.
pub const BIRTH_SCATTER: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionCommand {
    Bite { agent: usize, food: usize },
    Strike { attacker: usize, target: usize },
    Pair { a: usize, b: usize },
    Reproduce { a: usize, b: usize },
}

#[derive(Debug, Default)]
pub struct InteractionOutcome {
    pub births: Vec<Agent>,
    pub kills: usize,
    pub bites: usize,
    pub pairs: usize,
}

/// One agent's death, with what it leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Death {
    pub index: usize,
    pub id: Uuid,
    pub marker: DeathMarker,
    pub carcass: FoodSource,
}

fn drain_factor(stance: &StanceState, cfg: &LifecycleConfig) -> f64 {
    match (stance.current, stance.substate.as_deref()) {
        (Stance::Idle, _) => cfg.rest_drain_factor,
        (Stance::Fleeing, Some("panic" | "tactical")) => cfg.sprint_drain_factor,
        (Stance::Hunting, Some("striking" | "chasing")) => cfg.sprint_drain_factor,
        _ => 1.0,
    }
}

/// One frame of metabolism: energy drain, starvation, healing, ageing and
/// cooldowns.
pub fn metabolize(
    vitals: &mut Vitals,
    stance: &StanceState,
    phenotype: &Phenotype,
    cfg: &LifecycleConfig,
) {
    vitals.energy = (vitals.energy - cfg.drain_per_frame * drain_factor(stance, cfg)).max(0.0);
    if vitals.energy <= 0.0 {
        vitals.health -= cfg.starvation_damage;
    } else if ratio(vitals.energy, phenotype.max_energy) >= REGEN_ENERGY_RATIO {
        vitals.health = (vitals.health + cfg.health_regen).min(phenotype.max_health);
    }
    vitals.age = vitals.age.saturating_add(1);
    let cd = &mut vitals.cooldowns;
    cd.reproduction = cd.reproduction.saturating_sub(1);
    cd.eating = cd.eating.saturating_sub(1);
    cd.attack = cd.attack.saturating_sub(1);
}

/// Mature, rested and well fed agents look for a mate.
pub fn refresh_seeking_mate(vitals: &mut Vitals, phenotype: &Phenotype, cfg: &LifecycleConfig) {
    vitals.seeking_mate = vitals.age >= cfg.maturity_age
        && vitals.cooldowns.reproduction == 0
        && ratio(vitals.energy, phenotype.max_energy) >= cfg.seek_mate_energy;
}

/// Runs [`metabolize`] and [`refresh_seeking_mate`] over every agent.
pub fn run_metabolism(agents: &mut [&mut Agent], registry: &SpeciesRegistry, cfg: &LifecycleConfig) {
    agents.par_iter_mut().for_each(|agent| {
        let Some(species) = registry.get(&agent.identity.species) else {
            return;
        };
        let agent: &mut Agent = agent;
        metabolize(&mut agent.vitals, &agent.stance, &species.phenotype, cfg);
        refresh_seeking_mate(&mut agent.vitals, &species.phenotype, cfg);
    });
}

/// Read-only inputs for interaction planning. `agent_index` must be built
/// from the agents' current positions in the same order as the slice.
pub struct InteractionPlan<'a> {
    pub bounds: WorldBounds,
    pub registry: &'a SpeciesRegistry,
    pub agent_index: &'a SpatialHash,
    pub food: &'a [FoodSource],
    pub food_index: &'a SpatialHash,
    pub behavior: &'a BehaviorConfig,
    pub lifecycle: &'a LifecycleConfig,
}

impl InteractionPlan<'_> {
    /// Commands in agent order, each agent's commands in a fixed order.
    #[must_use]
    pub fn plan(&self, agents: &[&mut Agent]) -> Vec<InteractionCommand> {
        let by_id: HashMap<Uuid, usize> = agents
            .iter()
            .enumerate()
            .map(|(i, a)| (a.identity.id, i))
            .collect();
        let per_agent: Vec<Vec<InteractionCommand>> = agents
            .par_iter()
            .enumerate()
            .map(|(i, agent)| self.plan_agent(i, agent, agents, &by_id))
            .collect();
        per_agent.into_iter().flatten().collect()
    }

    fn plan_agent(
        &self,
        i: usize,
        agent: &Agent,
        agents: &[&mut Agent],
        by_id: &HashMap<Uuid, usize>,
    ) -> Vec<InteractionCommand> {
        let mut commands = Vec::new();
        let Some(role) = self.registry.role_of(&agent.identity.species) else {
            return commands;
        };
        let cd = agent.vitals.cooldowns;

        if agent.stance.current == Stance::Eating && cd.eating == 0 {
            let reach = self
                .food_index
                .query_nearby(agent.position, usize::MAX, Some(self.behavior.eat_range));
            if let Some(hit) = closest(reach.iter().filter(|h| self.food[h.index].edible_by(role)))
            {
                commands.push(InteractionCommand::Bite {
                    agent: i,
                    food: hit.index,
                });
            }
        }

        if role == Role::Predator
            && agent.stance.current == Stance::Hunting
            && agent.stance.substate.as_deref() == Some("striking")
            && cd.attack == 0
        {
            if let Some(target) = self.strike_target(agent, agents, by_id) {
                commands.push(InteractionCommand::Strike {
                    attacker: i,
                    target,
                });
            }
        }

        if agent.vitals.seeking_mate && agent.bonds.mate.id.is_none() {
            if let Some(partner) = self.suitor_for(agent, agents) {
                commands.push(InteractionCommand::Pair { a: i, b: partner });
            }
        }

        if let Some(mate_id) = agent.bonds.mate.id {
            if agent.identity.id < mate_id
                && agent.stance.current == Stance::Mating
                && agent.bonds.mate.commitment_frames >= self.lifecycle.mating_frames
                && cd.reproduction == 0
            {
                if let Some(&j) = by_id.get(&mate_id) {
                    let mate = &agents[j];
                    if mate.stance.current == Stance::Mating
                        && mate.bonds.mate.id == Some(agent.identity.id)
                        && mate.vitals.cooldowns.reproduction == 0
                        && self.bounds.distance(agent.position, mate.position)
                            <= self.behavior.mating_range
                    {
                        commands.push(InteractionCommand::Reproduce { a: i, b: j });
                    }
                }
            }
        }
        commands
    }

    fn strike_target(
        &self,
        agent: &Agent,
        agents: &[&mut Agent],
        by_id: &HashMap<Uuid, usize>,
    ) -> Option<usize> {
        let range = self.behavior.attack_range;
        let is_prey =
            |j: usize| self.registry.role_of(&agents[j].identity.species) == Some(Role::Prey);
        let locked = agent
            .bonds
            .target
            .id
            .and_then(|id| by_id.get(&id).copied())
            .filter(|&j| {
                is_prey(j) && self.bounds.distance(agent.position, agents[j].position) <= range
            });
        locked.or_else(|| {
            let hits = self
                .agent_index
                .query_nearby(agent.position, usize::MAX, Some(range));
            closest(hits.iter().filter(|h| is_prey(h.index))).map(|h| h.index)
        })
    }

    /// Closest unpaired, mate-seeking flockmate with a larger id.
    fn suitor_for(&self, agent: &Agent, agents: &[&mut Agent]) -> Option<usize> {
        let hits = self.agent_index.query_nearby(
            agent.position,
            usize::MAX,
            Some(self.behavior.mating_range),
        );
        closest(hits.iter().filter(|h| {
            let other = &agents[h.index];
            other.identity.id > agent.identity.id
                && other.identity.species == agent.identity.species
                && other.vitals.seeking_mate
                && other.bonds.mate.id.is_none()
        }))
        .map(|h| h.index)
    }
}

/// Nearest hit, lower index on ties.
fn closest<'h>(hits: impl Iterator<Item = &'h Neighbor>) -> Option<&'h Neighbor> {
    hits.min_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.index.cmp(&b.index))
    })
}

/// Applies planned interactions in order.
#[allow(clippy::too_many_arguments)]
pub fn apply_interactions<R: Rng>(
    commands: &[InteractionCommand],
    agents: &mut [&mut Agent],
    registry: &SpeciesRegistry,
    food: &mut [FoodSource],
    population_capacity: usize,
    frame: u64,
    cfg: &LifecycleConfig,
    rng: &mut R,
) -> InteractionOutcome {
    let mut outcome = InteractionOutcome::default();
    let mut population = agents.len();

    for &cmd in commands {
        match cmd {
            InteractionCommand::Bite { agent, food: f } => {
                let a = &mut *agents[agent];
                let Some(species) = registry.get(&a.identity.species) else {
                    continue;
                };
                let Some(source) = food.get_mut(f) else {
                    continue;
                };
                let taken = source.take(cfg.bite_size);
                if taken > 0.0 {
                    a.vitals.energy = (a.vitals.energy + taken).min(species.phenotype.max_energy);
                    a.vitals.cooldowns.eating = cfg.eating_cooldown;
                    outcome.bites += 1;
                }
            }
            InteractionCommand::Strike { attacker, target } => {
                if !agents[attacker].is_alive() || !agents[target].is_alive() {
                    continue;
                }
                let Some(damage) = registry
                    .get(&agents[attacker].identity.species)
                    .map(|s| s.phenotype.attack_damage)
                else {
                    continue;
                };
                agents[attacker].vitals.cooldowns.attack = cfg.attack_cooldown;
                let victim = &mut *agents[target];
                victim.vitals.health -= damage;
                if !victim.is_alive() {
                    outcome.kills += 1;
                    tracing::debug!(
                        attacker = %agents[attacker].identity.id,
                        target = %agents[target].identity.id,
                        frame,
                        "Prey killed"
                    );
                }
            }
            InteractionCommand::Pair { a, b } => {
                if agents[a].bonds.mate.id.is_some() || agents[b].bonds.mate.id.is_some() {
                    continue;
                }
                let (id_a, id_b) = (agents[a].identity.id, agents[b].identity.id);
                agents[a].bonds.mate.id = Some(id_b);
                agents[a].bonds.mate.commitment_frames = 0;
                agents[b].bonds.mate.id = Some(id_a);
                agents[b].bonds.mate.commitment_frames = 0;
                outcome.pairs += 1;
            }
            InteractionCommand::Reproduce { a, b } => {
                if population >= population_capacity {
                    continue;
                }
                let Some(species) = registry.get(&agents[a].identity.species) else {
                    continue;
                };
                let phenotype = species.phenotype;
                let cost = phenotype.max_energy * cfg.birth_energy_cost;
                if agents[a].vitals.energy < cost || agents[b].vitals.energy < cost {
                    continue;
                }
                for parent in [a, b] {
                    let p = &mut *agents[parent];
                    p.vitals.energy -= cost;
                    p.vitals.cooldowns.reproduction = cfg.reproduction_cooldown;
                    p.vitals.seeking_mate = false;
                    p.bonds.mate = Default::default();
                }

                let origin = agents[a].position;
                let offset = Position::new(
                    rng.gen_range(-BIRTH_SCATTER..=BIRTH_SCATTER),
                    rng.gen_range(-BIRTH_SCATTER..=BIRTH_SCATTER),
                );
                let mut child = Agent::new(
                    random_id(rng),
                    agents[a].identity.species.clone(),
                    species.role,
                    Position::new(origin.x + offset.x, origin.y + offset.y),
                    phenotype.max_energy,
                    phenotype.max_health,
                    frame,
                );
                child.vitals.energy = (cost * 2.0).min(phenotype.max_energy);
                child.vitals.cooldowns.reproduction = cfg.reproduction_cooldown;
                outcome.births.push(child);
                population += 1;
            }
        }
    }
    outcome
}

/// Agents that starved, were killed or outlived the maximum age.
#[must_use]
pub fn collect_deaths<R: Rng>(
    agents: &[&mut Agent],
    registry: &SpeciesRegistry,
    cfg: &LifecycleConfig,
    rng: &mut R,
) -> Vec<Death> {
    agents
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.is_alive() || a.vitals.age > cfg.max_age)
        .map(|(index, a)| {
            let max_energy = registry
                .get(&a.identity.species)
                .map_or(0.0, |s| s.phenotype.max_energy);
            Death {
                index,
                id: a.identity.id,
                marker: DeathMarker {
                    position: a.position,
                    remaining_frames: cfg.marker_lifetime,
                    strength: cfg.marker_strength,
                    source_species: a.identity.species.clone(),
                },
                carcass: FoodSource::new(
                    random_id(rng),
                    a.position,
                    max_energy * cfg.carcass_fraction,
                    FoodKind::Carcass,
                ),
            }
        })
        .collect()
}

/// Fades markers linearly and drops expired ones.
pub fn decay_markers(markers: &mut Vec<DeathMarker>) {
    for m in markers.iter_mut() {
        if m.remaining_frames > 0 {
            m.strength *= f64::from(m.remaining_frames - 1) / f64::from(m.remaining_frames);
            m.remaining_frames -= 1;
        }
    }
    markers.retain(|m| !m.is_expired());
}

/// Drops mate ids that point at agents no longer alive.
pub fn clear_dangling_mates(agents: &mut [&mut Agent], dead: &HashSet<Uuid>) {
    for agent in agents.iter_mut() {
        if agent.bonds.mate.id.is_some_and(|id| dead.contains(&id)) {
            agent.bonds.mate = Default::default();
        }
    }
}

/// Regrows plants, rots carcasses, removes depleted food and occasionally
/// sprouts a new plant.
pub fn update_food<R: Rng>(
    food: &mut Vec<FoodSource>,
    bounds: WorldBounds,
    max_food: usize,
    cfg: &LifecycleConfig,
    rng: &mut R,
) {
    for f in food.iter_mut() {
        match f.kind {
            FoodKind::Plant => {
                if f.energy > 0.0 {
                    f.energy = (f.energy + cfg.plant_regrowth).min(f.max_energy);
                }
            }
            FoodKind::Carcass => f.energy -= cfg.carcass_decay,
        }
    }
    food.retain(|f| !f.is_depleted());

    if food.len() < max_food && rng.gen_bool(cfg.plant_spawn_chance.clamp(0.0, 1.0)) {
        food.push(random_plant(bounds, cfg.plant_energy, rng));
    }
}

#[must_use]
pub fn random_plant<R: Rng>(bounds: WorldBounds, energy: f64, rng: &mut R) -> FoodSource {
    FoodSource::new(
        random_id(rng),
        Position::new(
            rng.gen_range(0.0..bounds.width),
            rng.gen_range(0.0..bounds.height),
        ),
        energy,
        FoodKind::Plant,
    )
}

/// A v4 id drawn from the simulation rng so seeded runs repeat exactly.
pub fn random_id<R: Rng>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoboids_data::SpeciesConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn registry() -> SpeciesRegistry {
        SpeciesRegistry::new([
            SpeciesConfig {
                name: "grazer".to_string(),
                role: Role::Prey,
                phenotype: Phenotype::default(),
            },
            SpeciesConfig {
                name: "stalker".to_string(),
                role: Role::Predator,
                phenotype: Phenotype {
                    attack_damage: 150.0,
                    ..Phenotype::default()
                },
            },
        ])
    }

    fn agent(id: u128, species: &str, role: Role, x: f64) -> Agent {
        Agent::new(
            Uuid::from_u128(id),
            species,
            role,
            Position::new(x, 10.0),
            100.0,
            100.0,
            0,
        )
    }

    #[test]
    fn test_metabolize_drains_and_ticks_cooldowns() {
        let cfg = LifecycleConfig::default();
        let phenotype = Phenotype::default();
        let mut a = agent(1, "grazer", Role::Prey, 0.0);
        a.vitals.cooldowns.eating = 2;
        let idle = StanceState::new(Stance::Idle, 0);
        metabolize(&mut a.vitals, &idle, &phenotype, &cfg);
        assert!((a.vitals.energy - (100.0 - cfg.drain_per_frame * cfg.rest_drain_factor)).abs() < 1e-9);
        assert_eq!(a.vitals.age, 1);
        assert_eq!(a.vitals.cooldowns.eating, 1);
    }

    #[test]
    fn test_starvation_damages_health() {
        let cfg = LifecycleConfig::default();
        let phenotype = Phenotype::default();
        let mut a = agent(1, "grazer", Role::Prey, 0.0);
        a.vitals.energy = 0.0;
        metabolize(&mut a.vitals, &a.stance.clone(), &phenotype, &cfg);
        assert_eq!(a.vitals.energy, 0.0);
        assert!(a.vitals.health < 100.0);
    }

    #[test]
    fn test_seeking_mate_needs_maturity_and_energy() {
        let cfg = LifecycleConfig::default();
        let phenotype = Phenotype::default();
        let mut a = agent(1, "grazer", Role::Prey, 0.0);
        refresh_seeking_mate(&mut a.vitals, &phenotype, &cfg);
        assert!(!a.vitals.seeking_mate);
        a.vitals.age = cfg.maturity_age;
        refresh_seeking_mate(&mut a.vitals, &phenotype, &cfg);
        assert!(a.vitals.seeking_mate);
        a.vitals.energy = 10.0;
        refresh_seeking_mate(&mut a.vitals, &phenotype, &cfg);
        assert!(!a.vitals.seeking_mate);
    }

    #[test]
    fn test_strike_plan_and_kill() {
        let registry = registry();
        let behavior = BehaviorConfig::default();
        let lifecycle = LifecycleConfig::default();
        let bounds = WorldBounds::new(100.0, 100.0);
        let mut hunter = agent(1, "stalker", Role::Predator, 10.0);
        hunter.stance.substate = Some("striking".to_string());
        let mut victim = agent(2, "grazer", Role::Prey, 15.0);
        let mut agents = vec![&mut hunter, &mut victim];

        let mut agent_index = SpatialHash::new(25.0, bounds);
        let positions: Vec<Position> = agents.iter().map(|a| a.position).collect();
        agent_index.insert(&positions);
        let food_index = SpatialHash::new(25.0, bounds);
        let plan = InteractionPlan {
            bounds,
            registry: &registry,
            agent_index: &agent_index,
            food: &[],
            food_index: &food_index,
            behavior: &behavior,
            lifecycle: &lifecycle,
        };
        let commands = plan.plan(&agents);
        assert_eq!(
            commands,
            vec![InteractionCommand::Strike {
                attacker: 0,
                target: 1
            }]
        );

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = apply_interactions(
            &commands,
            &mut agents,
            &registry,
            &mut [],
            100,
            5,
            &lifecycle,
            &mut rng,
        );
        assert_eq!(outcome.kills, 1);
        assert_eq!(agents[0].vitals.cooldowns.attack, lifecycle.attack_cooldown);

        let deaths = collect_deaths(&agents, &registry, &lifecycle, &mut rng);
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].id, Uuid::from_u128(2));
        assert_eq!(deaths[0].carcass.kind, FoodKind::Carcass);
        assert!((deaths[0].carcass.energy - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_pairing_is_mutual_and_exclusive() {
        let registry = registry();
        let lifecycle = LifecycleConfig::default();
        let mut a = agent(1, "grazer", Role::Prey, 10.0);
        let mut b = agent(2, "grazer", Role::Prey, 12.0);
        let mut c = agent(3, "grazer", Role::Prey, 11.0);
        let mut agents = vec![&mut a, &mut b, &mut c];
        let commands = [
            InteractionCommand::Pair { a: 0, b: 1 },
            InteractionCommand::Pair { a: 0, b: 2 },
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = apply_interactions(
            &commands,
            &mut agents,
            &registry,
            &mut [],
            100,
            0,
            &lifecycle,
            &mut rng,
        );
        assert_eq!(outcome.pairs, 1);
        assert_eq!(agents[0].bonds.mate.id, Some(Uuid::from_u128(2)));
        assert_eq!(agents[1].bonds.mate.id, Some(Uuid::from_u128(1)));
        assert_eq!(agents[2].bonds.mate.id, None);
    }

    #[test]
    fn test_reproduction_costs_parents_and_respects_capacity() {
        let registry = registry();
        let lifecycle = LifecycleConfig::default();
        let mut a = agent(1, "grazer", Role::Prey, 10.0);
        let mut b = agent(2, "grazer", Role::Prey, 12.0);
        a.bonds.mate.id = Some(b.identity.id);
        b.bonds.mate.id = Some(a.identity.id);
        let mut agents = vec![&mut a, &mut b];
        let commands = [InteractionCommand::Reproduce { a: 0, b: 1 }];
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let full = apply_interactions(
            &commands,
            &mut agents,
            &registry,
            &mut [],
            2,
            0,
            &lifecycle,
            &mut rng,
        );
        assert!(full.births.is_empty());

        let outcome = apply_interactions(
            &commands,
            &mut agents,
            &registry,
            &mut [],
            10,
            7,
            &lifecycle,
            &mut rng,
        );
        assert_eq!(outcome.births.len(), 1);
        assert_eq!(outcome.births[0].identity.species, "grazer");
        assert_eq!(outcome.births[0].stance.entered_at_frame, 7);
        assert!(agents.iter().all(|p| p.bonds.mate.id.is_none()));
        assert!(agents.iter().all(|p| p.vitals.energy < 100.0));
    }

    #[test]
    fn test_markers_fade_and_expire() {
        let mut markers = vec![DeathMarker {
            position: Position::default(),
            remaining_frames: 2,
            strength: 1.0,
            source_species: "grazer".to_string(),
        }];
        decay_markers(&mut markers);
        assert_eq!(markers.len(), 1);
        assert!((markers[0].strength - 0.5).abs() < 1e-9);
        decay_markers(&mut markers);
        assert!(markers.is_empty());
    }

    #[test]
    fn test_food_update_removes_depleted() {
        let cfg = LifecycleConfig {
            plant_spawn_chance: 0.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bounds = WorldBounds::new(50.0, 50.0);
        let mut eaten = random_plant(bounds, 10.0, &mut rng);
        eaten.take(10.0);
        let mut food = vec![eaten, random_plant(bounds, 10.0, &mut rng)];
        food[1].take(5.0);
        update_food(&mut food, bounds, 10, &cfg, &mut rng);
        assert_eq!(food.len(), 1);
        assert!(food[0].energy > 5.0);
    }
}
