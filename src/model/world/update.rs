use crate::model::world::{TickReport, World};
use ecoboids_core::context::{AgentSnapshot, SimulationCounters};
use ecoboids_core::metrics::{NO_DECISION, SKIPPED_UNKNOWN_SPECIES};
use ecoboids_core::systems::decision::{run_decisions, DecisionInputs};
use ecoboids_core::systems::lifecycle::{self, InteractionPlan};
use ecoboids_core::systems::movement::run_movement;
use ecoboids_data::{Agent, Position};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::time::Instant;
use uuid::Uuid;

impl World {
    /// Advances the simulation by one tick.
    ///
    /// Phases run in a fixed order over agents sorted by id:
    /// - Snapshot capture and index rebuild
    /// - Parallel decisions, applied sequentially
    /// - Steering and integration against the same frozen view
    /// - Metabolism, then interactions planned against post-move positions
    /// - Deaths, births, marker decay and food upkeep
    ///
    /// # Returns
    /// The stance transitions and population changes of this tick
    pub fn update(&mut self) -> anyhow::Result<TickReport> {
        let start = Instant::now();
        self.frame += 1;
        let world_seed = self.config.world.seed.unwrap_or(0);

        if self.config.world.deterministic {
            let seed = world_seed.wrapping_add(self.frame).wrapping_add(0x5EED);
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }

        let World {
            bounds,
            frame,
            ecs,
            food,
            obstacles,
            markers,
            registry,
            rules,
            builder,
            config,
            metrics,
            rng,
            index,
            snapshots,
        } = self;
        let (bounds, frame) = (*bounds, *frame);
        let (registry, rules, builder, config) = (&*registry, &*rules, &*builder, &*config);
        let mut report = TickReport {
            frame,
            ..Default::default()
        };

        let (handles, deaths, births) = {
            let mut entries: Vec<(hecs::Entity, &mut Agent)> =
                ecs.query_mut::<&mut Agent>().into_iter().collect();
            entries.sort_by_key(|(_, a)| a.identity.id);
            let (handles, mut agents): (Vec<hecs::Entity>, Vec<&mut Agent>) =
                entries.into_iter().unzip();

            snapshots.clear();
            snapshots.extend(
                agents
                    .iter()
                    .map(|a| AgentSnapshot::capture(a, registry.role_of(&a.identity.species))),
            );
            index.rebuild(snapshots, food, obstacles, markers);

            let view = index.view(
                registry,
                snapshots,
                food,
                obstacles,
                markers,
                config.perception.max_neighbors,
            );
            let inputs = DecisionInputs {
                view,
                builder,
                rules,
                counters: SimulationCounters {
                    frame,
                    population: agents.len(),
                    capacity: config.world.population_capacity,
                },
            };
            let decisions = run_decisions(&inputs, &mut agents, &config.min_durations);
            run_movement(&view, &config.forces, &mut agents, world_seed, frame)?;
            lifecycle::run_metabolism(&mut agents, registry, &config.lifecycle);

            // Interactions use where agents ended up, not where they decided.
            let positions: Vec<Position> = agents.iter().map(|a| a.position).collect();
            index.agents.insert(&positions);
            let plan = InteractionPlan {
                bounds,
                registry,
                agent_index: &index.agents,
                food,
                food_index: &index.food,
                behavior: &config.behavior,
                lifecycle: &config.lifecycle,
            };
            let commands = plan.plan(&agents);
            let outcome = lifecycle::apply_interactions(
                &commands,
                &mut agents,
                registry,
                food,
                config.world.population_capacity,
                frame,
                &config.lifecycle,
                rng,
            );

            let deaths = lifecycle::collect_deaths(&agents, registry, &config.lifecycle, rng);
            let dead: HashSet<Uuid> = deaths.iter().map(|d| d.id).collect();
            lifecycle::clear_dangling_mates(&mut agents, &dead);

            metrics.add_to_counter(SKIPPED_UNKNOWN_SPECIES, decisions.skipped as u64);
            metrics.add_to_counter(NO_DECISION, decisions.undecided as u64);
            report.transitions = decisions.transitions;
            report.skipped = decisions.skipped;
            report.kills = outcome.kills;
            (handles, deaths, outcome.births)
        };

        for death in &deaths {
            ecs.despawn(handles[death.index])?;
        }
        lifecycle::decay_markers(markers);
        lifecycle::update_food(food, bounds, config.world.max_food, &config.lifecycle, rng);

        report.deaths = deaths.len();
        for death in deaths {
            markers.push(death.marker);
            food.push(death.carcass);
        }
        report.births = births.len();
        for child in births {
            ecs.spawn((child,));
        }

        if report.deaths > 0 || report.births > 0 {
            tracing::debug!(
                frame,
                births = report.births,
                deaths = report.deaths,
                kills = report.kills,
                "Population changed"
            );
        }
        metrics.record_tick(
            start.elapsed(),
            ecs.len() as usize,
            report.transitions.len(),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::config::AppConfig;
    use crate::model::world::World;
    use ecoboids_data::{Agent, Position, Role, Stance};
    use uuid::Uuid;

    fn quiet_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.world.seed = Some(11);
        config.world.deterministic = true;
        config.lifecycle.plant_spawn_chance = 0.0;
        config
    }

    fn place(world: &mut World, id: u128, species: &str, role: Role, x: f64, y: f64) {
        let phenotype = world
            .config
            .species_config(species)
            .map(|s| s.phenotype)
            .unwrap_or_default();
        world.spawn_agent(Agent::new(
            Uuid::from_u128(id),
            species,
            role,
            Position::new(x, y),
            phenotype.max_energy,
            phenotype.max_health,
            0,
        ));
    }

    #[test]
    fn test_update_advances_frame() {
        let mut world = World::empty(quiet_config()).expect("valid config");
        place(&mut world, 1, "grazer", Role::Prey, 100.0, 100.0);
        let report = world.update().expect("tick");
        assert_eq!(report.frame, 1);
        assert_eq!(world.frame, 1);
        assert_eq!(world.metrics.tick_count(), 1);
    }

    #[test]
    fn test_prey_flees_nearby_hunter() {
        let mut world = World::empty(quiet_config()).expect("valid config");
        place(&mut world, 1, "grazer", Role::Prey, 100.0, 100.0);
        place(&mut world, 2, "stalker", Role::Predator, 130.0, 100.0);
        let report = world.update().expect("tick");

        let prey = world.agent(Uuid::from_u128(1)).expect("prey alive");
        assert_eq!(prey.stance.current, Stance::Fleeing);
        assert_eq!(prey.stance.substate.as_deref(), Some("panic"));
        assert!(report
            .transitions
            .iter()
            .any(|t| t.agent_id == Uuid::from_u128(1) && t.urgent));
    }
}
