mod common;

use common::{id, AgentBuilder, WorldBuilder};
use ecoboids_core::MinDurations;
use ecoboids_data::{FoodKind, Stance};

fn breeding_world(capacity: usize) -> WorldBuilder {
    WorldBuilder::new().with_config(move |c| {
        c.min_durations = MinDurations::none();
        c.lifecycle.mating_frames = 3;
        c.world.population_capacity = capacity;
    })
}

#[test]
fn test_pair_mates_and_reproduces() {
    let maturity = WorldBuilder::new().build().config.lifecycle.maturity_age;
    let mut world = breeding_world(300)
        .with_agent(
            AgentBuilder::prey(1)
                .at(100.0, 100.0)
                .energy(0.9)
                .age(maturity)
                .seeking_mate(),
        )
        .with_agent(
            AgentBuilder::prey(2)
                .at(105.0, 100.0)
                .energy(0.9)
                .age(maturity)
                .seeking_mate(),
        )
        .build();

    world.update().expect("tick");
    let a = world.agent(id(1)).expect("alive");
    let b = world.agent(id(2)).expect("alive");
    assert_eq!(a.bonds.mate.id, Some(id(2)));
    assert_eq!(b.bonds.mate.id, Some(id(1)));

    world.update().expect("tick");
    assert_stance!(world, id(1), Stance::Mating, "bonded");
    assert_stance!(world, id(2), Stance::Mating, "bonded");

    let mut births = 0;
    for _ in 0..20 {
        births += world.update().expect("tick").births;
    }
    assert_eq!(births, 1);
    assert_population!(world, 3);

    let child = world
        .agents()
        .into_iter()
        .find(|a| a.identity.id != id(1) && a.identity.id != id(2))
        .expect("offspring");
    assert_eq!(child.identity.species, "grazer");
    for parent in [id(1), id(2)] {
        let p = world.agent(parent).expect("parent alive");
        assert!(p.bonds.mate.id.is_none());
        assert!(p.vitals.cooldowns.reproduction > 0);
    }
}

#[test]
fn test_full_world_does_not_breed() {
    let maturity = WorldBuilder::new().build().config.lifecycle.maturity_age;
    let mut world = breeding_world(2)
        .with_agent(
            AgentBuilder::prey(1)
                .at(100.0, 100.0)
                .energy(0.9)
                .age(maturity)
                .seeking_mate(),
        )
        .with_agent(
            AgentBuilder::prey(2)
                .at(105.0, 100.0)
                .energy(0.9)
                .age(maturity)
                .seeking_mate(),
        )
        .build();

    let births: usize = (0..20)
        .map(|_| world.update().expect("tick").births)
        .sum();
    assert_eq!(births, 0);
    assert_population!(world, 2);
}

#[test]
fn test_starvation_kills_and_leaves_carcass() {
    let mut world = WorldBuilder::new()
        .with_config(|c| c.lifecycle.starvation_damage = 1000.0)
        .with_agent(AgentBuilder::prey(1).at(50.0, 50.0).energy(0.0))
        .build();

    let report = world.update().expect("tick");
    assert_eq!(report.deaths, 1);
    assert_eq!(report.kills, 0);
    assert_agent_dead!(world, id(1));
    assert_eq!(world.markers.len(), 1);
    assert!(world.food.iter().any(|f| f.kind == FoodKind::Carcass));
}

#[test]
fn test_grazing_restores_energy() {
    let mut world = WorldBuilder::new()
        .with_config(|c| c.min_durations = MinDurations::none())
        .with_food(102.0, 100.0, 40.0, FoodKind::Plant)
        .with_agent(AgentBuilder::prey(1).at(100.0, 100.0).energy(0.4))
        .build();

    world.update().expect("tick");
    assert_stance!(world, id(1), Stance::Eating, "grazing");
    let energy = world.agent(id(1)).expect("alive").vitals.energy;
    assert!(energy > 40.0, "energy {energy} should rise after a bite");
    assert!(world.food[0].energy < 40.0);
}

#[test]
fn test_death_markers_fade() {
    let mut world = WorldBuilder::new()
        .with_config(|c| {
            c.lifecycle.starvation_damage = 1000.0;
            c.lifecycle.marker_lifetime = 3;
        })
        .with_agent(AgentBuilder::prey(1).at(50.0, 50.0).energy(0.0))
        .build();

    world.update().expect("tick");
    assert_eq!(world.markers.len(), 1);
    for _ in 0..3 {
        world.update().expect("tick");
    }
    assert!(world.markers.is_empty());
}
