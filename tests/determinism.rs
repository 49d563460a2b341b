use ecoboids_lib::model::config::AppConfig;
use ecoboids_lib::model::World;

fn seeded_config(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.world.seed = Some(seed);
    config.world.deterministic = true;
    config.world.initial_prey = 60;
    config.world.initial_predators = 6;
    config
}

#[test]
fn test_determinism_consistency() {
    let mut world1 = World::new(seeded_config(12345)).unwrap();
    let mut world2 = World::new(seeded_config(12345)).unwrap();

    for _ in 0..100 {
        let r1 = world1.update().unwrap();
        let r2 = world2.update().unwrap();
        assert_eq!(r1, r2, "Tick reports should match at frame {}", r1.frame);
    }

    let agents1 = world1.agents();
    let agents2 = world2.agents();
    assert_eq!(agents1.len(), agents2.len(), "Agent counts should match");
    for (a, b) in agents1.iter().zip(&agents2) {
        assert_eq!(a.identity.id, b.identity.id);
        assert_eq!(a.position, b.position, "Agent {} position", a.identity.id);
        assert_eq!(a.stance, b.stance, "Agent {} stance", a.identity.id);
        assert_eq!(a.vitals.energy, b.vitals.energy);
    }

    assert_eq!(world1.food, world2.food, "Food should match");
    assert_eq!(world1.markers, world2.markers, "Markers should match");
}

#[test]
fn test_different_seeds_diverge() {
    let mut world1 = World::new(seeded_config(1)).unwrap();
    let mut world2 = World::new(seeded_config(2)).unwrap();
    for _ in 0..10 {
        world1.update().unwrap();
        world2.update().unwrap();
    }
    assert_ne!(world1.agents(), world2.agents());
}

#[test]
fn test_long_run_stays_finite() {
    let mut world = World::new(seeded_config(77)).unwrap();
    for _ in 0..300 {
        world.update().unwrap();
    }
    for agent in world.agents() {
        assert!(agent.position.is_finite(), "Agent {} position", agent.identity.id);
        assert!(agent.velocity.vx.is_finite() && agent.velocity.vy.is_finite());
        assert!(agent.vitals.energy.is_finite());
        assert!((0.0..world.bounds.width).contains(&agent.position.x));
        assert!((0.0..world.bounds.height).contains(&agent.position.y));
    }
    let stats = world.stats();
    assert!(stats.energy.values().all(|e| e.is_finite()));
    assert_eq!(world.metrics.tick_count(), 300);
}
