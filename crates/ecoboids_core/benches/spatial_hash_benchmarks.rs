use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ecoboids_core::config::BehaviorConfig;
use ecoboids_core::context::BehaviorContext;
use ecoboids_core::evaluator::evaluate;
use ecoboids_core::rules::RuleSet;
use ecoboids_core::spatial_hash::{SpatialHash, WorldBounds};
use ecoboids_data::{Position, Role, Stance};

fn grid_positions() -> Vec<Position> {
    (0..1000)
        .map(|i| Position::new((i % 100) as f64 * 10.0, (i / 100) as f64 * 10.0))
        .collect()
}

fn bounds() -> WorldBounds {
    WorldBounds::new(1000.0, 1000.0)
}

fn bench_spatial_hash_build(c: &mut Criterion) {
    let positions = grid_positions();

    c.bench_function("spatial_hash_build_1000", |b| {
        b.iter(|| {
            let mut spatial = SpatialHash::new(50.0, bounds());
            spatial.insert(&positions);
            black_box(spatial)
        })
    });
}

fn bench_spatial_hash_query(c: &mut Criterion) {
    let mut spatial = SpatialHash::new(50.0, bounds());
    spatial.insert(&grid_positions());

    c.bench_function("spatial_hash_query_50_radius", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            spatial.query_into(Position::new(500.0, 500.0), 24, Some(50.0), &mut results);
            black_box(results.len())
        })
    });
}

fn bench_spatial_hash_query_wrapped(c: &mut Criterion) {
    let mut spatial = SpatialHash::new(50.0, bounds());
    spatial.insert(&grid_positions());

    c.bench_function("spatial_hash_query_corner_wrap", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            spatial.query_into(Position::new(995.0, 5.0), 24, Some(50.0), &mut results);
            black_box(results.len())
        })
    });
}

fn bench_spatial_hash_count_nearby(c: &mut Criterion) {
    let mut spatial = SpatialHash::new(50.0, bounds());
    spatial.insert(&grid_positions());

    c.bench_function("spatial_hash_count_nearby_50", |b| {
        b.iter(|| {
            let count = spatial.count_nearby(Position::new(500.0, 500.0), 50.0);
            black_box(count)
        })
    });
}

fn bench_rule_evaluation(c: &mut Criterion) {
    let rules = RuleSet::standard(BehaviorConfig::default());
    let ctx = BehaviorContext {
        role: Role::Prey,
        energy_ratio: 0.4,
        closest_predator_distance: Some(60.0),
        closest_predator_stance: Some(Stance::Hunting),
        threat_level: 0.7,
        closest_food_distance: Some(20.0),
        ..Default::default()
    };

    c.bench_function("evaluate_prey_rules", |b| {
        b.iter(|| black_box(evaluate(black_box(&ctx), &rules, Role::Prey)))
    });
}

criterion_group!(
    benches,
    bench_spatial_hash_build,
    bench_spatial_hash_query,
    bench_spatial_hash_query_wrapped,
    bench_spatial_hash_count_nearby,
    bench_rule_evaluation
);
criterion_main!(benches);
