use ecoboids_core::config::{BehaviorConfig, ThreatConfig};
use ecoboids_core::context::{threat_level, BehaviorContext};
use ecoboids_core::evaluator::evaluate;
use ecoboids_core::rules::RuleSet;
use ecoboids_data::{Role, Stance};
use proptest::prelude::*;
use proptest_derive::Arbitrary;

#[derive(Debug, Clone, Copy, Arbitrary)]
enum PredatorActivity {
    Hunting,
    Eating,
    SeekingMate,
    Mating,
    Idle,
}

impl From<PredatorActivity> for Stance {
    fn from(a: PredatorActivity) -> Self {
        match a {
            PredatorActivity::Hunting => Stance::Hunting,
            PredatorActivity::Eating => Stance::Eating,
            PredatorActivity::SeekingMate => Stance::SeekingMate,
            PredatorActivity::Mating => Stance::Mating,
            PredatorActivity::Idle => Stance::Idle,
        }
    }
}

fn threatened_prey(stance: Stance, distance: f64, energy: f64) -> BehaviorContext {
    BehaviorContext {
        role: Role::Prey,
        energy_ratio: energy,
        health_ratio: 1.0,
        predator_count: 1,
        closest_predator_distance: Some(distance),
        closest_predator_stance: Some(stance),
        threat_level: threat_level(stance, distance, &ThreatConfig::default()),
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_threat_in_unit_range_and_falls_with_distance(
        activity in any::<PredatorActivity>(),
        near in 0.0f64..400.0,
        extra in 0.0f64..400.0
    ) {
        let cfg = ThreatConfig::default();
        let stance = Stance::from(activity);
        let close = threat_level(stance, near, &cfg);
        let far = threat_level(stance, near + extra, &cfg);
        prop_assert!((0.0..=1.0).contains(&close));
        prop_assert!(far <= close);
        if near >= cfg.max_threat_distance {
            prop_assert_eq!(close, 0.0);
        }
    }

    #[test]
    fn test_prey_panics_only_inside_panic_radius(
        activity in any::<PredatorActivity>(),
        distance in 0.0f64..199.0,
        energy in 0.25f64..1.0
    ) {
        let behavior = BehaviorConfig::default();
        let rules = RuleSet::standard(behavior.clone());
        let stance = Stance::from(activity);
        let ctx = threatened_prey(stance, distance, energy);

        let best = evaluate(&ctx, &rules, Role::Prey).expect("prey always has a fallback");
        let panic_radius = if stance == Stance::Hunting {
            behavior.panic_distance_hunting
        } else {
            behavior.panic_distance_other
        };
        if distance < panic_radius {
            prop_assert_eq!(best.stance, Stance::Fleeing);
            prop_assert!(best.urgent);
        } else {
            prop_assert!(!best.urgent, "urgent {:?} at distance {}", best, distance);
        }
        prop_assert!(best.score.is_finite() && best.score >= 0.0);
    }

    #[test]
    fn test_predator_always_decides(
        energy in 0.0f64..=1.0,
        prey_distance in proptest::option::of(0.0f64..150.0),
        attack_ready in any::<bool>()
    ) {
        let rules = RuleSet::standard(BehaviorConfig::default());
        let ctx = BehaviorContext {
            role: Role::Predator,
            stance: Stance::Hunting,
            energy_ratio: energy,
            closest_prey_distance: prey_distance,
            prey_count: usize::from(prey_distance.is_some()),
            attack_ready,
            ..Default::default()
        };
        let best = evaluate(&ctx, &rules, Role::Predator).expect("predator fallback");
        prop_assert!(best.stance.is_valid_for(Role::Predator));
    }
}
