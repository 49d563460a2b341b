use super::{bands, commitment_bonus, shared, BehaviorScore, Rule};
use crate::config::BehaviorConfig;
use crate::context::BehaviorContext;
use ecoboids_data::{Role, Stance};

#[must_use]
pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "predator_desperate_eat",
            Role::Predator,
            "Scavenge reachable carcasses when starving",
            shared::desperate_eat,
        ),
        Rule::new(
            "predator_strike",
            Role::Predator,
            "Attack prey within reach",
            strike,
        ),
        Rule::new(
            "predator_eat",
            Role::Predator,
            "Feed on a carcass within reach",
            eat,
        ),
        Rule::new(
            "predator_chase",
            Role::Predator,
            "Keep chasing the locked target",
            chase,
        ),
        Rule::new(
            "predator_pursue",
            Role::Predator,
            "Go after visible prey",
            pursue,
        ),
        Rule::new(
            "predator_mating_bond",
            Role::Predator,
            "Stay with a paired mate",
            shared::mating_bond,
        ),
        Rule::new(
            "predator_rest",
            Role::Predator,
            "Rest when tired, until recovered",
            rest,
        ),
        Rule::new(
            "predator_seek_mate",
            Role::Predator,
            "Court available packmates",
            shared::seek_mate,
        ),
        Rule::new("predator_hunt", Role::Predator, "Default roaming", hunt),
    ]
}

pub fn strike(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if !ctx.attack_ready {
        return None;
    }
    let distance = ctx.locked_target_distance.or(ctx.closest_prey_distance)?;
    (distance <= cfg.attack_range).then(|| {
        BehaviorScore::new(Stance::Hunting, bands::STRIKE, "prey_in_reach").with_substate("striking")
    })
}

pub fn eat(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if ctx.energy_ratio >= cfg.satiated_energy {
        return None;
    }
    let distance = ctx.closest_food_distance?;
    (distance <= cfg.eat_range).then(|| {
        BehaviorScore::new(Stance::Eating, bands::FEED, "carcass_in_reach").with_substate("feeding")
    })
}

/// Continuing an ongoing chase outranks switching to fresh prey.
pub fn chase(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if ctx.stance != Stance::Hunting {
        return None;
    }
    ctx.locked_target_distance?;
    let score = bands::COMMITMENT + commitment_bonus(ctx.lock_frames, cfg);
    Some(BehaviorScore::new(Stance::Hunting, score, "target_locked").with_substate("chasing"))
}

pub fn pursue(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if ctx.energy_ratio >= cfg.satiated_energy {
        return None;
    }
    ctx.closest_prey_distance?;
    Some(BehaviorScore::new(Stance::Hunting, bands::COMMITMENT, "prey_sighted").with_substate("pursuing"))
}

/// Enters below the lower threshold, stays until past the upper one.
pub fn rest(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    let threshold = if ctx.stance == Stance::Idle {
        cfg.rest_exit_energy
    } else {
        cfg.rest_enter_energy
    };
    (ctx.energy_ratio < threshold)
        .then(|| BehaviorScore::new(Stance::Idle, bands::REST, "low_energy").with_substate("resting"))
}

pub fn hunt(_ctx: &BehaviorContext, _cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    Some(BehaviorScore::new(Stance::Hunting, bands::FALLBACK, "default").with_substate("roaming"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn predator(stance: Stance, energy: f64) -> BehaviorContext {
        BehaviorContext {
            role: Role::Predator,
            stance,
            energy_ratio: energy,
            attack_ready: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_rest_hysteresis() {
        let cfg = BehaviorConfig::default();
        assert!(rest(&predator(Stance::Idle, 0.35), &cfg).is_some());
        assert!(rest(&predator(Stance::Hunting, 0.35), &cfg).is_none());
        assert!(rest(&predator(Stance::Hunting, 0.25), &cfg).is_some());
        assert!(rest(&predator(Stance::Idle, 0.55), &cfg).is_none());
    }

    #[test]
    fn test_strike_prefers_locked_target() {
        let cfg = BehaviorConfig::default();
        let mut ctx = BehaviorContext {
            closest_prey_distance: Some(5.0),
            locked_target: Some(Uuid::from_u128(3)),
            locked_target_distance: Some(30.0),
            ..predator(Stance::Hunting, 0.6)
        };
        assert!(strike(&ctx, &cfg).is_none());
        ctx.locked_target_distance = Some(8.0);
        assert_eq!(strike(&ctx, &cfg).map(|s| s.score), Some(bands::STRIKE));
        ctx.attack_ready = false;
        assert!(strike(&ctx, &cfg).is_none());
    }

    #[test]
    fn test_chase_needs_hunting_and_visible_lock() {
        let cfg = BehaviorConfig::default();
        let mut ctx = BehaviorContext {
            locked_target: Some(Uuid::from_u128(3)),
            locked_target_distance: Some(40.0),
            lock_frames: 10,
            ..predator(Stance::Hunting, 0.6)
        };
        let score = chase(&ctx, &cfg).expect("chase");
        assert!((score.score - 620.0).abs() < 1e-9);
        ctx.stance = Stance::Idle;
        assert!(chase(&ctx, &cfg).is_none());
        ctx.stance = Stance::Hunting;
        ctx.locked_target_distance = None;
        assert!(chase(&ctx, &cfg).is_none());
    }

    #[test]
    fn test_pursue_skipped_when_satiated() {
        let cfg = BehaviorConfig::default();
        let hungry = BehaviorContext {
            closest_prey_distance: Some(60.0),
            ..predator(Stance::Hunting, 0.5)
        };
        assert!(pursue(&hungry, &cfg).is_some());
        let full = BehaviorContext {
            energy_ratio: 0.95,
            ..hungry
        };
        assert!(pursue(&full, &cfg).is_none());
    }

    #[test]
    fn test_every_predator_rule_stays_in_vocabulary() {
        let cfg = BehaviorConfig::default();
        let ctx = BehaviorContext {
            closest_prey_distance: Some(2.0),
            locked_target_distance: Some(2.0),
            closest_food_distance: Some(2.0),
            seeking_mate: true,
            available_mates: 1,
            ..predator(Stance::Idle, 0.1)
        };
        for rule in rules() {
            if let Some(score) = (rule.evaluate)(&ctx, &cfg) {
                assert!(score.stance.is_valid_for(Role::Predator), "{}", rule.name);
            }
        }
    }
}
