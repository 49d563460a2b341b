//! Behaviors both roles share.

use super::{bands, commitment_bonus, BehaviorScore};
use crate::config::BehaviorConfig;
use crate::context::BehaviorContext;
use ecoboids_data::Stance;

/// Food within reach while starving.
pub fn desperate_eat(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if ctx.energy_ratio >= cfg.desperate_energy {
        return None;
    }
    let distance = ctx.closest_food_distance?;
    (distance <= cfg.eat_range).then(|| {
        BehaviorScore::new(Stance::Eating, bands::SURVIVAL, "starving")
            .with_substate("desperate")
            .urgent()
    })
}

/// Stay with a paired mate that is close enough to mate with.
pub fn mating_bond(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    ctx.mate_id?;
    let distance = ctx.mate_distance?;
    if distance > cfg.mating_range {
        return None;
    }
    let score = bands::COMMITMENT + commitment_bonus(ctx.mate_commitment_frames, cfg);
    Some(BehaviorScore::new(Stance::Mating, score, "mate_bonded").with_substate("bonded"))
}

/// Court when ready and someone is available, damped by crowding.
pub fn seek_mate(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if !ctx.seeking_mate || ctx.energy_ratio < cfg.courtship_energy {
        return None;
    }
    if ctx.available_mates == 0 && ctx.mate_id.is_none() {
        return None;
    }
    let score = bands::COURTSHIP * (1.0 - ctx.population_pressure);
    (score > 0.0).then(|| {
        BehaviorScore::new(Stance::SeekingMate, score, "mate_available").with_substate("courting")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ready() -> BehaviorContext {
        BehaviorContext {
            energy_ratio: 0.8,
            seeking_mate: true,
            available_mates: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_desperate_eat_needs_food_in_reach() {
        let cfg = BehaviorConfig::default();
        let mut ctx = BehaviorContext {
            energy_ratio: 0.1,
            closest_food_distance: Some(20.0),
            ..Default::default()
        };
        assert!(desperate_eat(&ctx, &cfg).is_none());
        ctx.closest_food_distance = Some(5.0);
        let score = desperate_eat(&ctx, &cfg).expect("starving next to food");
        assert!(score.urgent);
        assert_eq!(score.score, bands::SURVIVAL);
        ctx.energy_ratio = 0.2;
        assert!(desperate_eat(&ctx, &cfg).is_none());
    }

    #[test]
    fn test_courtship_dampened_by_pressure() {
        let cfg = BehaviorConfig::default();
        let calm = seek_mate(&ready(), &cfg).expect("calm courtship");
        assert_eq!(calm.score, bands::COURTSHIP);

        let crowded = BehaviorContext {
            population_pressure: 0.5,
            ..ready()
        };
        let damped = seek_mate(&crowded, &cfg).expect("damped courtship");
        assert!((damped.score - bands::COURTSHIP * 0.5).abs() < 1e-9);

        let full = BehaviorContext {
            population_pressure: 1.0,
            ..ready()
        };
        assert!(seek_mate(&full, &cfg).is_none());
    }

    #[test]
    fn test_courtship_needs_partner() {
        let cfg = BehaviorConfig::default();
        let alone = BehaviorContext {
            available_mates: 0,
            ..ready()
        };
        assert!(seek_mate(&alone, &cfg).is_none());
    }

    #[test]
    fn test_mating_bond_grows_with_commitment() {
        let cfg = BehaviorConfig::default();
        let mut ctx = BehaviorContext {
            mate_id: Some(Uuid::from_u128(7)),
            mate_distance: Some(4.0),
            ..Default::default()
        };
        let fresh = mating_bond(&ctx, &cfg).expect("bond").score;
        ctx.mate_commitment_frames = 30;
        let settled = mating_bond(&ctx, &cfg).expect("bond").score;
        assert!(settled > fresh);
        ctx.mate_distance = Some(cfg.mating_range + 1.0);
        assert!(mating_bond(&ctx, &cfg).is_none());
    }
}
