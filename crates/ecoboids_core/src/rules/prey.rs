use super::{bands, shared, BehaviorScore, Rule};
use crate::config::BehaviorConfig;
use crate::context::BehaviorContext;
use ecoboids_data::{Role, Stance};

#[must_use]
pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "prey_desperate_eat",
            Role::Prey,
            "Eat reachable food when starving",
            shared::desperate_eat,
        ),
        Rule::new(
            "prey_flee",
            Role::Prey,
            "Run from the closest predator, scaled by threat",
            flee,
        ),
        Rule::new("prey_eat", Role::Prey, "Graze food within reach", eat),
        Rule::new(
            "prey_mating_bond",
            Role::Prey,
            "Stay with a paired mate",
            shared::mating_bond,
        ),
        Rule::new(
            "prey_seek_mate",
            Role::Prey,
            "Court available flockmates",
            shared::seek_mate,
        ),
        Rule::new("prey_forage", Role::Prey, "Head for visible food", forage),
        Rule::new(
            "prey_avoid_hazard",
            Role::Prey,
            "Stay wary near death markers",
            avoid_hazard,
        ),
        Rule::new("prey_flock", Role::Prey, "Default flocking", flock),
    ]
}

/// Panic inside the panic radius, tactical retreat beyond it.
pub fn flee(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    let distance = ctx.closest_predator_distance?;
    if ctx.threat_level <= 0.0 {
        return None;
    }
    let panic_distance = match ctx.closest_predator_stance {
        Some(Stance::Hunting) => cfg.panic_distance_hunting,
        _ => cfg.panic_distance_other,
    };
    let score = BehaviorScore::new(
        Stance::Fleeing,
        cfg.flee_base_score * ctx.threat_level,
        "predator_threat",
    );
    Some(if distance < panic_distance {
        score.with_substate("panic").urgent()
    } else {
        score.with_substate("tactical")
    })
}

pub fn eat(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if ctx.energy_ratio >= cfg.satiated_energy {
        return None;
    }
    let distance = ctx.closest_food_distance?;
    (distance <= cfg.eat_range).then(|| {
        BehaviorScore::new(Stance::Eating, bands::FEED, "food_in_reach").with_substate("grazing")
    })
}

pub fn forage(ctx: &BehaviorContext, cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    if ctx.energy_ratio >= cfg.hungry_energy {
        return None;
    }
    let distance = ctx.closest_food_distance?;
    (distance > cfg.eat_range).then(|| {
        BehaviorScore::new(Stance::Eating, bands::FORAGE, "hungry").with_substate("foraging")
    })
}

pub fn avoid_hazard(ctx: &BehaviorContext, _cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    (ctx.hazard_intensity > 0.0).then(|| {
        BehaviorScore::new(
            Stance::Fleeing,
            bands::HAZARD * ctx.hazard_intensity,
            "death_scent",
        )
        .with_substate("wary")
    })
}

pub fn flock(_ctx: &BehaviorContext, _cfg: &BehaviorConfig) -> Option<BehaviorScore> {
    Some(BehaviorScore::new(Stance::Flocking, bands::FALLBACK, "default").with_substate("cruising"))
}
