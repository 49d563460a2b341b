//! Steering and integration.

use super::perception::{NeighborBuffers, PerceptionView};
use crate::error::Result;
use crate::forces::{ForceTable, SteeringInput};
use crate::spatial_hash::WorldBounds;
use ecoboids_data::{Acceleration, Agent, Position, Stance};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::f64::consts::TAU;

/// Largest per-frame velocity change, as a share of max speed.
pub const MAX_FORCE_RATIO: f64 = 0.25;

/// Share of max speed used in each stance.
#[must_use]
pub fn speed_factor(stance: Stance, substate: Option<&str>) -> f64 {
    match (stance, substate) {
        (Stance::Fleeing, Some("wary")) => 0.7,
        (Stance::Fleeing, _) => 1.0,
        (Stance::Hunting, Some("striking" | "chasing")) => 1.0,
        (Stance::Hunting, Some("pursuing")) => 0.9,
        (Stance::Hunting, _) => 0.5,
        (Stance::Flocking | Stance::SeekingMate, _) => 0.6,
        (Stance::Eating, Some("foraging")) => 0.7,
        (Stance::Eating, _) => 0.2,
        (Stance::Mating | Stance::Idle, _) => 0.1,
    }
}

/// Per-agent wander heading, stable for a given seed, frame and id.
#[must_use]
pub fn wander_angle(seed: u64, frame: u64, id: uuid::Uuid) -> f64 {
    let u = id.as_u128();
    let mut mixed = frame.wrapping_add(seed).wrapping_mul(0x517C_C1B7_2722_0A95);
    mixed ^= (u >> 64) as u64;
    mixed = mixed.wrapping_mul(0x517C_C1B7_2722_0A95);
    mixed ^= u as u64;
    rand_chacha::ChaCha8Rng::seed_from_u64(mixed).gen_range(0.0..TAU)
}

/// Computes the agent's acceleration from its stance forces.
pub fn steer_agent<'a>(
    view: &PerceptionView<'a>,
    forces: &ForceTable,
    agent: &mut Agent,
    buffers: &mut NeighborBuffers<'a>,
    wander: f64,
) -> Result<()> {
    let Some(species) = view.registry.get(&agent.identity.species) else {
        agent.acceleration = Acceleration::default();
        return Ok(());
    };
    let role = species.role;
    let neighbors = buffers.gather(view, agent, role, species.phenotype.vision_range);

    let target = agent
        .bonds
        .target
        .id
        .and_then(|id| neighbors.prey.iter().find(|p| p.item.id == id))
        .or_else(|| {
            neighbors
                .prey
                .iter()
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        })
        .map(|p| p.item.position);
    let mate = agent
        .bonds
        .mate
        .id
        .and_then(|id| neighbors.flock.iter().find(|m| m.item.id == id))
        .or_else(|| {
            neighbors
                .flock
                .iter()
                .filter(|m| m.item.is_mate_ready())
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
        })
        .map(|m| m.item.position);

    let input = SteeringInput {
        bounds: view.bounds,
        role,
        position: agent.position,
        velocity: agent.velocity,
        flock: neighbors.flock,
        threats: neighbors.predators,
        food: neighbors.food,
        obstacles: neighbors.obstacles,
        hazards: neighbors.hazards,
        target,
        mate,
        wander_angle: wander,
    };
    let (ax, ay) = forces.steer(agent.stance.current, &input)?;

    let max_force = species.phenotype.max_speed * MAX_FORCE_RATIO;
    let (ax, ay) = clamp_length(ax, ay, max_force);
    agent.acceleration = Acceleration { ax, ay };
    Ok(())
}

/// Applies acceleration, caps speed and wraps the position.
pub fn integrate(agent: &mut Agent, bounds: WorldBounds, max_speed: f64) {
    let vx = agent.velocity.vx + agent.acceleration.ax;
    let vy = agent.velocity.vy + agent.acceleration.ay;
    let (vx, vy) = clamp_length(vx, vy, max_speed);
    let next = Position::new(agent.position.x + vx, agent.position.y + vy);
    if !next.is_finite() {
        agent.velocity = Default::default();
        return;
    }
    agent.velocity.vx = vx;
    agent.velocity.vy = vy;
    agent.position = bounds.wrap(next);
}

fn clamp_length(x: f64, y: f64, max: f64) -> (f64, f64) {
    let len = x.hypot(y);
    if !len.is_finite() || max <= 0.0 {
        return (0.0, 0.0);
    }
    if len > max {
        (x / len * max, y / len * max)
    } else {
        (x, y)
    }
}

/// Steers and moves every agent in parallel against the frozen view.
pub fn run_movement(
    view: &PerceptionView<'_>,
    forces: &ForceTable,
    agents: &mut [&mut Agent],
    seed: u64,
    frame: u64,
) -> Result<()> {
    agents
        .par_iter_mut()
        .try_for_each_init(NeighborBuffers::default, |buffers, agent| {
            let wander = wander_angle(seed, frame, agent.identity.id);
            steer_agent(view, forces, agent, buffers, wander)?;
            let max_speed = view
                .registry
                .get(&agent.identity.species)
                .map_or(0.0, |s| s.phenotype.max_speed);
            let factor = speed_factor(agent.stance.current, agent.stance.substate.as_deref());
            integrate(agent, view.bounds, max_speed * factor);
            Ok(())
        })
}
