//! Stance-driven steering.
//!
//! Each stance maps to a weighted list of named forces. The table is plain
//! configuration, so names are checked against [`SteeringForce`] up front
//! and again at application time.

use crate::context::{AgentSnapshot, Sighted};
use crate::error::{DecisionError, Result};
use crate::spatial_hash::WorldBounds;
use ecoboids_data::{DeathMarker, FoodSource, Obstacle, Position, Stance, Velocity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flockmates closer than this push each other apart.
pub const SEPARATION_DISTANCE: f64 = 25.0;
/// Extra clearance kept around obstacle edges.
pub const OBSTACLE_MARGIN: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SteeringForce {
    Separation,
    Alignment,
    Cohesion,
    SeekFood,
    Flee,
    Pursue,
    SeekMate,
    AvoidObstacles,
    AvoidHazards,
    Wander,
}

impl SteeringForce {
    pub const ALL: [SteeringForce; 10] = [
        SteeringForce::Separation,
        SteeringForce::Alignment,
        SteeringForce::Cohesion,
        SteeringForce::SeekFood,
        SteeringForce::Flee,
        SteeringForce::Pursue,
        SteeringForce::SeekMate,
        SteeringForce::AvoidObstacles,
        SteeringForce::AvoidHazards,
        SteeringForce::Wander,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SteeringForce::Separation => "separation",
            SteeringForce::Alignment => "alignment",
            SteeringForce::Cohesion => "cohesion",
            SteeringForce::SeekFood => "seek_food",
            SteeringForce::Flee => "flee",
            SteeringForce::Pursue => "pursue",
            SteeringForce::SeekMate => "seek_mate",
            SteeringForce::AvoidObstacles => "avoid_obstacles",
            SteeringForce::AvoidHazards => "avoid_hazards",
            SteeringForce::Wander => "wander",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn resolve(stance: Stance, name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| DecisionError::UnknownForce {
            stance,
            force: name.to_string(),
        })
    }

    /// Unweighted steering vector, at most unit length.
    #[must_use]
    pub fn compute(self, input: &SteeringInput<'_>) -> (f64, f64) {
        match self {
            SteeringForce::Separation => separation(input),
            SteeringForce::Alignment => alignment(input),
            SteeringForce::Cohesion => cohesion(input),
            SteeringForce::SeekFood => input
                .food
                .iter()
                .filter(|f| f.item.edible_by(input.role))
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
                .map_or((0.0, 0.0), |f| towards(input, f.item.position)),
            SteeringForce::Flee => flee(input),
            SteeringForce::Pursue => input.target.map_or((0.0, 0.0), |t| towards(input, t)),
            SteeringForce::SeekMate => input.mate.map_or((0.0, 0.0), |m| towards(input, m)),
            SteeringForce::AvoidObstacles => avoid_obstacles(input),
            SteeringForce::AvoidHazards => avoid_hazards(input),
            SteeringForce::Wander => (input.wander_angle.cos(), input.wander_angle.sin()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedForce {
    pub name: String,
    pub weight: f64,
}

impl WeightedForce {
    #[must_use]
    pub fn new(name: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            weight,
        }
    }
}

/// Stance to weighted forces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForceTable(BTreeMap<Stance, Vec<WeightedForce>>);

impl Default for ForceTable {
    fn default() -> Self {
        let w = WeightedForce::new;
        Self(BTreeMap::from([
            (
                Stance::Flocking,
                vec![
                    w("separation", 1.5),
                    w("alignment", 1.0),
                    w("cohesion", 1.0),
                    w("avoid_obstacles", 2.0),
                    w("wander", 0.2),
                ],
            ),
            (
                Stance::Fleeing,
                vec![
                    w("flee", 2.5),
                    w("avoid_hazards", 1.0),
                    w("separation", 0.8),
                    w("avoid_obstacles", 2.0),
                ],
            ),
            (
                Stance::Eating,
                vec![w("seek_food", 1.5), w("separation", 0.8), w("avoid_obstacles", 2.0)],
            ),
            (
                Stance::SeekingMate,
                vec![
                    w("seek_mate", 1.2),
                    w("cohesion", 0.5),
                    w("separation", 0.8),
                    w("avoid_obstacles", 2.0),
                ],
            ),
            (
                Stance::Mating,
                vec![w("seek_mate", 0.6), w("avoid_obstacles", 2.0)],
            ),
            (
                Stance::Hunting,
                vec![
                    w("pursue", 2.0),
                    w("separation", 0.6),
                    w("avoid_obstacles", 2.0),
                    w("wander", 0.4),
                ],
            ),
            (
                Stance::Idle,
                vec![w("separation", 0.5), w("avoid_obstacles", 1.0), w("wander", 0.1)],
            ),
        ]))
    }
}

impl ForceTable {
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set(&mut self, stance: Stance, forces: Vec<WeightedForce>) {
        self.0.insert(stance, forces);
    }

    pub fn forces_for(&self, stance: Stance) -> Result<&[WeightedForce]> {
        self.0
            .get(&stance)
            .map(Vec::as_slice)
            .ok_or(DecisionError::MissingForces { stance })
    }

    /// Every force of `stance` must exist.
    pub fn validate_stance(&self, stance: Stance) -> Result<()> {
        for force in self.forces_for(stance)? {
            SteeringForce::resolve(stance, &force.name)?;
        }
        Ok(())
    }

    /// Weighted sum of the stance's forces.
    pub fn steer(&self, stance: Stance, input: &SteeringInput<'_>) -> Result<(f64, f64)> {
        let mut total = (0.0, 0.0);
        for force in self.forces_for(stance)? {
            let (x, y) = SteeringForce::resolve(stance, &force.name)?.compute(input);
            total.0 += x * force.weight;
            total.1 += y * force.weight;
        }
        Ok(total)
    }
}

/// What the steering functions may read about one agent's surroundings.
#[derive(Debug, Clone, Copy)]
pub struct SteeringInput<'a> {
    pub bounds: WorldBounds,
    pub role: ecoboids_data::Role,
    pub position: Position,
    pub velocity: Velocity,
    pub flock: &'a [Sighted<'a, AgentSnapshot>],
    pub threats: &'a [Sighted<'a, AgentSnapshot>],
    pub food: &'a [Sighted<'a, FoodSource>],
    pub obstacles: &'a [Sighted<'a, Obstacle>],
    pub hazards: &'a [Sighted<'a, DeathMarker>],
    pub target: Option<Position>,
    pub mate: Option<Position>,
    pub wander_angle: f64,
}

fn normalize(x: f64, y: f64) -> (f64, f64) {
    let len = x.hypot(y);
    if len > f64::EPSILON && len.is_finite() {
        (x / len, y / len)
    } else {
        (0.0, 0.0)
    }
}

fn towards(input: &SteeringInput<'_>, to: Position) -> (f64, f64) {
    let (dx, dy) = input.bounds.delta(input.position, to);
    normalize(dx, dy)
}

fn away_weighted(input: &SteeringInput<'_>, from: Position, distance: f64) -> (f64, f64) {
    let (dx, dy) = input.bounds.delta(input.position, from);
    let (ux, uy) = normalize(-dx, -dy);
    let weight = 1.0 / distance.max(1.0);
    (ux * weight, uy * weight)
}

fn separation(input: &SteeringInput<'_>) -> (f64, f64) {
    let (sx, sy) = input
        .flock
        .iter()
        .filter(|m| m.distance < SEPARATION_DISTANCE)
        .map(|m| away_weighted(input, m.item.position, m.distance))
        .fold((0.0, 0.0), |acc, v| (acc.0 + v.0, acc.1 + v.1));
    normalize(sx, sy)
}

fn alignment(input: &SteeringInput<'_>) -> (f64, f64) {
    if input.flock.is_empty() {
        return (0.0, 0.0);
    }
    let n = input.flock.len() as f64;
    let (vx, vy) = input
        .flock
        .iter()
        .fold((0.0, 0.0), |acc, m| (acc.0 + m.item.velocity.vx, acc.1 + m.item.velocity.vy));
    normalize(vx / n - input.velocity.vx, vy / n - input.velocity.vy)
}

fn cohesion(input: &SteeringInput<'_>) -> (f64, f64) {
    if input.flock.is_empty() {
        return (0.0, 0.0);
    }
    let (dx, dy) = input.flock.iter().fold((0.0, 0.0), |acc, m| {
        let d = input.bounds.delta(input.position, m.item.position);
        (acc.0 + d.0, acc.1 + d.1)
    });
    normalize(dx, dy)
}

fn flee(input: &SteeringInput<'_>) -> (f64, f64) {
    let (x, y) = input
        .threats
        .iter()
        .map(|p| away_weighted(input, p.item.position, p.distance))
        .fold((0.0, 0.0), |acc, v| (acc.0 + v.0, acc.1 + v.1));
    normalize(x, y)
}

fn avoid_obstacles(input: &SteeringInput<'_>) -> (f64, f64) {
    let (x, y) = input
        .obstacles
        .iter()
        .filter(|o| o.distance < o.item.radius + OBSTACLE_MARGIN)
        .map(|o| away_weighted(input, o.item.position, (o.distance - o.item.radius).max(1.0)))
        .fold((0.0, 0.0), |acc, v| (acc.0 + v.0, acc.1 + v.1));
    normalize(x, y)
}

fn avoid_hazards(input: &SteeringInput<'_>) -> (f64, f64) {
    let (x, y) = input
        .hazards
        .iter()
        .map(|h| {
            let (ax, ay) = away_weighted(input, h.item.position, h.distance);
            (ax * h.item.strength, ay * h.item.strength)
        })
        .fold((0.0, 0.0), |acc, v| (acc.0 + v.0, acc.1 + v.1));
    normalize(x, y)
}
