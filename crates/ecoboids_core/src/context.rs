//! Per-tick decision snapshot.
//!
//! [`ContextBuilder`] folds one agent's state and its already-partitioned
//! neighbor lists into a [`BehaviorContext`], the only thing rules ever see.
//! It is a pure transform: no spatial queries, no mutation.

use crate::config::ThreatConfig;
use crate::spatial_hash::Positioned;
use ecoboids_data::{
    Agent, DeathMarker, FoodSource, Obstacle, Position, Role, SpeciesConfig, Stance, Velocity,
};
use uuid::Uuid;

/// Population share at which crowding starts to weigh on courtship.
pub const PRESSURE_ONSET: f64 = 0.7;

/// Read-only view of an agent captured before any decision of the tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshot {
    pub id: Uuid,
    pub species: String,
    /// `None` when the species is missing from the registry.
    pub role: Option<Role>,
    pub position: Position,
    pub velocity: Velocity,
    pub stance: Stance,
    pub seeking_mate: bool,
    pub mate: Option<Uuid>,
}

impl AgentSnapshot {
    #[must_use]
    pub fn capture(agent: &Agent, role: Option<Role>) -> Self {
        Self {
            id: agent.identity.id,
            species: agent.identity.species.clone(),
            role,
            position: agent.position,
            velocity: agent.velocity,
            stance: agent.stance.current,
            seeking_mate: agent.vitals.seeking_mate,
            mate: agent.bonds.mate.id,
        }
    }

    #[must_use]
    pub fn is_mate_ready(&self) -> bool {
        self.seeking_mate || self.stance == Stance::SeekingMate
    }
}

impl Positioned for AgentSnapshot {
    fn position(&self) -> Position {
        self.position
    }
}

/// A neighbor paired with its wrapped distance from the observer.
#[derive(Debug)]
pub struct Sighted<'a, T> {
    pub item: &'a T,
    pub distance: f64,
}

impl<T> Clone for Sighted<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Sighted<'_, T> {}

impl<'a, T> Sighted<'a, T> {
    #[must_use]
    pub fn new(item: &'a T, distance: f64) -> Self {
        Self { item, distance }
    }
}

/// Neighbor lists already partitioned by role. Each list is bounded by the
/// perception neighbor cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neighborhood<'a> {
    /// Same species, same role.
    pub flock: &'a [Sighted<'a, AgentSnapshot>],
    /// Opposite-role agents that hunt the observer.
    pub predators: &'a [Sighted<'a, AgentSnapshot>],
    /// Opposite-role agents the observer hunts.
    pub prey: &'a [Sighted<'a, AgentSnapshot>],
    pub food: &'a [Sighted<'a, FoodSource>],
    pub obstacles: &'a [Sighted<'a, Obstacle>],
    pub hazards: &'a [Sighted<'a, DeathMarker>],
}

/// Simulation-wide numbers the context needs from the engine loop.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationCounters {
    pub frame: u64,
    pub population: usize,
    pub capacity: usize,
}

impl SimulationCounters {
    #[must_use]
    pub fn population_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.population as f64 / self.capacity as f64
        }
    }
}

/// Everything a rule may look at. Rebuilt every tick, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorContext {
    pub role: Role,
    pub frame: u64,
    pub stance: Stance,
    pub frames_in_stance: u64,

    pub energy_ratio: f64,
    pub health_ratio: f64,
    pub age: u64,

    pub predator_count: usize,
    pub closest_predator_distance: Option<f64>,
    pub closest_predator_stance: Option<Stance>,
    pub prey_count: usize,
    pub closest_prey_distance: Option<f64>,
    pub closest_prey_id: Option<Uuid>,
    pub food_count: usize,
    pub closest_food_distance: Option<f64>,
    pub flock_count: usize,
    pub closest_flockmate_distance: Option<f64>,
    pub obstacle_count: usize,
    /// Distance to the nearest obstacle edge.
    pub closest_obstacle_clearance: Option<f64>,
    pub hazard_count: usize,
    /// Combined death-marker scent in `[0, 1]`.
    pub hazard_intensity: f64,

    /// Continuous danger signal in `[0, 1]`.
    pub threat_level: f64,
    pub available_mates: usize,
    pub seeking_mate: bool,
    pub attack_ready: bool,

    pub locked_target: Option<Uuid>,
    pub lock_strength: f32,
    pub lock_frames: u32,
    /// Present only while the locked target is in sight.
    pub locked_target_distance: Option<f64>,
    pub mate_id: Option<Uuid>,
    pub mate_commitment_frames: u32,
    pub mate_distance: Option<f64>,

    pub population_pressure: f64,
}

impl Default for BehaviorContext {
    fn default() -> Self {
        Self {
            role: Role::Prey,
            frame: 0,
            stance: Stance::initial(Role::Prey),
            frames_in_stance: 0,
            energy_ratio: 0.0,
            health_ratio: 0.0,
            age: 0,
            predator_count: 0,
            closest_predator_distance: None,
            closest_predator_stance: None,
            prey_count: 0,
            closest_prey_distance: None,
            closest_prey_id: None,
            food_count: 0,
            closest_food_distance: None,
            flock_count: 0,
            closest_flockmate_distance: None,
            obstacle_count: 0,
            closest_obstacle_clearance: None,
            hazard_count: 0,
            hazard_intensity: 0.0,
            threat_level: 0.0,
            available_mates: 0,
            seeking_mate: false,
            attack_ready: false,
            locked_target: None,
            lock_strength: 0.0,
            lock_frames: 0,
            locked_target_distance: None,
            mate_id: None,
            mate_commitment_frames: 0,
            mate_distance: None,
            population_pressure: 0.0,
        }
    }
}

impl BehaviorContext {
    /// True when any floating-point field holds NaN.
    #[must_use]
    pub fn has_nan(&self) -> bool {
        let opt = |v: Option<f64>| v.is_some_and(f64::is_nan);
        self.energy_ratio.is_nan()
            || self.health_ratio.is_nan()
            || self.hazard_intensity.is_nan()
            || self.threat_level.is_nan()
            || self.population_pressure.is_nan()
            || self.lock_strength.is_nan()
            || opt(self.closest_predator_distance)
            || opt(self.closest_prey_distance)
            || opt(self.closest_food_distance)
            || opt(self.closest_flockmate_distance)
            || opt(self.closest_obstacle_clearance)
            || opt(self.locked_target_distance)
            || opt(self.mate_distance)
    }
}

/// Inputs for one context build.
#[derive(Debug, Clone, Copy)]
pub struct ContextInput<'a> {
    pub agent: &'a Agent,
    pub species: &'a SpeciesConfig,
    pub neighbors: &'a Neighborhood<'a>,
    pub counters: SimulationCounters,
}

#[derive(Debug, Clone, Default)]
pub struct ContextBuilder {
    pub threat: ThreatConfig,
}

impl ContextBuilder {
    #[must_use]
    pub fn new(threat: ThreatConfig) -> Self {
        Self { threat }
    }

    #[must_use]
    pub fn build(&self, input: &ContextInput<'_>) -> BehaviorContext {
        let mut ctx = BehaviorContext::default();
        self.build_into(input, &mut ctx);
        ctx
    }

    /// Overwrites every field of `out`; nothing from a previous build leaks
    /// through.
    pub fn build_into(&self, input: &ContextInput<'_>, out: &mut BehaviorContext) {
        let agent = input.agent;
        let role = input.species.role;
        let phenotype = &input.species.phenotype;
        let n = input.neighbors;
        let frame = input.counters.frame;

        let closest_predator = closest(n.predators);
        let closest_prey = closest(n.prey);

        let edible = n.food.iter().filter(|f| f.item.edible_by(role));
        let (food_count, closest_food_distance) =
            edible.fold((0usize, None::<f64>), |(count, best), f| {
                (count + 1, Some(best.map_or(f.distance, |b| b.min(f.distance))))
            });

        let flock = n.flock.iter().filter(|s| s.item.id != agent.identity.id);
        let mut flock_count = 0;
        let mut closest_flockmate_distance: Option<f64> = None;
        let mut available_mates = 0;
        let mut mate_distance = None;
        for mate in flock {
            flock_count += 1;
            if closest_flockmate_distance.map_or(true, |d| mate.distance < d) {
                closest_flockmate_distance = Some(mate.distance);
            }
            if mate.item.is_mate_ready() {
                available_mates += 1;
            }
            if agent.bonds.mate.id == Some(mate.item.id) {
                mate_distance = Some(mate.distance);
            }
        }

        let closest_obstacle_clearance = n
            .obstacles
            .iter()
            .map(|o| (o.distance - o.item.radius).max(0.0))
            .reduce(f64::min);

        let target = agent.bonds.target;
        let locked_target_distance = target.id.and_then(|id| {
            n.prey
                .iter()
                .find(|s| s.item.id == id)
                .map(|s| s.distance)
        });

        let threat_level = closest_predator.map_or(0.0, |p| {
            threat_level(p.item.stance, p.distance, &self.threat)
        });

        *out = BehaviorContext {
            role,
            frame,
            stance: agent.stance.current,
            frames_in_stance: agent.stance.frames_in_stance(frame),
            energy_ratio: ratio(agent.vitals.energy, phenotype.max_energy),
            health_ratio: ratio(agent.vitals.health, phenotype.max_health),
            age: agent.vitals.age,
            predator_count: n.predators.len(),
            closest_predator_distance: closest_predator.map(|p| p.distance),
            closest_predator_stance: closest_predator.map(|p| p.item.stance),
            prey_count: n.prey.len(),
            closest_prey_distance: closest_prey.map(|p| p.distance),
            closest_prey_id: closest_prey.map(|p| p.item.id),
            food_count,
            closest_food_distance,
            flock_count,
            closest_flockmate_distance,
            obstacle_count: n.obstacles.len(),
            closest_obstacle_clearance,
            hazard_count: n.hazards.len(),
            hazard_intensity: hazard_intensity(n.hazards, phenotype.vision_range),
            threat_level,
            available_mates,
            seeking_mate: agent.vitals.seeking_mate,
            attack_ready: agent.vitals.cooldowns.attack == 0,
            locked_target: target.id,
            lock_strength: target.strength,
            lock_frames: target.frames,
            locked_target_distance,
            mate_id: agent.bonds.mate.id,
            mate_commitment_frames: agent.bonds.mate.commitment_frames,
            mate_distance,
            population_pressure: environment_pressure(input.counters.population_ratio()),
        };
    }
}

/// First minimum-distance entry of a list.
fn closest<'a, 'b, T>(list: &'b [Sighted<'a, T>]) -> Option<&'b Sighted<'a, T>> {
    let mut best: Option<&Sighted<'a, T>> = None;
    for s in list {
        if !s.distance.is_finite() {
            continue;
        }
        if best.map_or(true, |b| s.distance < b.distance) {
            best = Some(s);
        }
    }
    best
}

/// `value / max` clamped to `[0, 1]`; zero when undefined.
#[must_use]
pub fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 && value.is_finite() && max.is_finite() {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// How much a predator's current activity should worry its prey.
#[must_use]
pub fn stance_multiplier(stance: Stance, cfg: &ThreatConfig) -> f64 {
    match stance {
        Stance::Hunting => cfg.hunting_multiplier,
        Stance::SeekingMate | Stance::Mating => cfg.distracted_multiplier,
        _ => cfg.resting_multiplier,
    }
}

/// Linear falloff, zero at and beyond the threat horizon.
#[must_use]
pub fn distance_factor(distance: f64, max_threat_distance: f64) -> f64 {
    if max_threat_distance <= 0.0 || !distance.is_finite() {
        return 0.0;
    }
    (1.0 - distance / max_threat_distance).max(0.0)
}

#[must_use]
pub fn threat_level(predator_stance: Stance, distance: f64, cfg: &ThreatConfig) -> f64 {
    (stance_multiplier(predator_stance, cfg) * distance_factor(distance, cfg.max_threat_distance))
        .clamp(0.0, 1.0)
}

/// Zero below [`PRESSURE_ONSET`] of capacity, rising linearly to 1.0 at
/// full capacity.
#[must_use]
pub fn environment_pressure(population_ratio: f64) -> f64 {
    if !population_ratio.is_finite() {
        return 0.0;
    }
    ((population_ratio - PRESSURE_ONSET) / (1.0 - PRESSURE_ONSET)).clamp(0.0, 1.0)
}

fn hazard_intensity(hazards: &[Sighted<'_, DeathMarker>], vision_range: f64) -> f64 {
    if vision_range <= 0.0 {
        return 0.0;
    }
    hazards
        .iter()
        .map(|h| h.item.strength.max(0.0) * (1.0 - h.distance / vision_range).max(0.0))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}
