//! Stance state machine.
//!
//! Turns a winning [`BehaviorScore`] into an actual stance change, holding
//! each stance for its minimum duration unless the proposal is urgent.

use crate::context::ratio;
use crate::rules::BehaviorScore;
use ecoboids_data::{Agent, Phenotype, Role, Stance, StanceState, Vitals};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Minimum frames a stance is held before a non-urgent change. Stances not
/// listed can be left immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinDurations(BTreeMap<Stance, u64>);

impl Default for MinDurations {
    fn default() -> Self {
        Self(BTreeMap::from([
            (Stance::Flocking, 10),
            (Stance::Fleeing, 0),
            (Stance::Eating, 20),
            (Stance::SeekingMate, 30),
            (Stance::Mating, 60),
            (Stance::Hunting, 10),
            (Stance::Idle, 40),
        ]))
    }
}

impl MinDurations {
    #[must_use]
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn get(&self, stance: Stance) -> u64 {
        self.0.get(&stance).copied().unwrap_or(0)
    }

    pub fn set(&mut self, stance: Stance, frames: u64) {
        self.0.insert(stance, frames);
    }
}

/// One accepted stance change, kept for telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub agent_id: Uuid,
    pub frame: u64,
    pub from: Stance,
    pub from_substate: Option<String>,
    pub to: Stance,
    pub to_substate: Option<String>,
    pub score: f64,
    pub reason: String,
    pub rule: String,
    pub urgent: bool,
    pub energy_ratio: f64,
    pub health_ratio: f64,
    pub frames_in_previous: u64,
}

/// The parts of an agent a decision touches. Only `stance` is writable.
#[derive(Debug)]
pub struct DecisionEntity<'a> {
    pub id: Uuid,
    pub role: Role,
    pub stance: &'a mut StanceState,
    pub vitals: &'a Vitals,
    pub phenotype: &'a Phenotype,
}

impl<'a> DecisionEntity<'a> {
    /// Splits an agent into a decision view.
    pub fn from_agent(agent: &'a mut Agent, role: Role, phenotype: &'a Phenotype) -> Self {
        Self {
            id: agent.identity.id,
            role,
            stance: &mut agent.stance,
            vitals: &agent.vitals,
            phenotype,
        }
    }
}

/// Applies a decision. Returns the transition when the stance or substate
/// actually changed.
///
/// The current stance is held for its minimum duration unless the proposal
/// is urgent. A substate change inside the same stance is a transition too
/// and restarts the lock. Re-proposing the current stance and substate is a
/// no-op and does not reset the entry frame.
pub fn apply_decision(
    entity: DecisionEntity<'_>,
    decision: &BehaviorScore,
    current_frame: u64,
    min_durations: &MinDurations,
) -> Option<TransitionRecord> {
    if !decision.stance.is_valid_for(entity.role) {
        tracing::warn!(
            agent = %entity.id,
            stance = %decision.stance,
            role = ?entity.role,
            rule = decision.rule,
            "Rejected stance outside role vocabulary"
        );
        return None;
    }

    let state = entity.stance;
    let substate = decision.substate;
    if state.current == decision.stance && state.substate.as_deref() == substate {
        return None;
    }

    let frames_in_stance = state.frames_in_stance(current_frame);
    if !decision.urgent && frames_in_stance < min_durations.get(state.current) {
        return None;
    }

    let record = TransitionRecord {
        agent_id: entity.id,
        frame: current_frame,
        from: state.current,
        from_substate: state.substate.clone(),
        to: decision.stance,
        to_substate: substate.map(str::to_string),
        score: decision.score,
        reason: decision.reason.to_string(),
        rule: decision.rule.to_string(),
        urgent: decision.urgent,
        energy_ratio: ratio(entity.vitals.energy, entity.phenotype.max_energy),
        health_ratio: ratio(entity.vitals.health, entity.phenotype.max_health),
        frames_in_previous: frames_in_stance,
    };

    state.previous = Some(state.current);
    state.current = decision.stance;
    state.entered_at_frame = current_frame;
    state.substate = substate.map(str::to_string);

    tracing::trace!(
        agent = %record.agent_id,
        from = %record.from,
        to = %record.to,
        rule = decision.rule,
        "Stance transition"
    );
    Some(record)
}
