//! Decision phase: parallel read, sequential apply.
//!
//! Every agent decides against the same frozen [`PerceptionView`]; stances
//! are only written once all decisions for the tick exist, so no agent ever
//! sees another's decision from the same tick.

use super::perception::{NeighborBuffers, PerceptionView};
use crate::bonds::update_bonds;
use crate::config::BehaviorConfig;
use crate::context::{BehaviorContext, ContextBuilder, ContextInput, SimulationCounters};
use crate::evaluator::evaluate;
use crate::rules::{BehaviorScore, RuleSet};
use crate::stance::{apply_decision, DecisionEntity, MinDurations, TransitionRecord};
use ecoboids_data::{Agent, SpeciesConfig};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub context: BehaviorContext,
    pub score: Option<BehaviorScore>,
}

/// Shared, read-only inputs of the decision phase.
#[derive(Clone, Copy)]
pub struct DecisionInputs<'a> {
    pub view: PerceptionView<'a>,
    pub builder: &'a ContextBuilder,
    pub rules: &'a RuleSet,
    pub counters: SimulationCounters,
}

#[derive(Debug, Default)]
pub struct DecisionReport {
    pub transitions: Vec<TransitionRecord>,
    pub skipped: usize,
    pub undecided: usize,
}

/// Builds the context and picks a behavior for one agent. `None` when the
/// agent's species is unknown.
pub fn decide_agent<'a>(
    inputs: &DecisionInputs<'a>,
    agent: &Agent,
    buffers: &mut NeighborBuffers<'a>,
) -> Option<DecisionOutcome> {
    let Some(species) = inputs.view.registry.get(&agent.identity.species) else {
        tracing::debug!(
            agent = %agent.identity.id,
            species = %agent.identity.species,
            "Skipping agent with unknown species"
        );
        return None;
    };
    let neighbors = buffers.gather(
        &inputs.view,
        agent,
        species.role,
        species.phenotype.vision_range,
    );
    let context = inputs.builder.build(&ContextInput {
        agent,
        species,
        neighbors: &neighbors,
        counters: inputs.counters,
    });
    let score = evaluate(&context, inputs.rules, species.role);
    Some(DecisionOutcome { context, score })
}

/// Writes one decision back: stance first, then bonds.
pub fn apply_outcome(
    agent: &mut Agent,
    species: &SpeciesConfig,
    outcome: &DecisionOutcome,
    frame: u64,
    min_durations: &MinDurations,
    cfg: &BehaviorConfig,
) -> Option<TransitionRecord> {
    let record = outcome.score.as_ref().and_then(|score| {
        apply_decision(
            DecisionEntity::from_agent(agent, species.role, &species.phenotype),
            score,
            frame,
            min_durations,
        )
    });
    update_bonds(
        species.role,
        &agent.stance,
        &mut agent.bonds,
        &outcome.context,
        cfg,
    );
    record
}

/// Runs the whole phase. `agents` must be in a stable order (by id) for
/// transitions to come out deterministically.
pub fn run_decisions(
    inputs: &DecisionInputs<'_>,
    agents: &mut [&mut Agent],
    min_durations: &MinDurations,
) -> DecisionReport {
    let outcomes: Vec<Option<DecisionOutcome>> = agents
        .par_iter()
        .map_init(NeighborBuffers::default, |buffers, agent| {
            decide_agent(inputs, agent, buffers)
        })
        .collect();

    let mut report = DecisionReport::default();
    for (agent, outcome) in agents.iter_mut().zip(outcomes) {
        let Some(outcome) = outcome else {
            report.skipped += 1;
            continue;
        };
        if outcome.score.is_none() {
            report.undecided += 1;
        }
        let Some(species) = inputs.view.registry.get(&agent.identity.species) else {
            continue;
        };
        if let Some(record) = apply_outcome(
            agent,
            species,
            &outcome,
            inputs.counters.frame,
            min_durations,
            &inputs.rules.params,
        ) {
            report.transitions.push(record);
        }
    }
    report
}
