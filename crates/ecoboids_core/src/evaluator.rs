//! Picks the winning behavior for one agent.

use crate::context::BehaviorContext;
use crate::error::{DecisionError, Result};
use crate::rules::{BehaviorScore, RuleSet};
use ecoboids_data::Role;

/// Runs every enabled rule of `role` in declaration order and keeps the
/// highest score. Ties keep the earlier rule.
///
/// # Errors
///
/// Returns [`DecisionError::InvalidScore`] when a rule produces a negative or
/// non-finite score.
pub fn try_evaluate(
    ctx: &BehaviorContext,
    rules: &RuleSet,
    role: Role,
) -> Result<Option<BehaviorScore>> {
    let mut best: Option<BehaviorScore> = None;
    for rule in rules.rules_for(role).iter().filter(|r| r.enabled) {
        let Some(mut candidate) = (rule.evaluate)(ctx, &rules.params) else {
            continue;
        };
        if !candidate.score.is_finite() || candidate.score < 0.0 {
            return Err(DecisionError::InvalidScore {
                rule: rule.name,
                score: candidate.score,
            });
        }
        candidate.rule = rule.name;
        if best.as_ref().map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    Ok(best)
}

/// Like [`try_evaluate`] but logs a faulty rule and abstains.
#[must_use]
pub fn evaluate(ctx: &BehaviorContext, rules: &RuleSet, role: Role) -> Option<BehaviorScore> {
    match try_evaluate(ctx, rules, role) {
        Ok(best) => best,
        Err(e) => {
            tracing::error!(error = %e, ?role, frame = ctx.frame, "Rule evaluation aborted");
            None
        }
    }
}
