//! Utility-scored behavior rules.
//!
//! A rule looks at a [`BehaviorContext`] and either abstains or proposes a
//! stance with a score. Rules are plain function pointers so they stay pure
//! and can be shared across threads without synchronization.
//!
//! Scores live in bands so that ordering between concerns is stable:
//! survival (1000) > strike (900) > feeding (850) > commitment (600+) >
//! foraging (520) > rest (500) > courtship (450) > hazard (300) > fallback (100).

pub mod predator;
pub mod prey;
pub mod shared;

use crate::config::BehaviorConfig;
use crate::context::BehaviorContext;
use crate::error::{DecisionError, Result};
use ecoboids_data::{Role, Stance};

pub mod bands {
    pub const SURVIVAL: f64 = 1000.0;
    pub const STRIKE: f64 = 900.0;
    pub const FEED: f64 = 850.0;
    pub const COMMITMENT: f64 = 600.0;
    pub const FORAGE: f64 = 520.0;
    pub const REST: f64 = 500.0;
    pub const COURTSHIP: f64 = 450.0;
    pub const HAZARD: f64 = 300.0;
    pub const FALLBACK: f64 = 100.0;
}

/// A rule's proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorScore {
    pub stance: Stance,
    pub substate: Option<&'static str>,
    pub score: f64,
    pub reason: &'static str,
    /// Bypasses the minimum stance duration.
    pub urgent: bool,
    /// Name of the proposing rule, filled in by the evaluator.
    pub rule: &'static str,
}

impl BehaviorScore {
    #[must_use]
    pub fn new(stance: Stance, score: f64, reason: &'static str) -> Self {
        Self {
            stance,
            substate: None,
            score,
            reason,
            urgent: false,
            rule: "",
        }
    }

    #[must_use]
    pub fn with_substate(mut self, substate: &'static str) -> Self {
        self.substate = Some(substate);
        self
    }

    #[must_use]
    pub fn urgent(mut self) -> Self {
        self.urgent = true;
        self
    }
}

pub type RuleFn = fn(&BehaviorContext, &BehaviorConfig) -> Option<BehaviorScore>;

#[derive(Clone)]
pub struct Rule {
    pub name: &'static str,
    pub role: Role,
    pub description: &'static str,
    pub enabled: bool,
    pub evaluate: RuleFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Rule {
    #[must_use]
    pub fn new(
        name: &'static str,
        role: Role,
        description: &'static str,
        evaluate: RuleFn,
    ) -> Self {
        Self {
            name,
            role,
            description,
            enabled: true,
            evaluate,
        }
    }
}

/// Ordered, role-partitioned rule lists plus the thresholds they read.
///
/// Declaration order matters: on equal scores the earlier rule wins.
#[derive(Debug, Clone)]
pub struct RuleSet {
    prey: Vec<Rule>,
    predator: Vec<Rule>,
    pub params: BehaviorConfig,
}

impl RuleSet {
    #[must_use]
    pub fn new(params: BehaviorConfig) -> Self {
        Self {
            prey: Vec::new(),
            predator: Vec::new(),
            params,
        }
    }

    /// The stock prey and predator behaviors.
    #[must_use]
    pub fn standard(params: BehaviorConfig) -> Self {
        let mut set = Self::new(params);
        for rule in prey::rules().into_iter().chain(predator::rules()) {
            set.push(rule);
        }
        set
    }

    /// Appends a rule to the end of its role's list.
    pub fn push(&mut self, rule: Rule) {
        match rule.role {
            Role::Prey => self.prey.push(rule),
            Role::Predator => self.predator.push(rule),
        }
    }

    #[must_use]
    pub fn rules_for(&self, role: Role) -> &[Rule] {
        match role {
            Role::Prey => &self.prey,
            Role::Predator => &self.predator,
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.prey
            .iter()
            .chain(self.predator.iter())
            .find(|r| r.name == name)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let rule = self
            .prey
            .iter_mut()
            .chain(self.predator.iter_mut())
            .find(|r| r.name == name)
            .ok_or_else(|| DecisionError::UnknownRule(name.to_string()))?;
        rule.enabled = enabled;
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.prey.iter().chain(self.predator.iter()).map(|r| r.name)
    }
}

/// Extra score for staying with an ongoing engagement, grows with elapsed
/// frames up to the configured cap.
#[must_use]
pub fn commitment_bonus(frames: u32, cfg: &BehaviorConfig) -> f64 {
    (f64::from(frames) * cfg.commitment_bonus_per_frame).min(cfg.commitment_bonus_cap)
}
