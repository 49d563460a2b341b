//! Error types for the decision core.
//!
//! Configuration wiring mistakes are fatal and surface as [`DecisionError`];
//! expected runtime gaps (a species missing from the registry) are not errors
//! and are handled by skipping the agent.

use ecoboids_data::{Role, Stance};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    /// A rule name that is not registered for any role.
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// The stance-to-force table references a force that does not exist.
    #[error("stance '{stance}' references unknown force '{force}'")]
    UnknownForce { stance: Stance, force: String },

    /// A role has a stance with no steering forces configured.
    #[error("no forces configured for stance '{stance}'")]
    MissingForces { stance: Stance },

    /// A rule returned a score that is negative or not finite.
    #[error("rule '{rule}' produced invalid score {score}")]
    InvalidScore { rule: &'static str, score: f64 },

    /// A candidate stance outside the role's vocabulary.
    #[error("stance '{stance}' is not valid for role {role:?}")]
    InvalidStance { stance: Stance, role: Role },
}

pub type Result<T> = std::result::Result<T, DecisionError>;
