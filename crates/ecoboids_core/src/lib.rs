//! # Ecoboids Core
//!
//! The decision core of a predator/prey boid simulation.
//!
//! This crate contains the per-tick behavior pipeline:
//! - Toroidal spatial indexing with capped nearest-neighbor queries
//! - Context building from partitioned neighbor lists
//! - Utility-scored rules and their evaluation
//! - A stance state machine with minimum durations and urgent overrides
//! - Stance-weighted steering and the lifecycle that feeds the core
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! Each tick runs as phases over a frozen snapshot:
//! - **Read**: every agent builds its context and picks a behavior in parallel
//! - **Apply**: stance changes are written sequentially in id order
//! - **Move**: steering is computed against the same frozen view
//! - **Lifecycle**: interactions are planned, then applied as commands
//!
//! ## Example
//!
//! ```
//! use ecoboids_core::config::BehaviorConfig;
//! use ecoboids_core::context::BehaviorContext;
//! use ecoboids_core::evaluator::evaluate;
//! use ecoboids_core::rules::RuleSet;
//! use ecoboids_data::{Role, Stance};
//!
//! let rules = RuleSet::standard(BehaviorConfig::default());
//! let ctx = BehaviorContext {
//!     role: Role::Prey,
//!     energy_ratio: 0.7,
//!     closest_predator_distance: Some(40.0),
//!     closest_predator_stance: Some(Stance::Hunting),
//!     threat_level: 0.8,
//!     ..Default::default()
//! };
//! let best = evaluate(&ctx, &rules, Role::Prey).unwrap();
//! assert_eq!(best.stance, Stance::Fleeing);
//! assert!(best.urgent);
//! ```

/// Target-lock and mate-bond bookkeeping
pub mod bonds;
/// Configuration structures and validation
pub mod config;
/// Behavior context and its builder
pub mod context;
pub mod error;
/// Rule evaluation
pub mod evaluator;
/// Named steering forces and the stance force table
pub mod forces;
/// Performance metrics and logging setup
pub mod metrics;
/// Behavior rules by role
pub mod rules;
/// Toroidal spatial hash
pub mod spatial_hash;
/// Stance state machine
pub mod stance;
/// Per-tick systems
pub mod systems;

pub use context::{BehaviorContext, ContextBuilder};
pub use error::DecisionError;
pub use metrics::{init_logging, Metrics};
pub use rules::{BehaviorScore, RuleSet};
pub use spatial_hash::{SpatialHash, WorldBounds};
pub use stance::{apply_decision, MinDurations, TransitionRecord};
