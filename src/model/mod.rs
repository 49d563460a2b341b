pub use ecoboids_core::{BehaviorScore, ContextBuilder, RuleSet, TransitionRecord};
pub mod config {
    pub use ecoboids_core::config::*;
}

pub mod stats;
pub mod world;

pub use stats::PopulationStats;
pub use world::{TickReport, World};
