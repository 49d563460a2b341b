//! Core data structures for the ecoboids simulation.

pub mod agent;
pub mod environment;
pub mod species;
