//! Headless predator/prey boid simulation built on `ecoboids_core`.
//!
//! [`model::World`] stores agents in a `hecs` world and drives the decision
//! core once per tick; [`app::App`] runs it headless and exports telemetry.

pub mod app;
pub mod model;
