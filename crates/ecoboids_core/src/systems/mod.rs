//! Per-tick phases, run by the world loop in this order:
//! decision, movement, lifecycle.

pub mod decision;
pub mod lifecycle;
pub mod movement;
pub mod perception;
