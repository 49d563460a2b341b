//! Plain data shared by the ecoboids simulation crates.
//!
//! Nothing in here knows how agents decide; the types only describe what an
//! agent, a species and the surrounding environment look like.

pub mod data;

pub use data::agent::*;
pub use data::environment::*;
pub use data::species::*;
