use super::agent::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric capabilities handed over by the genetics system.
///
/// The decision core only reads these values to turn raw gauges into ratios
/// and to size perception; it never derives or mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    pub max_energy: f64,
    pub max_health: f64,
    pub attack_damage: f64,
    pub max_speed: f64,
    pub vision_range: f64,
}

impl Default for Phenotype {
    fn default() -> Self {
        Self {
            max_energy: 100.0,
            max_health: 100.0,
            attack_damage: 0.0,
            max_speed: 2.0,
            vision_range: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    pub name: String,
    pub role: Role,
    pub phenotype: Phenotype,
}

/// Species lookup by name. Loaded externally, so a missing entry is an
/// expected condition rather than an error.
#[derive(Debug, Clone, Default)]
pub struct SpeciesRegistry {
    species: HashMap<String, SpeciesConfig>,
}

impl SpeciesRegistry {
    #[must_use]
    pub fn new(configs: impl IntoIterator<Item = SpeciesConfig>) -> Self {
        Self {
            species: configs.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SpeciesConfig> {
        self.species.get(name)
    }

    #[must_use]
    pub fn role_of(&self, name: &str) -> Option<Role> {
        self.species.get(name).map(|c| c.role)
    }

    pub fn insert(&mut self, config: SpeciesConfig) -> Option<SpeciesConfig> {
        self.species.insert(config.name.clone(), config)
    }

    pub fn remove(&mut self, name: &str) -> Option<SpeciesConfig> {
        self.species.remove(name)
    }

    /// Species names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.species.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
