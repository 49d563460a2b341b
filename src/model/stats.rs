use ecoboids_data::{Agent, Stance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-species headcount, mean energy and stance distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub populations: BTreeMap<String, usize>,
    pub energy: BTreeMap<String, f64>,
    pub stances: BTreeMap<Stance, usize>,
}

impl PopulationStats {
    pub fn collect<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut stats = Self::default();
        let mut energy_sums: BTreeMap<String, f64> = BTreeMap::new();

        for agent in agents {
            let species = &agent.identity.species;
            *stats.populations.entry(species.clone()).or_default() += 1;
            *energy_sums.entry(species.clone()).or_default() += agent.vitals.energy;
            *stats.stances.entry(agent.stance.current).or_default() += 1;
        }

        stats.energy = energy_sums
            .into_iter()
            .map(|(species, sum)| {
                let count = stats.populations.get(&species).copied().unwrap_or(0);
                let mean = if count == 0 { 0.0 } else { sum / count as f64 };
                (species, mean)
            })
            .collect();
        stats
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.populations.values().sum()
    }

    #[must_use]
    pub fn population_of(&self, species: &str) -> usize {
        self.populations.get(species).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn in_stance(&self, stance: Stance) -> usize {
        self.stances.get(&stance).copied().unwrap_or(0)
    }
}
