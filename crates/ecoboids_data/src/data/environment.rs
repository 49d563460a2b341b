use super::agent::{Position, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a food source is made of; decides which role may eat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    Plant,
    Carcass,
}

impl FoodKind {
    #[must_use]
    pub const fn consumer(self) -> Role {
        match self {
            Self::Plant => Role::Prey,
            Self::Carcass => Role::Predator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSource {
    pub id: Uuid,
    pub position: Position,
    pub energy: f64,
    pub max_energy: f64,
    pub kind: FoodKind,
}

impl FoodSource {
    #[must_use]
    pub fn new(id: Uuid, position: Position, max_energy: f64, kind: FoodKind) -> Self {
        Self {
            id,
            position,
            energy: max_energy,
            max_energy,
            kind,
        }
    }

    #[must_use]
    pub fn edible_by(&self, role: Role) -> bool {
        self.kind.consumer() == role && self.energy > 0.0
    }

    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.energy <= 0.0
    }

    /// Removes up to `amount` energy and returns what was actually taken.
    pub fn take(&mut self, amount: f64) -> f64 {
        let taken = amount.max(0.0).min(self.energy.max(0.0));
        self.energy -= taken;
        taken
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Position,
    pub radius: f64,
}

/// Scent left where an agent died. Prey avoid it while it lasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathMarker {
    pub position: Position,
    pub remaining_frames: u32,
    pub strength: f64,
    pub source_species: String,
}

impl DeathMarker {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_frames == 0 || self.strength <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_kind_restricts_consumer() {
        let plant = FoodSource::new(Uuid::nil(), Position::new(0.0, 0.0), 10.0, FoodKind::Plant);
        assert!(plant.edible_by(Role::Prey));
        assert!(!plant.edible_by(Role::Predator));

        let carcass = FoodSource::new(Uuid::nil(), Position::new(0.0, 0.0), 10.0, FoodKind::Carcass);
        assert!(carcass.edible_by(Role::Predator));
        assert!(!carcass.edible_by(Role::Prey));
    }

    #[test]
    fn test_take_never_overdraws() {
        let mut food = FoodSource::new(Uuid::nil(), Position::new(0.0, 0.0), 10.0, FoodKind::Plant);
        assert_eq!(food.take(4.0), 4.0);
        assert_eq!(food.take(20.0), 6.0);
        assert!(food.is_depleted());
        assert!(!food.edible_by(Role::Prey));
        assert_eq!(food.take(1.0), 0.0);
    }
}
