use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// World position of an agent or environment entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Velocity of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

impl Velocity {
    #[must_use]
    pub fn speed(&self) -> f64 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// Steering acceleration accumulated during the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Acceleration {
    pub ax: f64,
    pub ay: f64,
}

/// Trophic role of a species. Agents never store it; it is looked up from
/// the species registry each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Prey,
    Predator,
}

impl Role {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Prey => Self::Predator,
            Self::Predator => Self::Prey,
        }
    }
}

/// Top-level behavioural mode of an agent.
///
/// The vocabulary is shared between roles but each role may only use a
/// subset of it, see [`Stance::is_valid_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Flocking,
    Fleeing,
    Eating,
    SeekingMate,
    Mating,
    Hunting,
    Idle,
}

impl Stance {
    pub const PREY: [Stance; 5] = [
        Stance::Flocking,
        Stance::Fleeing,
        Stance::Eating,
        Stance::SeekingMate,
        Stance::Mating,
    ];

    pub const PREDATOR: [Stance; 5] = [
        Stance::Hunting,
        Stance::Eating,
        Stance::SeekingMate,
        Stance::Mating,
        Stance::Idle,
    ];

    #[must_use]
    pub fn vocabulary(role: Role) -> &'static [Stance] {
        match role {
            Role::Prey => &Self::PREY,
            Role::Predator => &Self::PREDATOR,
        }
    }

    #[must_use]
    pub fn is_valid_for(self, role: Role) -> bool {
        Self::vocabulary(role).contains(&self)
    }

    /// Stance an agent of `role` starts in.
    #[must_use]
    pub const fn initial(role: Role) -> Self {
        match role {
            Role::Prey => Self::Flocking,
            Role::Predator => Self::Hunting,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flocking => "flocking",
            Self::Fleeing => "fleeing",
            Self::Eating => "eating",
            Self::SeekingMate => "seeking_mate",
            Self::Mating => "mating",
            Self::Hunting => "hunting",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identification of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub species: String,
}

/// Countdown timers, in frames. Zero means ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub reproduction: u32,
    pub eating: u32,
    pub attack: u32,
}

/// Resource gauges and lifecycle flags. Written by the lifecycle system only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub energy: f64,
    pub health: f64,
    pub age: u64,
    pub cooldowns: Cooldowns,
    /// Cached mate-readiness, refreshed by the lifecycle system.
    pub seeking_mate: bool,
}

/// Behavioural mode bookkeeping. Written by the stance state machine only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceState {
    pub current: Stance,
    pub substate: Option<String>,
    pub previous: Option<Stance>,
    pub entered_at_frame: u64,
}

impl StanceState {
    #[must_use]
    pub fn new(stance: Stance, frame: u64) -> Self {
        Self {
            current: stance,
            substate: None,
            previous: None,
            entered_at_frame: frame,
        }
    }

    #[must_use]
    pub fn frames_in_stance(&self, frame: u64) -> u64 {
        frame.saturating_sub(self.entered_at_frame)
    }
}

/// A predator's lock on a chosen prey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetLock {
    pub id: Option<Uuid>,
    /// Decays while the target is out of sight, in `[0, 1]`.
    pub strength: f32,
    pub frames: u32,
}

impl TargetLock {
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

/// A pairing with a mate. The id is assigned by the lifecycle system, the
/// commitment counter is advanced by the decision core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MateBond {
    pub id: Option<Uuid>,
    pub commitment_frames: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bonds {
    pub target: TargetLock,
    pub mate: MateBond,
}

/// A single autonomous agent ("boid").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(flatten)]
    pub identity: Identity,
    pub position: Position,
    pub velocity: Velocity,
    pub acceleration: Acceleration,
    pub vitals: Vitals,
    pub stance: StanceState,
    pub bonds: Bonds,
}

impl Agent {
    /// Creates a fresh agent with full gauges in the role's initial stance.
    #[must_use]
    pub fn new(
        id: Uuid,
        species: impl Into<String>,
        role: Role,
        position: Position,
        max_energy: f64,
        max_health: f64,
        frame: u64,
    ) -> Self {
        Self {
            identity: Identity {
                id,
                species: species.into(),
            },
            position,
            velocity: Velocity::default(),
            acceleration: Acceleration::default(),
            vitals: Vitals {
                energy: max_energy,
                health: max_health,
                age: 0,
                cooldowns: Cooldowns::default(),
                seeking_mate: false,
            },
            stance: StanceState::new(Stance::initial(role), frame),
            bonds: Bonds::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.identity.id
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.vitals.health > 0.0
    }
}
