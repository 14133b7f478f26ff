use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for an individual. Survives chromosome replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndividualId(pub usize);

impl IndividualId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for IndividualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Torque direction around the limb's hinge axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }
}

/// Abstract torque multiplier (1x, 5x, 10x a base unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagnitudeClass {
    Small,
    Medium,
    Large,
}

impl MagnitudeClass {
    pub fn multiplier(self) -> f64 {
        match self {
            MagnitudeClass::Small => 1.0,
            MagnitudeClass::Medium => 5.0,
            MagnitudeClass::Large => 10.0,
        }
    }
}

/// One decoded instruction for one limb of one individual, valid for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuationCommand {
    pub individual: IndividualId,
    pub limb: usize,
    pub direction: Direction,
    pub magnitude: MagnitudeClass,
}

impl ActuationCommand {
    /// Signed torque for this command. `time_scale` is owned by the physics side
    /// (tick duration times its speed constant).
    pub fn torque(&self, time_scale: f64) -> f64 {
        self.direction.sign() * self.magnitude.multiplier() * time_scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Body part a sampled position belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkKind {
    Head,
    Body,
    Limb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub kind: LandmarkKind,
    pub position: Vec3,
}

impl Landmark {
    pub fn new(kind: LandmarkKind, position: Vec3) -> Self {
        Self { kind, position }
    }
}
