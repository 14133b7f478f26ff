pub mod fitness;
pub mod kinematic;
pub mod physics;

pub use fitness::{FitnessContext, FitnessSampler, WeightedLandmarkFitness};
pub use kinematic::KinematicPhysics;
pub use physics::{ActuationSink, BodySampler, PhysicsBackend};
