use crate::types::{ActuationCommand, IndividualId, Landmark, LandmarkKind};

/// Receives decoded instructions. Implemented by whatever simulates the bodies.
pub trait ActuationSink {
    /// Apply one limb's torque for the duration of the current tick.
    fn apply(&mut self, command: &ActuationCommand);

    /// Zero velocities and restore the spawn pose.
    fn reset_individual(&mut self, id: IndividualId);
}

/// Reports body-part positions on demand.
pub trait BodySampler {
    fn landmarks(&self, id: IndividualId) -> Vec<Landmark>;

    /// Position of the `Body` landmark, if the individual has one.
    fn body_landmark(&self, id: IndividualId) -> Option<Landmark> {
        self.landmarks(id)
            .into_iter()
            .find(|l| l.kind == LandmarkKind::Body)
    }

    fn head_landmark(&self, id: IndividualId) -> Option<Landmark> {
        self.landmarks(id)
            .into_iter()
            .find(|l| l.kind == LandmarkKind::Head)
    }
}

/// Full collaborator driven by `GenerationDriver`
pub trait PhysicsBackend: ActuationSink + BodySampler {
    /// Integrate one tick after all commands for it have been applied.
    fn step(&mut self);
}
