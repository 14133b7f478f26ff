use crate::config::SimulationConfig;
use crate::engines::evaluation::physics::{ActuationSink, BodySampler, PhysicsBackend};
use crate::types::{ActuationCommand, IndividualId, Landmark, LandmarkKind, Vec3};

const SPAWN_HEIGHT: f64 = 0.5;
const JOINT_LIMIT: f64 = 1.2;
const ANGULAR_DAMPING: f64 = 0.9;
const DEFAULT_INERTIA: f64 = 20_000.0;
const LIMB_LENGTH: f64 = 0.5;
const NECK_LENGTH: f64 = 0.4;
const STRIDE: f64 = 0.35;

/// Side-on hinge walker: part 0 is the head, the rest are legs and arms.
#[derive(Debug, Clone)]
struct WalkerBody {
    spawn: Vec3,
    body_x: f64,
    angles: Vec<f64>,
    angular_velocity: Vec<f64>,
}

impl WalkerBody {
    fn new(spawn: Vec3, parts: usize) -> Self {
        Self {
            spawn,
            body_x: spawn.x,
            angles: vec![0.0; parts],
            angular_velocity: vec![0.0; parts],
        }
    }

    fn reset(&mut self) {
        self.body_x = self.spawn.x;
        self.angles.iter_mut().for_each(|a| *a = 0.0);
        self.angular_velocity.iter_mut().for_each(|w| *w = 0.0);
    }

    fn step(&mut self, dt: f64) {
        for (angle, omega) in self.angles.iter_mut().zip(self.angular_velocity.iter_mut()) {
            *omega *= ANGULAR_DAMPING;
            *angle += *omega * dt;
            if angle.abs() > JOINT_LIMIT {
                *angle = angle.clamp(-JOINT_LIMIT, JOINT_LIMIT);
                *omega = 0.0;
            }
        }

        // Legs push the body while swinging back through the planted arc
        let legs = self.angles.len().saturating_sub(1).max(1) as f64;
        let push: f64 = self
            .angles
            .iter()
            .zip(&self.angular_velocity)
            .skip(1)
            .map(|(angle, omega)| -omega * angle.cos())
            .sum();
        self.body_x += STRIDE * push / legs * dt;
    }

    fn landmarks(&self) -> Vec<Landmark> {
        let z = self.spawn.z;
        let mut landmarks = Vec::with_capacity(self.angles.len() + 1);

        let head_angle = self.angles.first().copied().unwrap_or(0.0);
        landmarks.push(Landmark::new(
            LandmarkKind::Head,
            Vec3::new(
                self.body_x + NECK_LENGTH * head_angle.sin(),
                self.spawn.y + LIMB_LENGTH + NECK_LENGTH * head_angle.cos(),
                z,
            ),
        ));
        landmarks.push(Landmark::new(
            LandmarkKind::Body,
            Vec3::new(self.body_x, self.spawn.y + LIMB_LENGTH, z),
        ));
        for angle in self.angles.iter().skip(1) {
            landmarks.push(Landmark::new(
                LandmarkKind::Limb,
                Vec3::new(
                    self.body_x + LIMB_LENGTH * angle.sin(),
                    self.spawn.y + LIMB_LENGTH * (1.0 - angle.cos()),
                    z,
                ),
            ));
        }
        landmarks
    }
}

/// Minimal deterministic physics for running the GA without an engine.
///
/// Commands become angular impulses on hinge joints; legs swinging backwards
/// move the body forward. Good enough to give selection a gradient.
#[derive(Debug, Clone)]
pub struct KinematicPhysics {
    walkers: Vec<WalkerBody>,
    actuation_scale: f64,
    inertia: f64,
    dt: f64,
}

impl KinematicPhysics {
    /// Walker `i` spawns at `(0, 0.5, i * spawn_spacing)`.
    pub fn new(population_size: usize, parts: usize, config: &SimulationConfig) -> Self {
        let walkers = (0..population_size)
            .map(|i| {
                WalkerBody::new(
                    Vec3::new(0.0, SPAWN_HEIGHT, i as f64 * config.spawn_spacing),
                    parts,
                )
            })
            .collect();

        Self {
            walkers,
            actuation_scale: config.actuation_time_scale(),
            inertia: DEFAULT_INERTIA,
            dt: config.tick_seconds * config.time_scale,
        }
    }

    /// Larger inertia turns the same torque into a smaller angular impulse.
    pub fn with_inertia(mut self, inertia: f64) -> Self {
        self.inertia = inertia;
        self
    }

    pub fn len(&self) -> usize {
        self.walkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walkers.is_empty()
    }
}

impl ActuationSink for KinematicPhysics {
    fn apply(&mut self, command: &ActuationCommand) {
        let impulse = command.torque(self.actuation_scale) / self.inertia;
        match self
            .walkers
            .get_mut(command.individual.index())
            .and_then(|w| w.angular_velocity.get_mut(command.limb))
        {
            Some(omega) => *omega += impulse,
            None => log::warn!(
                "Dropping command for {} limb {}: no such body part",
                command.individual,
                command.limb
            ),
        }
    }

    fn reset_individual(&mut self, id: IndividualId) {
        if let Some(walker) = self.walkers.get_mut(id.index()) {
            walker.reset();
        }
    }
}

impl BodySampler for KinematicPhysics {
    fn landmarks(&self, id: IndividualId) -> Vec<Landmark> {
        self.walkers
            .get(id.index())
            .map(WalkerBody::landmarks)
            .unwrap_or_default()
    }
}

impl PhysicsBackend for KinematicPhysics {
    fn step(&mut self) {
        let dt = self.dt;
        self.walkers.iter_mut().for_each(|w| w.step(dt));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, MagnitudeClass};

    fn command(limb: usize, direction: Direction) -> ActuationCommand {
        ActuationCommand {
            individual: IndividualId(1),
            limb,
            direction,
            magnitude: MagnitudeClass::Large,
        }
    }

    #[test]
    fn test_spawn_layout() {
        let config = SimulationConfig::default();
        let physics = KinematicPhysics::new(3, 5, &config);

        let body = physics.body_landmark(IndividualId(2)).unwrap();
        assert_eq!(body.position.x, 0.0);
        assert_eq!(body.position.z, 4.0);
        assert_eq!(physics.landmarks(IndividualId(0)).len(), 6);
        assert!(physics.landmarks(IndividualId(9)).is_empty());
    }

    #[test]
    fn test_backward_leg_swing_moves_body_forward() {
        let config = SimulationConfig::default();
        let mut physics = KinematicPhysics::new(2, 5, &config);

        for _ in 0..10 {
            for limb in 1..5 {
                physics.apply(&command(limb, Direction::CounterClockwise));
            }
            physics.step();
        }

        let moved = physics.body_landmark(IndividualId(1)).unwrap().position.x;
        let idle = physics.body_landmark(IndividualId(0)).unwrap().position.x;
        assert!(moved > 0.0, "body did not advance: {}", moved);
        assert_eq!(idle, 0.0);
    }

    #[test]
    fn test_heavier_walker_travels_less() {
        let config = SimulationConfig::default();
        let mut light = KinematicPhysics::new(2, 5, &config);
        let mut heavy = KinematicPhysics::new(2, 5, &config).with_inertia(DEFAULT_INERTIA * 4.0);

        for _ in 0..3 {
            for limb in 1..5 {
                light.apply(&command(limb, Direction::CounterClockwise));
                heavy.apply(&command(limb, Direction::CounterClockwise));
            }
            light.step();
            heavy.step();
        }

        let light_x = light.body_landmark(IndividualId(1)).unwrap().position.x;
        let heavy_x = heavy.body_landmark(IndividualId(1)).unwrap().position.x;
        assert!(heavy_x > 0.0);
        assert!(heavy_x < light_x, "heavy {} vs light {}", heavy_x, light_x);
    }

    #[test]
    fn test_reset_restores_spawn() {
        let config = SimulationConfig::default();
        let mut physics = KinematicPhysics::new(2, 5, &config);
        let spawn = physics.landmarks(IndividualId(1));

        for _ in 0..5 {
            physics.apply(&command(0, Direction::Clockwise));
            physics.apply(&command(2, Direction::CounterClockwise));
            physics.step();
        }
        assert_ne!(physics.landmarks(IndividualId(1)), spawn);

        physics.reset_individual(IndividualId(1));
        assert_eq!(physics.landmarks(IndividualId(1)), spawn);
    }
}
