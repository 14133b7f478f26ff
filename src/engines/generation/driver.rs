use crate::config::SimulationConfig;
use crate::engines::evaluation::{
    fitness::{FitnessContext, FitnessSampler},
    physics::PhysicsBackend,
};
use crate::engines::generation::{
    individual::Individual,
    population::{GenerationOutcome, Population},
};
use crate::error::Result;
use crate::types::{ActuationCommand, IndividualId, LandmarkKind, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: u64);
    fn on_tick(&mut self, tick: u64, pending: usize);
    fn on_generation_complete(&mut self, report: &GenerationReport);
}

/// Statistics of one evaluated generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u64,
    pub ticks: usize,
    pub average_fitness: f64,
    pub best_fitness: f64,
    pub best_individual: Option<IndividualId>,
    /// Mean forward position of the body landmark at the barrier
    pub average_displacement: f64,
    /// Leading body x at the barrier, floored at the start line like the camera
    pub furthest_displacement: f64,
    pub mutated: usize,
    pub fallback_selections: usize,
}

/// Values a display collaborator reads every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverReport {
    pub generation: u64,
    pub tick: u64,
    /// From the last completed generation
    pub average_fitness: Option<f64>,
    pub average_displacement: Option<f64>,
    pub leader: Option<IndividualId>,
    pub camera_target: Vec3,
}

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub tick: u64,
    pub commands_emitted: usize,
    /// Present on the tick that crossed the completion barrier
    pub generation: Option<GenerationReport>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub height: f64,
    pub distance: f64,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self { height: 7.5, distance: 21.0 }
    }
}

/// Fixed-timestep loop around a population and its physics collaborator.
///
/// Every tick decodes one column per active walker, hands the commands to the
/// physics backend and steps it. The tick on which the last walker completes
/// scores everyone, breeds the next generation and resets the bodies, all
/// before the next tick can run.
pub struct GenerationDriver<P, F> {
    population: Population,
    physics: P,
    fitness: F,
    camera: CameraRig,
    parallel_decode: bool,
    head_height: Vec<f64>,
    tick: u64,
    generation_ticks: usize,
    commands: Vec<ActuationCommand>,
    history: Vec<GenerationReport>,
    last_outcome: Option<GenerationOutcome>,
}

impl<P, F> GenerationDriver<P, F>
where
    P: PhysicsBackend,
    F: FitnessSampler,
{
    pub fn new(population: Population, physics: P, fitness: F) -> Self {
        let size = population.len();
        let limbs = population.dimensions().0;
        Self {
            population,
            physics,
            fitness,
            camera: CameraRig::default(),
            parallel_decode: false,
            head_height: vec![0.0; size],
            tick: 0,
            generation_ticks: 0,
            commands: Vec::with_capacity(size * limbs),
            history: Vec::new(),
            last_outcome: None,
        }
    }

    pub fn with_simulation_config(mut self, config: &SimulationConfig) -> Self {
        self.camera = CameraRig {
            height: config.camera_height,
            distance: config.camera_distance,
        };
        self.parallel_decode = config.parallel_decode;
        self
    }

    pub fn with_parallel_decode(mut self, enabled: bool) -> Self {
        self.parallel_decode = enabled;
        self
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn generation(&self) -> u64 {
        self.population.generation()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn history(&self) -> &[GenerationReport] {
        &self.history
    }

    /// Lineage and mutation sites of the most recent generation advance
    pub fn last_outcome(&self) -> Option<&GenerationOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn advance_tick(&mut self) -> Result<TickOutcome> {
        let active: Vec<bool> = self
            .population
            .individuals()
            .iter()
            .map(|i| !i.is_complete())
            .collect();

        self.commands.clear();
        if self.parallel_decode {
            let batches: Vec<Vec<ActuationCommand>> = self
                .population
                .individuals_mut()
                .par_iter_mut()
                .map(Individual::advance)
                .collect();
            self.commands.extend(batches.into_iter().flatten());
        } else {
            for individual in self.population.individuals_mut() {
                individual.advance_into(&mut self.commands);
            }
        }

        for command in &self.commands {
            self.physics.apply(command);
        }
        self.physics.step();

        for (index, _) in active.iter().enumerate().filter(|(_, a)| **a) {
            if let Some(head) = self.physics.head_landmark(IndividualId(index)) {
                self.head_height[index] += head.position.y;
            }
        }

        self.tick += 1;
        self.generation_ticks += 1;

        let generation = if self.population.all_complete() {
            Some(self.complete_generation()?)
        } else {
            None
        };

        Ok(TickOutcome {
            tick: self.tick,
            commands_emitted: self.commands.len(),
            generation,
        })
    }

    /// Tick until the barrier is crossed once.
    pub fn run_generation<C: ProgressCallback + ?Sized>(
        &mut self,
        callback: &mut C,
    ) -> Result<GenerationReport> {
        callback.on_generation_start(self.generation());
        loop {
            let outcome = self.advance_tick()?;
            callback.on_tick(outcome.tick, self.population.pending());
            if let Some(report) = outcome.generation {
                callback.on_generation_complete(&report);
                return Ok(report);
            }
        }
    }

    pub fn run_generations<C: ProgressCallback + ?Sized>(
        &mut self,
        count: usize,
        callback: &mut C,
    ) -> Result<Vec<GenerationReport>> {
        (0..count).map(|_| self.run_generation(callback)).collect()
    }

    /// Live display values; the camera follows the walker furthest along x.
    pub fn report(&self) -> DriverReport {
        let (leader, furthest) = self.leader();
        let last = self.history.last();
        DriverReport {
            generation: self.generation(),
            tick: self.tick,
            average_fitness: last.map(|r| r.average_fitness),
            average_displacement: last.map(|r| r.average_displacement),
            leader,
            camera_target: Vec3::new(furthest.max(0.0), self.camera.height, -self.camera.distance),
        }
    }

    fn leader(&self) -> (Option<IndividualId>, f64) {
        self.population
            .ids()
            .filter_map(|id| self.physics.body_landmark(id).map(|l| (id, l.position.x)))
            .fold((None, f64::NEG_INFINITY), |best, (id, x)| {
                if x > best.1 {
                    (Some(id), x)
                } else {
                    best
                }
            })
    }

    fn complete_generation(&mut self) -> Result<GenerationReport> {
        let chromosome_length = self.population.dimensions().1;
        let ids: Vec<IndividualId> = self.population.ids().collect();

        let mut displacement_sum = 0.0;
        for &id in &ids {
            let landmarks = self.physics.landmarks(id);
            let context = FitnessContext {
                id,
                landmarks: &landmarks,
                accumulated_head_height: self.head_height[id.index()],
                chromosome_length,
            };
            let score = self.fitness.score(&context);
            self.population.record_fitness(id, score)?;

            displacement_sum += landmarks
                .iter()
                .find(|l| l.kind == LandmarkKind::Body)
                .map(|l| l.position.x)
                .unwrap_or(0.0);
        }
        let average_displacement = displacement_sum / ids.len() as f64;
        let (_, furthest) = self.leader();

        let outcome = self.population.advance_generation(&mut self.physics)?;
        self.head_height.iter_mut().for_each(|h| *h = 0.0);

        let report = GenerationReport {
            generation: outcome.generation,
            ticks: self.generation_ticks,
            average_fitness: outcome.average_fitness,
            best_fitness: outcome.best.map(|(_, score)| score).unwrap_or(f64::NAN),
            best_individual: outcome.best.map(|(id, _)| id),
            average_displacement,
            furthest_displacement: furthest.max(0.0),
            mutated: outcome.mutated_count(),
            fallback_selections: outcome.fallback_selections,
        };
        self.generation_ticks = 0;
        self.history.push(report.clone());
        self.last_outcome = Some(outcome);

        Ok(report)
    }
}
