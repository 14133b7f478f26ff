use crate::config::SimulationConfig;
use crate::types::{IndividualId, Landmark, LandmarkKind};

/// Everything a sampler may look at when scoring one individual
#[derive(Debug, Clone)]
pub struct FitnessContext<'a> {
    pub id: IndividualId,
    pub landmarks: &'a [Landmark],
    /// Sum of the head's height over every active tick of the generation
    pub accumulated_head_height: f64,
    pub chromosome_length: usize,
}

/// Produces one score per individual per generation. Higher is fitter.
pub trait FitnessSampler {
    fn score(&self, context: &FitnessContext<'_>) -> f64;
}

impl<F> FitnessSampler for F
where
    F: Fn(&FitnessContext<'_>) -> f64,
{
    fn score(&self, context: &FitnessContext<'_>) -> f64 {
        self(context)
    }
}

/// Weighted sum of forward (x) landmark positions, plus an optional
/// uprightness bonus proportional to the mean head height.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedLandmarkFitness {
    pub head_weight: f64,
    pub body_weight: f64,
    pub limb_weight: f64,
    pub upright_weight: f64,
}

impl Default for WeightedLandmarkFitness {
    fn default() -> Self {
        Self {
            head_weight: 5.0,
            body_weight: 1.0,
            limb_weight: 1.0,
            upright_weight: 0.0,
        }
    }
}

impl WeightedLandmarkFitness {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            head_weight: config.head_weight,
            body_weight: config.body_weight,
            limb_weight: config.limb_weight,
            upright_weight: config.upright_weight,
        }
    }

    fn weight(&self, kind: LandmarkKind) -> f64 {
        match kind {
            LandmarkKind::Head => self.head_weight,
            LandmarkKind::Body => self.body_weight,
            LandmarkKind::Limb => self.limb_weight,
        }
    }
}

impl FitnessSampler for WeightedLandmarkFitness {
    fn score(&self, context: &FitnessContext<'_>) -> f64 {
        let travel: f64 = context
            .landmarks
            .iter()
            .map(|l| self.weight(l.kind) * l.position.x)
            .sum();

        if self.upright_weight == 0.0 || context.chromosome_length == 0 {
            return travel;
        }
        travel + self.upright_weight * context.accumulated_head_height / context.chromosome_length as f64
    }
}
