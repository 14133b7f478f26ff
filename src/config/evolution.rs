use super::traits::{ConfigSection, ConfigManifest, FieldManifest};
use crate::error::StridegenError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Genes per limb, i.e. ticks per generation
    pub chromosome_length: usize,
    pub mutation_rate: f64,
    pub seed: Option<u64>,
    /// How many generations the headless host runs before exiting
    pub generations: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            chromosome_length: 250,
            mutation_rate: 0.1,
            seed: None,
            generations: 50,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), StridegenError> {
        if self.population_size == 0 {
            return Err(StridegenError::Configuration(
                "Population size must be positive".to_string()
            ));
        }
        if self.chromosome_length == 0 {
            return Err(StridegenError::Configuration(
                "Chromosome length must be positive".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(StridegenError::Configuration(
                "Mutation rate must be between 0 and 1".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest::new(
                    "population_size",
                    "integer",
                    serde_json::json!(self.population_size),
                    "Number of walkers per generation",
                )
                .with_range(Some(1.0), None),
                FieldManifest::new(
                    "chromosome_length",
                    "integer",
                    serde_json::json!(self.chromosome_length),
                    "Genes per limb; one gene is consumed per tick",
                )
                .with_range(Some(1.0), None),
                FieldManifest::new(
                    "mutation_rate",
                    "float",
                    serde_json::json!(self.mutation_rate),
                    "Probability that an offspring receives one mutation per limb",
                )
                .with_range(Some(0.0), Some(1.0)),
                FieldManifest::new(
                    "seed",
                    "integer?",
                    serde_json::json!(self.seed),
                    "Random seed; entropy is used when absent",
                ),
                FieldManifest::new(
                    "generations",
                    "integer",
                    serde_json::json!(self.generations),
                    "Generations run by the headless host",
                ),
            ],
        }
    }
}
