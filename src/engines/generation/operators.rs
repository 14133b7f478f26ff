use crate::engines::generation::genome::{Chromosome, Gene};
use crate::error::{Result, StridegenError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome of one parent draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentSelection {
    pub index: usize,
    /// Uniform draws taken, at most `len / 2 + 1`
    pub attempts: usize,
    /// True when no draw reached the average and the last draw was kept anyway
    pub fell_back: bool,
}

/// Above-average rejection sampling with a bounded budget.
///
/// Draws uniformly and accepts the first individual whose fitness is at least
/// `average`. After `len / 2` rejected resamples the last draw is returned
/// unconditionally. This is biased rather than fitness-proportionate: every
/// accepted individual is equally likely regardless of how far above the mean
/// it sits, and the fallback pick ignores fitness entirely.
///
/// Returns `None` for an empty table.
pub fn select_parent<R: Rng + ?Sized>(
    fitness: &[f64],
    average: f64,
    rng: &mut R,
) -> Option<ParentSelection> {
    if fitness.is_empty() {
        return None;
    }

    let resample_budget = fitness.len() / 2;
    let mut attempts = 0;

    loop {
        let index = rng.gen_range(0..fitness.len());
        attempts += 1;

        if fitness[index] >= average {
            return Some(ParentSelection { index, attempts, fell_back: false });
        }
        if attempts > resample_budget {
            return Some(ParentSelection { index, attempts, fell_back: true });
        }
    }
}

/// Uniform crossover: a fair coin per cell picks the gene from `parent_a` or `parent_b`.
pub fn uniform_crossover<R: Rng + ?Sized>(
    parent_a: &Chromosome,
    parent_b: &Chromosome,
    rng: &mut R,
) -> Result<Chromosome> {
    parent_b.ensure_dimensions(parent_a.dimensions())?;

    let (limbs, length) = parent_a.dimensions();
    let mut genes = Vec::with_capacity(limbs * length);
    for limb in 0..limbs {
        for column in 0..length {
            let gene = if rng.gen::<bool>() {
                parent_b.gene(limb, column)
            } else {
                parent_a.gene(limb, column)
            };
            genes.push(gene);
        }
    }

    Ok(Chromosome::from_genes(limbs, length, genes))
}

/// One overwritten cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSite {
    pub limb: usize,
    pub column: usize,
    pub previous: Gene,
    pub replacement: Gene,
}

impl MutationSite {
    pub fn changed(&self) -> bool {
        self.previous != self.replacement
    }
}

/// Overwrite one uniformly chosen column per limb with a uniformly drawn gene.
///
/// Always returns exactly `limbs` sites. A site may redraw the gene it replaces.
pub fn mutate_one_per_limb<R: Rng + ?Sized>(
    chromosome: &mut Chromosome,
    rng: &mut R,
) -> Result<Vec<MutationSite>> {
    let (limbs, length) = chromosome.dimensions();
    if length == 0 {
        return Err(StridegenError::DimensionMismatch {
            expected: (limbs, 1),
            actual: (limbs, 0),
        });
    }

    let mut sites = Vec::with_capacity(limbs);
    for limb in 0..limbs {
        let column = rng.gen_range(0..length);
        let replacement = Gene::random(rng);
        let previous = chromosome.gene(limb, column);
        chromosome.set_gene(limb, column, replacement);
        sites.push(MutationSite { limb, column, previous, replacement });
    }

    Ok(sites)
}
