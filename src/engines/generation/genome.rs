//! Gene alphabet and chromosome layout
//!
//! A chromosome is a `limbs x length` table. Row `i` drives limb `i`; column `t`
//! is the instruction consumed on tick `t` of a generation. Every gene decodes to
//! a torque direction and a magnitude class:
//!
//! | symbol | direction        | magnitude |
//! |--------|------------------|-----------|
//! | `a`    | clockwise        | 1x        |
//! | `b`    | clockwise        | 5x        |
//! | `c`    | clockwise        | 10x       |
//! | `x`    | counter-clockwise| 1x        |
//! | `y`    | counter-clockwise| 5x        |
//! | `z`    | counter-clockwise| 10x       |
//!
//! The table is closed: parsing any other symbol fails with
//! `StridegenError::InvalidGeneSymbol` instead of producing a no-op instruction.

use crate::error::{Result, StridegenError};
use crate::types::{Direction, MagnitudeClass};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limbs driven by one chromosome (head plus four limbs on the walker body)
pub const LIMB_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gene {
    A,
    B,
    C,
    X,
    Y,
    Z,
}

impl Gene {
    pub const ALPHABET: [Gene; 6] = [Gene::A, Gene::B, Gene::C, Gene::X, Gene::Y, Gene::Z];

    pub fn decode(self) -> (Direction, MagnitudeClass) {
        match self {
            Gene::A => (Direction::Clockwise, MagnitudeClass::Small),
            Gene::B => (Direction::Clockwise, MagnitudeClass::Medium),
            Gene::C => (Direction::Clockwise, MagnitudeClass::Large),
            Gene::X => (Direction::CounterClockwise, MagnitudeClass::Small),
            Gene::Y => (Direction::CounterClockwise, MagnitudeClass::Medium),
            Gene::Z => (Direction::CounterClockwise, MagnitudeClass::Large),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Gene::A => 'a',
            Gene::B => 'b',
            Gene::C => 'c',
            Gene::X => 'x',
            Gene::Y => 'y',
            Gene::Z => 'z',
        }
    }

    /// Uniform draw over the alphabet
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Gene {
        Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())]
    }
}

impl TryFrom<char> for Gene {
    type Error = StridegenError;

    fn try_from(symbol: char) -> Result<Self> {
        match symbol {
            'a' => Ok(Gene::A),
            'b' => Ok(Gene::B),
            'c' => Ok(Gene::C),
            'x' => Ok(Gene::X),
            'y' => Ok(Gene::Y),
            'z' => Ok(Gene::Z),
            other => Err(StridegenError::InvalidGeneSymbol(other)),
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Rectangular gene table, stored row-major (one row per limb)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChromosomeRepr")]
pub struct Chromosome {
    limbs: usize,
    length: usize,
    genes: Vec<Gene>,
}

/// Unchecked wire form; `Chromosome` only deserializes through it.
#[derive(Deserialize)]
struct ChromosomeRepr {
    limbs: usize,
    length: usize,
    genes: Vec<Gene>,
}

impl TryFrom<ChromosomeRepr> for Chromosome {
    type Error = StridegenError;

    fn try_from(repr: ChromosomeRepr) -> Result<Self> {
        let cells = repr.limbs.checked_mul(repr.length);
        if cells != Some(repr.genes.len()) {
            return Err(StridegenError::DimensionMismatch {
                expected: (repr.limbs, repr.length),
                actual: (repr.limbs, repr.genes.len().checked_div(repr.limbs).unwrap_or(0)),
            });
        }
        Ok(Self {
            limbs: repr.limbs,
            length: repr.length,
            genes: repr.genes,
        })
    }
}

impl Chromosome {
    pub fn random<R: Rng + ?Sized>(limbs: usize, length: usize, rng: &mut R) -> Self {
        let genes = (0..limbs * length).map(|_| Gene::random(rng)).collect();
        Self { limbs, length, genes }
    }

    /// Build from one symbol string per limb. Rows must be equally long.
    pub fn from_symbols<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let limbs = rows.len();
        let length = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        let mut genes = Vec::with_capacity(limbs * length);

        for row in rows {
            let row = row.as_ref();
            let row_len = row.chars().count();
            if row_len != length {
                return Err(StridegenError::DimensionMismatch {
                    expected: (limbs, length),
                    actual: (limbs, row_len),
                });
            }
            for symbol in row.chars() {
                genes.push(Gene::try_from(symbol)?);
            }
        }

        Ok(Self { limbs, length, genes })
    }

    pub fn limbs(&self) -> usize {
        self.limbs
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// `(limbs, length)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.limbs, self.length)
    }

    /// Panics when out of range, like slice indexing.
    pub fn gene(&self, limb: usize, column: usize) -> Gene {
        assert!(limb < self.limbs && column < self.length, "gene ({limb}, {column}) out of range");
        self.genes[limb * self.length + column]
    }

    pub fn set_gene(&mut self, limb: usize, column: usize, gene: Gene) {
        assert!(limb < self.limbs && column < self.length, "gene ({limb}, {column}) out of range");
        self.genes[limb * self.length + column] = gene;
    }

    pub fn row(&self, limb: usize) -> &[Gene] {
        &self.genes[limb * self.length..(limb + 1) * self.length]
    }

    /// Genes for every limb at one timestep
    pub fn column(&self, column: usize) -> impl Iterator<Item = Gene> + '_ {
        (0..self.limbs).map(move |limb| self.gene(limb, column))
    }

    pub fn ensure_dimensions(&self, expected: (usize, usize)) -> Result<()> {
        if self.dimensions() != expected {
            return Err(StridegenError::DimensionMismatch {
                expected,
                actual: self.dimensions(),
            });
        }
        Ok(())
    }

    /// Row strings, the inverse of `from_symbols`
    pub fn to_symbols(&self) -> Vec<String> {
        (0..self.limbs)
            .map(|limb| self.row(limb).iter().map(|g| g.symbol()).collect())
            .collect()
    }

    pub(crate) fn from_genes(limbs: usize, length: usize, genes: Vec<Gene>) -> Self {
        debug_assert_eq!(genes.len(), limbs * length);
        Self { limbs, length, genes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_decode_table() {
        assert_eq!(Gene::A.decode(), (Direction::Clockwise, MagnitudeClass::Small));
        assert_eq!(Gene::B.decode(), (Direction::Clockwise, MagnitudeClass::Medium));
        assert_eq!(Gene::C.decode(), (Direction::Clockwise, MagnitudeClass::Large));
        assert_eq!(Gene::X.decode(), (Direction::CounterClockwise, MagnitudeClass::Small));
        assert_eq!(Gene::Y.decode(), (Direction::CounterClockwise, MagnitudeClass::Medium));
        assert_eq!(Gene::Z.decode(), (Direction::CounterClockwise, MagnitudeClass::Large));
    }

    #[test]
    fn test_symbols_round_trip_through_alphabet() {
        for gene in Gene::ALPHABET {
            assert_eq!(Gene::try_from(gene.symbol()).unwrap(), gene);
        }
    }

    #[test]
    fn test_invalid_symbol_rejected() {
        assert!(matches!(Gene::try_from('q'), Err(StridegenError::InvalidGeneSymbol('q'))));
        assert!(matches!(Gene::try_from('A'), Err(StridegenError::InvalidGeneSymbol('A'))));

        let result = Chromosome::from_symbols(&["abc", "xyQ"]);
        assert!(matches!(result, Err(StridegenError::InvalidGeneSymbol('Q'))));
    }

    #[test]
    fn test_deserialize_checks_cell_count() {
        let short = serde_json::from_str::<Chromosome>(r#"{"limbs":5,"length":3,"genes":["A"]}"#);
        assert!(short.is_err());

        let empty_rows = serde_json::from_str::<Chromosome>(r#"{"limbs":0,"length":3,"genes":["A"]}"#);
        assert!(empty_rows.is_err());

        let chromosome = Chromosome::from_symbols(&["abc", "xyz"]).unwrap();
        let json = serde_json::to_string(&chromosome).unwrap();
        let restored: Chromosome = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, chromosome);
        assert_eq!(restored.gene(1, 2), Gene::Z);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = Chromosome::from_symbols(&["abc", "xy"]);
        assert!(matches!(result, Err(StridegenError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_random_chromosome_is_fully_populated() {
        let mut rng = StdRng::seed_from_u64(7);
        let chromosome = Chromosome::random(LIMB_COUNT, 40, &mut rng);

        assert_eq!(chromosome.dimensions(), (LIMB_COUNT, 40));
        for limb in 0..LIMB_COUNT {
            assert_eq!(chromosome.row(limb).len(), 40);
        }

        // 200 draws over 6 symbols should hit every symbol
        for gene in Gene::ALPHABET {
            let hits = (0..LIMB_COUNT)
                .flat_map(|l| chromosome.row(l).iter())
                .filter(|g| **g == gene)
                .count();
            assert!(hits > 0, "symbol {} never drawn", gene);
        }
    }

    #[test]
    fn test_row_and_column_access() {
        let chromosome = Chromosome::from_symbols(&["abc", "xyz"]).unwrap();

        assert_eq!(chromosome.gene(0, 2), Gene::C);
        assert_eq!(chromosome.gene(1, 0), Gene::X);
        assert_eq!(chromosome.column(1).collect::<Vec<_>>(), vec![Gene::B, Gene::Y]);
        assert_eq!(chromosome.to_symbols(), vec!["abc".to_string(), "xyz".to_string()]);
    }
}
