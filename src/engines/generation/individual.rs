use crate::engines::generation::genome::Chromosome;
use crate::types::{ActuationCommand, IndividualId};

/// One walker controller: a chromosome plus a read cursor.
///
/// Active while `cursor < length`; each `advance` decodes one column and moves
/// the cursor. Once the cursor reaches the chromosome length the individual is
/// Complete and emits nothing until `reset`.
#[derive(Debug, Clone)]
pub struct Individual {
    id: IndividualId,
    chromosome: Chromosome,
    cursor: usize,
    complete: bool,
}

impl Individual {
    pub fn new(id: IndividualId, chromosome: Chromosome) -> Self {
        let complete = chromosome.length() == 0;
        Self {
            id,
            chromosome,
            cursor: 0,
            complete,
        }
    }

    pub fn id(&self) -> IndividualId {
        self.id
    }

    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Decode the current column into one command per limb and step the cursor.
    pub fn advance(&mut self) -> Vec<ActuationCommand> {
        let mut commands = Vec::with_capacity(self.chromosome.limbs());
        self.advance_into(&mut commands);
        commands
    }

    /// Same as `advance`, appending to a caller-owned buffer.
    pub fn advance_into(&mut self, commands: &mut Vec<ActuationCommand>) {
        if self.complete {
            return;
        }

        let id = self.id;
        commands.extend(
            self.chromosome
                .column(self.cursor)
                .enumerate()
                .map(|(limb, gene)| {
                    let (direction, magnitude) = gene.decode();
                    ActuationCommand {
                        individual: id,
                        limb,
                        direction,
                        magnitude,
                    }
                }),
        );

        self.cursor += 1;
        if self.cursor >= self.chromosome.length() {
            self.cursor = self.chromosome.length();
            self.complete = true;
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.complete = self.chromosome.length() == 0;
    }

    /// Swap in next generation's chromosome. Callers reset first.
    pub(crate) fn install(&mut self, chromosome: Chromosome) {
        self.chromosome = chromosome;
    }

    pub(crate) fn chromosome_mut(&mut self) -> &mut Chromosome {
        &mut self.chromosome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::genome::{Gene, LIMB_COUNT};
    use crate::types::{Direction, MagnitudeClass};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn walker(length: usize) -> Individual {
        let mut rng = StdRng::seed_from_u64(3);
        Individual::new(IndividualId(0), Chromosome::random(LIMB_COUNT, length, &mut rng))
    }

    #[test]
    fn test_completes_after_exactly_length_advances() {
        let mut individual = walker(6);

        for tick in 0..6 {
            assert!(!individual.is_complete(), "complete early at tick {}", tick);
            let commands = individual.advance();
            assert_eq!(commands.len(), LIMB_COUNT);
        }

        assert!(individual.is_complete());
        assert_eq!(individual.cursor(), 6);
        assert!(individual.advance().is_empty());
        assert_eq!(individual.cursor(), 6);
    }

    #[test]
    fn test_commands_follow_chromosome_column() {
        let chromosome = Chromosome::from_symbols(&["az", "cy"]).unwrap();
        let mut individual = Individual::new(IndividualId(4), chromosome);

        let first = individual.advance();
        assert_eq!(first[0].individual, IndividualId(4));
        assert_eq!(first[0].limb, 0);
        assert_eq!((first[0].direction, first[0].magnitude), (Direction::Clockwise, MagnitudeClass::Small));
        assert_eq!(first[1].limb, 1);
        assert_eq!((first[1].direction, first[1].magnitude), (Direction::Clockwise, MagnitudeClass::Large));

        let second = individual.advance();
        assert_eq!(second[0].direction, Direction::CounterClockwise);
        assert_eq!(second[0].magnitude, MagnitudeClass::Large);
        assert_eq!(second[1].magnitude, MagnitudeClass::Medium);
    }

    #[test]
    fn test_advance_does_not_touch_chromosome() {
        let mut individual = walker(4);
        let before = individual.chromosome().clone();
        while !individual.is_complete() {
            individual.advance();
        }
        assert_eq!(individual.chromosome(), &before);
    }

    #[test]
    fn test_reset_restores_active_state() {
        let mut individual = walker(3);
        individual.reset();
        assert_eq!(individual.cursor(), 0);
        assert!(!individual.is_complete());

        individual.advance();
        individual.reset();
        assert_eq!(individual.cursor(), 0);

        while !individual.is_complete() {
            individual.advance();
        }
        individual.reset();
        assert_eq!(individual.cursor(), 0);
        assert!(!individual.is_complete());
        assert_eq!(individual.advance().len(), LIMB_COUNT);
    }

    #[test]
    fn test_torque_scaling() {
        let mut individual = Individual::new(
            IndividualId(0),
            Chromosome::from_symbols(&["b", "x"]).unwrap(),
        );
        let commands = individual.advance();
        assert_eq!(commands[0].torque(2.0), 10.0);
        assert_eq!(commands[1].torque(2.0), -2.0);
        assert_eq!(Gene::try_from('b').unwrap().decode().1.multiplier(), 5.0);
    }
}
