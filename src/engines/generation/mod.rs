pub mod genome;
pub mod individual;
pub mod operators;
pub mod population;
pub mod driver;
pub mod progress;

pub use genome::{Chromosome, Gene, LIMB_COUNT};
pub use individual::Individual;
pub use operators::{MutationSite, ParentSelection};
pub use population::{GenerationOutcome, Offspring, Population, TracedSelection};
pub use driver::{DriverReport, GenerationDriver, GenerationReport, ProgressCallback, TickOutcome};
pub use progress::{ChannelProgressCallback, LogProgressCallback, ProgressMessage};
