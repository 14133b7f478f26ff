pub mod traits;
pub mod evolution;
pub mod simulation;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use simulation::SimulationConfig;
pub use traits::{ConfigSection, ConfigManifest, FieldManifest};
