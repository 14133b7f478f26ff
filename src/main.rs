use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stridegen::config::ConfigManager;
use stridegen::engines::evaluation::{KinematicPhysics, WeightedLandmarkFitness};
use stridegen::engines::generation::{GenerationDriver, LogProgressCallback, Population};

#[derive(Parser)]
#[command(name = "stridegen")]
#[command(version)]
#[command(about = "Evolve walking gaits for limbed bodies with a genetic algorithm")]
struct Cli {
    /// Configuration file (TOML or JSON); STRIDEGEN_* variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the configuration manifest as JSON and exit
    #[arg(long)]
    manifest: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let manager = ConfigManager::new();
    match &cli.config {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => manager.load_from_env()?,
    }
    let config = manager.get();

    if cli.manifest {
        println!("{}", serde_json::to_string_pretty(&config.manifests())?);
        return Ok(());
    }

    let population = Population::new(&config.evolution)?;
    let (limbs, length) = population.dimensions();
    log::info!(
        "Evolving {} walkers, {} limbs x {} ticks, mutation rate {}",
        population.len(),
        limbs,
        length,
        population.mutation_rate()
    );

    let physics = KinematicPhysics::new(population.len(), limbs, &config.simulation);
    let fitness = WeightedLandmarkFitness::from_config(&config.simulation);
    let mut driver = GenerationDriver::new(population, physics, fitness)
        .with_simulation_config(&config.simulation);

    let mut progress = LogProgressCallback::default();
    for _ in 0..config.evolution.generations {
        driver.run_generation(&mut progress)?;
        let report = driver.report();
        log::debug!(
            "Camera following {:?} at x = {:.2}",
            report.leader,
            report.camera_target.x
        );
    }

    if let Some(best) = driver
        .history()
        .iter()
        .max_by(|a, b| a.average_displacement.total_cmp(&b.average_displacement))
    {
        log::info!(
            "Best generation: {} with average distance {:.3}",
            best.generation,
            best.average_displacement
        );
    }

    Ok(())
}
