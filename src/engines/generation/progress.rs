use super::driver::{GenerationReport, ProgressCallback};
use std::sync::mpsc::Sender;

/// Reports through the `log` facade; pair with `env_logger` in binaries.
#[derive(Default)]
pub struct LogProgressCallback {
    /// Log a pending-count line every this many ticks (0 disables)
    pub tick_interval: u64,
}

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: u64) {
        log::debug!("Generation {} starting", generation);
    }

    fn on_tick(&mut self, tick: u64, pending: usize) {
        if self.tick_interval > 0 && tick % self.tick_interval == 0 {
            log::debug!("  tick {}: {} walkers still active", tick, pending);
        }
    }

    fn on_generation_complete(&mut self, report: &GenerationReport) {
        log::info!(
            "Generation {} complete. Average fitness: {:.3}, best: {:.3} ({}), average distance: {:.3}",
            report.generation,
            report.average_fitness,
            report.best_fitness,
            report
                .best_individual
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            report.average_displacement
        );
    }
}

/// Forwards progress to another thread, e.g. a display loop
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    GenerationStart(u64),
    Tick { tick: u64, pending: usize },
    GenerationComplete(GenerationReport),
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: u64) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_tick(&mut self, tick: u64, pending: usize) {
        let _ = self.sender.send(ProgressMessage::Tick { tick, pending });
    }

    fn on_generation_complete(&mut self, report: &GenerationReport) {
        let _ = self
            .sender
            .send(ProgressMessage::GenerationComplete(report.clone()));
    }
}
