pub mod export;

use crate::model::config::AppConfig;
use crate::model::World;
use export::TelemetryRecorder;
use std::path::Path;

/// Totals over a headless run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub transitions: usize,
    pub births: usize,
    pub deaths: usize,
    pub final_population: usize,
}

/// Headless simulation runner.
pub struct App {
    pub world: World,
    pub telemetry: Option<TelemetryRecorder>,
}

impl App {
    /// Loads `path`, falling back to defaults when the file does not exist.
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found; using defaults");
            return Ok(AppConfig::default());
        }
        AppConfig::from_file(path)
    }

    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            world: World::new(config)?,
            telemetry: None,
        })
    }

    #[must_use]
    pub fn with_telemetry(mut self, recorder: TelemetryRecorder) -> Self {
        self.telemetry = Some(recorder);
        self
    }

    /// Runs up to `ticks` ticks, stopping early once no agents remain.
    pub fn run(&mut self, ticks: u64) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            if self.world.population() == 0 {
                tracing::info!(frame = self.world.frame, "Population extinct; stopping");
                break;
            }
            let report = self.world.update()?;
            summary.ticks += 1;
            summary.transitions += report.transitions.len();
            summary.births += report.births;
            summary.deaths += report.deaths;
            if let Some(recorder) = self.telemetry.as_mut() {
                let world = &self.world;
                recorder.observe(&report, || world.stats());
            }
        }
        summary.final_population = self.world.population();
        tracing::info!(
            ticks = summary.ticks,
            transitions = summary.transitions,
            births = summary.births,
            deaths = summary.deaths,
            population = summary.final_population,
            "Run finished"
        );
        Ok(summary)
    }

    /// Writes collected telemetry, if any was recorded.
    pub fn save_telemetry(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(recorder) = &self.telemetry {
            recorder.save(path, &self.world.config)?;
        }
        Ok(())
    }
}
