//! JSONL telemetry for offline analysis.
//!
//! File layout:
//! - `# Key: value` metadata comments (`Generated`, `Snapshots`, `Time Range`)
//! - the run configuration as JSON between `# CONFIG_START` and
//!   `# CONFIG_END`, every line prefixed with `# `
//! - one JSON object per sampled tick
//!
//! Stance transitions can go to a sibling `behavior.jsonl`, one record per
//! line.

use crate::model::config::AppConfig;
use crate::model::{PopulationStats, TickReport};
use anyhow::Context;
use ecoboids_core::TransitionRecord;
use ecoboids_data::Stance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_START: &str = "# CONFIG_START";
pub const CONFIG_END: &str = "# CONFIG_END";
pub const BEHAVIOR_FILE: &str = "behavior.jsonl";

/// One sampled tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub tick: u64,
    pub timestamp: String,
    pub populations: BTreeMap<String, usize>,
    pub energy: BTreeMap<String, f64>,
    pub stances: BTreeMap<Stance, usize>,
    /// Stance changes since the previous sample.
    pub transitions: usize,
}

impl TelemetrySnapshot {
    #[must_use]
    pub fn new(tick: u64, stats: PopulationStats, transitions: usize) -> Self {
        Self {
            tick,
            timestamp: chrono::Utc::now().to_rfc3339(),
            populations: stats.populations,
            energy: stats.energy,
            stances: stats.stances,
            transitions,
        }
    }
}

/// Buffers samples in memory so the header can carry exact counts.
#[derive(Debug, Clone)]
pub struct TelemetryRecorder {
    interval: u64,
    keep_transitions: bool,
    pending: usize,
    snapshots: Vec<TelemetrySnapshot>,
    transitions: Vec<TransitionRecord>,
}

impl TelemetryRecorder {
    /// Samples every `interval` ticks; `keep_transitions` also retains every
    /// transition record for `behavior.jsonl`.
    #[must_use]
    pub fn new(interval: u64, keep_transitions: bool) -> Self {
        Self {
            interval: interval.max(1),
            keep_transitions,
            pending: 0,
            snapshots: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Accounts for one tick. `stats` is only evaluated on sampled ticks.
    pub fn observe(&mut self, report: &TickReport, stats: impl FnOnce() -> PopulationStats) {
        self.pending += report.transitions.len();
        if self.keep_transitions {
            self.transitions.extend(report.transitions.iter().cloned());
        }
        if report.frame % self.interval == 0 {
            self.snapshots
                .push(TelemetrySnapshot::new(report.frame, stats(), self.pending));
            self.pending = 0;
        }
    }

    #[must_use]
    pub fn snapshots(&self) -> &[TelemetrySnapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Writes the header, config block and sample lines.
    pub fn write_to<W: Write>(&self, out: &mut W, config: &AppConfig) -> anyhow::Result<()> {
        writeln!(out, "# Ecoboids telemetry")?;
        writeln!(out, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;
        writeln!(out, "# Snapshots: {}", self.snapshots.len())?;
        if let (Some(first), Some(last)) = (self.snapshots.first(), self.snapshots.last()) {
            writeln!(out, "# Time Range: {} to {}", first.tick, last.tick)?;
        }
        writeln!(out, "{CONFIG_START}")?;
        for line in serde_json::to_string_pretty(config)?.lines() {
            writeln!(out, "# {line}")?;
        }
        writeln!(out, "{CONFIG_END}")?;
        for snapshot in &self.snapshots {
            writeln!(out, "{}", serde_json::to_string(snapshot)?)?;
        }
        Ok(())
    }

    pub fn write_transitions<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        for record in &self.transitions {
            writeln!(out, "{}", serde_json::to_string(record)?)?;
        }
        Ok(())
    }

    /// Writes `path` and, when transitions are kept, `behavior.jsonl` next
    /// to it. Returns every file written.
    pub fn save(&self, path: &Path, config: &AppConfig) -> anyhow::Result<Vec<PathBuf>> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let mut written = Vec::new();

        let mut out = BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        );
        self.write_to(&mut out, config)?;
        out.flush()?;
        written.push(path.to_path_buf());

        if self.keep_transitions {
            let behavior = path.with_file_name(BEHAVIOR_FILE);
            let mut out = BufWriter::new(
                File::create(&behavior)
                    .with_context(|| format!("creating {}", behavior.display()))?,
            );
            self.write_transitions(&mut out)?;
            out.flush()?;
            written.push(behavior);
        }

        tracing::info!(
            snapshots = self.snapshots.len(),
            transitions = self.transitions.len(),
            path = %path.display(),
            "Telemetry exported"
        );
        Ok(written)
    }
}

/// A parsed telemetry file.
#[derive(Debug, Clone, Default)]
pub struct TelemetryLog {
    /// Header `# Key: value` pairs with keys lowercased and spaces replaced
    /// by underscores.
    pub metadata: BTreeMap<String, String>,
    pub config: Option<serde_json::Value>,
    pub snapshots: Vec<TelemetrySnapshot>,
}

impl TelemetryLog {
    /// Header lines scanned for metadata.
    pub const METADATA_LINES: usize = 20;

    /// Reads a telemetry file. Lines that fail to parse are skipped with a
    /// warning.
    pub fn read<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut log = Self::default();
        let mut config_lines: Option<Vec<String>> = None;
        let mut config_done = false;

        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line == CONFIG_START && !config_done {
                config_lines = Some(Vec::new());
                continue;
            }
            if line == CONFIG_END {
                config_done = true;
                continue;
            }
            if let Some(lines) = config_lines.as_mut().filter(|_| !config_done) {
                if let Some(json) = line.strip_prefix("# ") {
                    lines.push(json.to_string());
                }
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                if n < Self::METADATA_LINES {
                    if let Some((key, value)) = comment.trim().split_once(':') {
                        let key = key.trim().to_lowercase().replace(' ', "_");
                        log.metadata.insert(key, value.trim().to_string());
                    }
                }
                continue;
            }

            match serde_json::from_str::<TelemetrySnapshot>(line) {
                Ok(snapshot) => log.snapshots.push(snapshot),
                Err(e) => tracing::warn!(line = n + 1, error = %e, "Skipping malformed telemetry line"),
            }
        }

        if let Some(lines) = config_lines {
            match serde_json::from_str(&lines.join("\n")) {
                Ok(value) => log.config = Some(value),
                Err(e) => tracing::warn!(error = %e, "Malformed config block"),
            }
        }
        log.snapshots.sort_by_key(|s| s.tick);
        Ok(log)
    }
}
