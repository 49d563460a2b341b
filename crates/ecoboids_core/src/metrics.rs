//! Decision pipeline metrics and logging setup.
//!
//! Counts ticks, transitions and skipped agents so a long run can be
//! summarized without scraping logs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

pub const SKIPPED_UNKNOWN_SPECIES: &str = "skipped_unknown_species";
pub const NO_DECISION: &str = "no_decision";

/// Shared counters for the simulation loop.
pub struct Metrics {
    tick_count: AtomicU64,
    agent_count: AtomicU64,
    transition_count: AtomicU64,
    counters: Mutex<HashMap<String, u64>>,
    interval: u64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metrics {
    /// `interval` is the number of ticks between summary log lines.
    #[must_use]
    pub fn new(interval: u64) -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            agent_count: AtomicU64::new(0),
            transition_count: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            interval: interval.max(1),
            start_time: Instant::now(),
        }
    }

    pub fn record_tick(&self, duration: Duration, agents: usize, transitions: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.agent_count.store(agents as u64, Ordering::Relaxed);
        let total = self
            .transition_count
            .fetch_add(transitions as u64, Ordering::Relaxed)
            + transitions as u64;

        if tick % self.interval == 0 {
            tracing::info!(
                tick,
                agents,
                transitions_total = total,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, amount: u64) {
        if amount == 0 {
            return;
        }
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.entry(name.to_string()).or_insert(0) += amount;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn agent_count(&self) -> u64 {
        self.agent_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transition_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a global fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}
