//! Per-tick statistics collection
//!
//! Mirrors what the external UI polls for: fleet-wide averages per tick
//! plus running aggregates for state snapshots.

use serde::{Deserialize, Serialize};

/// Fleet-wide sample taken at the start of a tick
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TickSample {
    pub tick: u64,
    pub avg_steps_taken: f64,
    pub robots_at_goal: usize,
    pub avg_battery_pct: f64,
    pub packages_delivered: usize,
}

/// Aggregate statistics exposed in full state snapshots
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    pub ticks: u64,
    pub total_steps_taken: u64,
    pub total_packages_delivered: usize,
    pub active_packages: usize,
    pub avg_battery_pct: f64,
}

/// Collects one sample per tick
#[derive(Clone, Debug, Default)]
pub struct StatsCollector {
    samples: Vec<TickSample>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: TickSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[TickSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&TickSample> {
        self.samples.last()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
