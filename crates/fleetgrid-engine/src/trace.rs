//! Event trace collector for debugging and analysis
//!
//! Runtime anomalies (self-repairs, deadlock resets, battery exhaustion)
//! are recorded here rather than surfaced as errors; the model never fails
//! across a tick boundary.

use fleetgrid_core::Tick;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single event trace entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceEntry {
    pub tick: u64,
    pub details: TraceDetails,
}

/// Details for different trace event types
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraceDetails {
    RobotMove {
        robot_id: u32,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    },
    PackageAssigned {
        package_id: u32,
        robot_id: u32,
    },
    PackagePicked {
        package_id: u32,
        robot_id: u32,
    },
    PackageDelivered {
        package_id: u32,
        robot_id: u32,
    },
    PackageReleased {
        package_id: u32,
        robot_id: u32,
    },
    ChargingStart {
        robot_id: u32,
        station_id: u32,
    },
    ChargingEnd {
        robot_id: u32,
        station_id: u32,
        level: f64,
    },
    EmergencyReroute {
        robot_id: u32,
        station_id: u32,
    },
    AlternativeRoute {
        robot_id: u32,
        path_len: usize,
    },
    SelfRepair {
        robot_id: u32,
    },
    DeadlockReset {
        robot_id: u32,
    },
    BatteryExhausted {
        robot_id: u32,
    },
}

/// Ring-buffer based event trace collector
#[derive(Clone, Debug)]
pub struct EventTraceCollector {
    entries: VecDeque<TraceEntry>,
    max_entries: usize,
    enabled: bool,
}

impl Default for EventTraceCollector {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl EventTraceCollector {
    /// Create a collector keeping at most `max_entries` recent events
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
            enabled: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record an event; a no-op while disabled
    pub fn record(&mut self, tick: Tick, details: TraceDetails) {
        if !self.enabled {
            return;
        }
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(TraceEntry {
            tick: tick.value(),
            details,
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Serialize the buffered entries to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries.iter().collect::<Vec<_>>())
    }
}
