//! Fleetgrid Engine - Simulation orchestration
//!
//! The model owns the grid, robots, charging stations, and packages, and
//! advances them one tick at a time: health sweep, stats sample, per-robot
//! step machine in insertion order, then package auto-assignment. The
//! command surface consumed by the transport wrapper is the set of public
//! methods on [`Model`].

mod arbitration;
mod charging;
mod stepper;

pub mod export;
pub mod model;
pub mod snapshot;
pub mod stats;
pub mod trace;

pub use export::{export_path_coordinates, parse_path_coordinates, write_path_coordinates};
pub use model::Model;
pub use snapshot::{
    ObstacleUpdate, PackageSnapshot, RobotDelta, RobotSnapshot, StateSnapshot, StationSnapshot,
    StepDelta,
};
pub use stats::{AggregateStats, StatsCollector, TickSample};
pub use trace::{EventTraceCollector, TraceDetails, TraceEntry};
