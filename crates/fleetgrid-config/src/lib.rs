//! Fleetgrid Config - Scenario loading and validation

pub mod scenario;
pub mod validation;

pub use scenario::{
    BatteryConfig, ConfigError, GridConfig, PackagePools, PackageSpec, RobotSpec, RunConfig,
    ScenarioConfig, StationSpec,
};
pub use validation::{validate_scenario, ValidationError};
