//! Scenario configuration parsing

use fleetgrid_map::Cell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file format")]
    UnsupportedFormat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub grid: GridConfig,
    #[serde(default)]
    pub run: RunConfig,
    pub robots: Vec<RobotSpec>,
    #[serde(default)]
    pub charging_stations: Vec<StationSpec>,
    #[serde(default)]
    pub obstacles: Vec<Cell>,
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
    /// Pickup/delivery pools that `create_packages` draws from
    #[serde(default)]
    pub package_pools: PackagePools,
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
        }
    }
}

fn default_ticks() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotSpec {
    pub start: Cell,
    /// Defaults to `start` for robots created without a destination
    pub goal: Option<Cell>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_idle")]
    pub idle: bool,
    #[serde(default)]
    pub battery: BatteryConfig,
}

fn default_color() -> String {
    "red".to_string()
}

fn default_idle() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct BatteryConfig {
    #[serde(default = "default_max_battery")]
    pub max: f64,
    /// Initial charge; defaults to full
    pub level: Option<f64>,
    #[serde(default = "default_drain_rate")]
    pub drain_rate: f64,
    /// Reduced drain below the critical threshold; defaults to half the
    /// normal rate
    pub energy_saving_rate: Option<f64>,
    #[serde(default = "default_low_threshold")]
    pub low_threshold_pct: f64,
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold_pct: f64,
    #[serde(default = "default_emergency_threshold")]
    pub emergency_threshold_pct: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            max: default_max_battery(),
            level: None,
            drain_rate: default_drain_rate(),
            energy_saving_rate: None,
            low_threshold_pct: default_low_threshold(),
            critical_threshold_pct: default_critical_threshold(),
            emergency_threshold_pct: default_emergency_threshold(),
        }
    }
}

fn default_max_battery() -> f64 {
    100.0
}

fn default_drain_rate() -> f64 {
    1.0
}

fn default_low_threshold() -> f64 {
    30.0
}

fn default_critical_threshold() -> f64 {
    20.0
}

fn default_emergency_threshold() -> f64 {
    10.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationSpec {
    pub cell: Cell,
    #[serde(default = "default_charging_rate")]
    pub charging_rate: f64,
}

fn default_charging_rate() -> f64 {
    10.0
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PackageSpec {
    pub pickup: Cell,
    pub delivery: Cell,
}

/// Dock and shelf cell pools for randomly generated packages
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackagePools {
    #[serde(default)]
    pub pickups: Vec<Cell>,
    #[serde(default)]
    pub deliveries: Vec<Cell>,
}

impl PackagePools {
    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty() || self.deliveries.is_empty()
    }
}

impl ScenarioConfig {
    /// Load a scenario from a YAML or JSON file, dispatching on extension
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Ok(serde_yaml::from_str(&content)?)
        } else if path.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Err(ConfigError::UnsupportedFormat)
        }
    }

    /// Parse a scenario from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a scenario from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}
