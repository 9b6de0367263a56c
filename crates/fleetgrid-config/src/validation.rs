//! Scenario validation

use crate::scenario::ScenarioConfig;
use fleetgrid_map::Cell;
use std::collections::HashSet;
use std::fmt;

/// A validation failure tied to a config field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a scenario; returns warnings on success, errors on failure
pub fn validate_scenario(config: &ScenarioConfig) -> Result<Vec<String>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.grid.width <= 0 || config.grid.height <= 0 {
        errors.push(ValidationError::new(
            "grid",
            format!(
                "dimensions must be positive, got {}x{}",
                config.grid.width, config.grid.height
            ),
        ));
        // Bounds checks below would be meaningless
        return Err(errors);
    }

    let in_bounds = |cell: Cell| {
        cell.x >= 0 && cell.x < config.grid.width && cell.y >= 0 && cell.y < config.grid.height
    };

    let obstacle_set: HashSet<Cell> = config.obstacles.iter().copied().collect();

    for (i, cell) in config.obstacles.iter().enumerate() {
        if !in_bounds(*cell) {
            errors.push(ValidationError::new(
                format!("obstacles[{}]", i),
                format!("cell {} is out of bounds", cell),
            ));
        }
    }

    let mut seen_starts = HashSet::new();
    for (i, robot) in config.robots.iter().enumerate() {
        let field = format!("robots[{}]", i);
        if !in_bounds(robot.start) {
            errors.push(ValidationError::new(&field, format!("start {} is out of bounds", robot.start)));
        }
        if obstacle_set.contains(&robot.start) {
            errors.push(ValidationError::new(&field, format!("start {} is on an obstacle", robot.start)));
        }
        if !seen_starts.insert(robot.start) {
            errors.push(ValidationError::new(&field, format!("start {} is shared by another robot", robot.start)));
        }
        if let Some(goal) = robot.goal {
            if !in_bounds(goal) {
                errors.push(ValidationError::new(&field, format!("goal {} is out of bounds", goal)));
            }
            if obstacle_set.contains(&goal) {
                errors.push(ValidationError::new(&field, format!("goal {} is on an obstacle", goal)));
            }
        }
        let b = &robot.battery;
        if b.max <= 0.0 {
            errors.push(ValidationError::new(&field, "battery capacity must be positive"));
        }
        if b.drain_rate < 0.0 {
            errors.push(ValidationError::new(&field, "drain rate must not be negative"));
        }
        if let Some(level) = b.level {
            if level < 0.0 || level > b.max {
                errors.push(ValidationError::new(
                    &field,
                    format!("battery level {} outside [0, {}]", level, b.max),
                ));
            }
        }
    }

    let mut seen_stations = HashSet::new();
    for (i, station) in config.charging_stations.iter().enumerate() {
        let field = format!("charging_stations[{}]", i);
        if !in_bounds(station.cell) {
            errors.push(ValidationError::new(&field, format!("cell {} is out of bounds", station.cell)));
        }
        if obstacle_set.contains(&station.cell) {
            errors.push(ValidationError::new(&field, format!("cell {} is on an obstacle", station.cell)));
        }
        if !seen_stations.insert(station.cell) {
            errors.push(ValidationError::new(&field, format!("duplicate station at {}", station.cell)));
        }
        if station.charging_rate <= 0.0 {
            errors.push(ValidationError::new(&field, "charging rate must be positive"));
        }
    }

    for (i, package) in config.packages.iter().enumerate() {
        let field = format!("packages[{}]", i);
        for (name, cell) in [("pickup", package.pickup), ("delivery", package.delivery)] {
            if !in_bounds(cell) {
                errors.push(ValidationError::new(&field, format!("{} {} is out of bounds", name, cell)));
            }
            if obstacle_set.contains(&cell) {
                errors.push(ValidationError::new(&field, format!("{} {} is on an obstacle", name, cell)));
            }
        }
    }

    for (name, cells) in [
        ("package_pools.pickups", &config.package_pools.pickups),
        ("package_pools.deliveries", &config.package_pools.deliveries),
    ] {
        for (i, cell) in cells.iter().enumerate() {
            if !in_bounds(*cell) {
                errors.push(ValidationError::new(
                    format!("{}[{}]", name, i),
                    format!("cell {} is out of bounds", cell),
                ));
            }
        }
    }

    if config.robots.is_empty() {
        warnings.push("scenario has no robots".to_string());
    }
    if config.run.ticks == 0 {
        warnings.push("run.ticks is 0, the simulation will not advance".to_string());
    }
    if !config.packages.is_empty() && config.charging_stations.is_empty() {
        warnings.push("packages configured without any charging station".to_string());
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(errors)
    }
}
