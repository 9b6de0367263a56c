//! Error types for the simulation

use thiserror::Error;

/// Simulation error types
#[derive(Error, Debug)]
pub enum SimError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: u32 },

    /// Placement overlaps a reserved cell
    #[error("Placement conflict at ({x}, {y}): {reason}")]
    PlacementConflict { x: i32, y: i32, reason: String },

    /// Planner returned no path
    #[error("No path from ({from_x}, {from_y}) to ({to_x}, {to_y})")]
    UnreachableGoal {
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    },

    /// Package assignment rejected
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Create a not found error for a robot
    pub fn robot_not_found(id: u32) -> Self {
        Self::NotFound {
            entity_type: "Robot",
            id,
        }
    }

    /// Create a not found error for a package
    pub fn package_not_found(id: u32) -> Self {
        Self::NotFound {
            entity_type: "Package",
            id,
        }
    }

    /// Create a not found error for a charging station
    pub fn station_not_found(id: u32) -> Self {
        Self::NotFound {
            entity_type: "ChargingStation",
            id,
        }
    }

    /// Create a placement conflict error
    pub fn placement(x: i32, y: i32, reason: impl Into<String>) -> Self {
        Self::PlacementConflict {
            x,
            y,
            reason: reason.into(),
        }
    }
}

/// Result type alias for simulation operations
pub type SimResult<T> = Result<T, SimError>;
