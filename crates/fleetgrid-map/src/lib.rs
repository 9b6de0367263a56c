//! Fleetgrid Map - Grid world and A* path planning
//!
//! The warehouse floor is a finite W×H lattice of cells. Static obstacles
//! and mobile robots occupy cells; charging stations live in a parallel
//! overlay owned by the model. The planner searches the 4-connected grid.

pub mod cell;
pub mod grid;
pub mod planner;

pub use cell::Cell;
pub use grid::Grid;
pub use planner::{detour, emergency, penalized, plain, Peer};
