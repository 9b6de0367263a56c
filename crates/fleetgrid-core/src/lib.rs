//! Fleetgrid Core - Core types for the warehouse robot coordination engine
//!
//! This crate provides the typed identifiers, error surface, tick counter,
//! and seeded RNG used throughout the Fleetgrid simulation system.

pub mod error;
pub mod id;
pub mod rng;
pub mod tick;

pub use error::{SimError, SimResult};
pub use id::*;
pub use rng::SimRng;
pub use tick::Tick;
