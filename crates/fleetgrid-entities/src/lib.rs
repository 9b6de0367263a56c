//! Fleetgrid Entities - Robots, packages, and charging stations

pub mod charging_station;
pub mod package;
pub mod robot;

pub use charging_station::ChargingStation;
pub use package::{Package, PackageStatus};
pub use robot::{Battery, BatteryOptions, Robot};
