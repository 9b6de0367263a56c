//! Serde DTOs for the command surface
//!
//! Primitive-typed snapshots decouple the transport wrapper from entity
//! internals; everything here serializes with serde and reports cells
//! 0-indexed.

use crate::model::Model;
use crate::stats::AggregateStats;
use fleetgrid_entities::{ChargingStation, Package, PackageStatus, Robot};
use fleetgrid_map::Cell;
use serde::{Deserialize, Serialize};

/// Full view of one robot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotSnapshot {
    pub id: u32,
    pub color: String,
    pub home: Cell,
    pub goal: Cell,
    pub position: Cell,
    pub path: Vec<Cell>,
    pub battery_level: f64,
    pub max_battery: f64,
    pub battery_percentage: f64,
    pub charging: bool,
    pub waiting_for_charge: bool,
    pub idle: bool,
    pub reached_goal: bool,
    pub steps_taken: u64,
    pub total_packages_delivered: u32,
    pub priority: i32,
    pub carrying_package: Option<PackageSnapshot>,
}

impl RobotSnapshot {
    pub fn capture(model: &Model, robot: &Robot) -> Self {
        let carrying = robot
            .carrying_package
            .and_then(|id| model.package(id))
            .map(PackageSnapshot::capture);
        Self {
            id: robot.id.as_u32(),
            color: robot.color.clone(),
            home: robot.home,
            goal: robot.goal,
            position: robot.pos,
            path: robot.path.clone(),
            battery_level: robot.battery.level,
            max_battery: robot.battery.max,
            battery_percentage: robot.battery.percentage(),
            charging: robot.charging,
            waiting_for_charge: robot.waiting_for_charge,
            idle: robot.idle,
            reached_goal: robot.reached_goal,
            steps_taken: robot.steps_taken,
            total_packages_delivered: robot.total_packages_delivered,
            priority: robot.priority,
            carrying_package: carrying,
        }
    }
}

/// Per-robot delta returned by `Model::step`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotDelta {
    pub id: u32,
    pub position: Cell,
    pub battery_level: f64,
    pub battery_percentage: f64,
    pub charging: bool,
    pub carrying: bool,
    pub reached_goal: bool,
    pub steps_taken: u64,
    pub steps_left: usize,
    pub status: String,
    pub path: Vec<Cell>,
}

impl RobotDelta {
    fn capture(robot: &Robot) -> Self {
        let status = if robot.charging {
            "charging"
        } else if robot.reached_goal {
            "goal_reached"
        } else if robot.idle {
            "idle"
        } else {
            "moving"
        };
        Self {
            id: robot.id.as_u32(),
            position: robot.pos,
            battery_level: robot.battery.level,
            battery_percentage: robot.battery.percentage(),
            charging: robot.charging,
            carrying: robot.carrying_package.is_some(),
            reached_goal: robot.reached_goal,
            steps_taken: robot.steps_taken,
            steps_left: robot.steps_left(),
            status: status.to_string(),
            path: robot.path.clone(),
        }
    }
}

/// Result of one model step
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepDelta {
    pub tick: u64,
    pub robots: Vec<RobotDelta>,
    pub all_reached_goal: bool,
}

impl StepDelta {
    pub(crate) fn capture(model: &Model) -> Self {
        Self {
            tick: model.tick.value(),
            robots: model.robots.iter().map(RobotDelta::capture).collect(),
            all_reached_goal: model.all_reached_goal(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Full view of one package
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackageSnapshot {
    pub id: u32,
    pub pickup: Cell,
    pub delivery: Cell,
    pub status: PackageStatus,
    pub assigned_robot_id: Option<u32>,
    pub pickup_tick: Option<u64>,
    pub delivery_tick: Option<u64>,
}

impl PackageSnapshot {
    pub fn capture(package: &Package) -> Self {
        Self {
            id: package.id.as_u32(),
            pickup: package.pickup,
            delivery: package.delivery,
            status: package.status,
            assigned_robot_id: package.assigned_robot.map(|r| r.as_u32()),
            pickup_tick: package.pickup_tick.map(|t| t.value()),
            delivery_tick: package.delivery_tick.map(|t| t.value()),
        }
    }
}

/// Full view of one charging station
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub id: u32,
    pub cell: Cell,
    pub charging_rate: f64,
    pub queue: Vec<u32>,
    pub active: Option<u32>,
}

impl StationSnapshot {
    pub fn capture(station: &ChargingStation) -> Self {
        Self {
            id: station.id.as_u32(),
            cell: station.cell,
            charging_rate: station.charging_rate,
            queue: station.queued_robots().map(|r| r.as_u32()).collect(),
            active: station.active_robot().map(|r| r.as_u32()),
        }
    }
}

/// An adopted obstacle plus the replanned robot paths
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObstacleUpdate {
    pub obstacles: Vec<Cell>,
    pub robot_paths: Vec<RobotPath>,
}

/// A robot id with its current plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotPath {
    pub id: u32,
    pub path: Vec<Cell>,
}

impl ObstacleUpdate {
    pub(crate) fn capture(model: &Model) -> Self {
        let mut obstacles: Vec<Cell> = model.grid.obstacles().collect();
        obstacles.sort_by_key(|c| (c.x, c.y));
        Self {
            obstacles,
            robot_paths: model
                .robots
                .iter()
                .map(|r| RobotPath {
                    id: r.id.as_u32(),
                    path: r.path.clone(),
                })
                .collect(),
        }
    }
}

/// The complete world state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub grid_width: i32,
    pub grid_height: i32,
    pub tick: u64,
    pub robots: Vec<RobotSnapshot>,
    pub obstacles: Vec<Cell>,
    pub charging_stations: Vec<StationSnapshot>,
    pub active_packages: Vec<PackageSnapshot>,
    pub delivered_packages: Vec<PackageSnapshot>,
    pub all_reached_goal: bool,
    pub stats: AggregateStats,
}

impl StateSnapshot {
    pub(crate) fn capture(model: &Model) -> Self {
        let mut obstacles: Vec<Cell> = model.grid.obstacles().collect();
        obstacles.sort_by_key(|c| (c.x, c.y));

        let (active, delivered): (Vec<&Package>, Vec<&Package>) =
            model.packages.iter().partition(|p| !p.is_delivered());

        let n = model.robots.len();
        let stats = AggregateStats {
            ticks: model.tick.value(),
            total_steps_taken: model.robots.iter().map(|r| r.steps_taken).sum(),
            total_packages_delivered: delivered.len(),
            active_packages: active.len(),
            avg_battery_pct: if n == 0 {
                0.0
            } else {
                model.robots.iter().map(|r| r.battery.percentage()).sum::<f64>() / n as f64
            },
        };

        Self {
            grid_width: model.grid.width(),
            grid_height: model.grid.height(),
            tick: model.tick.value(),
            robots: model
                .robots
                .iter()
                .map(|r| RobotSnapshot::capture(model, r))
                .collect(),
            obstacles,
            charging_stations: model.stations.iter().map(StationSnapshot::capture).collect(),
            active_packages: active.into_iter().map(PackageSnapshot::capture).collect(),
            delivered_packages: delivered.into_iter().map(PackageSnapshot::capture).collect(),
            all_reached_goal: model.all_reached_goal(),
            stats,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::robot_spec;

    fn demo_model() -> Model {
        let mut model = Model::new(10, 10, 1).unwrap();
        model.add_charging_station(Cell::new(9, 9), 10.0).unwrap();
        model.add_obstacle(Cell::new(3, 3)).unwrap();
        let robot = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        let package = model
            .create_package(Cell::new(5, 0), Cell::new(5, 9))
            .unwrap();
        model.assign_package(package, robot).unwrap();
        model
    }

    #[test]
    fn test_state_snapshot_shape() {
        let model = demo_model();
        let state = model.state();
        assert_eq!(state.grid_width, 10);
        assert_eq!(state.robots.len(), 1);
        assert_eq!(state.obstacles, vec![Cell::new(3, 3)]);
        assert_eq!(state.charging_stations.len(), 1);
        assert_eq!(state.active_packages.len(), 1);
        assert!(state.delivered_packages.is_empty());
        let robot = &state.robots[0];
        assert_eq!(robot.id, 1);
        assert!(robot.carrying_package.is_some());
        assert_eq!(robot.battery_percentage, 100.0);
    }

    #[test]
    fn test_state_json_round_trip() {
        let model = demo_model();
        let json = model.state().to_json().unwrap();
        let back = StateSnapshot::from_json(&json).unwrap();
        assert_eq!(back.grid_width, 10);
        assert_eq!(back.robots.len(), 1);
        assert_eq!(back.active_packages[0].status, PackageStatus::Assigned);
    }

    #[test]
    fn test_step_delta_statuses() {
        let mut model = demo_model();
        let delta = model.step();
        assert_eq!(delta.tick, 1);
        assert_eq!(delta.robots.len(), 1);
        assert_eq!(delta.robots[0].status, "moving");
        assert!(!delta.all_reached_goal);
    }
}
