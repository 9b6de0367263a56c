//! The simulation model: owner of all entities and the global step
//!
//! Arena ownership: the model owns the grid, robots, stations, and packages;
//! robots are identified by stable ids and stepped by index in insertion
//! order. The command surface consumed by the transport wrapper lives here;
//! the external driver must serialize all calls through a single dispatcher.

use crate::charging::{self, SearchFlavor};
use crate::snapshot::{ObstacleUpdate, StateSnapshot, StepDelta};
use crate::stats::{StatsCollector, TickSample};
use crate::stepper;
use crate::trace::{EventTraceCollector, TraceDetails};
use crate::{arbitration, export};
use fleetgrid_config::{BatteryConfig, RobotSpec, ScenarioConfig};
use fleetgrid_core::{
    IdGenerator, PackageId, RobotId, SimError, SimResult, SimRng, StationId, Tick,
};
use fleetgrid_entities::{Battery, BatteryOptions, ChargingStation, Package, Robot};
use fleetgrid_map::{planner, Cell, Grid, Peer};

/// Container for all simulation state
pub struct Model {
    pub grid: Grid,
    pub robots: Vec<Robot>,
    pub stations: Vec<ChargingStation>,
    pub packages: Vec<Package>,
    pub rng: SimRng,
    pub tick: Tick,
    pub trace: EventTraceCollector,
    pub stats: StatsCollector,

    /// Dock cells that `create_packages` draws pickups from
    pub pickup_pool: Vec<Cell>,
    /// Shelf cells that `create_packages` draws deliveries from
    pub delivery_pool: Vec<Cell>,

    robot_ids: IdGenerator<RobotId>,
    package_ids: IdGenerator<PackageId>,
    station_ids: IdGenerator<StationId>,
}

impl Model {
    /// Create an empty model
    ///
    /// Non-positive dimensions are the one fatal misconfiguration: nothing
    /// downstream can recover from a degenerate grid.
    pub fn new(width: i32, height: i32, seed: u64) -> SimResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(SimError::Config(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            grid: Grid::new(width, height),
            robots: Vec::new(),
            stations: Vec::new(),
            packages: Vec::new(),
            rng: SimRng::new(seed),
            tick: Tick::ZERO,
            trace: EventTraceCollector::default(),
            stats: StatsCollector::new(),
            pickup_pool: Vec::new(),
            delivery_pool: Vec::new(),
            robot_ids: IdGenerator::starting_from(1),
            package_ids: IdGenerator::starting_from(1),
            station_ids: IdGenerator::starting_from(0),
        })
    }

    /// Build a model from a validated scenario
    pub fn from_scenario(config: &ScenarioConfig) -> SimResult<Self> {
        if let Err(errors) = fleetgrid_config::validate_scenario(config) {
            let joined = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SimError::Config(joined));
        }

        let mut model = Self::new(config.grid.width, config.grid.height, config.seed)?;

        for cell in &config.obstacles {
            model.grid.place_obstacle(*cell)?;
        }
        for station in &config.charging_stations {
            model.add_charging_station(station.cell, station.charging_rate)?;
        }
        for spec in &config.robots {
            model.add_robot(spec)?;
        }
        for package in &config.packages {
            model.create_package(package.pickup, package.delivery)?;
        }
        model.pickup_pool = config.package_pools.pickups.clone();
        model.delivery_pool = config.package_pools.deliveries.clone();

        Ok(model)
    }

    // === Command surface ===

    /// Add a robot at a start cell
    ///
    /// A non-idle robot gets an initial plan to its goal; if no path exists
    /// it stays idle rather than failing the add.
    pub fn add_robot(&mut self, spec: &RobotSpec) -> SimResult<RobotId> {
        let start = spec.start;
        let goal = spec.goal.unwrap_or(start);

        if !self.grid.is_inside(start) || !self.grid.is_inside(goal) {
            return Err(SimError::Validation(format!(
                "robot start {} or goal {} outside the grid",
                start, goal
            )));
        }
        if self.grid.has_obstacle(start) || self.grid.has_obstacle(goal) {
            return Err(SimError::placement(start.x, start.y, "start or goal on an obstacle"));
        }

        let id = self.robot_ids.next_id();
        self.grid.place_robot(id, start)?;

        let mut robot = Robot::new(id, start, goal, spec.color.clone(), battery_options(&spec.battery));
        robot.idle = spec.idle;
        if !spec.idle {
            if start == goal {
                robot.reached_goal = true;
                robot.set_path(vec![start]);
            } else {
                // Peers may be parked mid-route at creation time; pay the
                // penalized cost rather than refuse the robot a plan
                let peers = self.peers_of_all();
                let mut path = planner::plain(&self.grid, &peers, start, goal);
                if path.is_empty() {
                    path = planner::penalized(&self.grid, &peers, start, goal, 1);
                }
                if path.is_empty() {
                    robot.idle = true;
                } else {
                    robot.set_path(path);
                }
            }
        }
        self.robots.push(robot);
        Ok(id)
    }

    /// Place an obstacle and replan every in-flight robot
    ///
    /// If any replan fails the placement is rolled back and the world is
    /// left exactly as it was.
    pub fn add_obstacle(&mut self, cell: Cell) -> SimResult<ObstacleUpdate> {
        if !self.grid.is_inside(cell) {
            return Err(SimError::Validation(format!("cell {} outside the grid", cell)));
        }
        for robot in &self.robots {
            if cell == robot.home || cell == robot.goal {
                return Err(SimError::placement(cell.x, cell.y, "cell reserved by a robot"));
            }
        }
        if self.station_index_at(cell).is_some() {
            return Err(SimError::placement(cell.x, cell.y, "cell holds a charging station"));
        }
        self.grid.place_obstacle(cell)?;

        let mut replaced: Vec<(usize, Vec<Cell>)> = Vec::new();
        for idx in 0..self.robots.len() {
            let (pos, dest, in_flight) = {
                let r = &self.robots[idx];
                let dest = match r.target_station.and_then(|sid| self.station(sid)) {
                    Some(station) => station.cell,
                    None => r.goal,
                };
                (r.pos, dest, r.path.len() > 1 && !r.reached_goal)
            };
            if !in_flight {
                continue;
            }
            let peers = self.peers_excluding(idx);
            let path = planner::plain(&self.grid, &peers, pos, dest);
            if path.is_empty() {
                // Roll back: the add must not strand an active robot
                self.grid.remove_obstacle(cell);
                for (i, old) in replaced {
                    self.robots[i].set_path(old);
                }
                return Err(SimError::UnreachableGoal {
                    from_x: pos.x,
                    from_y: pos.y,
                    to_x: dest.x,
                    to_y: dest.y,
                });
            }
            let old = std::mem::take(&mut self.robots[idx].path);
            replaced.push((idx, old));
            self.robots[idx].set_path(path);
        }

        Ok(ObstacleUpdate::capture(self))
    }

    /// Add a charging station; stations never force replans
    pub fn add_charging_station(&mut self, cell: Cell, charging_rate: f64) -> SimResult<StationId> {
        if !self.grid.is_inside(cell) {
            return Err(SimError::Validation(format!("cell {} outside the grid", cell)));
        }
        if self.grid.has_obstacle(cell) {
            return Err(SimError::placement(cell.x, cell.y, "cell holds an obstacle"));
        }
        if self.station_index_at(cell).is_some() {
            return Err(SimError::placement(cell.x, cell.y, "station already present"));
        }
        let id = self.station_ids.next_id();
        self.stations.push(ChargingStation::new(id, cell, charging_rate));
        Ok(id)
    }

    /// Re-target a robot; on failure the prior goal and plan are kept
    pub fn change_goal(&mut self, robot: RobotId, goal: Cell) -> SimResult<Vec<Cell>> {
        if !self.grid.is_inside(goal) {
            return Err(SimError::Validation(format!("goal {} outside the grid", goal)));
        }
        if self.grid.has_obstacle(goal) {
            return Err(SimError::placement(goal.x, goal.y, "goal is an obstacle"));
        }
        let idx = self
            .robot_index(robot)
            .ok_or_else(|| SimError::robot_not_found(robot.as_u32()))?;

        let pos = self.robots[idx].pos;
        let peers = self.peers_excluding(idx);
        let path = planner::plain(&self.grid, &peers, pos, goal);
        if path.is_empty() {
            return Err(SimError::UnreachableGoal {
                from_x: pos.x,
                from_y: pos.y,
                to_x: goal.x,
                to_y: goal.y,
            });
        }

        let r = &mut self.robots[idx];
        r.goal = goal;
        r.reached_goal = pos == goal;
        r.returning_to_task = false;
        r.idle = false;
        r.set_path(path.clone());
        Ok(path)
    }

    /// Create a package with explicit pickup and delivery cells
    pub fn create_package(&mut self, pickup: Cell, delivery: Cell) -> SimResult<PackageId> {
        for (name, cell) in [("pickup", pickup), ("delivery", delivery)] {
            if !self.grid.is_inside(cell) {
                return Err(SimError::Validation(format!("{} {} outside the grid", name, cell)));
            }
            if self.grid.has_obstacle(cell) {
                return Err(SimError::placement(cell.x, cell.y, "package cell on an obstacle"));
            }
        }
        let id = self.package_ids.next_id();
        self.packages.push(Package::new(id, pickup, delivery));
        Ok(id)
    }

    /// Create `count` packages drawn from the configured dock/shelf pools
    pub fn create_packages(&mut self, count: usize) -> SimResult<Vec<PackageId>> {
        if self.pickup_pool.is_empty() || self.delivery_pool.is_empty() {
            return Err(SimError::Validation(
                "package pools are empty; configure package_pools first".to_string(),
            ));
        }
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let pickup = *self.rng.choose(&self.pickup_pool).expect("pool checked non-empty");
            let delivery = *self.rng.choose(&self.delivery_pool).expect("pool checked non-empty");
            ids.push(self.create_package(pickup, delivery)?);
        }
        Ok(ids)
    }

    /// Assign a waiting package to an available robot and route it to pickup
    pub fn assign_package(&mut self, package: PackageId, robot: RobotId) -> SimResult<()> {
        let pidx = self
            .package_index(package)
            .ok_or_else(|| SimError::package_not_found(package.as_u32()))?;
        let ridx = self
            .robot_index(robot)
            .ok_or_else(|| SimError::robot_not_found(robot.as_u32()))?;

        if !self.packages[pidx].is_waiting() {
            return Err(SimError::InvalidAssignment(format!(
                "package {} is not waiting",
                package
            )));
        }
        {
            let r = &self.robots[ridx];
            if r.charging || !r.is_available() {
                return Err(SimError::InvalidAssignment(format!(
                    "robot {} is not available",
                    robot
                )));
            }
        }

        let pickup = self.packages[pidx].pickup;
        let pos = self.robots[ridx].pos;
        let peers = self.peers_excluding(ridx);
        let path = planner::plain(&self.grid, &peers, pos, pickup);
        if path.is_empty() {
            return Err(SimError::UnreachableGoal {
                from_x: pos.x,
                from_y: pos.y,
                to_x: pickup.x,
                to_y: pickup.y,
            });
        }

        self.packages[pidx].assign(robot);
        let r = &mut self.robots[ridx];
        r.carrying_package = Some(package);
        r.package_destination = Some(pickup);
        r.goal = pickup;
        r.reached_goal = false;
        r.returning_to_task = false;
        r.idle = false;
        r.set_path(path);

        self.trace.record(
            self.tick,
            TraceDetails::PackageAssigned {
                package_id: package.as_u32(),
                robot_id: robot.as_u32(),
            },
        );
        Ok(())
    }

    /// Advance the simulation one tick
    ///
    /// Health sweep, stats sample, robot steps in insertion order, then
    /// auto-assignment; recoverable anomalies never escape this boundary.
    pub fn step(&mut self) -> StepDelta {
        self.tick.advance();
        self.health_sweep();
        self.collect_sample();
        for idx in 0..self.robots.len() {
            stepper::step_robot(self, idx);
        }
        self.auto_assign();
        StepDelta::capture(self)
    }

    /// Full state snapshot for observers
    pub fn state(&self) -> StateSnapshot {
        StateSnapshot::capture(self)
    }

    /// Snapshot of a single robot, as returned to `add_robot` callers
    pub fn robot_snapshot(&self, id: RobotId) -> Option<crate::snapshot::RobotSnapshot> {
        self.robot(id)
            .map(|r| crate::snapshot::RobotSnapshot::capture(self, r))
    }

    /// Remaining-path export in the two-lines-per-robot text format
    pub fn export_path_coordinates(&self) -> String {
        export::export_path_coordinates(self)
    }

    // === Periodic health check ===

    fn health_sweep(&mut self) {
        for idx in 0..self.robots.len() {
            let (low, stuck) = {
                let r = &self.robots[idx];
                let low = r.battery.percentage() < 15.0
                    && !r.battery.is_empty()
                    && !r.charging
                    && !r.heading_to_station()
                    && !self.stations.is_empty();
                (low, r.position_unchanged_count > 10)
            };
            if low && charging::divert_to_station(self, idx, SearchFlavor::Emergency, None) {
                let r = &mut self.robots[idx];
                r.critical_battery = true;
                r.idle = false;
                let station_id = r.target_station.map(|s| s.as_u32()).unwrap_or(0);
                let robot_id = r.id.as_u32();
                self.trace.record(
                    self.tick,
                    TraceDetails::EmergencyReroute {
                        robot_id,
                        station_id,
                    },
                );
            }
            if stuck {
                arbitration::alternative_route(self, idx);
                self.robots[idx].priority += 5;
            }
        }
    }

    fn collect_sample(&mut self) {
        let n = self.robots.len();
        let sample = TickSample {
            tick: self.tick.value(),
            avg_steps_taken: if n == 0 {
                0.0
            } else {
                self.robots.iter().map(|r| r.steps_taken as f64).sum::<f64>() / n as f64
            },
            robots_at_goal: self.robots.iter().filter(|r| r.reached_goal).count(),
            avg_battery_pct: if n == 0 {
                0.0
            } else {
                self.robots.iter().map(|r| r.battery.percentage()).sum::<f64>() / n as f64
            },
            packages_delivered: self.packages.iter().filter(|p| p.is_delivered()).count(),
        };
        self.stats.push(sample);
    }

    /// Greedy pairing of waiting packages to idle robots, run after all
    /// robot steps so it cannot disturb in-flight plans within the tick
    fn auto_assign(&mut self) {
        let waiting: Vec<PackageId> = self
            .packages
            .iter()
            .filter(|p| p.is_waiting())
            .map(|p| p.id)
            .collect();
        for package in waiting {
            let candidates: Vec<RobotId> = self
                .robots
                .iter()
                .filter(|r| r.is_available() && !r.charging)
                .map(|r| r.id)
                .collect();
            for robot in candidates {
                if self.assign_package(package, robot).is_ok() {
                    break;
                }
            }
        }
    }

    // === Lookups and shared helpers ===

    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.iter().find(|r| r.id == id)
    }

    pub fn robot_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.iter_mut().find(|r| r.id == id)
    }

    pub(crate) fn robot_index(&self, id: RobotId) -> Option<usize> {
        self.robots.iter().position(|r| r.id == id)
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }

    pub(crate) fn package_index(&self, id: PackageId) -> Option<usize> {
        self.packages.iter().position(|p| p.id == id)
    }

    pub fn station(&self, id: StationId) -> Option<&ChargingStation> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn station_mut(&mut self, id: StationId) -> Option<&mut ChargingStation> {
        self.stations.iter_mut().find(|s| s.id == id)
    }

    /// The station whose pad is at the given cell, if any
    pub fn station_at(&self, cell: Cell) -> Option<&ChargingStation> {
        self.stations.iter().find(|s| s.cell == cell)
    }

    pub(crate) fn station_index_at(&self, cell: Cell) -> Option<usize> {
        self.stations.iter().position(|s| s.cell == cell)
    }

    /// Planner view of every robot except the one at `idx`
    pub(crate) fn peers_excluding(&self, idx: usize) -> Vec<Peer> {
        self.robots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, r)| Peer {
                cell: r.pos,
                goal: r.goal,
            })
            .collect()
    }

    fn peers_of_all(&self) -> Vec<Peer> {
        self.robots
            .iter()
            .map(|r| Peer {
                cell: r.pos,
                goal: r.goal,
            })
            .collect()
    }

    /// Drop a robot from every station queue and slot; keeps the one-station
    /// membership invariant before any new enqueue
    pub(crate) fn dequeue_everywhere(&mut self, robot: RobotId) {
        for station in &mut self.stations {
            station.dequeue(robot);
        }
    }

    /// Whether every robot has reached its goal (idle robots count)
    pub fn all_reached_goal(&self) -> bool {
        self.robots.iter().all(|r| r.reached_goal || r.idle)
    }
}

fn battery_options(config: &BatteryConfig) -> BatteryOptions {
    BatteryOptions {
        max: config.max,
        level: config.level.unwrap_or(config.max),
        drain_rate: config.drain_rate,
        energy_saving_rate: config.energy_saving_rate.unwrap_or(config.drain_rate / 2.0),
        low_threshold_pct: config.low_threshold_pct,
        critical_threshold_pct: config.critical_threshold_pct,
        emergency_threshold_pct: config.emergency_threshold_pct,
    }
}

/// Build a [`Battery`] directly from a config block
pub fn battery_from_config(config: &BatteryConfig) -> Battery {
    Battery::new(battery_options(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::robot_spec;
    use fleetgrid_config::GridConfig;

    fn empty_model(width: i32, height: i32) -> Model {
        Model::new(width, height, 42).unwrap()
    }

    #[test]
    fn test_zero_dimensions_fatal() {
        assert!(Model::new(0, 10, 1).is_err());
        assert!(Model::new(10, -1, 1).is_err());
    }

    #[test]
    fn test_add_robot_assigns_sequential_ids() {
        let mut model = empty_model(10, 10);
        let a = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        let b = model.add_robot(&robot_spec(Cell::new(1, 0), None, true)).unwrap();
        assert_eq!(a, RobotId(1));
        assert_eq!(b, RobotId(2));
        assert_eq!(model.grid.robot_at(Cell::new(0, 0)), Some(a));
    }

    #[test]
    fn test_add_robot_on_occupied_cell_fails() {
        let mut model = empty_model(10, 10);
        model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        assert!(model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).is_err());
    }

    #[test]
    fn test_tasked_robot_gets_initial_plan() {
        let mut model = empty_model(10, 10);
        let id = model
            .add_robot(&robot_spec(Cell::new(0, 0), Some(Cell::new(5, 0)), false))
            .unwrap();
        let robot = model.robot(id).unwrap();
        assert!(!robot.idle);
        assert_eq!(robot.path.len(), 6);
        assert_eq!(robot.path[0], Cell::new(0, 0));
    }

    #[test]
    fn test_obstacle_rejected_on_home_goal_station() {
        let mut model = empty_model(10, 10);
        model
            .add_robot(&robot_spec(Cell::new(0, 0), Some(Cell::new(5, 0)), false))
            .unwrap();
        model.add_charging_station(Cell::new(9, 9), 10.0).unwrap();
        assert!(model.add_obstacle(Cell::new(0, 0)).is_err());
        assert!(model.add_obstacle(Cell::new(5, 0)).is_err());
        assert!(model.add_obstacle(Cell::new(9, 9)).is_err());
        assert!(model.add_obstacle(Cell::new(3, 3)).is_ok());
    }

    #[test]
    fn test_obstacle_add_replans_in_flight_robot() {
        let mut model = empty_model(10, 10);
        let id = model
            .add_robot(&robot_spec(Cell::new(0, 5), Some(Cell::new(9, 5)), false))
            .unwrap();
        let update = model.add_obstacle(Cell::new(4, 5)).unwrap();
        assert!(update.obstacles.contains(&Cell::new(4, 5)));
        let robot = model.robot(id).unwrap();
        assert!(!robot.path.contains(&Cell::new(4, 5)));
        assert_eq!(*robot.path.last().unwrap(), Cell::new(9, 5));
    }

    #[test]
    fn test_obstacle_add_rolls_back_when_stranding() {
        let mut model = empty_model(3, 1);
        let id = model
            .add_robot(&robot_spec(Cell::new(0, 0), Some(Cell::new(2, 0)), false))
            .unwrap();
        let before = model.robot(id).unwrap().path.clone();
        // The only corridor cell: placing it would strand the robot
        let err = model.add_obstacle(Cell::new(1, 0)).unwrap_err();
        assert!(matches!(err, SimError::UnreachableGoal { .. }));
        assert!(!model.grid.has_obstacle(Cell::new(1, 0)));
        assert_eq!(model.robot(id).unwrap().path, before);
    }

    #[test]
    fn test_change_goal_keeps_prior_plan_on_failure() {
        let mut model = empty_model(5, 5);
        let id = model
            .add_robot(&robot_spec(Cell::new(0, 0), Some(Cell::new(4, 0)), false))
            .unwrap();
        model.add_obstacle(Cell::new(2, 2)).unwrap();
        let before_path = model.robot(id).unwrap().path.clone();
        let err = model.change_goal(id, Cell::new(2, 2)).unwrap_err();
        assert!(matches!(err, SimError::PlacementConflict { .. }));
        let robot = model.robot(id).unwrap();
        assert_eq!(robot.goal, Cell::new(4, 0));
        assert_eq!(robot.path, before_path);
    }

    #[test]
    fn test_change_goal_activates_idle_robot() {
        let mut model = empty_model(5, 5);
        let id = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        let path = model.change_goal(id, Cell::new(4, 4)).unwrap();
        assert_eq!(path.len(), 9);
        assert!(!model.robot(id).unwrap().idle);
    }

    #[test]
    fn test_assign_package_validation() {
        let mut model = empty_model(10, 10);
        let robot = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        let package = model
            .create_package(Cell::new(5, 0), Cell::new(5, 9))
            .unwrap();

        assert!(model.assign_package(package, robot).is_ok());
        // Re-assigning an assigned package fails
        assert!(matches!(
            model.assign_package(package, robot),
            Err(SimError::InvalidAssignment(_))
        ));
        // A busy robot cannot take another package
        let other = model
            .create_package(Cell::new(1, 1), Cell::new(2, 2))
            .unwrap();
        assert!(model.assign_package(other, robot).is_err());
    }

    #[test]
    fn test_assign_package_no_state_change_on_unreachable() {
        let mut model = empty_model(5, 1);
        let robot = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        let package = model
            .create_package(Cell::new(4, 0), Cell::new(0, 0))
            .unwrap();
        model.add_obstacle(Cell::new(2, 0)).unwrap();
        assert!(matches!(
            model.assign_package(package, robot),
            Err(SimError::UnreachableGoal { .. })
        ));
        assert!(model.package(package).unwrap().is_waiting());
        assert!(model.robot(robot).unwrap().idle);
    }

    #[test]
    fn test_create_packages_draws_from_pools() {
        let mut model = empty_model(10, 10);
        assert!(model.create_packages(1).is_err());
        model.pickup_pool = vec![Cell::new(0, 9), Cell::new(1, 9)];
        model.delivery_pool = vec![Cell::new(9, 0)];
        let ids = model.create_packages(3).unwrap();
        assert_eq!(ids, vec![PackageId(1), PackageId(2), PackageId(3)]);
        for id in ids {
            let p = model.package(id).unwrap();
            assert!(model.pickup_pool.contains(&p.pickup));
            assert_eq!(p.delivery, Cell::new(9, 0));
        }
    }

    #[test]
    fn test_auto_assignment_after_step() {
        let mut model = empty_model(10, 10);
        let robot = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        let package = model
            .create_package(Cell::new(5, 0), Cell::new(5, 9))
            .unwrap();
        model.step();
        let r = model.robot(robot).unwrap();
        assert!(!r.idle);
        assert_eq!(r.carrying_package, Some(package));
        assert_eq!(model.package(package).unwrap().assigned_robot, Some(robot));
    }

    #[test]
    fn test_from_scenario_rejects_invalid() {
        let config = ScenarioConfig {
            seed: 1,
            grid: GridConfig {
                width: -2,
                height: 5,
            },
            run: Default::default(),
            robots: vec![],
            charging_stations: vec![],
            obstacles: vec![],
            packages: vec![],
            package_pools: Default::default(),
        };
        assert!(matches!(Model::from_scenario(&config), Err(SimError::Config(_))));
    }

    #[test]
    fn test_station_duplicate_rejected() {
        let mut model = empty_model(10, 10);
        model.add_charging_station(Cell::new(5, 5), 10.0).unwrap();
        assert!(model.add_charging_station(Cell::new(5, 5), 10.0).is_err());
    }
}
