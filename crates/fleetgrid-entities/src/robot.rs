//! Robot entity: per-agent state for the step machine

use fleetgrid_core::{PackageId, RobotId, StationId};
use fleetgrid_map::Cell;
use std::collections::VecDeque;

/// How many recent alternative plans a robot remembers
pub const ALTERNATIVE_PATH_HISTORY: usize = 3;

/// Ticks a robot suppresses battery checks after leaving a station
pub const CHARGE_COOLDOWN_TICKS: u32 = 5;

/// Battery configuration knobs, all optional in scenario files
#[derive(Clone, Copy, Debug)]
pub struct BatteryOptions {
    pub max: f64,
    pub level: f64,
    pub drain_rate: f64,
    pub energy_saving_rate: f64,
    pub low_threshold_pct: f64,
    pub critical_threshold_pct: f64,
    pub emergency_threshold_pct: f64,
}

impl Default for BatteryOptions {
    fn default() -> Self {
        Self {
            max: 100.0,
            level: 100.0,
            drain_rate: 1.0,
            energy_saving_rate: 0.5,
            low_threshold_pct: 30.0,
            critical_threshold_pct: 20.0,
            emergency_threshold_pct: 10.0,
        }
    }
}

/// Battery state for a robot
#[derive(Clone, Debug)]
pub struct Battery {
    /// Current charge in battery units
    pub level: f64,
    /// Capacity in battery units
    pub max: f64,
    /// Units consumed per tick of movement
    pub drain_rate: f64,
    /// Reduced drain rate engaged below the critical threshold
    pub energy_saving_rate: f64,
    /// Percentage below which the robot starts looking for a station
    pub low_threshold_pct: f64,
    /// Percentage below which energy-saving mode engages
    pub critical_threshold_pct: f64,
    /// Percentage at or below which the emergency override fires
    pub emergency_threshold_pct: f64,
}

impl Battery {
    pub fn new(options: BatteryOptions) -> Self {
        let max = options.max.max(0.0);
        Self {
            level: options.level.clamp(0.0, max),
            max,
            drain_rate: options.drain_rate,
            energy_saving_rate: options.energy_saving_rate,
            low_threshold_pct: options.low_threshold_pct,
            critical_threshold_pct: options.critical_threshold_pct,
            emergency_threshold_pct: options.emergency_threshold_pct,
        }
    }

    /// Charge level as a percentage of capacity
    pub fn percentage(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.level / self.max * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.level <= 0.0
    }

    pub fn is_low(&self) -> bool {
        self.percentage() <= self.low_threshold_pct
    }

    pub fn is_critical(&self) -> bool {
        self.percentage() < self.critical_threshold_pct
    }

    pub fn is_emergency(&self) -> bool {
        self.percentage() <= self.emergency_threshold_pct
    }

    /// The drain applied per moving tick, honoring energy-saving mode
    pub fn current_drain_rate(&self) -> f64 {
        if self.is_critical() {
            self.energy_saving_rate
        } else {
            self.drain_rate
        }
    }

    /// Consume one tick's worth of charge; returns false when the battery
    /// hits zero and the robot must halt
    pub fn drain(&mut self) -> bool {
        self.level = (self.level - self.current_drain_rate()).max(0.0);
        !self.is_empty()
    }

    /// Add charge, clamped at capacity
    pub fn charge(&mut self, amount: f64) {
        self.level = (self.level + amount).min(self.max);
    }

    /// Whether the level covers traveling `cells` grid cells with a 10% margin
    pub fn can_reach(&self, cells: u32) -> bool {
        self.level >= 1.1 * cells as f64 * self.drain_rate
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::new(BatteryOptions::default())
    }
}

/// A robot in the warehouse
///
/// Pure state; the step machine that drives it lives in the engine crate,
/// which looks peers up through the model rather than through references
/// held here.
#[derive(Clone, Debug)]
pub struct Robot {
    pub id: RobotId,
    pub color: String,
    /// The cell the robot occupied on creation
    pub home: Cell,
    pub pos: Cell,
    pub goal: Cell,
    /// Planned path; starts at `pos` when non-empty, empty means no plan
    pub path: Vec<Cell>,
    pub battery: Battery,

    // Behavioral flags
    pub idle: bool,
    pub charging: bool,
    pub waiting_for_charge: bool,
    pub target_station: Option<StationId>,
    pub critical_battery: bool,
    pub emergency_route: bool,
    pub just_charged: bool,
    pub charge_cooldown: u32,
    pub returning_to_task: bool,

    // Task state
    pub carrying_package: Option<PackageId>,
    pub package_destination: Option<Cell>,

    // Arbitration state
    pub priority: i32,
    pub blocked_count: u32,
    pub position_unchanged_count: u32,
    pub waiting_time: u32,
    pub alternative_paths_tried: VecDeque<Vec<Cell>>,

    // Statistics
    pub steps_taken: u64,
    pub total_packages_delivered: u32,
    pub reached_goal: bool,
}

impl Robot {
    pub fn new(id: RobotId, start: Cell, goal: Cell, color: impl Into<String>, battery: BatteryOptions) -> Self {
        Self {
            id,
            color: color.into(),
            home: start,
            pos: start,
            goal,
            path: Vec::new(),
            battery: Battery::new(battery),
            idle: true,
            charging: false,
            waiting_for_charge: false,
            target_station: None,
            critical_battery: false,
            emergency_route: false,
            just_charged: false,
            charge_cooldown: 0,
            returning_to_task: false,
            carrying_package: None,
            package_destination: None,
            priority: 1,
            blocked_count: 0,
            position_unchanged_count: 0,
            waiting_time: 0,
            alternative_paths_tried: VecDeque::new(),
            steps_taken: 0,
            total_packages_delivered: 0,
            reached_goal: false,
        }
    }

    /// Whether the robot can take a new package assignment
    pub fn is_available(&self) -> bool {
        self.idle
            && self.carrying_package.is_none()
            && !self.charging
            && !self.battery.is_empty()
    }

    /// Whether the robot is en route to or waiting at a charging station
    pub fn heading_to_station(&self) -> bool {
        self.waiting_for_charge || self.target_station.is_some()
    }

    /// Steps remaining on the current plan
    pub fn steps_left(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Install a new plan; an empty path clears the plan
    pub fn set_path(&mut self, path: Vec<Cell>) {
        self.path = path;
    }

    /// Next cell the robot intends to enter, if it has somewhere to go
    pub fn next_cell(&self) -> Option<Cell> {
        (self.path.len() >= 2).then(|| self.path[1])
    }

    /// Record an accepted alternative plan, bounded to the recent few
    pub fn remember_alternative(&mut self, path: Vec<Cell>) {
        if self.alternative_paths_tried.len() >= ALTERNATIVE_PATH_HISTORY {
            self.alternative_paths_tried.pop_front();
        }
        self.alternative_paths_tried.push_back(path);
    }

    /// Whether a candidate plan repeats the current plan or a recent proposal
    pub fn has_tried(&self, candidate: &[Cell]) -> bool {
        if candidate == self.path.as_slice() {
            return true;
        }
        self.alternative_paths_tried
            .iter()
            .any(|p| p.as_slice() == candidate)
    }

    /// Drop charge-seeking state (station targeting and queue intent)
    pub fn clear_charge_state(&mut self) {
        self.charging = false;
        self.waiting_for_charge = false;
        self.target_station = None;
    }

    /// Drop the current task without touching the package itself
    pub fn clear_task(&mut self) {
        self.carrying_package = None;
        self.package_destination = None;
    }

    /// Zero the deadlock counters after successful progress
    pub fn reset_block_counters(&mut self) {
        self.blocked_count = 0;
        self.waiting_time = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_robot() -> Robot {
        Robot::new(
            RobotId(1),
            Cell::new(0, 0),
            Cell::new(5, 5),
            "red",
            BatteryOptions::default(),
        )
    }

    #[test]
    fn test_battery_percentage_and_thresholds() {
        let mut b = Battery::default();
        assert_eq!(b.percentage(), 100.0);
        b.level = 25.0;
        assert!(b.is_low());
        assert!(!b.is_critical());
        b.level = 15.0;
        assert!(b.is_critical());
        assert!(!b.is_emergency());
        b.level = 10.0;
        assert!(b.is_emergency());
    }

    #[test]
    fn test_energy_saving_drain() {
        let mut b = Battery::default();
        b.level = 30.0;
        assert!(b.drain());
        assert_eq!(b.level, 29.0);
        b.level = 19.0;
        assert!(b.drain());
        assert_eq!(b.level, 18.5);
    }

    #[test]
    fn test_drain_to_empty_halts() {
        let mut b = Battery::new(BatteryOptions {
            level: 0.4,
            ..BatteryOptions::default()
        });
        assert!(!b.drain());
        assert_eq!(b.level, 0.0);
        assert!(b.is_empty());
    }

    #[test]
    fn test_charge_clamped_at_capacity() {
        let mut b = Battery::default();
        b.level = 90.0;
        b.charge(25.0);
        assert_eq!(b.level, 100.0);
    }

    #[test]
    fn test_can_reach_margin() {
        let b = Battery::new(BatteryOptions {
            level: 30.0,
            ..BatteryOptions::default()
        });
        assert!(b.can_reach(27));
        assert!(!b.can_reach(28));
    }

    #[test]
    fn test_alternative_path_history_bounded() {
        let mut r = make_robot();
        for i in 0..5 {
            r.remember_alternative(vec![Cell::new(i, 0)]);
        }
        assert_eq!(r.alternative_paths_tried.len(), ALTERNATIVE_PATH_HISTORY);
        assert!(!r.has_tried(&[Cell::new(0, 0)]));
        assert!(r.has_tried(&[Cell::new(4, 0)]));
    }

    #[test]
    fn test_has_tried_matches_current_path() {
        let mut r = make_robot();
        r.set_path(vec![Cell::new(0, 0), Cell::new(1, 0)]);
        assert!(r.has_tried(&[Cell::new(0, 0), Cell::new(1, 0)]));
    }

    #[test]
    fn test_availability() {
        let mut r = make_robot();
        assert!(r.is_available());
        r.carrying_package = Some(PackageId(1));
        assert!(!r.is_available());
        r.carrying_package = None;
        r.battery.level = 0.0;
        assert!(!r.is_available());
    }
}
