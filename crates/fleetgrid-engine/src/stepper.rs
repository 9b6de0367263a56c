//! The per-robot step machine
//!
//! Each tick the robot runs a flat sequence of guarded stages; the first
//! stage that fires owns the tick. The consistency sweep and the cooldown
//! accounting are the two non-consuming exceptions. Deadlock accounting
//! wraps the stages: a tick that wanted motion but produced none bumps the
//! stuck counter and climbs the escalation ladder (priority bump, forced
//! route diversification, full reset).

use crate::arbitration;
use crate::charging::{self, SearchFlavor};
use crate::model::Model;
use crate::trace::TraceDetails;
use fleetgrid_entities::robot::CHARGE_COOLDOWN_TICKS;
use fleetgrid_entities::PackageStatus;
use fleetgrid_map::{planner, Cell};

/// Priority a robot is raised to under the emergency override
const EMERGENCY_PRIORITY: i32 = 20;

/// Battery fraction at which a charge completes
const CHARGE_TARGET: f64 = 0.95;

/// What a robot's tick amounted to; drives the deadlock accounting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    Idle,
    Repaired,
    EmergencyRerouted,
    TaskAction,
    QueueWait,
    StartedCharging,
    AtGoal,
    Charging,
    ChargeComplete,
    Diverted,
    Moved,
    Blocked,
    Rerouted,
    NoPlan,
    Halted,
}

impl StepOutcome {
    /// Ticks where the robot wanted to move and could not
    fn is_stuck(self) -> bool {
        matches!(
            self,
            StepOutcome::Blocked | StepOutcome::Rerouted | StepOutcome::NoPlan | StepOutcome::Halted
        )
    }
}

pub(crate) fn step_robot(model: &mut Model, idx: usize) {
    let outcome = run_stages(model, idx);
    account_progress(model, idx, outcome);
}

fn run_stages(model: &mut Model, idx: usize) -> StepOutcome {
    // Inconsistency repair: charging flag with no pad underneath
    let bad_charge_state = {
        let r = &model.robots[idx];
        r.charging && model.station_at(r.pos).is_none()
    };
    if bad_charge_state {
        let id = model.robots[idx].id;
        model.dequeue_everywhere(id);
        let pct = {
            let r = &mut model.robots[idx];
            r.clear_charge_state();
            r.battery.percentage()
        };
        model.trace.record(
            model.tick,
            TraceDetails::SelfRepair {
                robot_id: id.as_u32(),
            },
        );
        if pct < 40.0 {
            charging::divert_to_station(model, idx, SearchFlavor::Ranked, None);
        }
        return StepOutcome::Repaired;
    }

    // Emergency override: fires once per episode, not while an emergency
    // route to a station is already in force
    let emergency_due = {
        let r = &model.robots[idx];
        r.battery.is_emergency()
            && !r.battery.is_empty()
            && !r.charging
            && !r.emergency_route
            && !model.stations.is_empty()
            && !r
                .target_station
                .and_then(|sid| model.station(sid))
                .is_some_and(|s| s.cell == r.pos)
    };
    if emergency_due {
        emergency_override(model, idx);
        return StepOutcome::EmergencyRerouted;
    }

    if model.robots[idx].idle {
        return StepOutcome::Idle;
    }

    // State consistency sweep (does not consume the tick)
    {
        let r = &mut model.robots[idx];
        if r.path.is_empty() || r.path[0] != r.pos {
            r.path = vec![r.pos];
        }
        if r.charging && r.waiting_for_charge {
            r.waiting_for_charge = false;
        }
        if r.battery.percentage() > 15.0 {
            r.critical_battery = false;
            r.emergency_route = false;
        }
    }

    // Standing on the package destination at tick entry
    {
        let r = &model.robots[idx];
        if r.carrying_package.is_some() && r.package_destination == Some(r.pos) {
            perform_package_action(model, idx);
            return StepOutcome::TaskAction;
        }
    }

    // Waiting for charge while standing on the target pad
    let on_target_pad = {
        let r = &model.robots[idx];
        r.waiting_for_charge
            && r.target_station
                .and_then(|sid| model.station(sid))
                .is_some_and(|s| s.cell == r.pos)
    };
    if on_target_pad {
        let id = model.robots[idx].id;
        let Some(sid) = model.robots[idx].target_station else {
            return StepOutcome::QueueWait;
        };
        let Some(station) = model.station_mut(sid) else {
            return StepOutcome::QueueWait;
        };
        if station.is_next_in_queue(id) {
            station.start_charging(id);
            let r = &mut model.robots[idx];
            r.charging = true;
            r.waiting_for_charge = false;
            model.trace.record(
                model.tick,
                TraceDetails::ChargingStart {
                    robot_id: id.as_u32(),
                    station_id: sid.as_u32(),
                },
            );
            return StepOutcome::StartedCharging;
        }
        if !station.in_queue(id) {
            station.enqueue(id);
        }
        return StepOutcome::QueueWait;
    }

    // Final goal reached with no ongoing task
    {
        let r = &model.robots[idx];
        if r.reached_goal && r.carrying_package.is_none() && !r.charging && !r.waiting_for_charge {
            return StepOutcome::AtGoal;
        }
    }

    // Charging at a station
    if model.robots[idx].charging {
        return charge_tick(model, idx);
    }

    // Post-charge cooldown accounting (does not consume the tick)
    {
        let r = &mut model.robots[idx];
        if r.just_charged {
            r.charge_cooldown += 1;
            if r.charge_cooldown >= CHARGE_COOLDOWN_TICKS {
                r.just_charged = false;
                r.charge_cooldown = 0;
            }
        }
    }

    // Battery-sufficiency gate
    {
        let r = &model.robots[idx];
        let gate_applies = !r.just_charged && !r.heading_to_station();
        if gate_applies
            && !charging::plan_is_feasible(model, idx)
            && charging::divert_to_station(model, idx, SearchFlavor::Ranked, None)
        {
            return StepOutcome::Diverted;
        }
    }

    // Drain and move
    if model.robots[idx].path.len() < 2 {
        return StepOutcome::NoPlan;
    }
    {
        let r = &mut model.robots[idx];
        if r.battery.is_empty() {
            return StepOutcome::Halted;
        }
        if !r.battery.drain() {
            let robot_id = r.id.as_u32();
            model
                .trace
                .record(model.tick, TraceDetails::BatteryExhausted { robot_id });
            return StepOutcome::Halted;
        }
    }

    let next = model.robots[idx].path[1];
    if let Some(peer) = model.grid.robot_at(next) {
        let wins = arbitration::wins_right_of_way(model, idx, peer);
        if wins && model.robots[idx].blocked_count < 3 {
            let r = &mut model.robots[idx];
            r.blocked_count += 1;
            r.waiting_time += 1;
            return StepOutcome::Blocked;
        }
        arbitration::alternative_route(model, idx);
        return StepOutcome::Rerouted;
    }

    if commit_move(model, idx, next) {
        StepOutcome::Moved
    } else {
        StepOutcome::Blocked
    }
}

fn emergency_override(model: &mut Model, idx: usize) {
    // Nearest station by distance only; the override is past caring about
    // queue lengths
    let pos = model.robots[idx].pos;
    let Some((sid, cell)) = model
        .stations
        .iter()
        .map(|s| (s.id, s.cell))
        .min_by_key(|(id, cell)| (pos.manhattan(*cell), *id))
    else {
        return;
    };

    {
        let r = &mut model.robots[idx];
        r.priority = EMERGENCY_PRIORITY;
        r.critical_battery = true;
        r.emergency_route = true;
        r.idle = false;
    }

    let path = planner::emergency(&model.grid, pos, cell);
    if !path.is_empty() {
        let id = model.robots[idx].id;
        model.dequeue_everywhere(id);
        if let Some(station) = model.station_mut(sid) {
            station.enqueue(id);
        }
        let r = &mut model.robots[idx];
        r.set_path(path);
        r.waiting_for_charge = true;
        r.target_station = Some(sid);
        r.reached_goal = false;
    }

    let robot_id = model.robots[idx].id.as_u32();
    model.trace.record(
        model.tick,
        TraceDetails::EmergencyReroute {
            robot_id,
            station_id: sid.as_u32(),
        },
    );
}

/// One tick on the charging pad; at ≥95% the robot releases the slot,
/// replans to its task destination, and tries to step off immediately
fn charge_tick(model: &mut Model, idx: usize) -> StepOutcome {
    let pos = model.robots[idx].pos;
    let Some(station_idx) = model.station_index_at(pos) else {
        // Repaired next tick by the inconsistency stage
        return StepOutcome::Charging;
    };
    let rate = model.stations[station_idx].charging_rate;
    let sid = model.stations[station_idx].id;

    let (full, id, level) = {
        let r = &mut model.robots[idx];
        r.battery.charge(rate);
        (
            r.battery.level >= CHARGE_TARGET * r.battery.max,
            r.id,
            r.battery.level,
        )
    };
    if !full {
        return StepOutcome::Charging;
    }

    model.stations[station_idx].finish_charging(id);
    {
        let r = &mut model.robots[idx];
        r.charging = false;
        r.waiting_for_charge = false;
        r.target_station = None;
        r.critical_battery = false;
        r.emergency_route = false;
        r.just_charged = true;
        r.charge_cooldown = 0;
        r.returning_to_task = true;
    }
    model.trace.record(
        model.tick,
        TraceDetails::ChargingEnd {
            robot_id: id.as_u32(),
            station_id: sid.as_u32(),
            level,
        },
    );

    let dest = {
        let r = &model.robots[idx];
        r.package_destination.unwrap_or(r.goal)
    };
    if pos == dest {
        model.robots[idx].set_path(vec![pos]);
        return StepOutcome::ChargeComplete;
    }

    let peers = model.peers_excluding(idx);
    let mut path = planner::plain(&model.grid, &peers, pos, dest);
    if path.is_empty() {
        path = planner::penalized(&model.grid, &peers, pos, dest, 1);
    }
    if path.is_empty() {
        path = planner::detour(&model.grid, &peers, pos, dest, &mut model.rng);
    }

    if path.len() >= 2 {
        model.robots[idx].set_path(path);
        // Step off the pad now rather than hold it against the queue
        let next = model.robots[idx].path[1];
        if model.grid.robot_at(next).is_none() && commit_move(model, idx, next) {
            return StepOutcome::Moved;
        }
        return StepOutcome::ChargeComplete;
    }
    if path.len() == 1 {
        model.robots[idx].set_path(path);
        return StepOutcome::ChargeComplete;
    }

    // No way back to the task: free the package and go idle
    release_package(model, idx);
    let r = &mut model.robots[idx];
    r.clear_task();
    r.idle = true;
    r.returning_to_task = false;
    r.path = Vec::new();
    StepOutcome::ChargeComplete
}

/// Commit a move to a free adjacent cell, then run arrival detection
fn commit_move(model: &mut Model, idx: usize, next: Cell) -> bool {
    let (id, from) = {
        let r = &model.robots[idx];
        (r.id, r.pos)
    };
    if model.grid.move_robot(id, from, next).is_err() {
        return false;
    }
    {
        let r = &mut model.robots[idx];
        r.path.remove(0);
        r.pos = next;
        r.steps_taken += 1;
        r.blocked_count = 0;
    }
    model.trace.record(
        model.tick,
        TraceDetails::RobotMove {
            robot_id: id.as_u32(),
            from_x: from.x,
            from_y: from.y,
            to_x: next.x,
            to_y: next.y,
        },
    );

    // Arrival detection on the new cell
    let r = &model.robots[idx];
    if r.carrying_package.is_some() && r.package_destination == Some(next) {
        perform_package_action(model, idx);
    } else if !r.heading_to_station() && r.carrying_package.is_none() && next == r.goal {
        let r = &mut model.robots[idx];
        r.reached_goal = true;
        r.returning_to_task = false;
    }
    true
}

/// Pickup or delivery at the package destination
fn perform_package_action(model: &mut Model, idx: usize) {
    let Some(package_id) = model.robots[idx].carrying_package else {
        return;
    };
    let Some(pidx) = model.package_index(package_id) else {
        model.robots[idx].clear_task();
        return;
    };

    match model.packages[pidx].status {
        PackageStatus::Assigned => {
            model.packages[pidx].pick(model.tick);
            let delivery = model.packages[pidx].delivery;
            let robot_id = {
                let r = &mut model.robots[idx];
                r.package_destination = Some(delivery);
                r.goal = delivery;
                r.reached_goal = false;
                r.returning_to_task = false;
                r.priority += 1;
                r.id
            };
            model.trace.record(
                model.tick,
                TraceDetails::PackagePicked {
                    package_id: package_id.as_u32(),
                    robot_id: robot_id.as_u32(),
                },
            );
            let pos = model.robots[idx].pos;
            let peers = model.peers_excluding(idx);
            let path = planner::plain(&model.grid, &peers, pos, delivery);
            // An empty plan here is recovered by the alternative-route and
            // deadlock ladders on later ticks
            model.robots[idx].set_path(path);
        }
        PackageStatus::Picked => {
            model.packages[pidx].deliver(model.tick);
            let robot_id = {
                let r = &mut model.robots[idx];
                r.total_packages_delivered += 1;
                r.clear_task();
                r.idle = true;
                r.reached_goal = true;
                r.returning_to_task = false;
                r.path = Vec::new();
                r.id
            };
            model.trace.record(
                model.tick,
                TraceDetails::PackageDelivered {
                    package_id: package_id.as_u32(),
                    robot_id: robot_id.as_u32(),
                },
            );
        }
        // Waiting or already delivered: stale reference, drop it
        _ => {
            model.robots[idx].clear_task();
        }
    }
}

/// Return a held package to the waiting pool
fn release_package(model: &mut Model, idx: usize) {
    let Some(package_id) = model.robots[idx].carrying_package else {
        return;
    };
    if let Some(pidx) = model.package_index(package_id) {
        if model.packages[pidx].release() {
            let robot_id = model.robots[idx].id.as_u32();
            model.trace.record(
                model.tick,
                TraceDetails::PackageReleased {
                    package_id: package_id.as_u32(),
                    robot_id,
                },
            );
        }
    }
}

/// Full reset: the last rung of the deadlock ladder
fn full_reset(model: &mut Model, idx: usize) {
    let id = model.robots[idx].id;
    release_package(model, idx);
    model.dequeue_everywhere(id);
    let r = &mut model.robots[idx];
    r.clear_task();
    r.clear_charge_state();
    r.critical_battery = false;
    r.emergency_route = false;
    r.just_charged = false;
    r.charge_cooldown = 0;
    r.returning_to_task = false;
    r.idle = true;
    r.reached_goal = false;
    r.path = Vec::new();
    r.blocked_count = 0;
    r.position_unchanged_count = 0;
    r.waiting_time = 0;
    r.alternative_paths_tried.clear();
    model.trace.record(
        model.tick,
        TraceDetails::DeadlockReset {
            robot_id: id.as_u32(),
        },
    );
}

/// Deadlock accounting: escalate while the robot fails to make progress
fn account_progress(model: &mut Model, idx: usize, outcome: StepOutcome) {
    if outcome == StepOutcome::Moved {
        model.robots[idx].position_unchanged_count = 0;
        return;
    }
    if !outcome.is_stuck() {
        return;
    }

    model.robots[idx].position_unchanged_count += 1;
    let count = model.robots[idx].position_unchanged_count;

    // Near-station deadlock: blocked within sight of the pad
    let near_station = {
        let r = &model.robots[idx];
        count >= 3
            && r.waiting_for_charge
            && r.target_station
                .and_then(|sid| model.station(sid))
                .is_some_and(|s| r.pos.manhattan(s.cell) <= 3)
    };
    if near_station && charging::try_station_fallback(model, idx) {
        return;
    }

    if count > 20 {
        full_reset(model, idx);
    } else if count > 10 {
        arbitration::alternative_route(model, idx);
    } else if count > 5 {
        model.robots[idx].priority += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_invariants, robot_spec, robot_spec_with_level};

    /// Straight pickup and delivery: 10x10 grid, one robot, one package.
    /// Pickup at tick 5, delivery at tick 14 with battery 86 and 14 steps.
    #[test]
    fn test_straight_pickup_and_delivery() {
        let mut model = Model::new(10, 10, 42).unwrap();
        model.add_charging_station(Cell::new(9, 9), 10.0).unwrap();
        let robot = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        let package = model
            .create_package(Cell::new(5, 0), Cell::new(5, 9))
            .unwrap();
        model.assign_package(package, robot).unwrap();

        for _ in 0..14 {
            model.step();
            assert_invariants(&model);
        }

        let r = model.robot(robot).unwrap();
        assert_eq!(r.pos, Cell::new(5, 9));
        assert_eq!(r.steps_taken, 14);
        assert_eq!(r.battery.level, 86.0);
        assert!(r.idle);
        let p = model.package(package).unwrap();
        assert_eq!(p.status, PackageStatus::Delivered);
        assert_eq!(p.pickup_tick, Some(fleetgrid_core::Tick(5)));
        assert_eq!(p.delivery_tick, Some(fleetgrid_core::Tick(14)));
    }

    /// An obstacle dropped mid-route forces a replan; the robot still makes
    /// the goal in 11 ticks total.
    #[test]
    fn test_obstacle_forces_replan() {
        let mut model = Model::new(10, 10, 42).unwrap();
        let robot = model
            .add_robot(&robot_spec(Cell::new(0, 5), Some(Cell::new(9, 5)), false))
            .unwrap();

        for _ in 0..3 {
            model.step();
        }
        assert_eq!(model.robot(robot).unwrap().pos, Cell::new(3, 5));

        model.add_obstacle(Cell::new(4, 5)).unwrap();
        assert!(!model.robot(robot).unwrap().path.contains(&Cell::new(4, 5)));

        for _ in 0..8 {
            model.step();
            assert_invariants(&model);
        }
        let r = model.robot(robot).unwrap();
        assert_eq!(r.pos, Cell::new(9, 5));
        assert!(r.reached_goal);
        assert_eq!(model.tick.value(), 11);
    }

    /// Head-on crossing: the lower id wins the tiebreak and holds its lane,
    /// the other diverts; the two never share a cell.
    #[test]
    fn test_head_on_collision_arbitration() {
        let mut model = Model::new(5, 5, 42).unwrap();
        let r1 = model
            .add_robot(&robot_spec(Cell::new(0, 2), Some(Cell::new(4, 2)), false))
            .unwrap();
        let r2 = model
            .add_robot(&robot_spec(Cell::new(4, 2), Some(Cell::new(0, 2)), false))
            .unwrap();

        for _ in 0..20 {
            model.step();
            assert_invariants(&model);
            let a = model.robot(r1).unwrap().pos;
            let b = model.robot(r2).unwrap().pos;
            assert_ne!(a, b);
        }
        assert!(model.robot(r1).unwrap().reached_goal);
        assert!(model.robot(r2).unwrap().reached_goal);
        assert_eq!(model.robot(r1).unwrap().pos, Cell::new(4, 2));
        assert_eq!(model.robot(r2).unwrap().pos, Cell::new(0, 2));
        // The diverting robot left the y=2 lane at some point
        assert!(model.robot(r2).unwrap().steps_taken > 4);
    }

    /// Battery too thin for the plan: the robot diverts to the station,
    /// charges to 95%, then resumes and reaches the far corner.
    #[test]
    fn test_battery_triggered_station_detour() {
        let mut model = Model::new(20, 20, 42).unwrap();
        let station = model.add_charging_station(Cell::new(10, 10), 10.0).unwrap();
        let robot = model
            .add_robot(&robot_spec_with_level(
                Cell::new(0, 0),
                Some(Cell::new(19, 19)),
                false,
                30.0,
            ))
            .unwrap();

        // The first step diverts instead of moving
        model.step();
        {
            let r = model.robot(robot).unwrap();
            assert!(r.waiting_for_charge);
            assert_eq!(r.target_station, Some(station));
            assert_eq!(*r.path.last().unwrap(), Cell::new(10, 10));
        }

        let mut charged = false;
        for _ in 0..70 {
            model.step();
            assert_invariants(&model);
            let r = model.robot(robot).unwrap();
            if r.charging {
                charged = true;
            }
            if r.reached_goal {
                break;
            }
        }
        let r = model.robot(robot).unwrap();
        assert!(charged);
        assert!(r.reached_goal);
        assert_eq!(r.pos, Cell::new(19, 19));
        assert!(r.battery.level > 50.0);
    }

    /// Two robots converge on one station: FIFO order holds, the second
    /// starts charging only after the first releases the slot.
    #[test]
    fn test_charge_queue_fifo() {
        let mut model = Model::new(12, 12, 42).unwrap();
        let station = model.add_charging_station(Cell::new(5, 5), 10.0).unwrap();
        let r1 = model
            .add_robot(&robot_spec_with_level(
                Cell::new(0, 5),
                Some(Cell::new(11, 5)),
                false,
                12.0,
            ))
            .unwrap();
        let r2 = model
            .add_robot(&robot_spec_with_level(
                Cell::new(10, 5),
                Some(Cell::new(0, 5)),
                false,
                12.0,
            ))
            .unwrap();

        let mut first_charge_r1 = None;
        let mut first_charge_r2 = None;
        let mut overlap = false;
        for _ in 0..80 {
            model.step();
            assert_invariants(&model);
            let a = model.robot(r1).unwrap();
            let b = model.robot(r2).unwrap();
            if a.charging && first_charge_r1.is_none() {
                first_charge_r1 = Some(model.tick.value());
            }
            if b.charging && first_charge_r2.is_none() {
                first_charge_r2 = Some(model.tick.value());
            }
            if a.charging && b.charging {
                overlap = true;
            }
            if first_charge_r1.is_some() && first_charge_r2.is_some() {
                break;
            }
        }

        // Insertion order decided the queue: robot 1 first, never both
        let t1 = first_charge_r1.expect("robot 1 never charged");
        let t2 = first_charge_r2.expect("robot 2 never charged");
        assert!(t1 < t2);
        assert!(!overlap);
        assert_eq!(model.station(station).unwrap().active_robot(), Some(r2));
    }

    /// Walled-in goal swap: no alternative exists, the stuck counter climbs
    /// to the full reset and the lower-id robot is returned to idle.
    #[test]
    fn test_walled_in_deadlock_reset() {
        let mut model = Model::new(3, 3, 42).unwrap();
        // Leave a single corridor (0,0)-(1,0)-(2,0)-(2,1)-(2,2)
        for cell in [Cell::new(0, 1), Cell::new(1, 1), Cell::new(0, 2), Cell::new(1, 2)] {
            model.add_obstacle(cell).unwrap();
        }
        model.trace.set_enabled(true);
        let r1 = model
            .add_robot(&robot_spec(Cell::new(0, 0), Some(Cell::new(2, 2)), false))
            .unwrap();
        let r2 = model
            .add_robot(&robot_spec(Cell::new(2, 2), Some(Cell::new(0, 0)), false))
            .unwrap();

        for _ in 0..30 {
            model.step();
            assert_invariants(&model);
            let a = model.robot(r1).unwrap().pos;
            let b = model.robot(r2).unwrap().pos;
            assert_ne!(a, b);
        }

        let r = model.robot(r1).unwrap();
        assert!(r.idle);
        assert_eq!(r.position_unchanged_count, 0);
        assert!(r.path.is_empty());
        assert!(model
            .trace
            .entries()
            .any(|e| matches!(e.details, TraceDetails::DeadlockReset { robot_id } if robot_id == r1.as_u32())));
        let _ = r2;
    }

    /// A held-but-unpicked package goes back to waiting when its carrier is
    /// fully reset.
    #[test]
    fn test_deadlock_reset_releases_package() {
        let mut model = Model::new(3, 1, 42).unwrap();
        model.trace.set_enabled(true);
        let r1 = model.add_robot(&robot_spec(Cell::new(0, 0), None, true)).unwrap();
        // A parked robot at its own goal lets the assignment plan through
        // its cell but blocks the actual move forever
        model
            .add_robot(&robot_spec(Cell::new(1, 0), Some(Cell::new(1, 0)), false))
            .unwrap();
        let package = model
            .create_package(Cell::new(2, 0), Cell::new(0, 0))
            .unwrap();
        model.assign_package(package, r1).unwrap();

        for _ in 0..30 {
            model.step();
        }

        assert!(model
            .trace
            .entries()
            .any(|e| matches!(e.details, TraceDetails::PackageReleased { package_id, .. } if package_id == package.as_u32())));
        assert!(model
            .trace
            .entries()
            .any(|e| matches!(e.details, TraceDetails::DeadlockReset { robot_id } if robot_id == r1.as_u32())));
    }

    /// A robot at zero battery never moves; stepping it is idempotent.
    #[test]
    fn test_zero_battery_robot_is_inert() {
        let mut model = Model::new(10, 10, 42).unwrap();
        let robot = model
            .add_robot(&robot_spec_with_level(
                Cell::new(0, 0),
                Some(Cell::new(9, 0)),
                false,
                2.0,
            ))
            .unwrap();

        for _ in 0..10 {
            model.step();
        }
        let pos = model.robot(robot).unwrap().pos;
        let steps = model.robot(robot).unwrap().steps_taken;
        assert_eq!(model.robot(robot).unwrap().battery.level, 0.0);

        for _ in 0..5 {
            model.step();
            let r = model.robot(robot).unwrap();
            assert_eq!(r.pos, pos);
            assert_eq!(r.steps_taken, steps);
            assert_eq!(r.battery.level, 0.0);
        }
    }

    /// The emergency override fires at 10%: priority jumps to 20 and the
    /// robot runs a peer-blind route to the nearest station.
    #[test]
    fn test_emergency_override() {
        let mut model = Model::new(10, 10, 42).unwrap();
        let station = model.add_charging_station(Cell::new(5, 0), 10.0).unwrap();
        let robot = model
            .add_robot(&robot_spec_with_level(
                Cell::new(0, 0),
                Some(Cell::new(9, 9)),
                false,
                9.0,
            ))
            .unwrap();

        model.step();
        let r = model.robot(robot).unwrap();
        assert_eq!(r.priority, 20);
        assert!(r.critical_battery);
        assert!(r.emergency_route);
        assert!(r.waiting_for_charge);
        assert_eq!(r.target_station, Some(station));
    }

    /// The self-repair stage clears a charging flag with no pad underneath.
    #[test]
    fn test_inconsistency_repair() {
        let mut model = Model::new(10, 10, 42).unwrap();
        model.trace.set_enabled(true);
        model.add_charging_station(Cell::new(9, 9), 10.0).unwrap();
        let robot = model
            .add_robot(&robot_spec(Cell::new(0, 0), Some(Cell::new(5, 0)), false))
            .unwrap();
        model.robot_mut(robot).unwrap().charging = true;

        model.step();
        let r = model.robot(robot).unwrap();
        assert!(!r.charging);
        assert!(model
            .trace
            .entries()
            .any(|e| matches!(e.details, TraceDetails::SelfRepair { .. })));
    }

    /// Cooldown: after a charge the battery gate stays quiet for five ticks.
    #[test]
    fn test_post_charge_cooldown_expires() {
        let mut model = Model::new(20, 20, 42).unwrap();
        model.add_charging_station(Cell::new(10, 10), 10.0).unwrap();
        let robot = model
            .add_robot(&robot_spec_with_level(
                Cell::new(8, 10),
                Some(Cell::new(19, 10)),
                false,
                14.0,
            ))
            .unwrap();

        let mut saw_cooldown = false;
        for _ in 0..60 {
            model.step();
            let r = model.robot(robot).unwrap();
            if r.just_charged {
                saw_cooldown = true;
                assert!(r.charge_cooldown < CHARGE_COOLDOWN_TICKS);
            }
            if r.reached_goal {
                break;
            }
        }
        assert!(saw_cooldown);
        let r = model.robot(robot).unwrap();
        assert!(!r.just_charged);
        assert_eq!(r.charge_cooldown, 0);
    }
}
