//! Collision right-of-way and alternative-route search

use crate::model::Model;
use crate::trace::TraceDetails;
use fleetgrid_core::RobotId;
use fleetgrid_map::{planner, Cell};
use fleetgrid_entities::PackageStatus;

/// Battery percentage treated as critical for right-of-way purposes
const CRITICAL_PCT: f64 = 8.0;

/// How many random probe cells the last-resort search tries
const PROBE_ATTEMPTS: usize = 5;

/// Layered right-of-way comparison; the first decisive condition wins
///
/// Returns true when the robot at `idx` outranks the peer blocking it.
/// A winner waits for the peer to clear; a loser diversifies its route.
pub(crate) fn wins_right_of_way(model: &Model, idx: usize, peer: RobotId) -> bool {
    let me = &model.robots[idx];
    let Some(other) = model.robot(peer) else {
        return true;
    };

    let me_critical = me.critical_battery || me.battery.percentage() < CRITICAL_PCT;
    let other_critical = other.critical_battery || other.battery.percentage() < CRITICAL_PCT;
    if me_critical != other_critical {
        return me_critical;
    }

    let me_charge_run = me.heading_to_station() && me.battery.percentage() < 20.0;
    let other_charge_run = other.heading_to_station() && other.battery.percentage() < 20.0;
    if me_charge_run != other_charge_run {
        return me_charge_run;
    }

    if me.heading_to_station() && other.heading_to_station() {
        let me_pct = me.battery.percentage();
        let other_pct = other.battery.percentage();
        if me_pct != other_pct {
            return me_pct < other_pct;
        }
    }

    let picked = |robot: &fleetgrid_entities::Robot| {
        robot
            .carrying_package
            .and_then(|p| model.package(p))
            .is_some_and(|p| p.status == PackageStatus::Picked)
    };
    let me_picked = picked(me);
    let other_picked = picked(other);
    if me_picked != other_picked {
        return me_picked;
    }

    if me.priority != other.priority {
        return me.priority > other.priority;
    }

    me.id < other.id
}

/// Find a route strictly different from the current plan and recent attempts
///
/// Order of attempts: plain replan (peer positions may have changed),
/// penalized (doubled multiplier when critical), detour, then up to five
/// random probe cells composed into pos → probe → destination. The accepted
/// plan is pushed onto the bounded history and the block counters reset.
pub(crate) fn alternative_route(model: &mut Model, idx: usize) -> bool {
    let (pos, dest, critical) = {
        let r = &model.robots[idx];
        let dest = match r.target_station.and_then(|sid| model.station(sid)) {
            Some(station) => station.cell,
            None => r.goal,
        };
        let critical = r.critical_battery || r.battery.percentage() < CRITICAL_PCT;
        (r.pos, dest, critical)
    };
    if pos == dest {
        return false;
    }

    let peers = model.peers_excluding(idx);

    let candidate = planner::plain(&model.grid, &peers, pos, dest);
    if accept(model, idx, candidate) {
        return true;
    }

    let multiplier = if critical { 2 } else { 1 };
    let candidate = planner::penalized(&model.grid, &peers, pos, dest, multiplier);
    if accept(model, idx, candidate) {
        return true;
    }

    let candidate = planner::detour(&model.grid, &peers, pos, dest, &mut model.rng);
    if accept(model, idx, candidate) {
        return true;
    }

    // Random probes; near stations instead when battery is critical
    let station_cells: Vec<Cell> = model.stations.iter().map(|s| s.cell).collect();
    let (width, height) = (model.grid.width(), model.grid.height());
    for _ in 0..PROBE_ATTEMPTS {
        let probe = if critical && !station_cells.is_empty() {
            let center = *model.rng.choose(&station_cells).expect("non-empty");
            let neighbors = center.neighbors4();
            neighbors[model.rng.gen_range(0..neighbors.len())]
        } else {
            Cell::new(
                model.rng.gen_range(0..width),
                model.rng.gen_range(0..height),
            )
        };
        if !model.grid.is_inside(probe) || model.grid.has_obstacle(probe) || probe == pos {
            continue;
        }
        let head = planner::plain(&model.grid, &peers, pos, probe);
        if head.is_empty() {
            continue;
        }
        let tail = planner::plain(&model.grid, &peers, probe, dest);
        if tail.is_empty() {
            continue;
        }
        let mut composite = head;
        composite.extend(tail.into_iter().skip(1));
        if accept(model, idx, composite) {
            return true;
        }
    }

    false
}

fn accept(model: &mut Model, idx: usize, candidate: Vec<Cell>) -> bool {
    if candidate.len() < 2 {
        return false;
    }
    if model.robots[idx].has_tried(&candidate) {
        return false;
    }
    let path_len = candidate.len();
    let robot_id = {
        let r = &mut model.robots[idx];
        r.remember_alternative(candidate.clone());
        r.set_path(candidate);
        r.reset_block_counters();
        r.id.as_u32()
    };
    model.trace.record(
        model.tick,
        TraceDetails::AlternativeRoute { robot_id, path_len },
    );
    true
}
