//! Charge-seeking policy: station ranking, plan feasibility, diversion

use crate::model::Model;
use fleetgrid_core::StationId;
use fleetgrid_map::{planner, Cell};

/// Margin applied to remaining-plan energy estimates
const SAFETY_MARGIN: f64 = 1.1;

/// Battery percentage under which station choice turns desperate
const DESPERATION_PCT: f64 = 8.0;

/// Which search the diversion plans its route with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SearchFlavor {
    /// Plain search with a penalized fallback
    Ranked,
    /// Peer-blind search for battery-critical robots
    Emergency,
}

/// Whether the robot's remaining plan fits in its battery
///
/// Short plans with comfortable charge pass unconditionally, as does any
/// robot within three cells of a station. Otherwise the remaining steps plus
/// a hypothetical post-destination trip to the nearest station must fit.
pub(crate) fn plan_is_feasible(model: &Model, idx: usize) -> bool {
    let r = &model.robots[idx];
    let remaining = r.steps_left();
    if remaining == 0 || model.stations.is_empty() {
        return true;
    }
    let pct = r.battery.percentage();
    if remaining < 20 && pct > 40.0 {
        return true;
    }
    if remaining < 40 && pct > 60.0 {
        return true;
    }
    if model
        .stations
        .iter()
        .any(|s| r.pos.manhattan(s.cell) <= 3)
    {
        return true;
    }

    let rate = r.battery.current_drain_rate();
    let dest = *r.path.last().expect("remaining > 0 implies a path");
    let post_trip = model
        .stations
        .iter()
        .map(|s| dest.manhattan(s.cell))
        .min()
        .unwrap_or(0);
    let needed = remaining as f64 * rate * SAFETY_MARGIN + post_trip as f64 * rate;
    r.battery.level >= needed
}

/// Stations ranked by (reachable, occupation, occupation + distance)
///
/// Under the desperation threshold occupation is ignored: nearest reachable
/// first, then nearest at all.
pub(crate) fn ranked_stations(model: &Model, idx: usize, exclude: Option<StationId>) -> Vec<StationId> {
    let r = &model.robots[idx];
    let pos = r.pos;

    let mut candidates: Vec<(StationId, bool, usize, u32, u32)> = model
        .stations
        .iter()
        .filter(|s| Some(s.id) != exclude)
        .map(|s| {
            let dist = pos.manhattan(s.cell);
            let occupation = s.occupation();
            let eta = occupation as u32 + dist;
            (s.id, r.battery.can_reach(dist), occupation, eta, dist)
        })
        .collect();

    if r.battery.percentage() < DESPERATION_PCT {
        candidates.sort_by_key(|&(id, can_reach, _, _, dist)| (!can_reach, dist, id));
    } else {
        candidates.sort_by_key(|&(id, can_reach, occupation, eta, _)| {
            (!can_reach, occupation, eta, id)
        });
    }
    candidates.into_iter().map(|(id, ..)| id).collect()
}

/// Route the robot to the best-ranked station it can actually path to
///
/// On success the robot is dequeued everywhere, enqueued at the chosen
/// station, and its plan replaced by the station route.
pub(crate) fn divert_to_station(
    model: &mut Model,
    idx: usize,
    flavor: SearchFlavor,
    exclude: Option<StationId>,
) -> bool {
    for sid in ranked_stations(model, idx, exclude) {
        let cell = match model.station(sid) {
            Some(s) => s.cell,
            None => continue,
        };
        let pos = model.robots[idx].pos;
        let path = match flavor {
            SearchFlavor::Emergency => planner::emergency(&model.grid, pos, cell),
            SearchFlavor::Ranked => {
                let peers = model.peers_excluding(idx);
                let path = planner::plain(&model.grid, &peers, pos, cell);
                if path.is_empty() {
                    planner::penalized(&model.grid, &peers, pos, cell, 1)
                } else {
                    path
                }
            }
        };
        if path.is_empty() {
            continue;
        }

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
        r.idle = false;
        return true;
    }
    false
}

/// Near-station deadlock recovery: switch stations, or park beside the pad
///
/// Queue membership at the current station is kept until an alternative is
/// actually found, so a robot that ends up staying put keeps its FIFO spot.
pub(crate) fn try_station_fallback(model: &mut Model, idx: usize) -> bool {
    let Some(current) = model.robots[idx].target_station else {
        return false;
    };
    let Some(station_cell) = model.station(current).map(|s| s.cell) else {
        return false;
    };
    let pos = model.robots[idx].pos;

    // The pad may have freed up since the last replan
    {
        let peers = model.peers_excluding(idx);
        let to_pad = planner::plain(&model.grid, &peers, pos, station_cell);
        if to_pad.len() >= 2 && to_pad != model.robots[idx].path {
            let r = &mut model.robots[idx];
            r.set_path(to_pad);
            r.position_unchanged_count = 0;
            return true;
        }
    }

    if divert_to_station(model, idx, SearchFlavor::Ranked, Some(current)) {
        return true;
    }

    if model.robots[idx].battery.percentage() >= DESPERATION_PCT {
        return false;
    }

    // Last resort: park on the nearest accessible cell of the ring around
    // the pad (staying put counts) and keep the queue spot
    let mut ring: Vec<Cell> = ring_cells(station_cell)
        .into_iter()
        .filter(|c| *c == pos || model.grid.is_free(*c))
        .collect();
    ring.sort_by_key(|c| (pos.manhattan(*c), c.x, c.y));

    let peers = model.peers_excluding(idx);
    for cell in ring {
        let path = planner::plain(&model.grid, &peers, pos, cell);
        if !path.is_empty() {
            let r = &mut model.robots[idx];
            r.set_path(path);
            r.position_unchanged_count = 0;
            return true;
        }
    }
    false
}

/// The eight cells surrounding a station pad
fn ring_cells(center: Cell) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(8);
    for dx in -1..=1 {
        for dy in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            cells.push(center.offset(dx, dy));
        }
    }
    cells
}
