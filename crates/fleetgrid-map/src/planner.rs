//! A* path planning over the 4-connected grid
//!
//! Four search flavors share one best-first core:
//! - `plain`: unit edge costs; peer-occupied cells are blocked unless the
//!   cell is that peer's own goal (a robot resting at its goal does not
//!   block others from planning through it; the commit-time occupancy check
//!   still applies).
//! - `penalized`: peer cells cost 10000·k extra and cells 4-adjacent to a
//!   peer cost 5000·k extra, instead of being blocked.
//! - `emergency`: ignores peers entirely; battery-critical use only.
//! - `detour`: routes through a waypoint beside the direct line, for
//!   escaping head-on stand-offs the direct searches cannot resolve.
//!
//! Every search returns a path starting at `start` and ending at `goal`,
//! or an empty vector when no path exists.

use crate::cell::Cell;
use crate::grid::Grid;
use fleetgrid_core::SimRng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Peer robot view used by the planner: where it is and where it is headed
#[derive(Clone, Copy, Debug)]
pub struct Peer {
    pub cell: Cell,
    pub goal: Cell,
}

const PEER_PENALTY: u64 = 10_000;
const ADJACENT_PENALTY: u64 = 5_000;

enum Mode {
    Plain,
    Penalized { multiplier: u64 },
    Emergency,
}

/// Plain A*: f = g + h with Manhattan heuristic and unit edges
pub fn plain(grid: &Grid, peers: &[Peer], start: Cell, goal: Cell) -> Vec<Cell> {
    search(grid, peers, start, goal, Mode::Plain)
}

/// Robot-penalized A*: peer cells are costed instead of pruned
pub fn penalized(grid: &Grid, peers: &[Peer], start: Cell, goal: Cell, multiplier: u32) -> Vec<Cell> {
    search(
        grid,
        peers,
        start,
        goal,
        Mode::Penalized {
            multiplier: multiplier.max(1) as u64,
        },
    )
}

/// Emergency A*: peers are invisible
pub fn emergency(grid: &Grid, start: Cell, goal: Cell) -> Vec<Cell> {
    search(grid, &[], start, goal, Mode::Emergency)
}

/// Detour A*: concatenate plain searches through a sideways waypoint
///
/// Candidates are the two cells offset ±3 perpendicular to the direct
/// start→goal vector (taken from the segment midpoint), plus two random
/// offsets in [-5, +5]² of the midpoint. The first candidate for which both
/// legs succeed wins.
pub fn detour(grid: &Grid, peers: &[Peer], start: Cell, goal: Cell, rng: &mut SimRng) -> Vec<Cell> {
    for waypoint in detour_waypoints(grid, start, goal, rng) {
        if waypoint == start || waypoint == goal {
            continue;
        }
        let head = plain(grid, peers, start, waypoint);
        if head.is_empty() {
            continue;
        }
        let tail = plain(grid, peers, waypoint, goal);
        if tail.is_empty() {
            continue;
        }
        let mut path = head;
        path.extend(tail.into_iter().skip(1));
        return path;
    }
    Vec::new()
}

fn detour_waypoints(grid: &Grid, start: Cell, goal: Cell, rng: &mut SimRng) -> Vec<Cell> {
    let mid = Cell::new((start.x + goal.x) / 2, (start.y + goal.y) / 2);
    let dx = (goal.x - start.x) as f64;
    let dy = (goal.y - start.y) as f64;
    let len = (dx * dx + dy * dy).sqrt();

    let mut candidates = Vec::with_capacity(4);
    if len > 0.0 {
        let px = (-dy / len * 3.0).round() as i32;
        let py = (dx / len * 3.0).round() as i32;
        candidates.push(mid.offset(px, py));
        candidates.push(mid.offset(-px, -py));
    }
    candidates.push(mid.offset(rng.offset(5), rng.offset(5)));
    candidates.push(mid.offset(rng.offset(5), rng.offset(5)));

    candidates
        .into_iter()
        .filter(|c| grid.is_inside(*c) && !grid.has_obstacle(*c))
        .collect()
}

/// Check that a path is well-formed: endpoints match, consecutive cells are
/// 4-adjacent, and no cell holds an obstacle
pub fn is_valid_path(grid: &Grid, path: &[Cell], start: Cell, goal: Cell) -> bool {
    if path.is_empty() {
        return false;
    }
    if path[0] != start || *path.last().unwrap() != goal {
        return false;
    }
    for window in path.windows(2) {
        if !window[0].is_adjacent(window[1]) {
            return false;
        }
    }
    path.iter().all(|c| grid.is_inside(*c) && !grid.has_obstacle(*c))
}

#[derive(PartialEq, Eq)]
struct Open {
    f: u64,
    g: u64,
    seq: u64,
    cell: Cell,
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f; ties broken by insertion order into the open set
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn search(grid: &Grid, peers: &[Peer], start: Cell, goal: Cell, mode: Mode) -> Vec<Cell> {
    if !grid.is_inside(start) || !grid.is_inside(goal) || grid.has_obstacle(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let peer_cells: HashSet<Cell> = peers.iter().map(|p| p.cell).collect();

    let mut g_score: HashMap<Cell, u64> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0);
    heap.push(Open {
        f: start.manhattan(goal) as u64,
        g: 0,
        seq,
        cell: start,
    });

    while let Some(Open { g, cell, .. }) = heap.pop() {
        if cell == goal {
            return reconstruct(&came_from, goal);
        }
        if g_score.get(&cell).is_some_and(|&best| g > best) {
            continue;
        }

        for neighbor in cell.neighbors4() {
            if !grid.is_inside(neighbor) || grid.has_obstacle(neighbor) {
                continue;
            }

            let step_cost = match mode {
                Mode::Plain => {
                    // Blocked by a peer unless the cell is that peer's goal
                    if peers
                        .iter()
                        .any(|p| p.cell == neighbor && p.goal != neighbor)
                    {
                        continue;
                    }
                    1
                }
                Mode::Penalized { multiplier } => {
                    let mut cost = 1;
                    if peer_cells.contains(&neighbor) {
                        cost += PEER_PENALTY * multiplier;
                    }
                    if neighbor
                        .neighbors4()
                        .iter()
                        .any(|c| peer_cells.contains(c))
                    {
                        cost += ADJACENT_PENALTY * multiplier;
                    }
                    cost
                }
                Mode::Emergency => 1,
            };

            let tentative = g + step_cost;
            if g_score.get(&neighbor).is_none_or(|&best| tentative < best) {
                g_score.insert(neighbor, tentative);
                came_from.insert(neighbor, cell);
                seq += 1;
                heap.push(Open {
                    f: tentative + neighbor.manhattan(goal) as u64,
                    g: tentative,
                    seq,
                    cell: neighbor,
                });
            }
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
