//! Grid occupancy: obstacles and robot positions

use crate::cell::Cell;
use fleetgrid_core::{RobotId, SimError, SimResult};
use std::collections::{HashMap, HashSet};

/// The warehouse floor: a non-toroidal W×H lattice
///
/// Tracks two occupant kinds: static obstacles (immovable once placed) and
/// robots (at most one per cell). Charging stations are not grid occupants.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    obstacles: HashSet<Cell>,
    robots: HashMap<Cell, RobotId>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            obstacles: HashSet::new(),
            robots: HashMap::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether a cell lies inside the grid bounds
    #[inline]
    pub fn is_inside(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    #[inline]
    pub fn has_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    /// The robot occupying a cell, if any
    #[inline]
    pub fn robot_at(&self, cell: Cell) -> Option<RobotId> {
        self.robots.get(&cell).copied()
    }

    /// Whether a cell is free of both obstacles and robots
    #[inline]
    pub fn is_free(&self, cell: Cell) -> bool {
        self.is_inside(cell) && !self.has_obstacle(cell) && !self.robots.contains_key(&cell)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Cell> + '_ {
        self.obstacles.iter().copied()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Place a static obstacle
    ///
    /// Reservation checks against robot homes, goals, and station cells are
    /// the model's responsibility; the grid rejects out-of-range cells,
    /// duplicates, and cells currently occupied by a robot.
    pub fn place_obstacle(&mut self, cell: Cell) -> SimResult<()> {
        if !self.is_inside(cell) {
            return Err(SimError::Validation(format!(
                "cell {} is outside the {}x{} grid",
                cell, self.width, self.height
            )));
        }
        if self.obstacles.contains(&cell) {
            return Err(SimError::placement(cell.x, cell.y, "obstacle already present"));
        }
        if self.robots.contains_key(&cell) {
            return Err(SimError::placement(cell.x, cell.y, "cell occupied by a robot"));
        }
        self.obstacles.insert(cell);
        Ok(())
    }

    /// Remove an obstacle, restoring the cell to free space
    pub fn remove_obstacle(&mut self, cell: Cell) -> bool {
        self.obstacles.remove(&cell)
    }

    /// Place a robot on an empty cell
    pub fn place_robot(&mut self, robot: RobotId, cell: Cell) -> SimResult<()> {
        if !self.is_inside(cell) {
            return Err(SimError::Validation(format!(
                "cell {} is outside the {}x{} grid",
                cell, self.width, self.height
            )));
        }
        if self.has_obstacle(cell) {
            return Err(SimError::placement(cell.x, cell.y, "cell holds an obstacle"));
        }
        if self.robots.contains_key(&cell) {
            return Err(SimError::placement(cell.x, cell.y, "cell occupied by a robot"));
        }
        self.robots.insert(cell, robot);
        Ok(())
    }

    /// Move a robot from one cell to an adjacent free cell
    ///
    /// The target must be empty of peers at the moment of commit; the caller
    /// has already arbitrated contention.
    pub fn move_robot(&mut self, robot: RobotId, from: Cell, to: Cell) -> SimResult<()> {
        if self.robots.get(&from) != Some(&robot) {
            return Err(SimError::Validation(format!(
                "robot {} is not at {}",
                robot, from
            )));
        }
        if !self.is_free(to) {
            return Err(SimError::placement(to.x, to.y, "target cell not free"));
        }
        self.robots.remove(&from);
        self.robots.insert(to, robot);
        Ok(())
    }

    /// Remove a robot from the occupancy map (robot removal, not movement)
    pub fn remove_robot(&mut self, cell: Cell) -> Option<RobotId> {
        self.robots.remove(&cell)
    }

    /// Cells currently occupied by robots
    pub fn robot_cells(&self) -> impl Iterator<Item = (Cell, RobotId)> + '_ {
        self.robots.iter().map(|(c, r)| (*c, *r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let grid = Grid::new(5, 5);
        assert!(grid.is_inside(Cell::new(0, 0)));
        assert!(grid.is_inside(Cell::new(4, 4)));
        assert!(!grid.is_inside(Cell::new(5, 0)));
        assert!(!grid.is_inside(Cell::new(-1, 2)));
    }

    #[test]
    fn test_obstacle_roundtrip() {
        let mut grid = Grid::new(5, 5);
        let c = Cell::new(2, 2);
        grid.place_obstacle(c).unwrap();
        assert!(grid.has_obstacle(c));
        assert!(grid.place_obstacle(c).is_err());
        assert!(grid.remove_obstacle(c));
        assert!(!grid.has_obstacle(c));
        assert_eq!(grid.obstacle_count(), 0);
    }

    #[test]
    fn test_obstacle_rejected_on_robot() {
        let mut grid = Grid::new(5, 5);
        let c = Cell::new(1, 1);
        grid.place_robot(RobotId(1), c).unwrap();
        assert!(grid.place_obstacle(c).is_err());
    }

    #[test]
    fn test_move_robot() {
        let mut grid = Grid::new(5, 5);
        let from = Cell::new(1, 1);
        let to = Cell::new(1, 2);
        grid.place_robot(RobotId(1), from).unwrap();
        grid.move_robot(RobotId(1), from, to).unwrap();
        assert_eq!(grid.robot_at(to), Some(RobotId(1)));
        assert_eq!(grid.robot_at(from), None);
    }

    #[test]
    fn test_move_into_occupied_cell_fails() {
        let mut grid = Grid::new(5, 5);
        grid.place_robot(RobotId(1), Cell::new(0, 0)).unwrap();
        grid.place_robot(RobotId(2), Cell::new(0, 1)).unwrap();
        assert!(grid
            .move_robot(RobotId(1), Cell::new(0, 0), Cell::new(0, 1))
            .is_err());
    }
}
