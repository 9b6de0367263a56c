//! Package entity

use fleetgrid_core::{PackageId, RobotId, Tick};
use fleetgrid_map::Cell;
use serde::{Deserialize, Serialize};

/// Package lifecycle status
///
/// Progresses monotonically: Waiting → Assigned → Picked → Delivered.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    #[default]
    Waiting,
    Assigned,
    Picked,
    Delivered,
}

/// A parcel to be picked up at a dock cell and delivered to a shelf cell
#[derive(Clone, Debug)]
pub struct Package {
    pub id: PackageId,
    pub pickup: Cell,
    pub delivery: Cell,
    pub status: PackageStatus,
    pub assigned_robot: Option<RobotId>,
    pub pickup_tick: Option<Tick>,
    pub delivery_tick: Option<Tick>,
}

impl Package {
    pub fn new(id: PackageId, pickup: Cell, delivery: Cell) -> Self {
        Self {
            id,
            pickup,
            delivery,
            status: PackageStatus::Waiting,
            assigned_robot: None,
            pickup_tick: None,
            delivery_tick: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == PackageStatus::Waiting
    }

    pub fn is_delivered(&self) -> bool {
        self.status == PackageStatus::Delivered
    }

    /// Assign the package to a robot (Waiting → Assigned)
    pub fn assign(&mut self, robot: RobotId) -> bool {
        if self.status != PackageStatus::Waiting {
            return false;
        }
        self.status = PackageStatus::Assigned;
        self.assigned_robot = Some(robot);
        true
    }

    /// Record pickup by the assigned robot (Assigned → Picked)
    pub fn pick(&mut self, tick: Tick) -> bool {
        if self.status != PackageStatus::Assigned {
            return false;
        }
        self.status = PackageStatus::Picked;
        self.pickup_tick = Some(tick);
        true
    }

    /// Record delivery (Picked → Delivered); a delivered package never mutates
    pub fn deliver(&mut self, tick: Tick) -> bool {
        if self.status != PackageStatus::Picked {
            return false;
        }
        self.status = PackageStatus::Delivered;
        self.delivery_tick = Some(tick);
        true
    }

    /// Return an undelivered package to the waiting pool
    ///
    /// Used by assignment rollback and the deadlock full reset; a delivered
    /// package is left untouched.
    pub fn release(&mut self) -> bool {
        if self.status == PackageStatus::Delivered {
            return false;
        }
        self.status = PackageStatus::Waiting;
        self.assigned_robot = None;
        self.pickup_tick = None;
        true
    }

    /// The cell the carrying robot must reach next for this package
    pub fn destination(&self) -> Cell {
        match self.status {
            PackageStatus::Picked => self.delivery,
            _ => self.pickup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_package() -> Package {
        Package::new(PackageId(1), Cell::new(5, 0), Cell::new(5, 9))
    }

    #[test]
    fn test_full_lifecycle() {
        let mut p = make_package();
        assert!(p.is_waiting());
        assert!(p.assign(RobotId(1)));
        assert_eq!(p.status, PackageStatus::Assigned);
        assert_eq!(p.destination(), Cell::new(5, 0));
        assert!(p.pick(Tick(5)));
        assert_eq!(p.destination(), Cell::new(5, 9));
        assert!(p.deliver(Tick(14)));
        assert_eq!(p.pickup_tick, Some(Tick(5)));
        assert_eq!(p.delivery_tick, Some(Tick(14)));
    }

    #[test]
    fn test_transitions_are_guarded() {
        let mut p = make_package();
        assert!(!p.pick(Tick(1)));
        assert!(!p.deliver(Tick(1)));
        assert!(p.assign(RobotId(1)));
        assert!(!p.assign(RobotId(2)));
        assert!(!p.deliver(Tick(1)));
    }

    #[test]
    fn test_release_reverts_to_waiting() {
        let mut p = make_package();
        p.assign(RobotId(1));
        p.pick(Tick(3));
        assert!(p.release());
        assert!(p.is_waiting());
        assert_eq!(p.assigned_robot, None);
    }

    #[test]
    fn test_delivered_never_mutates() {
        let mut p = make_package();
        p.assign(RobotId(1));
        p.pick(Tick(3));
        p.deliver(Tick(9));
        assert!(!p.release());
        assert!(!p.assign(RobotId(2)));
        assert_eq!(p.status, PackageStatus::Delivered);
    }
}
