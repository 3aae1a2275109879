use std::f64::consts::SQRT_2;

use super::{Cell, CostMap, Node};
use crate::config::CornerCutting;


/// One neighbour offset with its step cost in cells
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub dx: i32,
    pub dy: i32,
    pub cost: f64,
}

impl Motion {
    const fn new(dx: i32, dy: i32, cost: f64) -> Self {
        Self { dx, dy, cost }
    }

    pub fn is_diagonal(&self) -> bool {
        self.dx != 0 && self.dy != 0
    }
}


/// 8-connected motion table, axis moves first
/// The order is fixed: neighbour enumeration and tie-breaking depend on it
pub static MOTIONS: [Motion; 8] = [
    Motion::new(0, 1, 1.0),
    Motion::new(1, 0, 1.0),
    Motion::new(0, -1, 1.0),
    Motion::new(-1, 0, 1.0),
    Motion::new(1, 1, SQRT_2),
    Motion::new(1, -1, SQRT_2),
    Motion::new(-1, 1, SQRT_2),
    Motion::new(-1, -1, SQRT_2),
];


/// Traversable neighbours of a cell with their step costs
/// Yields at most 8 unvisited candidate nodes in `MOTIONS` order
pub fn neighbors<'a>(map: CostMap<'a>, cell: Cell, corner_cutting: CornerCutting) -> impl Iterator<Item = (Node, f64)> + 'a {
    MOTIONS.iter().filter_map(move |motion| {
        let next = Cell::new(cell.x + motion.dx, cell.y + motion.dy);

        // out of bounds counts as blocked
        if map.is_blocked(next) {
            return None;
        }

        if motion.is_diagonal() && cuts_corner(map, cell, motion.dx, motion.dy, corner_cutting) {
            return None;
        }

        Some((Node::unvisited(map.grid(), next), motion.cost))
    })
}


/// Check the two axis cells a diagonal step from `cell` by (dx, dy) squeezes between
/// Both directions of the same step see the same pair of flanks
pub(crate) fn cuts_corner(map: CostMap<'_>, cell: Cell, dx: i32, dy: i32, corner_cutting: CornerCutting) -> bool {
    let flank_x = map.is_blocked(Cell::new(cell.x + dx, cell.y));
    let flank_y = map.is_blocked(Cell::new(cell.x, cell.y + dy));

    match corner_cutting {
        CornerCutting::Allow => false,
        CornerCutting::BothBlocked => flank_x && flank_y,
        CornerCutting::AnyBlocked => flank_x || flank_y,
    }
}
