use super::motion::cuts_corner;
use super::{Cell, CostMap};
use crate::config::CornerCutting;


/// Bresenham line-of-sight test between two cells
/// Returns false on the first blocked cell along the segment, endpoints included,
/// or on a diagonal step whose flanks `corner_cutting` forbids squeezing between.
/// The walk always starts from the smaller endpoint so that
/// `line_of_sight(a, b) == line_of_sight(b, a)` holds exactly.
/// https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm
pub fn line_of_sight(map: CostMap<'_>, a: Cell, b: Cell, corner_cutting: CornerCutting) -> bool {
    let (from, to) = if a <= b { (a, b) } else { (b, a) };

    // i64 so the doubled error term cannot overflow on wide grids
    let (x1, y1) = (to.x as i64, to.y as i64);
    let (mut x, mut y) = (from.x as i64, from.y as i64);

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let here = Cell::new(x as i32, y as i32);
        if map.is_blocked(here) {
            return false;
        }

        if x == x1 && y == y1 {
            return true;
        }

        let e2 = 2 * err;
        let step_x = e2 >= dy;
        let step_y = e2 <= dx;

        if step_x && step_y && cuts_corner(map, here, sx as i32, sy as i32, corner_cutting) {
            return false;
        }

        if step_x {
            err += dy;
            x += sx;
        }
        if step_y {
            err += dx;
            y += sy;
        }
    }
}
