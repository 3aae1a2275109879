//! Open and closed lists for grid searches
//!
//! Both are dense arenas indexed by node id, sized to the grid.

mod closed_list;
mod open_list;

pub use closed_list::ClosedList;
pub use open_list::OpenList;
