//! Lazy Theta* any-angle planner
//!
//! Theta* lets a node take its parent's parent as its own parent whenever
//! the straight segment between them is free, which yields paths that are
//! not bound to the 8 grid directions. The lazy variant assumes that segment
//! is free when a node is generated and only checks it once the node is
//! popped for expansion. A failed check re-parents the node onto its best
//! closed grid neighbour and sends it back to the open list.
//!
//! http://idm-lab.org/bib/abstracts/papers/aaai10b.pdf

use super::{prepare_query, GlobalPlanner, PlanOutcome, SearchStats};
use crate::config::PlannerConfig;
use crate::errors::Result;
use crate::grid::{line_of_sight, neighbors, Cell, CostMap, Grid, Node};
use crate::search::{ClosedList, OpenList};


/// Lazy Theta* planner for a fixed grid
#[derive(Debug, Clone)]
pub struct LazyThetaStar {
    grid: Grid,
    config: PlannerConfig,
}

impl LazyThetaStar {

    /// Planner with the default configuration
    pub fn new(nx: usize, ny: usize, resolution: f64) -> Result<Self> {
        Self::with_config(nx, ny, resolution, PlannerConfig::default())
    }

    pub fn with_config(nx: usize, ny: usize, resolution: f64, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid: Grid::new(nx, ny, resolution)?,
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }
}

impl GlobalPlanner for LazyThetaStar {

    fn name(&self) -> &'static str {
        "lazy_theta_star"
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn plan(&self, costmap: &[u8], start: Cell, goal: Cell) -> Result<PlanOutcome> {
        let Some(map) = prepare_query(&self.grid, &self.config, costmap, start, goal)? else {
            return Ok(PlanOutcome::rejected());
        };

        tracing::debug!(
            nx = self.grid.nx(),
            ny = self.grid.ny(),
            start = ?start,
            goal = ?goal,
            "lazy theta* search started"
        );

        let outcome = Search::new(map, &self.config, goal).run(start);

        tracing::debug!(
            found = outcome.found,
            waypoints = outcome.path.len(),
            expanded = outcome.expand.len(),
            repairs = outcome.stats.repairs,
            line_of_sight_checks = outcome.stats.line_of_sight_checks,
            "lazy theta* search finished"
        );

        Ok(outcome)
    }
}


/// Result of validating a popped node's parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validation {
    Confirmed, // the lazy parent is visible, expand now
    Repaired, // re-parented onto a closed neighbour, expand on a later pop
    Orphaned, // no visible closed neighbour, cannot happen on a consistent search
}


/// State of one planning call
struct Search<'a> {
    map: CostMap<'a>,
    config: &'a PlannerConfig,
    goal: Cell,
    goal_id: usize,
    open: OpenList,
    closed: ClosedList,
    stats: SearchStats,
}

impl<'a> Search<'a> {

    fn new(map: CostMap<'a>, config: &'a PlannerConfig, goal: Cell) -> Self {
        let grid = map.grid();
        Self {
            map,
            config,
            goal,
            goal_id: grid.coordinates_to_id(goal),
            open: OpenList::new(grid.size(), config.tie_break),
            closed: ClosedList::new(grid.size()),
            stats: SearchStats::default(),
        }
    }

    /// Main loop - pop, validate, expand until the goal closes or the frontier empties
    fn run(mut self, start: Cell) -> PlanOutcome {
        self.open.push(Node::root(self.map.grid(), start, self.goal));

        let mut found = false;

        while let Some(mut node) = self.open.pop_min() {

            if self.config.max_iterations.is_some_and(|limit| self.stats.pops >= limit) {
                tracing::warn!(limit = self.stats.pops, "lazy theta* iteration budget exhausted");
                break;
            }
            self.stats.pops += 1;

            // nothing re-enters the open list once closed
            if self.closed.contains(node.id) {
                debug_assert!(false, "closed node {} popped from the open list", node.id);
                continue;
            }

            match self.set_vertex(&mut node) {
                Validation::Confirmed => {}
                Validation::Repaired => {
                    self.open.push(node);
                    continue;
                }
                Validation::Orphaned => {
                    debug_assert!(false, "node {} has no visible closed neighbour", node.id);
                    continue;
                }
            }

            let expanded = node.clone();
            self.closed.insert(node);

            // the goal is closed before this check so it shows up in the expansion record
            if expanded.id == self.goal_id {
                found = true;
                break;
            }

            for (child, _) in neighbors(self.map, expanded.cell, self.config.corner_cutting) {
                self.update_vertex(&expanded, child);
            }
        }

        self.finish(found)
    }

    /// Tentatively give `child` the parent of `parent`, without checking visibility
    /// The root is its own parent, so children of the root hang off the root itself
    fn update_vertex(&mut self, parent: &Node, mut child: Node) {
        if self.closed.contains(child.id) {
            return;
        }

        // parents are always closed, the root included
        let Some(grandparent) = parent.parent_id.and_then(|id| self.closed.get(id)) else {
            debug_assert!(false, "parent of expanded node {} is not closed", parent.id);
            return;
        };

        let g = grandparent.g + grandparent.distance(&child);
        if self.open.best_known(child.id).is_some_and(|best| best <= g) {
            return;
        }

        child.parent_id = Some(grandparent.id);
        child.g = g;
        child.h = Node::distance_between(child.cell, self.goal);
        self.open.push(child);
    }

    /// Check the lazy parent of a freshly popped node, re-parenting it if the
    /// straight segment is obstructed
    fn set_vertex(&mut self, node: &mut Node) -> Validation {
        if node.is_root() {
            return Validation::Confirmed;
        }

        let Some(parent) = node.parent_id.and_then(|id| self.closed.get(id)) else {
            return Validation::Orphaned;
        };

        self.stats.line_of_sight_checks += 1;
        if line_of_sight(self.map, parent.cell, node.cell, self.config.corner_cutting) {
            return Validation::Confirmed;
        }

        // Fall back to the cheapest closed grid neighbour that can see the node
        let mut best: Option<(f64, usize)> = None;
        for (candidate, _) in neighbors(self.map, node.cell, self.config.corner_cutting) {
            let Some(neighbor) = self.closed.get(candidate.id) else {
                continue;
            };

            let g = neighbor.g + neighbor.distance(node);
            if best.is_some_and(|(best_g, _)| best_g <= g) {
                continue;
            }

            self.stats.line_of_sight_checks += 1;
            if line_of_sight(self.map, neighbor.cell, node.cell, self.config.corner_cutting) {
                best = Some((g, neighbor.id));
            }
        }

        let Some((g, parent_id)) = best else {
            return Validation::Orphaned;
        };

        tracing::trace!(
            x = node.cell.x,
            y = node.cell.y,
            optimistic_g = node.g,
            repaired_g = g,
            "lazy parent obstructed, re-parented"
        );

        node.g = g;
        node.parent_id = Some(parent_id);
        self.stats.repairs += 1;
        Validation::Repaired
    }

    /// Collect the path and expansion record
    fn finish(self, found: bool) -> PlanOutcome {
        let mut stats = self.stats;
        stats.stale_discards = self.open.stale_discards();
        let expand: Vec<Node> = self.closed.iter().cloned().collect();

        if !found {
            return PlanOutcome { found, path: Vec::new(), expand, stats };
        }

        match self.closed.trace_path(self.goal_id) {
            Some(path) => PlanOutcome { found, path, expand, stats },
            None => {
                debug_assert!(false, "goal parent chain does not reach the start");
                PlanOutcome { found: false, path: Vec::new(), expand, stats }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CornerCutting, TieBreak};
    use crate::planners::test_maps;
    use crate::planners::GridSearch;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn planner_for(grid: &Grid) -> LazyThetaStar {
        LazyThetaStar::new(grid.nx(), grid.ny(), grid.resolution()).unwrap()
    }

    /// Every segment visible and every waypoint free
    fn assert_valid(grid: &Grid, costs: &[u8], outcome: &PlanOutcome) {
        let config = PlannerConfig::default();
        let map = CostMap::new(grid, costs, config.obstacle_threshold()).unwrap();
        for node in &outcome.path {
            assert!(!map.is_blocked(node.cell), "waypoint {:?} is blocked", node.cell);
        }
        for pair in outcome.path.windows(2) {
            assert!(
                line_of_sight(map, pair[0].cell, pair[1].cell, config.corner_cutting),
                "no line of sight between {:?} and {:?}",
                pair[0].cell,
                pair[1].cell
            );
        }
    }

    /// Each expanded node hangs off an earlier expanded node it can see,
    /// at exactly the cost of that straight segment
    fn assert_expanded_parents_confirmed(grid: &Grid, costs: &[u8], outcome: &PlanOutcome) {
        let config = PlannerConfig::default();
        let map = CostMap::new(grid, costs, config.obstacle_threshold()).unwrap();

        for (position, node) in outcome.expand.iter().enumerate() {
            if node.is_root() {
                assert_eq!(position, 0, "root expanded out of turn");
                assert_eq!(node.g, 0.0);
                continue;
            }

            let parent_id = node.parent_id.expect("expanded node without a parent");
            let parent = outcome.expand[..position]
                .iter()
                .find(|earlier| earlier.id == parent_id)
                .unwrap_or_else(|| panic!("parent of {:?} was not expanded before it", node.cell));

            assert!(
                line_of_sight(map, parent.cell, node.cell, config.corner_cutting),
                "{:?} expanded with hidden parent {:?}",
                node.cell,
                parent.cell
            );
            assert_relative_eq!(node.g, parent.g + parent.distance(node), epsilon = 1e-9);
        }
    }

    fn assert_unique_expansion(grid: &Grid, outcome: &PlanOutcome) {
        let ids: HashSet<usize> = outcome.expand.iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), outcome.expand.len(), "a node was expanded twice");
        assert!(outcome.expand.len() <= grid.size());
    }

    #[test]
    fn test_open_map_gives_straight_line() {
        let (grid, costs) = test_maps::open(20);
        let planner = planner_for(&grid);

        let outcome = planner.plan(&costs, Cell::new(1, 2), Cell::new(17, 11)).unwrap();

        assert!(outcome.found);
        assert_eq!(outcome.path_cells(), vec![Cell::new(1, 2), Cell::new(17, 11)]);
        assert_relative_eq!(outcome.path_length(), (16.0f64 * 16.0 + 9.0 * 9.0).sqrt(), epsilon = 1e-9);
        assert_relative_eq!(outcome.path[1].g, outcome.path_length(), epsilon = 1e-9);
        assert_eq!(outcome.stats.repairs, 0);
        assert_unique_expansion(&grid, &outcome);
    }

    #[test]
    fn test_start_equals_goal() {
        let (grid, costs) = test_maps::open(5);
        let outcome = planner_for(&grid).plan(&costs, Cell::new(2, 2), Cell::new(2, 2)).unwrap();

        assert!(outcome.found);
        assert_eq!(outcome.path_cells(), vec![Cell::new(2, 2)]);
        assert_eq!(outcome.path[0].g, 0.0);
        assert_eq!(outcome.expand_cells(), vec![Cell::new(2, 2)]);
    }

    #[test]
    fn test_blocked_or_outside_query_is_rejected_without_search() {
        let (grid, costs) = test_maps::parse(&[
            "....",
            ".#..",
            "....",
        ]);
        let planner = planner_for(&grid);

        for (start, goal) in [
            (Cell::new(1, 1), Cell::new(3, 2)),
            (Cell::new(0, 0), Cell::new(1, 1)),
            (Cell::new(0, 0), Cell::new(4, 0)),
            (Cell::new(0, -1), Cell::new(3, 2)),
        ] {
            let outcome = planner.plan(&costs, start, goal).unwrap();
            assert!(!outcome.found);
            assert!(outcome.path.is_empty());
            assert!(outcome.expand.is_empty());
            assert_eq!(outcome.stats, SearchStats::default());
        }
    }

    #[test]
    fn test_cost_map_size_mismatch_is_an_error() {
        let (grid, costs) = test_maps::open(5);
        let result = planner_for(&grid).plan(&costs[1..], Cell::new(0, 0), Cell::new(4, 4));
        assert!(result.is_err());
    }

    #[test]
    fn test_full_wall_means_no_path() {
        let (grid, costs) = test_maps::parse(&[
            "...#....",
            "...#....",
            "...#....",
            "...#....",
            "...#....",
        ]);

        let outcome = planner_for(&grid).plan(&costs, Cell::new(0, 2), Cell::new(7, 2)).unwrap();

        assert!(!outcome.found);
        assert!(outcome.path.is_empty());
        // the whole left side gets explored before giving up
        assert_eq!(outcome.expand.len(), 15);
        assert_unique_expansion(&grid, &outcome);
    }

    #[test]
    fn test_detour_around_wall() {
        // wall at x = 10 with a gap at the top rows
        let mut rows = vec![String::from("...................."); 20];
        for row in rows.iter_mut().take(15) {
            row.replace_range(10..11, "#");
        }
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let (grid, costs) = test_maps::parse(&rows);

        let (start, goal) = (Cell::new(2, 2), Cell::new(17, 2));
        let outcome = planner_for(&grid).plan(&costs, start, goal).unwrap();

        assert!(outcome.found);
        assert_valid(&grid, &costs, &outcome);
        assert_unique_expansion(&grid, &outcome);
        assert!(outcome.path.len() >= 3, "path must bend around the wall");

        // up, across the gap, and back down again
        let hand_detour = 14.0 + 15.0 + 14.0;
        assert!(outcome.path_length() <= hand_detour);
        assert!(outcome.path_length() > 15.0);

        // never worse than the 8-connected grid path
        let grid_search = GridSearch::a_star(grid.nx(), grid.ny(), 1.0).unwrap();
        let a_star = grid_search.plan(&costs, start, goal).unwrap();
        assert!(a_star.found);
        assert!(outcome.path_length() <= a_star.path_length() + 1e-9);

        // the goal's cost equals the geometric length of its parent chain
        let goal_node = outcome.path.last().unwrap();
        assert_relative_eq!(goal_node.g, outcome.path_length(), epsilon = 1e-9);
    }

    #[test]
    fn test_lazy_parent_gets_repaired() {
        // the pillar hides cells behind it from the start
        let (grid, costs) = test_maps::parse(&[
            "..........",
            "..........",
            "...##.....",
            "...##.....",
            "..........",
            "..........",
        ]);

        let outcome = planner_for(&grid).plan(&costs, Cell::new(0, 0), Cell::new(7, 5)).unwrap();

        assert!(outcome.found);
        assert!(outcome.stats.repairs > 0);
        assert_valid(&grid, &costs, &outcome);
        assert_expanded_parents_confirmed(&grid, &costs, &outcome);
        assert!(outcome.stats.line_of_sight_checks >= outcome.stats.pops - 1);
    }

    #[test]
    fn test_repaired_node_waits_for_a_later_pop() {
        let (grid, costs) = test_maps::parse(&[
            "..........",
            "..........",
            "...##.....",
            "...##.....",
            "..........",
            "..........",
        ]);

        let outcome = planner_for(&grid).plan(&costs, Cell::new(0, 0), Cell::new(7, 5)).unwrap();
        assert!(outcome.found);
        assert!(outcome.stats.repairs > 0);

        // a repair consumes its pop without expanding, the node is expanded on a later pop
        assert_eq!(outcome.stats.pops, outcome.expand.len() + outcome.stats.repairs);
        assert!(outcome.stats.pops > outcome.expand.len());
        assert_unique_expansion(&grid, &outcome);
    }

    #[test]
    fn test_path_does_not_squeeze_through_diagonal_pinch() {
        // the straight diagonal passes between (5,4) and (4,5)
        let mut rows = vec![String::from(".........."); 10];
        rows[4].replace_range(5..6, "#");
        rows[5].replace_range(4..5, "#");
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let (grid, costs) = test_maps::parse(&rows);
        let (start, goal) = (Cell::new(0, 0), Cell::new(9, 9));
        let diagonal = 9.0 * std::f64::consts::SQRT_2;

        let outcome = planner_for(&grid).plan(&costs, start, goal).unwrap();
        assert!(outcome.found);
        assert_valid(&grid, &costs, &outcome);
        assert_expanded_parents_confirmed(&grid, &costs, &outcome);
        assert!(outcome.path.len() >= 3, "path must bend around the pinch");
        assert!(outcome.path_length() > diagonal + 1e-6);

        let permissive = PlannerConfig { corner_cutting: CornerCutting::Allow, ..PlannerConfig::default() };
        let planner = LazyThetaStar::with_config(grid.nx(), grid.ny(), 1.0, permissive).unwrap();
        let outcome = planner.plan(&costs, start, goal).unwrap();
        assert!(outcome.found);
        assert_relative_eq!(outcome.path_length(), diagonal, epsilon = 1e-9);
    }

    #[test]
    fn test_goal_reachable_only_by_cutting_corners() {
        // the goal at (3,2) is walled on all four axis sides
        let (grid, costs) = test_maps::parse(&[
            ".......",
            "...#...",
            "..#.#..",
            "...#...",
            ".......",
        ]);

        let outcome = planner_for(&grid).plan(&costs, Cell::new(0, 0), Cell::new(3, 2)).unwrap();
        assert!(!outcome.found);
        assert_unique_expansion(&grid, &outcome);

        let permissive = PlannerConfig { corner_cutting: CornerCutting::Allow, ..PlannerConfig::default() };
        let planner = LazyThetaStar::with_config(grid.nx(), grid.ny(), 1.0, permissive).unwrap();
        let outcome = planner.plan(&costs, Cell::new(0, 0), Cell::new(3, 2)).unwrap();
        assert!(outcome.found);
        assert_eq!(outcome.path_cells().last(), Some(&Cell::new(3, 2)));
    }

    #[test]
    fn test_iteration_budget_stops_search() {
        let (grid, costs) = test_maps::open(30);
        let config = PlannerConfig { max_iterations: Some(5), ..PlannerConfig::default() };
        let planner = LazyThetaStar::with_config(grid.nx(), grid.ny(), 1.0, config).unwrap();

        let outcome = planner.plan(&costs, Cell::new(0, 0), Cell::new(29, 29)).unwrap();

        assert!(!outcome.found);
        assert_eq!(outcome.stats.pops, 5);
        assert!(outcome.expand.len() <= 5);
    }

    #[test]
    fn test_tie_break_policies_both_reach_goal() {
        let (grid, costs) = test_maps::parse(&[
            "..........",
            "....#.....",
            "....#.....",
            "....#.....",
            "..........",
        ]);

        for tie_break in [TieBreak::LowerH, TieBreak::InsertionOrder] {
            let config = PlannerConfig { tie_break, ..PlannerConfig::default() };
            let planner = LazyThetaStar::with_config(grid.nx(), grid.ny(), 1.0, config).unwrap();
            let outcome = planner.plan(&costs, Cell::new(0, 2), Cell::new(9, 2)).unwrap();

            assert!(outcome.found);
            assert_valid(&grid, &costs, &outcome);
        }
    }

    #[test]
    fn test_obstacle_factor_lowers_threshold() {
        let (grid, mut costs) = test_maps::open(6);
        // a band of moderate cost splitting the map
        for y in 0..6 {
            costs[grid.coordinates_to_id(Cell::new(3, y))] = 150;
        }

        let lenient = planner_for(&grid);
        assert!(lenient.plan(&costs, Cell::new(0, 0), Cell::new(5, 0)).unwrap().found);

        let config = PlannerConfig { obstacle_factor: 0.5, ..PlannerConfig::default() };
        let strict = LazyThetaStar::with_config(grid.nx(), grid.ny(), 1.0, config).unwrap();
        assert!(!strict.plan(&costs, Cell::new(0, 0), Cell::new(5, 0)).unwrap().found);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlannerConfig { obstacle_factor: 2.0, ..PlannerConfig::default() };
        assert!(LazyThetaStar::with_config(5, 5, 1.0, config).is_err());
    }

    fn random_map() -> impl Strategy<Value = (Vec<u8>, (i32, i32), (i32, i32))> {
        (
            proptest::collection::vec(prop_oneof![4 => Just(0u8), 1 => Just(255u8)], 15 * 15),
            (0i32..15, 0i32..15),
            (0i32..15, 0i32..15),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_plan_is_deterministic_and_valid((costs, (sx, sy), (gx, gy)) in random_map()) {
            let grid = Grid::new(15, 15, 1.0).unwrap();
            let planner = planner_for(&grid);
            let (start, goal) = (Cell::new(sx, sy), Cell::new(gx, gy));

            let first = planner.plan(&costs, start, goal).unwrap();
            let second = planner.plan(&costs, start, goal).unwrap();

            prop_assert_eq!(first.found, second.found);
            prop_assert_eq!(first.path_cells(), second.path_cells());
            prop_assert_eq!(first.expand_cells(), second.expand_cells());

            assert_expanded_parents_confirmed(&grid, &costs, &first);
            if first.found {
                assert_valid(&grid, &costs, &first);
                prop_assert_eq!(first.path.first().map(|n| n.cell), Some(start));
                prop_assert_eq!(first.path.last().map(|n| n.cell), Some(goal));
            } else {
                prop_assert!(first.path.is_empty());
            }
            assert_unique_expansion(&grid, &first);
        }

        #[test]
        fn prop_reachability_matches_grid_a_star((costs, (sx, sy), (gx, gy)) in random_map()) {
            let grid = Grid::new(15, 15, 1.0).unwrap();
            let (start, goal) = (Cell::new(sx, sy), Cell::new(gx, gy));

            let theta = planner_for(&grid).plan(&costs, start, goal).unwrap();
            let a_star = GridSearch::a_star(15, 15, 1.0).unwrap().plan(&costs, start, goal).unwrap();

            // both searches share the motion model, so they agree on reachability
            prop_assert_eq!(theta.found, a_star.found);
        }
    }
}
