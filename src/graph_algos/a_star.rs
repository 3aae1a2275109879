use crate::errors::PathPlannerError;
use crate::collections::FxIndexMap;
use super::{shortest_path, GraphNodeMap};

use std::{
    collections::BinaryHeap,
    hash::Hash,
    fmt::Debug,
    cmp::Ordering
};
use num_traits::Zero;
use indexmap::map::Entry::{Occupied, Vacant};



/// Node on A* graph
#[derive(Debug)]
struct Node<T> {
    index: usize, // index in the node map - maps to the Id of the node
    cost: T, // Cost to reach this node
    f_cost: T, // Total cost = cost + h(n) aka estimated cost
    h_cost: T, // Heuristic alone, breaks ties between equal f_cost
}

impl<T: PartialOrd> Ord for Node<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Costs are only PartialOrd so floats can be used, incomparable values tie
        other.f_cost.partial_cmp(&self.f_cost).unwrap_or(Ordering::Equal)
            .then_with(|| other.h_cost.partial_cmp(&self.h_cost).unwrap_or(Ordering::Equal))
    }
}
impl<T: PartialOrd> PartialOrd for Node<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: PartialOrd> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T: PartialOrd> Eq for Node<T> {}


/// Everything a finished A* run produced
#[derive(Debug, Clone)]
pub struct AStarSearch<N, C> {
    pub path: Option<Vec<N>>, // start to goal, None if the goal was not reached
    pub expanded: Vec<(N, C)>, // nodes with their final cost, in the order they were expanded
    pub pops: usize, // entries taken off the open list, stale ones included
    pub stale_discards: usize, // entries skipped because a cheaper cost was already known
}


/// Node map plus bookkeeping from one traversal
struct SearchGraph<N, C> {
    node_map: GraphNodeMap<N, C>,
    goal_index: Option<usize>,
    expanded: Vec<usize>,
    pops: usize,
    stale_discards: usize,
}


/// A* Algorithm
/// https://en.wikipedia.org/wiki/A*_search_algorithm
#[derive(Debug, Clone, Default)]
pub struct AStar {
    max_expansions: Option<usize>, // cap on open list pops, None = unbounded
}

impl AStar{

    pub fn new() -> Self {
        Self::default()
    }

    /// Stop searching after `limit` pops from the open list
    pub fn with_max_expansions(limit: usize) -> Self {
        Self { max_expansions: Some(limit) }
    }

    /// From start Node, traverse through graph until node meets goal criteria
    /// The Approach has 2 requirements:
    /// 1. The heuristic function must be admissible (never overestimates the true cost to reach the goal)
    /// 2. A path actually exists between the start and goal nodes
    pub fn plan<N, C, IT, NN, H, G>(&self, start: N, neighbors: NN, heuristic_fn: H, goal_fn: G) -> Result<Vec<N>, PathPlannerError>
    where
        N: Eq + Hash + Clone + Debug,
        NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
        H: Fn(&N) -> C, // heuristic function
        IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
        C: Zero + PartialOrd + Copy + Debug,
        G: Fn(&N) -> bool, // node qualifier for goal
        {

        let search = self.search(start, neighbors, heuristic_fn, goal_fn)?;
        search.path.ok_or(PathPlannerError::NoPathFound)
    }


    /// Same traversal as `plan`, but also reports the expansion order
    /// An unreachable goal is not an error here, `path` is simply None
    pub fn search<N, C, IT, NN, H, G>(&self, start: N, neighbors: NN, heuristic_fn: H, goal_fn: G) -> Result<AStarSearch<N, C>, PathPlannerError>
    where
        N: Eq + Hash + Clone + Debug,
        NN: Fn(&N) -> IT,
        H: Fn(&N) -> C,
        IT: IntoIterator<Item = (N, C)>,
        C: Zero + PartialOrd + Copy + Debug,
        G: Fn(&N) -> bool,
        {

        let graph = self.build_graph(start, neighbors, heuristic_fn, goal_fn);

        let path = match graph.goal_index {
            Some(goal_index) => Some(shortest_path(&graph.node_map, goal_index)?),
            None => None,
        };

        let expanded = graph.expanded.iter()
            .filter_map(|&index| graph.node_map.get_index(index).map(|(node, &(_, cost))| (node.clone(), cost)))
            .collect();

        Ok(AStarSearch {
            path,
            expanded,
            pops: graph.pops,
            stale_discards: graph.stale_discards,
        })
    }


    /// Traverses the graph using A* algorithm
    /// Returns a map of nodes with their smallest costs along with the index of the goal node
    fn build_graph<N, C, IT, NN, H, G>(&self, start: N, neighbors: NN, heuristic_fn: H, goal_fn: G) -> SearchGraph<N, C>
    where
        N: Eq + Hash + Clone + Debug,
        NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
        IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
        C: Zero + PartialOrd + Copy + Debug,
        H: Fn(&N) -> C, // heuristic function
        G: Fn(&N) -> bool // Returns true if goal is met
    {
        // Open List
        // Nodes that need to be evaluated, implemented as priority queue
        // Sorting is done by f_cost (cost + heuristic), then by heuristic
        let mut open_list: BinaryHeap<Node<C>> = BinaryHeap::new();

        // Every node seen so far with its (parent_index, cost)
        // for the start node, parent_index is set to usize::MAX to indicate it has no parent
        let mut node_map: FxIndexMap<N, (usize, C)> = FxIndexMap::default();

        let mut graph_expanded: Vec<usize> = Vec::new();
        let mut pops = 0;
        let mut stale_discards = 0;

        let start_h = heuristic_fn(&start);
        let start_index = node_map.insert_full(start, (usize::MAX, Zero::zero())).0;
        open_list.push(Node{
            index: start_index,
            cost: Zero::zero(), // This is the cost from the start node
            f_cost: start_h, // cost + heuristic
            h_cost: start_h,
        });

        let mut goal_index = None;

        while let Some(Node{index, cost, ..}) = open_list.pop() {

            if self.max_expansions.is_some_and(|limit| pops >= limit) {
                tracing::warn!(limit = pops, "A* expansion budget exhausted");
                break;
            }
            pops += 1;

            // fetch current best cost for node
            let Some((node, &(_, c))) = node_map.get_index(index) else {
                debug_assert!(false, "open list entry {index} missing from node map");
                continue;
            };

            // If cost of new node from BinaryHeap is higher than the best cost, skip it
            // This implies we've already found a better path to this node
            if cost > c {
                stale_discards += 1;
                continue;
            }

            graph_expanded.push(index);

            // Check if we've reached the goal
            if goal_fn(node) {
                goal_index = Some(index);
                break;
            }

            // the node key is needed after node_map is borrowed mutably below
            let node = node.clone();

            // loop over neighbors
            for (neighbor, edge_cost) in neighbors(&node).into_iter() {

                // new cost to reach this node = edge cost + node cost
                // This is confirmed cost, not heuristic
                let new_cost = edge_cost + c;

                let neighbor_index: usize;
                // calculate heuristic cost
                let h_cost: C = heuristic_fn(&neighbor);

                match node_map.entry(neighbor) {
                    Vacant(e) => {
                        // This is the first time we're seeing this neighbor
                        neighbor_index = e.index();
                        e.insert((index, new_cost));
                    }
                    Occupied(mut e) => {
                        if e.get().1 > new_cost {
                            // We've found a better path to this neighbor
                            neighbor_index = e.index();
                            e.insert((index, new_cost));
                        } else {
                            // The existing path is better, do nothing
                            continue;
                        }
                    }
                }

                // Only add to the queue if we've found a better path
                open_list.push(Node {
                    index: neighbor_index,
                    cost: new_cost,
                    f_cost: new_cost + h_cost,
                    h_cost,
                });
            }
        }

        SearchGraph {
            node_map,
            goal_index,
            expanded: graph_expanded,
            pops,
            stale_discards,
        }
    }
}
