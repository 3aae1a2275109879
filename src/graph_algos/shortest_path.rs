use crate::errors::PathPlannerError;
use super::GraphNodeMap;

/// Walk parent indices from `goal_index` back to the root of the node map
/// Returns the ordered path as a vector of nodes from start to goal
/// The root is the entry whose parent index is `usize::MAX`
pub(crate) fn shortest_path<N, C>(node_map: &GraphNodeMap<N, C>, goal_index: usize) -> Result<Vec<N>, PathPlannerError>
where
    N: Clone,
{

    let mut path = Vec::new();
    let mut current_index = goal_index;

    // Trace back from goal to start
    while current_index != usize::MAX {
        let Some((node, &(parent_index, _))) = node_map.get_index(current_index) else {
            return Err(PathPlannerError::NoPathFound);
        };
        path.push(node.clone());

        // a chain longer than the map can only be a cycle
        if path.len() > node_map.len() {
            return Err(PathPlannerError::NoPathFound);
        }
        current_index = parent_index;
    }

    // The path is in reverse order, so reverse it
    path.reverse();

    if path.is_empty() {
        return Err(PathPlannerError::NoPathFound);
    }

    Ok(path)
}
