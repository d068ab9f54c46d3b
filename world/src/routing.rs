//! Breadth-first route search across traversable terrain.

use std::collections::{HashMap, VecDeque};

use crossroads_defence_core::{GridCoord, Route, TerrainView};
use tracing::trace;

/// Whether occupied cells take part in route searches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OccupancyRule {
    /// Only terrain decides traversability; structures are ignored.
    #[default]
    Ignore,
    /// Occupied cells are treated as blocked, except for the start cell.
    Avoid,
}

/// Route planner over any [`TerrainView`].
///
/// All traversable cells share the same cost, so a breadth-first search
/// already yields a shortest route by hop count. Neighbours are expanded in
/// the fixed [`Direction::ALL`](crossroads_defence_core::Direction::ALL)
/// order, which makes the chosen route deterministic for a given terrain.
/// The router holds no search state and never mutates the terrain, so it can
/// be shared and called concurrently while the terrain is read-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Router {
    occupancy: OccupancyRule,
}

impl Router {
    /// Creates a router applying the provided occupancy rule.
    #[must_use]
    pub const fn new(occupancy: OccupancyRule) -> Self {
        Self { occupancy }
    }

    /// Reports whether a route may pass through the cell.
    #[must_use]
    pub fn is_traversable<T>(&self, terrain: &T, coord: GridCoord) -> bool
    where
        T: TerrainView + ?Sized,
    {
        terrain_allows(terrain, coord)
            && match self.occupancy {
                OccupancyRule::Ignore => true,
                OccupancyRule::Avoid => !terrain.is_occupied(coord),
            }
    }

    /// Computes a shortest route from `start` to `goal`.
    ///
    /// Returns an empty route when either endpoint is untraversable or the goal
    /// cannot be reached.
    #[must_use]
    pub fn find_path<T>(&self, terrain: &T, start: GridCoord, goal: GridCoord) -> Route
    where
        T: TerrainView + ?Sized,
    {
        if !terrain_allows(terrain, start) || !self.is_traversable(terrain, goal) {
            trace!(%start, %goal, "route endpoints are not traversable");
            return Route::empty();
        }

        let mut came_from: HashMap<GridCoord, Option<GridCoord>> = HashMap::new();
        let mut queue = VecDeque::new();
        let _ = came_from.insert(start, None);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                let cells = reconstruct(&came_from, goal);
                trace!(
                    %start,
                    %goal,
                    hops = cells.len().saturating_sub(1),
                    explored = came_from.len(),
                    "route found"
                );
                return Route::from_cells(cells, terrain);
            }

            for next in terrain.neighbors(current) {
                if came_from.contains_key(&next) || !self.is_traversable(terrain, next) {
                    continue;
                }
                let _ = came_from.insert(next, Some(current));
                queue.push_back(next);
            }
        }

        trace!(
            %start,
            %goal,
            distance = start.manhattan_distance(goal),
            explored = came_from.len(),
            "route not found"
        );
        Route::empty()
    }
}

fn terrain_allows<T>(terrain: &T, coord: GridCoord) -> bool
where
    T: TerrainView + ?Sized,
{
    terrain
        .cell_type(coord)
        .is_some_and(|cell_type| cell_type.is_traversable())
}

fn reconstruct(
    came_from: &HashMap<GridCoord, Option<GridCoord>>,
    goal: GridCoord,
) -> Vec<GridCoord> {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(Some(previous)) = came_from.get(&current) {
        cells.push(*previous);
        current = *previous;
    }
    cells.reverse();
    cells
}
