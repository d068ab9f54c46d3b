#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crossroads Defence engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that observers react to deterministically. Read-only consumers such as the
//! router depend on the [`TerrainView`] trait rather than on the concrete grid
//! storage.

use std::{fmt, str::FromStr};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Crossroads Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests placement of a structure on the provided cell.
    PlaceStructure {
        /// Type of structure to construct.
        kind: StructureKind,
        /// Cell the structure should occupy.
        cell: GridCoord,
    },
    /// Notifies the world that the structure occupying a cell was destroyed.
    DestroyStructure {
        /// Cell whose occupant should be cleared.
        cell: GridCoord,
    },
    /// Requests removal of a structure identified by its handle.
    RemoveStructure {
        /// Handle of the structure targeted for removal.
        structure: StructureId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a structure was placed into the world.
    StructurePlaced {
        /// Handle allocated to the structure by the world.
        structure: StructureId,
        /// Type of structure that was placed.
        kind: StructureKind,
        /// Cell occupied by the structure.
        cell: GridCoord,
    },
    /// Reports that a placement request was rejected.
    StructurePlacementRejected {
        /// Type of structure requested for placement.
        kind: StructureKind,
        /// Cell provided in the placement request.
        cell: GridCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a structure was destroyed and its cell cleared.
    StructureDestroyed {
        /// Handle of the structure that no longer exists.
        structure: StructureId,
        /// Type of structure that was destroyed.
        kind: StructureKind,
        /// Cell the structure previously occupied.
        cell: GridCoord,
    },
}

impl Event {
    /// Reports whether the event changed the occupancy of any cell.
    #[must_use]
    pub const fn changes_occupancy(&self) -> bool {
        matches!(
            self,
            Self::StructurePlaced { .. } | Self::StructureDestroyed { .. }
        )
    }
}

/// Cardinal movement directions available to enemies.
///
/// The declaration order doubles as the fixed expansion order used by route
/// searches, so it must stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward increasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Direction {
    /// All directions in their canonical expansion order.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit offset applied to a coordinate when stepping in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid cell.
///
/// Axes are signed so that world positions left of or above the origin map to
/// a representable, out-of-range coordinate rather than wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i32,
    y: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Coordinate one step away in the provided direction, if representable.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<GridCoord> {
        let (dx, dy) = direction.offset();
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Terrain classification assigned to every cell at generation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    /// Open ground with no special features.
    Empty,
    /// Road segment that enemies may traverse.
    Road,
    /// Road intersection or terminus; traversable and hosts road-end structures.
    RoadEnd,
    /// Terrain nothing may occupy or traverse.
    Impassable,
    /// Ground explicitly prepared for construction.
    Buildable,
}

impl CellType {
    /// Cell types that enemies are allowed to move across.
    pub const TRAVERSABLE: [CellType; 2] = [Self::Road, Self::RoadEnd];

    /// Reports whether enemies may move across cells of this type.
    #[must_use]
    pub fn is_traversable(self) -> bool {
        Self::TRAVERSABLE.contains(&self)
    }
}

/// Terrain constraint attached to a structure type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementRequirement {
    /// Any cell that is not impassable.
    Anywhere,
    /// Road cells, including road ends.
    RoadOnly,
    /// Road ends only.
    RoadEndsOnly,
    /// Water cells. No water terrain exists yet, so nothing is admitted.
    WaterOnly,
    /// Impassable cells. Reserved; nothing is admitted yet.
    ImpassableOnly,
}

impl PlacementRequirement {
    /// Cell types admitted by the requirement, ignoring occupancy.
    #[must_use]
    pub const fn admissible_cell_types(self) -> &'static [CellType] {
        match self {
            Self::Anywhere => &[
                CellType::Empty,
                CellType::Road,
                CellType::RoadEnd,
                CellType::Buildable,
            ],
            Self::RoadOnly => &[CellType::Road, CellType::RoadEnd],
            Self::RoadEndsOnly => &[CellType::RoadEnd],
            Self::WaterOnly | Self::ImpassableOnly => &[],
        }
    }

    /// Reports whether the requirement admits the provided cell type.
    #[must_use]
    pub fn admits(self, cell_type: CellType) -> bool {
        self.admissible_cell_types().contains(&cell_type)
    }
}

/// Types of structures that can be constructed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    /// Ranged tower that can stand on any passable ground.
    ArrowTower,
    /// Obstacle dropped onto a road segment.
    Barricade,
    /// Lookout that must sit on a road end.
    Watchpost,
    /// Waterside structure awaiting water terrain.
    Dock,
    /// Fortification built into impassable rock.
    Outpost,
}

impl StructureKind {
    /// Every structure kind in declaration order.
    pub const ALL: [StructureKind; 5] = [
        Self::ArrowTower,
        Self::Barricade,
        Self::Watchpost,
        Self::Dock,
        Self::Outpost,
    ];

    /// Placement requirement shared by every structure of this kind.
    #[must_use]
    pub const fn requirement(self) -> PlacementRequirement {
        match self {
            Self::ArrowTower => PlacementRequirement::Anywhere,
            Self::Barricade => PlacementRequirement::RoadOnly,
            Self::Watchpost => PlacementRequirement::RoadEndsOnly,
            Self::Dock => PlacementRequirement::WaterOnly,
            Self::Outpost => PlacementRequirement::ImpassableOnly,
        }
    }

    /// Stable snake-case name used in configuration files and the CLI.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArrowTower => "arrow_tower",
            Self::Barricade => "barricade",
            Self::Watchpost => "watchpost",
            Self::Dock => "dock",
            Self::Outpost => "outpost",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a structure kind name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown structure kind '{0}'")]
pub struct UnknownStructureKind(pub String);

impl FromStr for StructureKind {
    type Err = UnknownStructureKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| UnknownStructureKind(value.to_owned()))
    }
}

new_key_type! {
    /// Handle to a structure stored in the world's registry.
    ///
    /// The key carries a slot version that changes whenever the slot is
    /// reused, so a handle kept past its structure's destruction never
    /// resolves to a newer structure.
    pub struct StructureId;
}

/// Unique identifier assigned to an enemy by the movement layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The requested cell already holds a structure.
    #[error("cell is already occupied")]
    Occupied,
    /// The cell's terrain does not satisfy the structure's requirement.
    #[error("terrain does not satisfy the placement requirement")]
    TerrainMismatch,
}

/// Route across traversable cells, start and goal inclusive.
///
/// An empty route means no traversable connection exists. Routes are produced
/// fresh per request and never change after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    cells: Vec<GridCoord>,
    waypoints: Vec<Vec2>,
}

impl Route {
    /// Route signalling that the goal is unreachable.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cells: Vec::new(),
            waypoints: Vec::new(),
        }
    }

    /// Builds a route from ordered cells, resolving each cell's world-space centre.
    #[must_use]
    pub fn from_cells<T>(cells: Vec<GridCoord>, terrain: &T) -> Self
    where
        T: TerrainView + ?Sized,
    {
        let waypoints = cells.iter().map(|cell| terrain.cell_center(*cell)).collect();
        Self { cells, waypoints }
    }

    /// Reports whether the route is empty, meaning no path was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of waypoints, start and goal included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Number of orthogonal moves needed to walk the route.
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// World-space waypoints located at the centre of each visited cell.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Grid cells visited by the route in travel order.
    #[must_use]
    pub fn cells(&self) -> &[GridCoord] {
        &self.cells
    }
}

/// Orthogonal neighbours of a coordinate that lie inside a grid.
#[derive(Clone, Debug)]
pub struct Neighbors {
    candidates: [Option<GridCoord>; 4],
    cursor: usize,
}

impl Neighbors {
    /// Collects the in-grid neighbours of `center` in canonical direction order.
    pub fn within<F>(center: GridCoord, mut contains: F) -> Self
    where
        F: FnMut(GridCoord) -> bool,
    {
        let mut candidates = [None; 4];
        if contains(center) {
            for (slot, direction) in candidates.iter_mut().zip(Direction::ALL) {
                *slot = center.step(direction).filter(|next| contains(*next));
            }
        }
        Self {
            candidates,
            cursor: 0,
        }
    }
}

impl Iterator for Neighbors {
    type Item = GridCoord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.candidates.len() {
            let candidate = self.candidates[self.cursor];
            self.cursor += 1;
            if candidate.is_some() {
                return candidate;
            }
        }
        None
    }
}

/// Read-only terrain queries consumed by route searches and placement checks.
///
/// Every method is total: coordinates outside the terrain report absence
/// instead of failing.
pub trait TerrainView {
    /// Reports whether the coordinate lies inside the terrain.
    fn contains(&self, coord: GridCoord) -> bool;

    /// Terrain type of the cell, or `None` when out of range.
    fn cell_type(&self, coord: GridCoord) -> Option<CellType>;

    /// Reports whether a structure currently occupies the cell.
    fn is_occupied(&self, coord: GridCoord) -> bool;

    /// World-space centre of the cell.
    fn cell_center(&self, coord: GridCoord) -> Vec2;

    /// In-range orthogonal neighbours of the coordinate, diagonals excluded.
    fn neighbors(&self, coord: GridCoord) -> Neighbors {
        Neighbors::within(coord, |candidate| self.contains(candidate))
    }
}
