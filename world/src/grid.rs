//! Terrain storage and coordinate-space translation.

use crossroads_defence_core::{
    CellType, GridCoord, Neighbors, PlacementError, StructureId, StructureKind, TerrainView,
};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::placement;

const DEFAULT_GRID_WIDTH: u32 = 20;
const DEFAULT_GRID_HEIGHT: u32 = 20;
const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Parameters consumed by the procedural terrain generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of cell columns.
    pub width: u32,
    /// Number of cell rows.
    pub height: u32,
    /// Side length of a square cell in world units.
    pub cell_size: f32,
    /// Columns carrying a north-south road. Defaults to the quarter lines.
    pub road_columns: Option<Vec<u32>>,
    /// Rows carrying an east-west road. Defaults to the quarter lines.
    pub road_rows: Option<Vec<u32>>,
    /// Explicit terrain assignments applied after the road pattern.
    pub overrides: Vec<TerrainOverride>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            road_columns: None,
            road_rows: None,
            overrides: Vec::new(),
        }
    }
}

impl GridConfig {
    /// Creates a configuration using the default road layout.
    #[must_use]
    pub fn new(width: u32, height: u32, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            ..Self::default()
        }
    }

    /// Adds a terrain override applied after the road pattern.
    #[must_use]
    pub fn with_override(mut self, cell: GridCoord, cell_type: CellType) -> Self {
        self.overrides.push(TerrainOverride {
            x: cell.x(),
            y: cell.y(),
            cell_type,
        });
        self
    }

    fn resolved_road_columns(&self) -> Vec<u32> {
        self.road_columns
            .clone()
            .unwrap_or_else(|| quarter_lines(self.width))
    }

    fn resolved_road_rows(&self) -> Vec<u32> {
        self.road_rows
            .clone()
            .unwrap_or_else(|| quarter_lines(self.height))
    }
}

/// Single terrain assignment applied at generation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainOverride {
    /// Column of the overridden cell.
    pub x: i32,
    /// Row of the overridden cell.
    pub y: i32,
    /// Terrain assigned to the cell.
    pub cell_type: CellType,
}

/// Reasons terrain generation may refuse a configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GridError {
    /// At least one dimension was zero.
    #[error("grid dimensions {width}x{height} must both be positive")]
    EmptyDimensions {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The grid would hold more cells than coordinates or handles can address.
    #[error("grid dimensions {width}x{height} are too large")]
    DimensionsTooLarge {
        /// Requested column count.
        width: u32,
        /// Requested row count.
        height: u32,
    },
    /// The cell size was zero, negative, or not finite.
    #[error("cell size {0} must be a positive finite number")]
    InvalidCellSize(f32),
    /// A terrain override pointed outside the grid.
    #[error("terrain override at {0} lies outside the grid")]
    OverrideOutOfBounds(GridCoord),
}

/// Atomic unit of terrain: a type tag plus at most one occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    cell_type: CellType,
    occupant: Option<StructureId>,
}

impl Cell {
    pub(crate) const fn new(cell_type: CellType) -> Self {
        Self {
            cell_type,
            occupant: None,
        }
    }

    /// Terrain type assigned at generation time.
    #[must_use]
    pub const fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// Structure currently occupying the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<StructureId> {
        self.occupant
    }

    /// Reports whether a structure occupies the cell.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub(crate) fn set_occupant(&mut self, structure: StructureId) {
        debug_assert!(
            self.occupant.is_none(),
            "double occupancy: {structure:?} registered over {:?}",
            self.occupant
        );
        self.occupant = Some(structure);
    }

    pub(crate) fn clear_occupant(&mut self) -> Option<StructureId> {
        self.occupant.take()
    }
}

/// Authoritative terrain store covering `[0, width) x [0, height)`.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cell_size: f32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Generates the crossroads terrain described by the configuration.
    ///
    /// Border cells become [`CellType::Impassable`], cells on both a road
    /// column and a road row become [`CellType::RoadEnd`], cells on exactly one
    /// road line become [`CellType::Road`], and everything else is
    /// [`CellType::Empty`]. Overrides are applied last.
    pub fn generate(config: &GridConfig) -> Result<Self, GridError> {
        let road_columns = config.resolved_road_columns();
        let road_rows = config.resolved_road_rows();
        let (width, height) = (config.width, config.height);

        let mut grid = Self::from_fn(width, height, config.cell_size, |coord| {
            crossroads_cell_type(coord, width, height, &road_columns, &road_rows)
        })?;

        for entry in &config.overrides {
            let coord = GridCoord::new(entry.x, entry.y);
            let index = grid
                .index(coord)
                .ok_or(GridError::OverrideOutOfBounds(coord))?;
            grid.cells[index] = Cell::new(entry.cell_type);
        }

        Ok(grid)
    }

    /// Builds a grid whose terrain is produced by `terrain` for every coordinate.
    pub fn from_fn<F>(
        width: u32,
        height: u32,
        cell_size: f32,
        mut terrain: F,
    ) -> Result<Self, GridError>
    where
        F: FnMut(GridCoord) -> CellType,
    {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        let too_large = GridError::DimensionsTooLarge { width, height };
        let columns = i32::try_from(width).map_err(|_| too_large.clone())?;
        let rows = i32::try_from(height).map_err(|_| too_large.clone())?;
        let capacity = u32::try_from(u64::from(width) * u64::from(height))
            .ok()
            .and_then(|count| usize::try_from(count).ok())
            .ok_or(too_large)?;

        let mut cells = Vec::with_capacity(capacity);
        for y in 0..rows {
            for x in 0..columns {
                cells.push(Cell::new(terrain(GridCoord::new(x, y))));
            }
        }

        Ok(Self {
            width,
            height,
            cell_size,
            cells,
        })
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Maps a world position to the cell containing it.
    ///
    /// Both planar components are divided by the cell size and floored, so a
    /// position lying exactly on a boundary belongs to the cell whose
    /// coordinate is the floor. The result may lie outside the grid; a
    /// position with a non-finite component always does.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec2) -> GridCoord {
        let scaled = (position / self.cell_size).floor();
        if !scaled.is_finite() {
            return GridCoord::new(i32::MIN, i32::MIN);
        }
        GridCoord::new(scaled.x as i32, scaled.y as i32)
    }

    /// World-space centre of the provided cell.
    #[must_use]
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec2 {
        let half = self.cell_size / 2.0;
        Vec2::new(
            coord.x() as f32 * self.cell_size + half,
            coord.y() as f32 * self.cell_size + half,
        )
    }

    /// Looks up the cell at the coordinate; `None` when out of range.
    #[must_use]
    pub fn cell(&self, coord: GridCoord) -> Option<&Cell> {
        self.index(coord).map(|index| &self.cells[index])
    }

    pub(crate) fn cell_mut(&mut self, coord: GridCoord) -> Option<&mut Cell> {
        self.index(coord).map(|index| &mut self.cells[index])
    }

    /// Up to four axis-aligned neighbours that exist in the grid.
    #[must_use]
    pub fn neighbors(&self, coord: GridCoord) -> Neighbors {
        TerrainView::neighbors(self, coord)
    }

    /// Resolves the cell under a world position and asks the placement rules
    /// whether `kind` may be built there.
    #[must_use]
    pub fn is_valid_placement(&self, position: Vec2, kind: StructureKind) -> bool {
        self.check_placement(self.world_to_grid(position), kind).is_ok()
    }

    /// Checks whether `kind` may be built on the cell, reporting why not.
    pub fn check_placement(
        &self,
        coord: GridCoord,
        kind: StructureKind,
    ) -> Result<(), PlacementError> {
        let cell = self.cell(coord).ok_or(PlacementError::OutOfBounds)?;
        placement::check(cell, kind.requirement())
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, &Cell)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let x = (index % width) as i32;
            let y = (index / width) as i32;
            (GridCoord::new(x, y), cell)
        })
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        let x = u32::try_from(coord.x()).ok()?;
        let y = u32::try_from(coord.y()).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

impl TerrainView for Grid {
    fn contains(&self, coord: GridCoord) -> bool {
        self.index(coord).is_some()
    }

    fn cell_type(&self, coord: GridCoord) -> Option<CellType> {
        self.cell(coord).map(Cell::cell_type)
    }

    fn is_occupied(&self, coord: GridCoord) -> bool {
        self.cell(coord).is_some_and(Cell::is_occupied)
    }

    fn cell_center(&self, coord: GridCoord) -> Vec2 {
        self.grid_to_world(coord)
    }
}

fn quarter_lines(extent: u32) -> Vec<u32> {
    let mut lines = vec![extent / 4, extent.saturating_mul(3) / 4];
    lines.dedup();
    lines
}

fn crossroads_cell_type(
    coord: GridCoord,
    width: u32,
    height: u32,
    road_columns: &[u32],
    road_rows: &[u32],
) -> CellType {
    let (Ok(x), Ok(y)) = (u32::try_from(coord.x()), u32::try_from(coord.y())) else {
        return CellType::Impassable;
    };

    let on_border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
    if on_border {
        return CellType::Impassable;
    }

    match (road_columns.contains(&x), road_rows.contains(&y)) {
        (true, true) => CellType::RoadEnd,
        (true, false) | (false, true) => CellType::Road,
        (false, false) => CellType::Empty,
    }
}
