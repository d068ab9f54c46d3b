//! Placement rules deciding which structures may occupy which cells.
//!
//! The rules are a pure function of the cell's terrain, its occupancy, and the
//! structure type's [`PlacementRequirement`]. Terrain-to-requirement
//! compatibility is looked up in the table exposed by
//! [`PlacementRequirement::admissible_cell_types`], so new structure kinds
//! only need a requirement and never touch the grid.

use crossroads_defence_core::{PlacementError, PlacementRequirement};

use crate::grid::Cell;

/// Checks whether a structure with `requirement` may be placed on `cell`.
///
/// Occupancy is checked first: no requirement overrides single occupancy.
pub fn check(cell: &Cell, requirement: PlacementRequirement) -> Result<(), PlacementError> {
    if cell.is_occupied() {
        return Err(PlacementError::Occupied);
    }
    if requirement.admits(cell.cell_type()) {
        Ok(())
    } else {
        Err(PlacementError::TerrainMismatch)
    }
}
