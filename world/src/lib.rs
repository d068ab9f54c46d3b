#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Crossroads Defence.
//!
//! The world owns the terrain [`Grid`] and the structure registry. All
//! occupancy mutations go through [`apply`], which re-validates every
//! placement immediately before touching a cell and reports the outcome as
//! [`Event`] values. Read-only access is grouped in the [`query`] module.

mod grid;
pub mod placement;
mod routing;
mod structures;

use crossroads_defence_core::{Command, Event, GridCoord, StructureKind, WELCOME_BANNER};
use tracing::{debug, trace, warn};

pub use grid::{Cell, Grid, GridConfig, GridError, TerrainOverride};
pub use routing::{OccupancyRule, Router};
pub use structures::StructureRecord;

use structures::StructureRegistry;

/// Represents the authoritative Crossroads Defence world state.
#[derive(Clone, Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    structures: StructureRegistry,
}

impl World {
    /// Creates a world around an already generated grid.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid,
            structures: StructureRegistry::new(),
        }
    }

    /// Generates the terrain described by `config` and wraps it in a world.
    pub fn generate(config: &GridConfig) -> Result<Self, GridError> {
        Grid::generate(config).map(Self::new)
    }

    fn place(&mut self, kind: StructureKind, cell: GridCoord, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.grid.check_placement(cell, kind) {
            debug!(%kind, %cell, %reason, "structure placement rejected");
            out_events.push(Event::StructurePlacementRejected { kind, cell, reason });
            return;
        }

        let structure = self.structures.insert(kind, cell);
        let Some(target) = self.grid.cell_mut(cell) else {
            let _ = self.structures.remove(structure);
            return;
        };
        target.set_occupant(structure);

        debug!(?structure, %kind, %cell, "structure placed");
        out_events.push(Event::StructurePlaced {
            structure,
            kind,
            cell,
        });
    }

    fn destroy_at(&mut self, cell: GridCoord, out_events: &mut Vec<Event>) {
        let Some(structure) = self.grid.cell_mut(cell).and_then(Cell::clear_occupant) else {
            trace!(%cell, "destruction notice for an empty cell");
            return;
        };

        let Some(record) = self.structures.remove(structure) else {
            warn!(?structure, %cell, "occupant missing from structure registry");
            return;
        };

        debug!(?structure, kind = %record.kind, %cell, "structure destroyed");
        out_events.push(Event::StructureDestroyed {
            structure,
            kind: record.kind,
            cell,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceStructure { kind, cell } => world.place(kind, cell, out_events),
        Command::DestroyStructure { cell } => world.destroy_at(cell, out_events),
        Command::RemoveStructure { structure } => {
            let Some(cell) = world.structures.get(structure).map(|record| record.cell) else {
                debug!(?structure, "removal requested for an unknown structure");
                return;
            };
            world.destroy_at(cell, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use crossroads_defence_core::{GridCoord, StructureId};

    use super::{Grid, StructureRecord, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's terrain grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Resolves a structure handle, returning `None` once it was destroyed.
    #[must_use]
    pub fn structure(world: &World, structure: StructureId) -> Option<&StructureRecord> {
        world.structures.get(structure)
    }

    /// Confirms that a handle still names a live structure.
    #[must_use]
    pub fn is_live(world: &World, structure: StructureId) -> bool {
        world.structures.get(structure).is_some()
    }

    /// Structure occupying the provided cell, if any.
    #[must_use]
    pub fn structure_at(world: &World, cell: GridCoord) -> Option<StructureId> {
        world.grid.cell(cell).and_then(|cell| cell.occupant())
    }

    /// Captures a read-only view of every live structure.
    #[must_use]
    pub fn structure_view(world: &World) -> StructureView {
        StructureView::from_records(world.structures.iter().copied().collect())
    }

    /// Number of live structures.
    #[must_use]
    pub fn structure_count(world: &World) -> usize {
        world.structures.len()
    }

    /// Captures the occupant of every occupied cell in row-major order.
    #[must_use]
    pub fn occupancy_snapshot(world: &World) -> Vec<(GridCoord, StructureId)> {
        world
            .grid
            .iter()
            .filter_map(|(coord, cell)| cell.occupant().map(|occupant| (coord, occupant)))
            .collect()
    }

    /// Read-only snapshot describing all structures placed in the world.
    #[derive(Clone, Debug, Default)]
    pub struct StructureView {
        records: Vec<StructureRecord>,
    }

    impl StructureView {
        fn from_records(mut records: Vec<StructureRecord>) -> Self {
            records.sort_by_key(|record| record.id);
            Self { records }
        }

        /// Iterator over the captured records in handle order.
        pub fn iter(&self) -> impl Iterator<Item = &StructureRecord> {
            self.records.iter()
        }
    }
}
