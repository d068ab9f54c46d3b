//! Plain-text rendering of the terrain, structures and routes.

use std::collections::HashSet;

use crossroads_defence_core::{CellType, GridCoord, Route, StructureKind};
use crossroads_defence_world::{query, World};

const ROUTE_GLYPH: char = '*';

/// Draws one character per cell, one line per row.
///
/// Structures take precedence over route markers, which take precedence over
/// terrain.
pub(crate) fn render(world: &World, route: Option<&Route>) -> String {
    let grid = query::grid(world);
    let on_route: HashSet<GridCoord> = route
        .map(|route| route.cells().iter().copied().collect())
        .unwrap_or_default();

    let mut output = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    for (coord, cell) in grid.iter() {
        let glyph = match cell.occupant() {
            Some(structure) => query::structure(world, structure)
                .map_or('?', |record| structure_glyph(record.kind)),
            None if on_route.contains(&coord) => ROUTE_GLYPH,
            None => terrain_glyph(cell.cell_type()),
        };
        output.push(glyph);
        if coord.x() + 1 == grid.width() as i32 {
            output.push('\n');
        }
    }
    output
}

/// Legend listing every glyph the renderer may emit.
pub(crate) fn legend() -> String {
    let terrain = [
        CellType::Empty,
        CellType::Road,
        CellType::RoadEnd,
        CellType::Impassable,
        CellType::Buildable,
    ]
    .into_iter()
    .map(|cell_type| format!("{} {cell_type:?}", terrain_glyph(cell_type)));
    let structures = StructureKind::ALL
        .into_iter()
        .map(|kind| format!("{} {kind}", structure_glyph(kind)));

    terrain
        .chain(structures)
        .chain(std::iter::once(format!("{ROUTE_GLYPH} route")))
        .collect::<Vec<_>>()
        .join("  ")
}

fn terrain_glyph(cell_type: CellType) -> char {
    match cell_type {
        CellType::Empty => '.',
        CellType::Road => '=',
        CellType::RoadEnd => '+',
        CellType::Impassable => '#',
        CellType::Buildable => '_',
    }
}

fn structure_glyph(kind: StructureKind) -> char {
    match kind {
        StructureKind::ArrowTower => 'A',
        StructureKind::Barricade => 'B',
        StructureKind::Watchpost => 'W',
        StructureKind::Dock => 'D',
        StructureKind::Outpost => 'O',
    }
}
