use crossroads_defence_core::GridCoord;
use crossroads_defence_world::{query, GridConfig, World};
use glam::Vec2;
use proptest::prelude::*;

const CELL_SIZE: f32 = 2.5;

fn world() -> World {
    World::generate(&GridConfig::new(40, 30, CELL_SIZE)).expect("valid config")
}

proptest! {
    #[test]
    fn prop_world_position_maps_to_centre_of_containing_cell(
        x in -50.0f32..150.0,
        y in -50.0f32..150.0,
    ) {
        let world = world();
        let grid = query::grid(&world);
        let position = Vec2::new(x, y);

        let cell = grid.world_to_grid(position);
        let centre = grid.grid_to_world(cell);

        prop_assert!((position.x - centre.x).abs() <= CELL_SIZE / 2.0 + 1e-3);
        prop_assert!((position.y - centre.y).abs() <= CELL_SIZE / 2.0 + 1e-3);
        prop_assert_eq!(grid.world_to_grid(centre), cell);
    }

    #[test]
    fn prop_in_range_coordinates_round_trip(column in 0i32..40, row in 0i32..30) {
        let world = world();
        let grid = query::grid(&world);
        let coord = GridCoord::new(column, row);

        prop_assert_eq!(grid.world_to_grid(grid.grid_to_world(coord)), coord);
        prop_assert!(grid.cell(coord).is_some());
    }

    #[test]
    fn prop_boundary_positions_floor_to_lower_cell(column in 0i32..40, row in 0i32..30) {
        let world = world();
        let grid = query::grid(&world);
        let corner = Vec2::new(column as f32 * CELL_SIZE, row as f32 * CELL_SIZE);

        prop_assert_eq!(grid.world_to_grid(corner), GridCoord::new(column, row));
    }
}
