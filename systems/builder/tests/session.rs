use std::collections::BTreeMap;

use crossroads_defence_core::{CellType, Command, Event, GridCoord, PlacementError, StructureKind};
use crossroads_defence_system_builder::{
    BuilderInput, CommitOutcome, PlacementPreview, PlacementSession, ResourceLedger, SessionState,
    Unmetered,
};
use crossroads_defence_world::{self as world, query, Grid, GridConfig, World};
use glam::Vec2;

#[derive(Debug)]
struct Purse {
    gold: u32,
    costs: BTreeMap<StructureKind, u32>,
    charged: Vec<StructureKind>,
}

impl Purse {
    fn with_gold(gold: u32) -> Self {
        let costs = StructureKind::ALL.into_iter().map(|kind| (kind, 10)).collect();
        Self {
            gold,
            costs,
            charged: Vec::new(),
        }
    }
}

impl ResourceLedger for Purse {
    fn can_afford(&self, kind: StructureKind) -> bool {
        self.costs.get(&kind).is_some_and(|cost| *cost <= self.gold)
    }

    fn charge(&mut self, kind: StructureKind) {
        let cost = self.costs.get(&kind).copied().unwrap_or(0);
        self.gold -= cost;
        self.charged.push(kind);
    }
}

fn crossroads() -> World {
    World::generate(&GridConfig::default()).expect("default config is valid")
}

fn centre_of(world: &World, x: i32, y: i32) -> Vec2 {
    query::grid(world).grid_to_world(GridCoord::new(x, y))
}

#[test]
fn valid_commit_places_charges_and_returns_to_idle() {
    let mut world = crossroads();
    let mut session = PlacementSession::new();
    let mut purse = Purse::with_gold(25);
    let mut events = Vec::new();

    session.begin_placement(StructureKind::Watchpost);
    assert_eq!(session.state(), SessionState::Previewing);
    assert!(session.update_cursor(&world, centre_of(&world, 5, 5)));
    assert_eq!(
        session.preview(),
        Some(PlacementPreview {
            kind: StructureKind::Watchpost,
            cell: GridCoord::new(5, 5),
            placeable: true,
        })
    );

    let outcome = session.commit(&mut world, &mut purse, &mut events);

    let structure = query::structure_at(&world, GridCoord::new(5, 5)).expect("placed");
    assert_eq!(outcome, CommitOutcome::Placed(structure));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(purse.charged, vec![StructureKind::Watchpost]);
    assert_eq!(purse.gold, 15);
    assert_eq!(
        events,
        vec![Event::StructurePlaced {
            structure,
            kind: StructureKind::Watchpost,
            cell: GridCoord::new(5, 5),
        }]
    );
}

#[test]
fn invalid_commit_is_a_no_op() {
    let mut world = crossroads();
    let mut session = PlacementSession::new();
    let mut purse = Purse::with_gold(100);
    let mut events = Vec::new();
    let before = query::occupancy_snapshot(&world);

    session.begin_placement(StructureKind::Watchpost);
    assert!(!session.update_cursor(&world, centre_of(&world, 6, 5)));

    assert_eq!(
        session.commit(&mut world, &mut purse, &mut events),
        CommitOutcome::Invalid
    );
    assert_eq!(
        session.commit(&mut world, &mut purse, &mut events),
        CommitOutcome::Invalid
    );

    assert_eq!(session.state(), SessionState::Previewing);
    assert_eq!(query::occupancy_snapshot(&world), before);
    assert!(events.is_empty());
    assert!(purse.charged.is_empty());
}

#[test]
fn commit_without_cursor_is_invalid() {
    let mut world = crossroads();
    let mut session = PlacementSession::new();
    let mut events = Vec::new();

    session.begin_placement(StructureKind::ArrowTower);

    assert_eq!(session.preview(), None);
    assert_eq!(
        session.commit(&mut world, &mut Unmetered, &mut events),
        CommitOutcome::Invalid
    );
    assert_eq!(session.state(), SessionState::Previewing);
}

#[test]
fn unaffordable_commit_keeps_previewing() {
    let mut world = crossroads();
    let mut session = PlacementSession::new();
    let mut purse = Purse::with_gold(5);
    let mut events = Vec::new();
    let before = query::occupancy_snapshot(&world);

    session.begin_placement(StructureKind::ArrowTower);
    assert!(session.update_cursor(&world, centre_of(&world, 8, 8)));

    assert_eq!(
        session.commit(&mut world, &mut purse, &mut events),
        CommitOutcome::Unaffordable
    );
    assert_eq!(session.state(), SessionState::Previewing);
    assert!(session.is_valid());
    assert_eq!(query::occupancy_snapshot(&world), before);
    assert!(purse.charged.is_empty());
}

#[test]
fn commit_revalidates_against_current_occupancy() {
    let mut world = crossroads();
    let mut session = PlacementSession::new();
    let mut purse = Purse::with_gold(100);
    let mut events = Vec::new();

    session.begin_placement(StructureKind::Barricade);
    assert!(session.update_cursor(&world, centre_of(&world, 7, 5)));

    world::apply(
        &mut world,
        Command::PlaceStructure {
            kind: StructureKind::ArrowTower,
            cell: GridCoord::new(7, 5),
        },
        &mut Vec::new(),
    );
    let occupant = query::structure_at(&world, GridCoord::new(7, 5));

    let outcome = session.commit(&mut world, &mut purse, &mut events);

    assert_eq!(outcome, CommitOutcome::Rejected(PlacementError::Occupied));
    assert_eq!(session.state(), SessionState::Previewing);
    assert!(!session.is_valid());
    assert_eq!(query::structure_at(&world, GridCoord::new(7, 5)), occupant);
    assert!(purse.charged.is_empty());
}

#[test]
fn beginning_again_replaces_the_previous_candidate() {
    let world = crossroads();
    let mut session = PlacementSession::new();

    session.begin_placement(StructureKind::Watchpost);
    assert!(session.update_cursor(&world, centre_of(&world, 5, 5)));

    session.begin_placement(StructureKind::Barricade);

    assert_eq!(session.candidate(), Some(StructureKind::Barricade));
    assert_eq!(session.cursor(), None);
    assert!(!session.is_valid());
    assert_eq!(session.state(), SessionState::Previewing);
}

#[test]
fn cancel_discards_candidate_without_touching_the_grid() {
    let world = crossroads();
    let mut session = PlacementSession::new();
    let before = query::occupancy_snapshot(&world);

    session.begin_placement(StructureKind::ArrowTower);
    let _ = session.update_cursor(&world, centre_of(&world, 8, 8));

    assert_eq!(session.cancel(), Some(StructureKind::ArrowTower));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.cancel(), None);
    assert_eq!(query::occupancy_snapshot(&world), before);
}

#[test]
fn idle_session_ignores_cursor_and_commit() {
    let mut world = crossroads();
    let mut session = PlacementSession::default();
    let mut events = Vec::new();

    assert!(!session.update_cursor(&world, centre_of(&world, 5, 5)));
    assert_eq!(
        session.commit(&mut world, &mut Unmetered, &mut events),
        CommitOutcome::NotPreviewing
    );
    assert!(events.is_empty());
}

#[test]
fn cursor_outside_the_grid_is_never_valid() {
    let world = crossroads();
    let mut session = PlacementSession::new();

    session.begin_placement(StructureKind::ArrowTower);

    assert!(!session.update_cursor(&world, Vec2::new(-0.25, 3.0)));
    assert_eq!(session.cursor(), Some(GridCoord::new(-1, 3)));
    assert!(!session.update_cursor(&world, Vec2::new(400.0, 3.0)));
}

#[test]
fn destroyed_structure_can_be_replaced_through_a_session() {
    let mut world = crossroads();
    let mut session = PlacementSession::new();
    let mut events = Vec::new();
    let cell = GridCoord::new(5, 5);

    session.begin_placement(StructureKind::Watchpost);
    let _ = session.update_cursor(&world, centre_of(&world, 5, 5));
    assert!(session.commit(&mut world, &mut Unmetered, &mut events).is_placed());

    session.begin_placement(StructureKind::Watchpost);
    assert!(!session.update_cursor(&world, centre_of(&world, 5, 5)));

    world::apply(&mut world, Command::DestroyStructure { cell }, &mut events);
    assert!(query::structure_at(&world, cell).is_none());

    assert!(session.update_cursor(&world, centre_of(&world, 5, 5)));
    assert!(session.commit(&mut world, &mut Unmetered, &mut events).is_placed());
    assert!(query::structure_at(&world, cell).is_some());
}

#[test]
fn frame_input_drives_the_session() {
    let mut world = crossroads();
    let mut session = PlacementSession::new();
    let mut events = Vec::new();
    let cursor = Some(centre_of(&world, 6, 5));

    session.begin_placement(StructureKind::Barricade);

    let cancelled = session.handle(
        BuilderInput {
            cursor_world_space: cursor,
            confirm_action: true,
            cancel_action: true,
        },
        &mut world,
        &mut Unmetered,
        &mut events,
    );
    assert_eq!(cancelled, None, "cancellation wins over confirmation");
    assert_eq!(session.state(), SessionState::Idle);

    session.begin_placement(StructureKind::Barricade);
    let hovered = session.handle(
        BuilderInput {
            cursor_world_space: cursor,
            ..BuilderInput::default()
        },
        &mut world,
        &mut Unmetered,
        &mut events,
    );
    assert_eq!(hovered, None);
    assert!(session.is_valid());

    let confirmed = session.handle(
        BuilderInput {
            confirm_action: true,
            ..BuilderInput::default()
        },
        &mut world,
        &mut Unmetered,
        &mut events,
    );
    assert!(confirmed.is_some_and(|outcome| outcome.is_placed()));
    assert!(query::structure_at(&world, GridCoord::new(6, 5)).is_some());
}

#[test]
fn non_finite_cursor_never_commits() {
    let grid = Grid::from_fn(4, 4, 1.0, |_| CellType::Empty).expect("valid grid");
    let mut world = World::new(grid);
    let mut session = PlacementSession::new();
    let mut purse = Purse::with_gold(25);
    let mut events = Vec::new();

    session.begin_placement(StructureKind::ArrowTower);
    assert!(!session.update_cursor(&world, Vec2::NAN));
    assert!(!session.is_valid());

    assert_eq!(
        session.commit(&mut world, &mut purse, &mut events),
        CommitOutcome::Invalid
    );
    assert!(events.is_empty());
    assert!(purse.charged.is_empty());
    assert_eq!(query::structure_count(&world), 0);
    assert!(query::structure_at(&world, GridCoord::new(0, 0)).is_none());
    assert_eq!(session.state(), SessionState::Previewing);
}
