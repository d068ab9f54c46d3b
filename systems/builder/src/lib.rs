#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Placement session that binds a candidate structure to a live cursor and
//! mediates the commit against the world and an external resource ledger.

use crossroads_defence_core::{
    Command, Event, GridCoord, PlacementError, StructureId, StructureKind,
};
use crossroads_defence_world::{self as world, query, World};
use glam::Vec2;
use tracing::debug;

/// Resource accounting collaborator consulted when a placement is committed.
pub trait ResourceLedger {
    /// Reports whether the player can currently pay for the structure.
    fn can_afford(&self, kind: StructureKind) -> bool;

    /// Deducts the structure's cost. Only called after the structure exists.
    fn charge(&mut self, kind: StructureKind);
}

/// Ledger that lets every structure be built for free.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unmetered;

impl ResourceLedger for Unmetered {
    fn can_afford(&self, _kind: StructureKind) -> bool {
        true
    }

    fn charge(&mut self, _kind: StructureKind) {}
}

/// Declarative placement preview describing a potential construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of structure proposed for placement.
    pub kind: StructureKind,
    /// Cell under the cursor.
    pub cell: GridCoord,
    /// Indicates whether the preview represents a valid placement location.
    pub placeable: bool,
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Cursor position in world units, when the cursor is over the play area.
    pub cursor_world_space: Option<Vec2>,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player abandoned the placement on this frame.
    pub cancel_action: bool,
}

/// Observable phase of the placement workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No structure is being placed.
    Idle,
    /// A candidate follows the cursor and awaits commit or cancellation.
    Previewing,
}

/// Result of a commit attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The structure was built; the session returned to idle.
    Placed(StructureId),
    /// No placement was in progress.
    NotPreviewing,
    /// The cursor is missing or over a cell the candidate cannot occupy.
    Invalid,
    /// The resource ledger refused the purchase.
    Unaffordable,
    /// The world refused the placement because the terrain changed since the
    /// last cursor update.
    Rejected(PlacementError),
}

impl CommitOutcome {
    /// Reports whether the commit constructed a structure.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed(_))
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    kind: StructureKind,
    cursor: Option<GridCoord>,
    is_valid: bool,
}

/// Stateful placement workflow. At most one candidate is tracked at a time.
#[derive(Clone, Debug, Default)]
pub struct PlacementSession {
    candidate: Option<Candidate>,
}

impl PlacementSession {
    /// Creates an idle session.
    #[must_use]
    pub const fn new() -> Self {
        Self { candidate: None }
    }

    /// Current workflow phase.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        match self.candidate {
            Some(_) => SessionState::Previewing,
            None => SessionState::Idle,
        }
    }

    /// Structure kind being placed, if any.
    #[must_use]
    pub fn candidate(&self) -> Option<StructureKind> {
        self.candidate.map(|candidate| candidate.kind)
    }

    /// Cell under the cursor as of the last update.
    #[must_use]
    pub fn cursor(&self) -> Option<GridCoord> {
        self.candidate.and_then(|candidate| candidate.cursor)
    }

    /// Whether the candidate may be built on the cursor cell.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.candidate.is_some_and(|candidate| candidate.is_valid)
    }

    /// Preview suitable for presentation, once the cursor has been placed.
    #[must_use]
    pub fn preview(&self) -> Option<PlacementPreview> {
        let candidate = self.candidate?;
        Some(PlacementPreview {
            kind: candidate.kind,
            cell: candidate.cursor?,
            placeable: candidate.is_valid,
        })
    }

    /// Starts previewing `kind`, discarding any placement already in progress.
    pub fn begin_placement(&mut self, kind: StructureKind) {
        if let Some(previous) = self.cancel() {
            debug!(%previous, "placement superseded");
        }
        debug!(%kind, "placement started");
        self.candidate = Some(Candidate {
            kind,
            cursor: None,
            is_valid: false,
        });
    }

    /// Moves the cursor and re-derives the candidate's validity.
    ///
    /// Returns the new validity; always `false` while idle.
    pub fn update_cursor(&mut self, world: &World, position: Vec2) -> bool {
        let Some(candidate) = self.candidate.as_mut() else {
            return false;
        };
        let grid = query::grid(world);
        candidate.cursor = Some(grid.world_to_grid(position));
        candidate.is_valid = grid.is_valid_placement(position, candidate.kind);
        candidate.is_valid
    }

    /// Attempts to build the candidate on the cursor cell.
    ///
    /// The commit is all-or-nothing: validity and affordability are confirmed
    /// first, the world re-validates occupancy as it registers the structure,
    /// and only a successful registration charges the ledger and ends the
    /// session. Any failure leaves the session previewing.
    pub fn commit<L>(
        &mut self,
        world: &mut World,
        ledger: &mut L,
        out_events: &mut Vec<Event>,
    ) -> CommitOutcome
    where
        L: ResourceLedger + ?Sized,
    {
        let Some(candidate) = self.candidate else {
            return CommitOutcome::NotPreviewing;
        };
        let (Some(cell), true) = (candidate.cursor, candidate.is_valid) else {
            return CommitOutcome::Invalid;
        };
        let kind = candidate.kind;
        if !ledger.can_afford(kind) {
            debug!(%kind, %cell, "placement unaffordable");
            return CommitOutcome::Unaffordable;
        }

        let first_new_event = out_events.len();
        world::apply(world, Command::PlaceStructure { kind, cell }, out_events);

        let outcome = out_events[first_new_event..]
            .iter()
            .find_map(|event| match *event {
                Event::StructurePlaced { structure, .. } => Some(CommitOutcome::Placed(structure)),
                Event::StructurePlacementRejected { reason, .. } => {
                    Some(CommitOutcome::Rejected(reason))
                }
                Event::StructureDestroyed { .. } => None,
            })
            .unwrap_or(CommitOutcome::Invalid);

        if let CommitOutcome::Placed(structure) = outcome {
            ledger.charge(kind);
            self.candidate = None;
            debug!(?structure, %kind, %cell, "placement committed");
        } else if let Some(candidate) = self.candidate.as_mut() {
            candidate.is_valid = false;
        }
        outcome
    }

    /// Abandons the placement in progress, returning the discarded kind.
    pub fn cancel(&mut self) -> Option<StructureKind> {
        self.candidate.take().map(|candidate| candidate.kind)
    }

    /// Drives the session from a frame of adapter input.
    ///
    /// Cancellation wins over confirmation within the same frame. Returns the
    /// commit outcome when a confirmation was processed.
    pub fn handle<L>(
        &mut self,
        input: BuilderInput,
        world: &mut World,
        ledger: &mut L,
        out_events: &mut Vec<Event>,
    ) -> Option<CommitOutcome>
    where
        L: ResourceLedger + ?Sized,
    {
        if input.cancel_action {
            let _ = self.cancel();
            return None;
        }

        if let Some(position) = input.cursor_world_space {
            let _ = self.update_cursor(world, position);
        }

        if input.confirm_action {
            Some(self.commit(world, ledger, out_events))
        } else {
            None
        }
    }
}
