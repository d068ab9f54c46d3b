//! Authoritative structure storage backed by a slot map.

use crossroads_defence_core::{GridCoord, PlacementRequirement, StructureId, StructureKind};
use slotmap::SlotMap;

/// Snapshot of a structure stored inside the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructureRecord {
    /// Handle allocated by the world for the structure.
    pub id: StructureId,
    /// Kind of structure that was constructed.
    pub kind: StructureKind,
    /// Cell occupied by the structure.
    pub cell: GridCoord,
    /// Requirement the cell satisfied when the structure was admitted.
    pub requirement: PlacementRequirement,
}

/// Arena that stores structures and hands out versioned handles.
///
/// Destroying a structure frees its slot and bumps the slot version, so every
/// handle issued earlier stops resolving.
#[derive(Clone, Debug, Default)]
pub(crate) struct StructureRegistry {
    records: SlotMap<StructureId, StructureRecord>,
}

impl StructureRegistry {
    /// Creates an empty structure registry.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores a new structure and returns its handle.
    pub(crate) fn insert(&mut self, kind: StructureKind, cell: GridCoord) -> StructureId {
        self.records.insert_with_key(|id| StructureRecord {
            id,
            kind,
            cell,
            requirement: kind.requirement(),
        })
    }

    /// Resolves a handle to the live structure it names.
    pub(crate) fn get(&self, id: StructureId) -> Option<&StructureRecord> {
        self.records.get(id)
    }

    /// Removes the structure named by the handle, invalidating the handle.
    pub(crate) fn remove(&mut self, id: StructureId) -> Option<StructureRecord> {
        self.records.remove(id)
    }

    /// Iterates over live structures in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &StructureRecord> {
        self.records.values()
    }

    /// Number of live structures.
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
