use std::collections::BTreeSet;

use crate::domain::entities::edit::CellId;

/// What a gesture did to the active set.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// The active set became a single, freshly focused cell.
    Replaced,
    Added,
    Removed,
    Cleared,
    Unchanged,
}

impl SelectionChange {
    /// A replaced or cleared selection must not inherit the previous typed value.
    pub fn resets_transient(self) -> bool {
        matches!(self, SelectionChange::Replaced | SelectionChange::Cleared)
    }
}

/// Owns the active set and the multi-select modifier state of one editor session.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    modifier_held: bool,
    active: BTreeSet<CellId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_modifier_change(&mut self, is_held: bool) {
        self.modifier_held = is_held;
    }

    pub fn modifier_held(&self) -> bool {
        self.modifier_held
    }

    pub fn on_cell_focus(&mut self, cell: &CellId) -> SelectionChange {
        if self.modifier_held {
            if self.active.remove(cell) {
                SelectionChange::Removed
            } else {
                self.active.insert(cell.clone());
                SelectionChange::Added
            }
        } else {
            self.active.clear();
            self.active.insert(cell.clone());
            SelectionChange::Replaced
        }
    }

    pub fn on_cell_blur(&mut self, _cell: &CellId) -> SelectionChange {
        if self.modifier_held {
            return SelectionChange::Unchanged;
        }
        self.clear()
    }

    pub fn is_active(&self, cell: &CellId) -> bool {
        self.active.contains(cell)
    }

    pub fn active(&self) -> &BTreeSet<CellId> {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) -> SelectionChange {
        if self.active.is_empty() {
            return SelectionChange::Unchanged;
        }
        self.active.clear();
        SelectionChange::Cleared
    }

    /// Drops active cells rejected by `keep`; returns how many were dropped.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&CellId) -> bool) -> usize {
        let before = self.active.len();
        self.active.retain(|cell| keep(cell));
        before - self.active.len()
    }
}
