use thiserror::Error;

use crate::domain::entities::edit::{CellId, PendingEdits};
use crate::domain::grid::{OriginalValues, PriceGrid};
use crate::domain::propagation::EditPropagationStore;
use crate::domain::selection::{SelectionChange, SelectionController};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cell {0} is not part of the current price grid")]
    UnknownCell(CellId),
}

/// One bulk-editing session over a row/column universe.
///
/// All gestures go through here; the selection and the overlay are never
/// handed out mutably.
#[derive(Debug, Clone)]
pub struct EditorSession<U = PriceGrid> {
    universe: U,
    selection: SelectionController,
    store: EditPropagationStore,
}

impl<U: OriginalValues> EditorSession<U> {
    pub fn new(universe: U) -> Self {
        Self {
            universe,
            selection: SelectionController::new(),
            store: EditPropagationStore::new(),
        }
    }

    pub fn universe(&self) -> &U {
        &self.universe
    }

    pub fn set_modifier(&mut self, is_held: bool) {
        if self.selection.modifier_held() != is_held {
            tracing::debug!("multi-select modifier {}", if is_held { "held" } else { "released" });
        }
        self.selection.on_modifier_change(is_held);
    }

    pub fn modifier_held(&self) -> bool {
        self.selection.modifier_held()
    }

    pub fn focus_cell(&mut self, cell: &CellId) -> Result<SelectionChange, SessionError> {
        self.ensure_known(cell, "focus")?;
        let change = self.selection.on_cell_focus(cell);
        if change.resets_transient() {
            self.store.clear_transient();
        }
        tracing::debug!("focus {cell}: {change:?}, {} active", self.selection.len());
        Ok(change)
    }

    /// Blur never fails; a cell that left the grid can still lose focus.
    pub fn blur_cell(&mut self, cell: &CellId) -> SelectionChange {
        let change = self.selection.on_cell_blur(cell);
        if !self.selection.modifier_held() {
            self.store.clear_transient();
        }
        change
    }

    /// Fans `value` out to every active cell. `cell` is the one that received the input.
    pub fn change_value(&mut self, cell: &CellId, value: &str) -> Result<(), SessionError> {
        self.ensure_known(cell, "value change")?;
        if !self.selection.is_active(cell) {
            tracing::debug!("value typed into inactive cell {cell}; fanning out to active set");
        }
        self.store.on_value_change(self.selection.active(), value);
        Ok(())
    }

    pub fn is_active(&self, cell: &CellId) -> bool {
        self.selection.is_active(cell)
    }

    pub fn active_cells(&self) -> impl Iterator<Item = &CellId> {
        self.selection.active().iter()
    }

    pub fn active_len(&self) -> usize {
        self.selection.len()
    }

    pub fn transient_value(&self) -> Option<&str> {
        self.store.transient()
    }

    pub fn display_value(&self, cell: &CellId) -> Option<String> {
        let original = self.universe.original_value(cell);
        self.store
            .display_value(cell, self.selection.is_active(cell), original.as_deref())
            .map(str::to_string)
    }

    pub fn is_edited(&self, cell: &CellId) -> bool {
        self.store.pending().contains(cell)
    }

    pub fn snapshot_pending_edits(&self) -> PendingEdits {
        self.store.snapshot_pending_edits()
    }

    pub fn pending_len(&self) -> usize {
        self.store.pending_len()
    }

    pub fn has_pending_edits(&self) -> bool {
        self.pending_len() > 0
    }

    /// Drops selection, typed value and every pending edit in one step.
    pub fn discard(&mut self) {
        let dropped = self.store.pending_len();
        let _ = self.selection.clear();
        self.store.reset();
        if dropped > 0 {
            tracing::info!("discarded {dropped} pending price edit(s)");
        }
    }

    /// Swaps in freshly loaded rows or a new column set.
    ///
    /// Pending edits survive; active cells that no longer exist are deselected.
    pub fn replace_universe(&mut self, universe: U) {
        self.universe = universe;
        let universe = &self.universe;
        let pruned = self.selection.retain(|cell| universe.contains(cell));
        if pruned > 0 {
            tracing::debug!("deselected {pruned} cell(s) no longer in the grid");
            if self.selection.is_empty() {
                self.store.clear_transient();
            }
        }
    }

    /// Called once the pending edits have been persisted.
    pub(crate) fn complete_commit(&mut self) {
        let _ = self.selection.clear();
        self.store.reset();
    }

    fn ensure_known(&self, cell: &CellId, gesture: &str) -> Result<(), SessionError> {
        if self.universe.contains(cell) {
            return Ok(());
        }
        tracing::warn!("rejected {gesture} on unknown cell {cell}");
        Err(SessionError::UnknownCell(cell.clone()))
    }
}
