use crate::domain::entities::edit::{CellId, PendingEdits};

/// Pending-edit overlay plus the value currently being typed.
#[derive(Debug, Clone, Default)]
pub struct EditPropagationStore {
    overlay: PendingEdits,
    transient: Option<String>,
}

impl EditPropagationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `new_value` into the overlay for every active cell.
    pub fn on_value_change<'a, I>(&mut self, active: I, new_value: &str)
    where
        I: IntoIterator<Item = &'a CellId>,
    {
        for cell in active {
            self.overlay.stage(cell.clone(), new_value.to_string());
        }
        self.transient = Some(new_value.to_string());
    }

    /// Active cells follow the typed value; others show overlay, then original.
    ///
    /// An active cell with nothing typed yet falls through to its overlay or
    /// original value.
    pub fn display_value<'a>(
        &'a self,
        cell: &CellId,
        is_active: bool,
        original: Option<&'a str>,
    ) -> Option<&'a str> {
        if is_active {
            if let Some(typed) = self.transient.as_deref() {
                return Some(typed);
            }
        }
        self.overlay.get(cell).or(original)
    }

    pub fn clear_transient(&mut self) {
        self.transient = None;
    }

    pub fn transient(&self) -> Option<&str> {
        self.transient.as_deref()
    }

    pub fn pending(&self) -> &PendingEdits {
        &self.overlay
    }

    pub fn pending_len(&self) -> usize {
        self.overlay.len()
    }

    pub fn snapshot_pending_edits(&self) -> PendingEdits {
        self.overlay.clone()
    }

    /// Clears overlay and transient together.
    pub fn reset(&mut self) {
        self.overlay.clear();
        self.transient = None;
    }
}
