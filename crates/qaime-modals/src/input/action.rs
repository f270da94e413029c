//! What a modal accelerator asks for.

/// A discrete modal action. Flat enum, one variant per accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ModalAction {
    /// Escape
    Close,
    /// Save without confirming
    Save,
    /// Hand the persisted invoice to the printer
    Print,
    /// Append an empty line
    InsertLine,
    /// Remove checked lines
    DeleteSelected,
    /// Append copies of checked lines
    DuplicateSelected,
}

impl ModalAction {
    /// Line editing accelerators, suppressed while typing.
    pub fn edits_lines(&self) -> bool {
        matches!(
            self,
            ModalAction::InsertLine | ModalAction::DeleteSelected | ModalAction::DuplicateSelected
        )
    }
}
