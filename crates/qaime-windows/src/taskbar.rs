//! Taskbar projection over the registry.
//!
//! Modal windows first, highest z first; routed pages after them in
//! registration order. Minimized modals stay listed with a suffix.

use qaime_types::{WindowId, WindowKind};

use crate::registry::SharedWindowRegistry;

const MINIMIZED_SUFFIX: &str = " (minimized)";

/// One taskbar button.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskbarEntry {
    pub id: WindowId,
    pub title: String,
    pub icon: &'static str,
    pub is_active: bool,
    pub is_minimized: bool,
    pub is_modal: bool,
}

impl TaskbarEntry {
    /// Button label, with the minimized suffix when applicable.
    pub fn label(&self) -> String {
        if self.is_minimized {
            format!("{}{}", self.title, MINIMIZED_SUFFIX)
        } else {
            self.title.clone()
        }
    }
}

/// Read-side view of the registry for the bottom bar, plus its click actions.
#[derive(Clone)]
pub struct Taskbar {
    registry: SharedWindowRegistry,
}

impl Taskbar {
    pub fn new(registry: SharedWindowRegistry) -> Self {
        Self { registry }
    }

    pub fn entries(&self) -> Vec<TaskbarEntry> {
        let windows = self.registry.snapshot();
        let top = self.registry.max_visible_z();

        let mut modals: Vec<_> = windows.iter().filter(|w| w.kind.is_modal()).collect();
        modals.sort_by(|a, b| b.z_index.cmp(&a.z_index));
        let routes = windows.iter().filter(|w| !w.kind.is_modal());

        modals
            .into_iter()
            .chain(routes)
            .map(|w| TaskbarEntry {
                id: w.id,
                title: w.title.clone(),
                icon: match &w.kind {
                    WindowKind::Modal { modal } => modal.icon(),
                    WindowKind::Route { .. } => "🗂️",
                },
                is_active: w.is_on_screen() && Some(w.z_index) == top,
                is_minimized: w.is_minimized,
                is_modal: w.kind.is_modal(),
            })
            .collect()
    }

    /// Restore if minimized, otherwise bring to front.
    pub fn click(&self, id: WindowId) {
        match self.registry.get(id) {
            Some(w) if w.is_minimized => {
                self.registry.restore(id);
            }
            Some(_) => {
                self.registry.activate(id);
            }
            None => {}
        }
    }

    /// Ask the window's owner to close it.
    pub fn close(&self, id: WindowId) {
        self.registry.request_close(id);
    }

    /// Tile every on-screen modal, top of the stack first.
    pub fn tile_visible(&self) -> Vec<WindowId> {
        let ids: Vec<WindowId> = self
            .entries()
            .into_iter()
            .filter(|e| e.is_modal && !e.is_minimized)
            .map(|e| e.id)
            .collect();
        self.registry.tile(&ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewWindow;
    use crate::registry::WindowRegistry;
    use pretty_assertions::assert_eq;
    use qaime_types::ModalKind;
    use std::sync::Arc;

    fn setup() -> (Taskbar, SharedWindowRegistry, Vec<WindowId>) {
        let reg = Arc::new(WindowRegistry::default());
        let mut ids = Vec::new();
        for (title, kind) in [
            ("Sale invoice #1", WindowKind::modal(ModalKind::InvoiceEdit)),
            ("Sales", WindowKind::Route { path: "/sales".into() }),
            ("Customers", WindowKind::modal(ModalKind::CustomerPicker)),
        ] {
            let w = NewWindow::new(WindowId::new(), title, kind);
            ids.push(w.id);
            reg.add(w);
        }
        (Taskbar::new(reg.clone()), reg, ids)
    }

    #[test]
    fn modals_first_by_z_descending() {
        let (bar, _, ids) = setup();
        let order: Vec<_> = bar.entries().iter().map(|e| e.id).collect();
        assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn single_active_entry_and_minimized_suffix() {
        let (bar, reg, ids) = setup();
        reg.minimize(ids[2]);
        reg.activate(ids[0]);
        let entries = bar.entries();
        let active: Vec<_> = entries.iter().filter(|e| e.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, ids[0]);

        let minimized = entries.iter().find(|e| e.id == ids[2]).unwrap();
        assert_eq!(minimized.label(), "Customers (minimized)");
        assert_eq!(minimized.icon, "👤");
    }

    #[test]
    fn click_restores_or_activates() {
        let (bar, reg, ids) = setup();
        reg.minimize(ids[0]);
        bar.click(ids[0]);
        assert!(reg.get(ids[0]).unwrap().is_on_screen());
        assert_eq!(reg.active_window(), Some(ids[0]));

        bar.click(ids[2]);
        assert_eq!(reg.active_window(), Some(ids[2]));
    }

    #[test]
    fn tile_visible_ignores_routes_and_minimized() {
        let (bar, reg, ids) = setup();
        reg.minimize(ids[0]);
        assert_eq!(bar.tile_visible(), vec![ids[2]]);
    }

    #[test]
    fn close_leaves_removal_to_owner() {
        let (bar, reg, ids) = setup();
        bar.close(ids[1]);
        assert!(reg.contains(ids[1]));
    }
}
