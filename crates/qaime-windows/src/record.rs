//! Window records, partial updates, and the owner callback seam.

use std::fmt;
use std::sync::Arc;

use qaime_types::{Point, Size, WindowId, WindowKind};

/// Callbacks a window's owner registers with the registry.
///
/// Invoked after the registry lock is released, so implementations may call
/// back into the registry. The registry never removes a window on its own;
/// `on_close` asks the owner to tear down and unregister.
pub trait WindowDelegate: Send + Sync {
    fn on_activate(&self, id: WindowId);

    fn on_close(&self, id: WindowId);

    fn on_restore(&self, _id: WindowId) {}
}

type Callback = Box<dyn Fn(WindowId) + Send + Sync>;

/// A delegate assembled from closures. Handy for route windows and tests.
#[derive(Default)]
pub struct CallbackDelegate {
    activate: Option<Callback>,
    close: Option<Callback>,
    restore: Option<Callback>,
}

impl CallbackDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate(mut self, f: impl Fn(WindowId) + Send + Sync + 'static) -> Self {
        self.activate = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl Fn(WindowId) + Send + Sync + 'static) -> Self {
        self.close = Some(Box::new(f));
        self
    }

    pub fn on_restore(mut self, f: impl Fn(WindowId) + Send + Sync + 'static) -> Self {
        self.restore = Some(Box::new(f));
        self
    }

    pub fn into_arc(self) -> Arc<dyn WindowDelegate> {
        Arc::new(self)
    }
}

impl WindowDelegate for CallbackDelegate {
    fn on_activate(&self, id: WindowId) {
        if let Some(f) = &self.activate {
            f(id);
        }
    }

    fn on_close(&self, id: WindowId) {
        if let Some(f) = &self.close {
            f(id);
        }
    }

    fn on_restore(&self, id: WindowId) {
        if let Some(f) = &self.restore {
            f(id);
        }
    }
}

/// One registered top-level surface.
#[derive(Clone)]
pub struct WindowRecord {
    pub id: WindowId,
    pub title: String,
    pub kind: WindowKind,
    pub is_visible: bool,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub z_index: u64,
    pub position: Point,
    pub size: Size,
    pub delegate: Option<Arc<dyn WindowDelegate>>,
}

impl WindowRecord {
    /// Shown on screen: visible and not minimized.
    pub fn is_on_screen(&self) -> bool {
        self.is_visible && !self.is_minimized
    }

    /// Apply a patch, keeping `is_minimized ⇒ !is_visible`.
    pub(crate) fn apply(&mut self, patch: &WindowPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(maximized) = patch.is_maximized {
            self.is_maximized = maximized;
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }
        match (patch.is_visible, patch.is_minimized) {
            (_, Some(true)) => {
                self.is_minimized = true;
                self.is_visible = false;
            }
            (Some(visible), Some(false)) => {
                self.is_minimized = false;
                self.is_visible = visible;
            }
            (None, Some(false)) => {
                self.is_minimized = false;
            }
            (Some(true), None) => {
                self.is_visible = true;
                self.is_minimized = false;
            }
            (Some(false), None) => {
                self.is_visible = false;
            }
            (None, None) => {}
        }
    }
}

impl fmt::Debug for WindowRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowRecord")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("is_visible", &self.is_visible)
            .field("is_minimized", &self.is_minimized)
            .field("is_maximized", &self.is_maximized)
            .field("z_index", &self.z_index)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}

/// Input for [`WindowRegistry::add`](crate::WindowRegistry::add).
///
/// Any z value the caller might have is ignored; the registry assigns one.
#[derive(Clone)]
pub struct NewWindow {
    pub id: WindowId,
    pub title: String,
    pub kind: WindowKind,
    pub is_visible: bool,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub position: Point,
    pub size: Size,
    pub delegate: Option<Arc<dyn WindowDelegate>>,
}

impl NewWindow {
    pub fn new(id: WindowId, title: impl Into<String>, kind: WindowKind) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            is_visible: true,
            is_minimized: false,
            is_maximized: false,
            position: Point::ORIGIN,
            size: Size::default(),
            delegate: None,
        }
    }

    pub fn with_geometry(mut self, position: Point, size: Size) -> Self {
        self.position = position;
        self.size = size;
        self
    }

    pub fn with_visibility(mut self, visible: bool, minimized: bool) -> Self {
        self.is_visible = visible;
        self.is_minimized = minimized;
        self
    }

    pub fn maximized(mut self, maximized: bool) -> Self {
        self.is_maximized = maximized;
        self
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn WindowDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub(crate) fn into_record(self, z_index: u64) -> WindowRecord {
        WindowRecord {
            id: self.id,
            title: self.title,
            kind: self.kind,
            is_visible: self.is_visible && !self.is_minimized,
            is_minimized: self.is_minimized,
            is_maximized: self.is_maximized,
            z_index,
            position: self.position,
            size: self.size,
            delegate: self.delegate,
        }
    }
}

/// Partial update for a record. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowPatch {
    pub title: Option<String>,
    /// Raises the registry's z counter when above it.
    pub z_index: Option<u64>,
    pub is_visible: Option<bool>,
    pub is_minimized: Option<bool>,
    pub is_maximized: Option<bool>,
    pub position: Option<Point>,
    pub size: Option<Size>,
}

impl WindowPatch {
    pub fn is_empty(&self) -> bool {
        *self == WindowPatch::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn geometry(mut self, position: Point, size: Size) -> Self {
        self.position = Some(position);
        self.size = Some(size);
        self
    }

    pub fn visibility(mut self, visible: bool, minimized: bool) -> Self {
        self.is_visible = Some(visible);
        self.is_minimized = Some(minimized);
        self
    }

    pub fn maximized(mut self, maximized: bool) -> Self {
        self.is_maximized = Some(maximized);
        self
    }

    pub fn z_index(mut self, z_index: u64) -> Self {
        self.z_index = Some(z_index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaime_types::ModalKind;

    fn record() -> WindowRecord {
        NewWindow::new(WindowId::new(), "w", WindowKind::modal(ModalKind::InvoiceEdit))
            .into_record(1001)
    }

    #[test]
    fn minimizing_hides() {
        let mut r = record();
        r.apply(&WindowPatch {
            is_minimized: Some(true),
            ..Default::default()
        });
        assert!(r.is_minimized);
        assert!(!r.is_visible);
    }

    #[test]
    fn showing_unminimizes() {
        let mut r = record();
        r.apply(&WindowPatch::default().visibility(false, true));
        r.apply(&WindowPatch {
            is_visible: Some(true),
            ..Default::default()
        });
        assert!(r.is_on_screen());
    }

    #[test]
    fn contradictory_patch_prefers_minimized() {
        let mut r = record();
        r.apply(&WindowPatch::default().visibility(true, true));
        assert!(r.is_minimized);
        assert!(!r.is_visible);
    }

    #[test]
    fn new_window_normalizes_visibility() {
        let r = NewWindow::new(WindowId::new(), "w", WindowKind::modal(ModalKind::Settings))
            .with_visibility(true, true)
            .into_record(1);
        assert!(!r.is_visible);
        assert!(r.is_minimized);
    }

    #[test]
    fn callback_delegate_dispatches() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let d = CallbackDelegate::new()
            .on_close(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            })
            .into_arc();
        d.on_activate(WindowId::new());
        d.on_restore(WindowId::new());
        d.on_close(WindowId::new());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
