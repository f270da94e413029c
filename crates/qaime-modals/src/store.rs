//! Modal instance store: the open documents of one invoice page.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use qaime_types::{Invoice, InvoiceId, InvoiceKind, ModalId, Point, Rect, Size};

use crate::buffer::EditBuffer;

/// Where an instance sits in the confirmation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Confirmation {
    /// Never persisted.
    Unsaved,
    /// Persisted, not confirmed.
    Draft,
    /// Persisted and posted.
    Confirmed,
}

impl Confirmation {
    pub fn from_persisted(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Draft
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

/// Local copy of the window geometry, kept in step by the bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalGeometry {
    pub position: Point,
    pub size: Size,
    pub z_index: u64,
    pub is_maximized: bool,
    pub is_minimized: bool,
}

impl ModalGeometry {
    pub fn new(rect: Rect) -> Self {
        Self {
            position: rect.position,
            size: rect.size,
            z_index: 0,
            is_maximized: false,
            is_minimized: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    pub fn is_on_screen(&self) -> bool {
        !self.is_minimized
    }
}

/// Partial geometry update emitted by the view or applied by the page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeometryPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub is_maximized: Option<bool>,
    pub is_minimized: Option<bool>,
}

impl GeometryPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn rect(rect: Rect) -> Self {
        Self {
            position: Some(rect.position),
            size: Some(rect.size),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == GeometryPatch::default()
    }
}

/// One open invoice document.
#[derive(Debug, Clone)]
pub struct ModalInstance {
    pub id: ModalId,
    /// `None` until the first successful save.
    pub entity: Option<InvoiceId>,
    pub buffer: EditBuffer,
    pub geometry: ModalGeometry,
    pub confirmation: Confirmation,
}

impl ModalInstance {
    /// A blank draft.
    pub fn new_draft(id: ModalId, geometry: ModalGeometry) -> Self {
        Self {
            id,
            entity: None,
            buffer: EditBuffer::new(),
            geometry,
            confirmation: Confirmation::Unsaved,
        }
    }

    /// An editor over a persisted invoice.
    pub fn for_invoice(id: ModalId, invoice: &Invoice, geometry: ModalGeometry) -> Self {
        Self {
            id,
            entity: Some(invoice.id),
            buffer: EditBuffer::from_invoice(invoice),
            geometry,
            confirmation: Confirmation::from_persisted(invoice.confirmed),
        }
    }

    pub fn title(&self, kind: InvoiceKind) -> String {
        kind.window_title(self.buffer.number.as_deref())
    }

    pub(crate) fn apply_geometry(&mut self, patch: &GeometryPatch) {
        if let Some(position) = patch.position {
            self.geometry.position = position;
        }
        if let Some(size) = patch.size {
            self.geometry.size = size;
        }
        if let Some(maximized) = patch.is_maximized {
            self.geometry.is_maximized = maximized;
        }
        if let Some(minimized) = patch.is_minimized {
            self.geometry.is_minimized = minimized;
        }
    }
}

/// The set of open instances for one page, plus opens still waiting on a fetch.
#[derive(Debug)]
pub struct ModalStore {
    kind: InvoiceKind,
    instances: IndexMap<ModalId, ModalInstance>,
    pending: HashSet<ModalId>,
    active: Option<ModalId>,
}

impl ModalStore {
    pub fn new(kind: InvoiceKind) -> Self {
        Self {
            kind,
            instances: IndexMap::new(),
            pending: HashSet::new(),
            active: None,
        }
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    pub fn get(&self, id: ModalId) -> Option<&ModalInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: ModalId) -> Option<&mut ModalInstance> {
        self.instances.get_mut(&id)
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModalInstance> {
        self.instances.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ModalInstance> {
        self.instances.values_mut()
    }

    pub fn ids(&self) -> Vec<ModalId> {
        self.instances.keys().copied().collect()
    }

    /// Instances that are not minimized.
    pub fn on_screen_count(&self) -> usize {
        self.instances.values().filter(|m| m.geometry.is_on_screen()).count()
    }

    /// Open instances backed by `entity`.
    pub fn by_entity(&self, entity: InvoiceId) -> Vec<ModalId> {
        self.instances
            .values()
            .filter(|m| m.entity == Some(entity))
            .map(|m| m.id)
            .collect()
    }

    pub fn insert(&mut self, instance: ModalInstance) {
        let id = instance.id;
        if let Some(entity) = instance.entity
            && self.instances.values().any(|m| m.entity == Some(entity))
        {
            warn!("invoice {} is already open in another window", entity);
        }
        self.pending.remove(&id);
        self.instances.insert(id, instance);
        debug!("modal {:?} inserted ({} open)", id, self.instances.len());
    }

    /// Merge a geometry patch. Returns false for unknown ids.
    pub fn update(&mut self, id: ModalId, patch: &GeometryPatch) -> bool {
        match self.instances.get_mut(&id) {
            Some(m) => {
                m.apply_geometry(patch);
                true
            }
            None => {
                debug!("update: no modal {:?}", id);
                false
            }
        }
    }

    /// Remove an instance. The active instance passes to the highest remaining z.
    pub fn remove(&mut self, id: ModalId) -> Option<ModalInstance> {
        let removed = self.instances.shift_remove(&id);
        if removed.is_some() && self.active == Some(id) {
            self.recompute_active();
        }
        removed
    }

    // ── Pending opens ───────────────────────────────────────────────────────

    /// Reserve an id for an open waiting on its detail fetch.
    pub fn begin_pending(&mut self, id: ModalId) {
        self.pending.insert(id);
    }

    pub fn is_pending(&self, id: ModalId) -> bool {
        self.pending.contains(&id)
    }

    /// Drop a reservation. Returns true if it was still pending.
    pub fn cancel_pending(&mut self, id: ModalId) -> bool {
        self.pending.remove(&id)
    }

    pub fn pending(&self) -> impl Iterator<Item = ModalId> + '_ {
        self.pending.iter().copied()
    }

    // ── Active instance ─────────────────────────────────────────────────────

    pub fn active(&self) -> Option<ModalId> {
        self.active
    }

    /// Active = on-screen instance with the highest z. Returns the new value.
    pub fn recompute_active(&mut self) -> Option<ModalId> {
        self.active = self
            .instances
            .values()
            .filter(|m| m.geometry.is_on_screen())
            .max_by_key(|m| m.geometry.z_index)
            .map(|m| m.id);
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(z: u64) -> ModalInstance {
        let mut m = ModalInstance::new_draft(
            ModalId::new(),
            ModalGeometry::new(Rect::new(0.0, 0.0, 900.0, 600.0)),
        );
        m.geometry.z_index = z;
        m
    }

    #[test]
    fn close_hands_active_to_highest_remaining() {
        let mut store = ModalStore::new(InvoiceKind::Sale);
        let (a, b, c) = (instance(1001), instance(1003), instance(1002));
        let (ia, ib, ic) = (a.id, b.id, c.id);
        store.insert(a);
        store.insert(b);
        store.insert(c);
        assert_eq!(store.recompute_active(), Some(ib));

        store.remove(ib);
        assert_eq!(store.active(), Some(ic));
        store.remove(ic);
        assert_eq!(store.active(), Some(ia));
        store.remove(ia);
        assert_eq!(store.active(), None);
    }

    #[test]
    fn minimized_instances_are_never_active() {
        let mut store = ModalStore::new(InvoiceKind::Sale);
        let a = instance(1001);
        let mut b = instance(1002);
        b.geometry.is_minimized = true;
        let ia = a.id;
        store.insert(a);
        store.insert(b);
        assert_eq!(store.recompute_active(), Some(ia));
        assert_eq!(store.on_screen_count(), 1);
    }

    #[test]
    fn pending_lifecycle() {
        let mut store = ModalStore::new(InvoiceKind::Purchase);
        let id = ModalId::new();
        store.begin_pending(id);
        assert!(store.is_pending(id));
        assert!(store.cancel_pending(id));
        assert!(!store.cancel_pending(id));
        assert!(!store.contains(id));
    }

    #[test]
    fn update_unknown_is_noop() {
        let mut store = ModalStore::new(InvoiceKind::Sale);
        assert!(!store.update(ModalId::new(), &GeometryPatch::position(Point::ORIGIN)));
    }

    #[test]
    fn title_follows_number() {
        let mut m = instance(1);
        assert_eq!(m.title(InvoiceKind::Sale), "New sale invoice");
        m.buffer.number = Some("S-0002".into());
        assert_eq!(m.title(InvoiceKind::Sale), "Sale invoice #S-0002");
    }
}
