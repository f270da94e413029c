//! Invoice page controller.
//!
//! One [`InvoicePage`] per invoice book (sales, purchases). It owns the modal
//! store, the bridge into the shared window registry, and a view per open
//! instance, and brokers saves and loads with the persistence collaborator.
//!
//! # Locking
//!
//! Page state sits behind a single `parking_lot::Mutex`. The lock is never
//! held across an `.await` and never held while calling registry operations
//! that fire delegate callbacks (`activate`, `restore`, `request_close`),
//! since those callbacks come straight back into the page.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use qaime_types::{
    CounterpartKind, InvoiceId, InvoiceKind, InvoicePayload, ModalId, ModalKind, Point, Rect, Size,
    WindowId,
};
use qaime_windows::{SharedWindowRegistry, WindowDelegate, WindowingConfig};

use crate::api::InvoiceApi;
use crate::bridge::{ReconcileReport, SyncBridge};
use crate::buffer::BufferEdit;
use crate::error::{ApiError, OpenError, PrintError, SaveError};
use crate::input::{KeyEvent, KeyMap, ModalAction};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::print::{InvoicePrinter, TextPrinter};
use crate::store::{Confirmation, GeometryPatch, ModalGeometry, ModalInstance, ModalStore};
use crate::view::{Frame, ModalView};

/// Per-page behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Refuse to save without a customer/supplier.
    pub require_counterpart: bool,
}

impl PageOptions {
    /// Purchases need a supplier; sales may be anonymous.
    pub fn for_kind(kind: InvoiceKind) -> Self {
        Self {
            require_counterpart: kind == InvoiceKind::Purchase,
        }
    }
}

/// A change coming from the view or the form.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalUpdate {
    Geometry(GeometryPatch),
    Edit(BufferEdit),
}

/// An open waiting on its detail fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOpen {
    pub modal: ModalId,
    pub entity: Option<InvoiceId>,
}

/// What a successful save did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved as a draft; the window stays open.
    Kept(InvoiceId),
    /// Saved and confirmed; the window was closed.
    Closed(InvoiceId),
    /// Persisted, but the window was closed while the request was in flight.
    Detached(InvoiceId),
}

impl SaveOutcome {
    pub fn entity(&self) -> InvoiceId {
        match self {
            SaveOutcome::Kept(id) | SaveOutcome::Closed(id) | SaveOutcome::Detached(id) => *id,
        }
    }
}

struct PageState {
    store: ModalStore,
    bridge: SyncBridge,
    views: HashMap<ModalId, ModalView>,
}

/// Registry callbacks for one instance. Holds the page weakly.
struct PageDelegate {
    page: Weak<InvoicePage>,
    modal: ModalId,
}

impl WindowDelegate for PageDelegate {
    fn on_activate(&self, _id: WindowId) {
        if let Some(page) = self.page.upgrade() {
            page.sync();
        }
    }

    fn on_close(&self, _id: WindowId) {
        if let Some(page) = self.page.upgrade() {
            page.close(self.modal);
        }
    }

    fn on_restore(&self, _id: WindowId) {
        if let Some(page) = self.page.upgrade() {
            page.sync();
        }
    }
}

pub struct InvoicePageBuilder {
    kind: InvoiceKind,
    api: Arc<dyn InvoiceApi>,
    registry: SharedWindowRegistry,
    options: PageOptions,
    notifier: Arc<dyn Notifier>,
    printer: Arc<dyn InvoicePrinter>,
    keymap: KeyMap,
}

impl InvoicePageBuilder {
    pub fn options(mut self, options: PageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn printer(mut self, printer: Arc<dyn InvoicePrinter>) -> Self {
        self.printer = printer;
        self
    }

    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn build(self) -> Arc<InvoicePage> {
        let config = self.registry.config().clone();
        Arc::new_cyclic(|this| InvoicePage {
            kind: self.kind,
            options: self.options,
            config,
            api: self.api,
            registry: self.registry,
            notifier: self.notifier,
            printer: self.printer,
            keymap: self.keymap,
            state: Mutex::new(PageState {
                store: ModalStore::new(self.kind),
                bridge: SyncBridge::new(ModalKind::InvoiceEdit),
                views: HashMap::new(),
            }),
            this: this.clone(),
        })
    }
}

/// Controller for one invoice book's modal windows.
pub struct InvoicePage {
    kind: InvoiceKind,
    options: PageOptions,
    config: WindowingConfig,
    api: Arc<dyn InvoiceApi>,
    registry: SharedWindowRegistry,
    notifier: Arc<dyn Notifier>,
    printer: Arc<dyn InvoicePrinter>,
    keymap: KeyMap,
    state: Mutex<PageState>,
    this: Weak<InvoicePage>,
}

impl InvoicePage {
    pub fn builder(
        kind: InvoiceKind,
        api: Arc<dyn InvoiceApi>,
        registry: SharedWindowRegistry,
    ) -> InvoicePageBuilder {
        InvoicePageBuilder {
            kind,
            api,
            registry,
            options: PageOptions::for_kind(kind),
            notifier: Arc::new(TracingNotifier),
            printer: Arc::new(TextPrinter::stdout()),
            keymap: KeyMap::default(),
        }
    }

    pub fn kind(&self) -> InvoiceKind {
        self.kind
    }

    pub fn registry(&self) -> &SharedWindowRegistry {
        &self.registry
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn instance(&self, modal: ModalId) -> Option<ModalInstance> {
        self.state.lock().store.get(modal).cloned()
    }

    pub fn instances(&self) -> Vec<ModalInstance> {
        self.state.lock().store.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().store.is_empty()
    }

    /// The instance that receives keyboard input.
    pub fn active(&self) -> Option<ModalId> {
        self.state.lock().store.active()
    }

    pub fn window_for(&self, modal: ModalId) -> Option<WindowId> {
        self.state.lock().bridge.window_for(modal)
    }

    pub fn is_pending(&self, modal: ModalId) -> bool {
        self.state.lock().store.is_pending(modal)
    }

    /// Paint state for an instance, or `None` if minimized or gone.
    pub fn frame(&self, modal: ModalId) -> Option<Frame> {
        let state = self.state.lock();
        let instance = state.store.get(modal)?;
        state.views.get(&modal)?.frame(&instance.geometry, &self.config)
    }

    // ── Reconciliation ──────────────────────────────────────────────────────

    /// Run one bridge pass.
    pub fn sync(&self) -> ReconcileReport {
        let mut state = self.state.lock();
        let PageState { store, bridge, .. } = &mut *state;
        let delegate_for = |modal: ModalId| -> Arc<dyn WindowDelegate> {
            Arc::new(PageDelegate {
                page: self.this.clone(),
                modal,
            })
        };
        bridge.reconcile(store, &self.registry, &delegate_for)
    }

    // ── Open / close ────────────────────────────────────────────────────────

    /// Open an editor: a blank draft for `None`, or a loaded invoice.
    ///
    /// Returns `Ok(None)` when the window was closed before the load finished.
    pub async fn open(&self, entity: Option<InvoiceId>) -> Result<Option<ModalId>, OpenError> {
        let pending = self.begin_open(entity);
        self.complete_open(pending).await
    }

    /// First half of [`open`](Self::open): reserve an instance id.
    pub fn begin_open(&self, entity: Option<InvoiceId>) -> PendingOpen {
        let modal = ModalId::new();
        if entity.is_some() {
            self.state.lock().store.begin_pending(modal);
        }
        PendingOpen { modal, entity }
    }

    /// Second half of [`open`](Self::open): fetch and insert.
    pub async fn complete_open(&self, pending: PendingOpen) -> Result<Option<ModalId>, OpenError> {
        let PendingOpen { modal, entity } = pending;

        let instance = match entity {
            None => {
                let geometry = self.placement(&self.state.lock().store);
                ModalInstance::new_draft(modal, geometry)
            }
            Some(id) => {
                let fetched = self.api.get_by_id(id).await;
                let mut state = self.state.lock();
                if !state.store.cancel_pending(modal) {
                    debug!("open of invoice {} abandoned, window closed during load", id);
                    return Ok(None);
                }
                match fetched {
                    Ok(invoice) => {
                        let geometry = self.placement(&state.store);
                        ModalInstance::for_invoice(modal, &invoice, geometry)
                    }
                    Err(e) => {
                        drop(state);
                        error!("failed to load invoice {}: {}", id, e);
                        self.notifier.notify(Notice::error(format!("Could not open invoice: {e}")));
                        return Err(e.into());
                    }
                }
            }
        };

        {
            let mut state = self.state.lock();
            state.store.insert(instance);
            state.views.insert(modal, ModalView::new(modal));
        }
        self.sync();
        info!("opened {} modal {:?} for {:?}", self.kind, modal, entity);
        Ok(Some(modal))
    }

    /// Initial geometry: capped size, centered, cascaded by on-screen count.
    fn placement(&self, store: &ModalStore) -> ModalGeometry {
        let viewport = self.registry.viewport();
        let cfg = &self.config;
        let size = Size::new(
            cfg.open_size_cap
                .width
                .min(viewport.width - cfg.open_margin.width)
                .max(0.0),
            cfg.open_size_cap
                .height
                .min(viewport.height - cfg.open_margin.height)
                .max(0.0),
        );
        let centered = Rect::centered(size, viewport.size());
        let step = cfg.cascade_step * store.on_screen_count() as f64;
        let max = viewport.max_position(size);
        let position = Point::new(
            (centered.position.x + step).clamp(0.0, max.x),
            (centered.position.y + step).clamp(0.0, max.y),
        );
        ModalGeometry::new(Rect::from_parts(position, size))
    }

    /// Close an instance and its window. Also cancels a pending open.
    pub fn close(&self, modal: ModalId) -> bool {
        let closed = {
            let mut state = self.state.lock();
            let cancelled = state.store.cancel_pending(modal);
            let removed = state.store.remove(modal).is_some();
            state.views.remove(&modal);
            removed || cancelled
        };
        if closed {
            self.sync();
            info!("closed modal {:?}", modal);
        } else {
            debug!("close: no modal {:?}", modal);
        }
        closed
    }

    // ── Window management ───────────────────────────────────────────────────

    /// Bring to front through the registry; the delegate syncs back.
    pub fn activate(&self, modal: ModalId) -> bool {
        match self.window_for(modal) {
            Some(window) => self.registry.activate(window),
            None => false,
        }
    }

    pub fn minimize(&self, modal: ModalId) -> bool {
        let Some(window) = self.window_for(modal) else {
            return false;
        };
        let done = self.registry.minimize(window);
        self.sync();
        done
    }

    pub fn restore(&self, modal: ModalId) -> bool {
        match self.window_for(modal) {
            Some(window) => self.registry.restore(window),
            None => false,
        }
    }

    /// Tile this page's on-screen windows, top of the stack first.
    pub fn tile(&self) -> Vec<ModalId> {
        let order: Vec<(ModalId, WindowId)> = {
            let state = self.state.lock();
            let mut on_screen: Vec<&ModalInstance> = state
                .store
                .iter()
                .filter(|m| m.geometry.is_on_screen())
                .collect();
            on_screen.sort_by(|a, b| b.geometry.z_index.cmp(&a.geometry.z_index));
            on_screen
                .into_iter()
                .filter_map(|m| state.bridge.window_for(m.id).map(|w| (m.id, w)))
                .collect()
        };
        let windows: Vec<WindowId> = order.iter().map(|(_, w)| *w).collect();
        let tiled = self.registry.tile(&windows);
        self.sync();
        order
            .into_iter()
            .filter(|(_, w)| tiled.contains(w))
            .map(|(m, _)| m)
            .collect()
    }

    /// Merge a geometry or form change into an instance.
    pub fn update(&self, modal: ModalId, update: ModalUpdate) -> bool {
        let applied = {
            let mut state = self.state.lock();
            match update {
                ModalUpdate::Geometry(patch) => state.store.update(modal, &patch),
                ModalUpdate::Edit(edit) => {
                    let price = self.kind.price_kind();
                    let is_move = matches!(edit, BufferEdit::MoveSelectedUp | BufferEdit::MoveSelectedDown);
                    match state.store.get_mut(modal) {
                        Some(instance) => {
                            let changed = instance.buffer.apply(edit, price);
                            if !changed && is_move {
                                self.notifier
                                    .notify(Notice::warning("Select exactly one line to move"));
                            }
                            changed
                        }
                        None => {
                            debug!("edit: no modal {:?}", modal);
                            false
                        }
                    }
                }
            }
        };
        if applied {
            self.sync();
        }
        applied
    }

    // ── Pointer interaction ─────────────────────────────────────────────────

    /// Header press: bring to front, then start a drag.
    pub fn header_pointer_down(&self, modal: ModalId, pointer: Point) -> bool {
        self.activate(modal);
        let mut state = self.state.lock();
        let PageState { store, views, .. } = &mut *state;
        match (store.get(modal), views.get_mut(&modal)) {
            (Some(instance), Some(view)) => view.header_pointer_down(pointer, &instance.geometry),
            _ => false,
        }
    }

    pub fn corner_pointer_down(&self, modal: ModalId, pointer: Point) -> bool {
        self.activate(modal);
        let mut state = self.state.lock();
        let PageState { store, views, .. } = &mut *state;
        match (store.get(modal), views.get_mut(&modal)) {
            (Some(instance), Some(view)) => view.corner_pointer_down(pointer, &instance.geometry),
            _ => false,
        }
    }

    pub fn pointer_move(&self, modal: ModalId, pointer: Point) {
        let viewport = self.registry.viewport();
        self.with_view(modal, |view, geometry| {
            view.pointer_move(pointer, geometry, &viewport, &self.config)
        });
    }

    pub fn pointer_up(&self, modal: ModalId) {
        self.with_view(modal, |view, geometry| view.pointer_up(geometry));
    }

    pub fn toggle_maximize(&self, modal: ModalId) {
        let viewport = self.registry.viewport();
        self.with_view(modal, |view, geometry| {
            Some(view.toggle_maximize(geometry, &viewport, &self.config))
        });
    }

    /// Run a view transition and commit the patch it emits.
    fn with_view(
        &self,
        modal: ModalId,
        f: impl FnOnce(&mut ModalView, &ModalGeometry) -> Option<GeometryPatch>,
    ) {
        let patch = {
            let mut state = self.state.lock();
            let PageState { store, views, .. } = &mut *state;
            let (Some(instance), Some(view)) = (store.get(modal), views.get_mut(&modal)) else {
                debug!("pointer: no modal {:?}", modal);
                return;
            };
            match f(view, &instance.geometry) {
                Some(patch) if !patch.is_empty() => patch,
                _ => return,
            }
        };
        self.update(modal, ModalUpdate::Geometry(patch));
    }

    // ── Persistence ─────────────────────────────────────────────────────────

    /// Validate and persist an instance.
    ///
    /// `commit` confirms the invoice and closes the window on success. On any
    /// error the window stays open and the error is returned after the user
    /// has been told.
    ///
    /// An id with no instance returns [`SaveError::Stale`] without a notice
    /// or an API call, so callers can tell it apart from a save. An instance
    /// closed while the request was in flight is not an error: the invoice
    /// is persisted and [`SaveOutcome::Detached`] is returned.
    pub async fn save(&self, modal: ModalId, commit: bool) -> Result<SaveOutcome, SaveError> {
        let (entity, mut payload) = {
            let state = self.state.lock();
            let Some(instance) = state.store.get(modal) else {
                debug!("save: no modal {:?}", modal);
                return Err(SaveError::Stale(modal));
            };
            let required: Option<CounterpartKind> = self
                .options
                .require_counterpart
                .then(|| self.kind.counterpart_kind());
            if let Err(v) = instance.buffer.validate(required) {
                drop(state);
                self.notifier.notify(Notice::warning(v.to_string()));
                return Err(v.into());
            }
            (instance.entity, instance.buffer.to_payload(None))
        };

        let (id, created) = match entity {
            Some(id) => {
                self.persist_existing(id, &payload, commit).await?;
                (id, None)
            }
            None => {
                payload.confirmed = Some(commit);
                let created = self
                    .api
                    .create(&payload)
                    .await
                    .map_err(|e| self.save_failed(e))?;
                (created.id, Some(created))
            }
        };

        let still_open = {
            let mut state = self.state.lock();
            match state.store.get_mut(modal) {
                Some(instance) => {
                    if let Some(created) = created {
                        instance.entity = Some(created.id);
                        instance.buffer.number = Some(created.number);
                        instance.buffer.date = created.date;
                        instance.confirmation = Confirmation::from_persisted(created.confirmed);
                    } else if commit {
                        instance.confirmation = Confirmation::Confirmed;
                    }
                    true
                }
                None => false,
            }
        };
        if !still_open {
            warn!("modal {:?} closed while saving, invoice {} persisted", modal, id);
            return Ok(SaveOutcome::Detached(id));
        }

        if commit {
            self.notifier.notify(Notice::info("Invoice saved and confirmed"));
            self.close(modal);
            info!("saved and confirmed invoice {} from {:?}", id, modal);
            Ok(SaveOutcome::Closed(id))
        } else {
            self.notifier.notify(Notice::info("Invoice saved"));
            self.sync();
            info!("saved invoice {} from {:?}", id, modal);
            Ok(SaveOutcome::Kept(id))
        }
    }

    async fn persist_existing(
        &self,
        id: InvoiceId,
        payload: &InvoicePayload,
        commit: bool,
    ) -> Result<(), SaveError> {
        if let Err(e) = self.api.update(id, payload).await {
            return Err(self.save_failed(e));
        }
        if commit && let Err(e) = self.api.update_confirmation_status(id, true).await {
            return Err(self.save_failed(e));
        }
        Ok(())
    }

    fn save_failed(&self, e: ApiError) -> SaveError {
        error!("save failed: {}", e);
        self.notifier.notify(Notice::error(format!("Could not save invoice: {e}")));
        SaveError::Api(e)
    }

    /// Load the persisted invoice and hand it to the printer.
    pub async fn print(&self, modal: ModalId) -> Result<(), PrintError> {
        let entity = self
            .state
            .lock()
            .store
            .get(modal)
            .map(|m| m.entity)
            .ok_or(PrintError::Stale(modal))?;
        let Some(id) = entity else {
            self.notifier.notify(Notice::warning("Save the invoice before printing"));
            return Err(PrintError::NotSaved);
        };

        let invoice = match self.api.get_by_id(id).await {
            Ok(invoice) => invoice,
            Err(e) => {
                error!("print: failed to load invoice {}: {}", id, e);
                self.notifier.notify(Notice::error(format!("Could not print invoice: {e}")));
                return Err(e.into());
            }
        };
        if let Err(e) = self.printer.print(self.kind, &invoice) {
            self.notifier.notify(Notice::error(e.to_string()));
            return Err(e);
        }
        info!("printed invoice {}", id);
        Ok(())
    }

    /// Bulk confirm or unconfirm persisted invoices from the list view.
    ///
    /// Open instances backed by those invoices follow the new state. Stops at
    /// the first failure; earlier updates stay applied.
    pub async fn set_confirmation(
        &self,
        ids: &[InvoiceId],
        confirmed: bool,
    ) -> Result<usize, ApiError> {
        if ids.is_empty() {
            self.notifier.notify(Notice::warning("No invoice selected"));
            return Ok(0);
        }
        for &id in ids {
            if let Err(e) = self.api.update_confirmation_status(id, confirmed).await {
                error!("confirmation update for invoice {} failed: {}", id, e);
                self.notifier.notify(Notice::error(format!("Could not update invoice {id}: {e}")));
                return Err(e);
            }
            let mut state = self.state.lock();
            for modal in state.store.by_entity(id) {
                if let Some(instance) = state.store.get_mut(modal) {
                    instance.confirmation = Confirmation::from_persisted(confirmed);
                }
            }
        }
        let verb = if confirmed { "confirmed" } else { "unconfirmed" };
        self.notifier.notify(Notice::info(format!("{} invoice(s) {verb}", ids.len())));
        Ok(ids.len())
    }

    // ── Keyboard ────────────────────────────────────────────────────────────

    /// Route a key press to the active instance.
    pub async fn dispatch_key(&self, event: KeyEvent) -> Option<ModalAction> {
        let modal = self.active()?;
        self.handle_key(modal, event).await
    }

    /// Handle a key press aimed at `modal`. Ignored unless it is the active,
    /// on-screen instance. Returns the action taken, if any.
    pub async fn handle_key(&self, modal: ModalId, event: KeyEvent) -> Option<ModalAction> {
        let is_active = {
            let state = self.state.lock();
            state.store.active() == Some(modal)
                && state
                    .store
                    .get(modal)
                    .is_some_and(|m| m.geometry.is_on_screen())
        };
        if !is_active {
            return None;
        }

        let action = self.keymap.resolve(&event)?;
        debug!("modal {:?}: {}", modal, action);
        match action {
            ModalAction::Close => {
                self.close(modal);
            }
            ModalAction::Save => {
                if let Err(e) = self.save(modal, false).await {
                    debug!("save key on {:?} did not save: {}", modal, e);
                }
            }
            ModalAction::Print => {
                if let Err(e) = self.print(modal).await {
                    debug!("print key on {:?} did not print: {}", modal, e);
                }
            }
            ModalAction::InsertLine => {
                self.update(modal, ModalUpdate::Edit(BufferEdit::AddLine));
            }
            ModalAction::DeleteSelected => {
                self.update(modal, ModalUpdate::Edit(BufferEdit::DeleteSelected));
            }
            ModalAction::DuplicateSelected => {
                self.update(modal, ModalUpdate::Edit(BufferEdit::DuplicateSelected));
            }
        }
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryInvoiceApi;
    use crate::notify::{NoticeLevel, RecordingNotifier};
    use qaime_types::Viewport;
    use qaime_windows::WindowRegistry;

    fn page(kind: InvoiceKind) -> (Arc<InvoicePage>, Arc<RecordingNotifier>) {
        let registry = Arc::new(WindowRegistry::default());
        registry.set_viewport(Viewport::new(1600.0, 900.0));
        let notifier = Arc::new(RecordingNotifier::new());
        let page = InvoicePage::builder(kind, Arc::new(MemoryInvoiceApi::new(kind)), registry)
            .notifier(notifier.clone())
            .printer(Arc::new(TextPrinter::buffered()))
            .build();
        (page, notifier)
    }

    #[tokio::test]
    async fn open_places_capped_and_centered() {
        let (page, _) = page(InvoiceKind::Sale);
        let first = page.open(None).await.unwrap().unwrap();
        let g = page.instance(first).unwrap().geometry;
        assert_eq!(g.size, Size::new(900.0, 700.0));
        assert_eq!(g.position, Point::new(350.0, 100.0));

        let second = page.open(None).await.unwrap().unwrap();
        let g2 = page.instance(second).unwrap().geometry;
        assert_eq!(g2.position, Point::new(380.0, 130.0));
        assert!(g2.z_index > g.z_index);
        assert_eq!(page.active(), Some(second));
    }

    #[tokio::test]
    async fn small_viewport_shrinks_open_size() {
        let (page, _) = page(InvoiceKind::Sale);
        page.registry().set_viewport(Viewport::new(800.0, 600.0));
        let m = page.open(None).await.unwrap().unwrap();
        let g = page.instance(m).unwrap().geometry;
        assert_eq!(g.size, Size::new(760.0, 520.0));
        assert_eq!(g.position, Point::new(20.0, 40.0));
    }

    #[tokio::test]
    async fn move_without_single_selection_warns() {
        let (page, notifier) = page(InvoiceKind::Sale);
        let m = page.open(None).await.unwrap().unwrap();
        assert!(!page.update(m, ModalUpdate::Edit(BufferEdit::MoveSelectedDown)));
        assert_eq!(notifier.count(NoticeLevel::Warning), 1);
    }

    #[tokio::test]
    async fn close_unknown_is_noop() {
        let (page, _) = page(InvoiceKind::Sale);
        assert!(!page.close(ModalId::new()));
        assert!(!page.activate(ModalId::new()));
        assert!(page.registry().is_empty());
    }

    #[tokio::test]
    async fn save_after_close_is_stale_and_silent() {
        let (page, notifier) = page(InvoiceKind::Sale);
        let m = page.open(None).await.unwrap().unwrap();
        assert!(page.close(m));

        let err = page.save(m, false).await.unwrap_err();
        assert!(matches!(err, SaveError::Stale(id) if id == m));
        assert!(!err.is_user_visible());
        assert!(matches!(page.print(m).await, Err(PrintError::Stale(id)) if id == m));
        assert!(notifier.notices().is_empty());
        assert!(page.registry().is_empty());
    }

    #[tokio::test]
    async fn purchase_requires_supplier() {
        let (page, notifier) = page(InvoiceKind::Purchase);
        let m = page.open(None).await.unwrap().unwrap();
        page.update(m, ModalUpdate::Edit(BufferEdit::AddLine));
        page.update(
            m,
            ModalUpdate::Edit(BufferEdit::SetProduct {
                line: 0,
                product: qaime_types::Product {
                    id: qaime_types::ProductId(1),
                    name: "Flour".into(),
                    sale_price: Some(3.0),
                    purchase_price: Some(2.0),
                },
            }),
        );
        let err = page.save(m, false).await.unwrap_err();
        assert!(matches!(
            err,
            SaveError::Validation(crate::error::ValidationError::NoCounterpart(
                CounterpartKind::Supplier
            ))
        ));
        assert_eq!(notifier.notices()[0].message, "select a supplier");
        assert_eq!(page.instance(m).unwrap().buffer.lines[0].unit_price, 2.0);
    }
}
