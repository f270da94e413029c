//! Synchronization bridge between a page's modal store and the window registry.
//!
//! The bridge owns the only mapping from [`ModalId`] to [`WindowId`]. Each
//! reconcile pass does a three-way merge per field against the values it last
//! synced: a side that moved since then wins, and when both moved the
//! registry wins. Unchanged fields are never written, so a second pass with
//! no intervening mutation reports zero writes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use qaime_types::{ModalId, ModalKind, Point, Size, WindowId, WindowKind};
use qaime_windows::{NewWindow, WindowDelegate, WindowPatch, WindowRecord, WindowRegistry};

use crate::store::{ModalInstance, ModalStore};

/// Fields that flow both ways.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Synced {
    position: Point,
    size: Size,
    z_index: u64,
    is_maximized: bool,
    is_minimized: bool,
}

impl Synced {
    fn from_instance(m: &ModalInstance) -> Self {
        Self {
            position: m.geometry.position,
            size: m.geometry.size,
            z_index: m.geometry.z_index,
            is_maximized: m.geometry.is_maximized,
            is_minimized: m.geometry.is_minimized,
        }
    }

    fn from_record(w: &WindowRecord) -> Self {
        Self {
            position: w.position,
            size: w.size,
            z_index: w.z_index,
            is_maximized: w.is_maximized,
            is_minimized: w.is_minimized,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    window: WindowId,
    synced: Synced,
}

/// Counts of writes made by one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Registry records added.
    pub created: usize,
    /// Registry records patched.
    pub updated: usize,
    /// Registry records removed.
    pub removed: usize,
    /// Instances that took values from the registry.
    pub pulled: usize,
}

impl ReconcileReport {
    pub fn writes(&self) -> usize {
        self.created + self.updated + self.removed + self.pulled
    }

    pub fn is_noop(&self) -> bool {
        self.writes() == 0
    }
}

/// Outcome of merging one field.
enum Merge<T> {
    Keep,
    Pull(T),
    Push(T),
}

fn merge<T: PartialEq + Copy>(base: T, local: T, remote: T) -> Merge<T> {
    if local == remote {
        Merge::Keep
    } else if remote != base {
        Merge::Pull(remote)
    } else {
        Merge::Push(local)
    }
}

/// Keeps one page's instances and their registry records consistent.
#[derive(Debug)]
pub struct SyncBridge {
    modal_kind: ModalKind,
    links: HashMap<ModalId, Link>,
}

impl SyncBridge {
    pub fn new(modal_kind: ModalKind) -> Self {
        Self {
            modal_kind,
            links: HashMap::new(),
        }
    }

    pub fn window_for(&self, modal: ModalId) -> Option<WindowId> {
        self.links.get(&modal).map(|l| l.window)
    }

    pub fn modal_for(&self, window: WindowId) -> Option<ModalId> {
        self.links
            .iter()
            .find(|(_, l)| l.window == window)
            .map(|(m, _)| *m)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// One reconcile pass.
    ///
    /// Only calls registry operations that never fire delegate callbacks, so
    /// it is safe to run while the caller holds its own page lock.
    pub fn reconcile(
        &mut self,
        store: &mut ModalStore,
        registry: &WindowRegistry,
        delegate_for: &dyn Fn(ModalId) -> Arc<dyn WindowDelegate>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let kind = store.kind();
        let epoch = registry.z_epoch();

        for instance in store.iter_mut() {
            let title = instance.title(kind);
            let existing = self
                .links
                .get(&instance.id)
                .copied()
                .and_then(|link| registry.get(link.window).map(|record| (link, record)));

            match existing {
                None => {
                    let window = self
                        .links
                        .get(&instance.id)
                        .map(|l| l.window)
                        .unwrap_or_else(WindowId::new);
                    let g = instance.geometry;
                    let placement = registry.add(
                        NewWindow::new(window, title, WindowKind::modal(self.modal_kind))
                            .with_geometry(g.position, g.size)
                            .with_visibility(!g.is_minimized, g.is_minimized)
                            .maximized(g.is_maximized)
                            .with_delegate(delegate_for(instance.id)),
                    );
                    instance.geometry.z_index = placement.z_index;
                    self.links.insert(
                        instance.id,
                        Link {
                            window,
                            synced: Synced::from_instance(instance),
                        },
                    );
                    debug!("bridge: created window {} for modal {:?}", window, instance.id);
                    report.created += 1;
                }
                Some((link, record)) => {
                    let synced = self.merge_one(instance, &title, link, &record, registry, &mut report);
                    self.links.insert(
                        instance.id,
                        Link {
                            window: link.window,
                            synced,
                        },
                    );
                }
            }
        }

        let orphans: Vec<ModalId> = self
            .links
            .keys()
            .filter(|m| !store.contains(**m))
            .copied()
            .collect();
        for modal in orphans {
            if let Some(link) = self.links.remove(&modal)
                && registry.remove(link.window).is_some()
            {
                debug!("bridge: removed window {} for closed modal {:?}", link.window, modal);
                report.removed += 1;
            }
        }

        if registry.z_epoch() != epoch {
            report.pulled += self.pull_renumbered_z(store, registry);
        }

        store.recompute_active();
        if !report.is_noop() {
            trace!("bridge: {:?}", report);
        }
        report
    }

    /// The registry renumbered z during this pass, so values merged earlier
    /// in the pass are stale. Take every linked record's z as the new base.
    fn pull_renumbered_z(&mut self, store: &mut ModalStore, registry: &WindowRegistry) -> usize {
        let mut pulled = 0;
        for instance in store.iter_mut() {
            let Some(link) = self.links.get_mut(&instance.id) else {
                continue;
            };
            let Some(record) = registry.get(link.window) else {
                continue;
            };
            link.synced.z_index = record.z_index;
            if instance.geometry.z_index != record.z_index {
                instance.geometry.z_index = record.z_index;
                pulled += 1;
            }
        }
        debug!("bridge: z renumbered mid-pass, pulled {} instances", pulled);
        pulled
    }

    fn merge_one(
        &self,
        instance: &mut ModalInstance,
        title: &str,
        link: Link,
        record: &WindowRecord,
        registry: &WindowRegistry,
        report: &mut ReconcileReport,
    ) -> Synced {
        let base = link.synced;
        let local = Synced::from_instance(instance);
        let remote = Synced::from_record(record);

        let mut patch = WindowPatch::default();
        let mut pulled = false;

        match merge(base.position, local.position, remote.position) {
            Merge::Keep => {}
            Merge::Pull(v) => {
                instance.geometry.position = v;
                pulled = true;
            }
            Merge::Push(v) => patch.position = Some(v),
        }
        match merge(base.size, local.size, remote.size) {
            Merge::Keep => {}
            Merge::Pull(v) => {
                instance.geometry.size = v;
                pulled = true;
            }
            Merge::Push(v) => patch.size = Some(v),
        }
        match merge(base.z_index, local.z_index, remote.z_index) {
            Merge::Keep => {}
            Merge::Pull(v) => {
                instance.geometry.z_index = v;
                pulled = true;
            }
            Merge::Push(v) => patch.z_index = Some(v),
        }
        match merge(base.is_maximized, local.is_maximized, remote.is_maximized) {
            Merge::Keep => {}
            Merge::Pull(v) => {
                instance.geometry.is_maximized = v;
                pulled = true;
            }
            Merge::Push(v) => patch.is_maximized = Some(v),
        }
        match merge(base.is_minimized, local.is_minimized, remote.is_minimized) {
            Merge::Keep => {}
            Merge::Pull(v) => {
                instance.geometry.is_minimized = v;
                pulled = true;
            }
            Merge::Push(v) => {
                patch.is_minimized = Some(v);
                patch.is_visible = Some(!v);
            }
        }
        if record.title != title {
            patch.title = Some(title.to_string());
        }

        if pulled {
            report.pulled += 1;
        }
        if !patch.is_empty() && registry.update(link.window, &patch) {
            report.updated += 1;
        }
        Synced::from_instance(instance)
    }
}
