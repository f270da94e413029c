//! The window registry: one record per top-level surface.
//!
//! # Concurrency Model
//!
//! - A single `parking_lot::RwLock` guards the records and the z counter
//! - Delegate callbacks and event broadcasts happen after the lock is released
//! - Viewport dimensions are cached separately so tiling never blocks on a
//!   host query

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use qaime_types::{Rect, Size, Viewport, WindowId};

use crate::config::WindowingConfig;
use crate::events::WindowEvent;
use crate::record::{NewWindow, WindowDelegate, WindowPatch, WindowRecord};
use crate::tile;

struct Inner {
    windows: IndexMap<WindowId, WindowRecord>,
    /// Last z value handed out. Strictly increases except on renormalize.
    top_z: u64,
    /// Bumped on every compaction, so callers can tell their z values went stale.
    z_epoch: u64,
}

impl Inner {
    fn next_z(&mut self) -> u64 {
        self.top_z += 1;
        self.top_z
    }

    /// Reassign z values to `base+1..=base+n`, preserving relative order.
    fn compact(&mut self, base: u64) -> u64 {
        let mut order: Vec<(u64, WindowId)> =
            self.windows.values().map(|w| (w.z_index, w.id)).collect();
        order.sort_by_key(|(z, _)| *z);
        for (i, (_, id)) in order.iter().enumerate() {
            if let Some(w) = self.windows.get_mut(id) {
                w.z_index = base + 1 + i as u64;
            }
        }
        self.top_z = base + order.len() as u64;
        self.z_epoch += 1;
        self.top_z
    }
}

/// Where [`WindowRegistry::add`] put a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Final z of the new window.
    pub z_index: u64,
    /// The add pushed the counter past the threshold and every window was
    /// renumbered. z values read earlier are stale.
    pub renormalized: bool,
}

/// Deferred side effects collected under the lock, run after it's released.
#[derive(Default)]
struct Effects {
    events: Vec<WindowEvent>,
    activate: Option<(Arc<dyn WindowDelegate>, WindowId)>,
    restore: Option<(Arc<dyn WindowDelegate>, WindowId)>,
}

/// Tracks every open window, its z-order, and visibility.
pub struct WindowRegistry {
    inner: RwLock<Inner>,
    viewport: RwLock<Viewport>,
    config: WindowingConfig,
    event_tx: broadcast::Sender<WindowEvent>,
}

impl WindowRegistry {
    pub fn new(config: WindowingConfig) -> Self {
        let (event_tx, _) = broadcast::channel(1024);
        Self {
            inner: RwLock::new(Inner {
                windows: IndexMap::new(),
                top_z: config.base_z_index,
                z_epoch: 0,
            }),
            viewport: RwLock::new(Viewport::default()),
            config,
            event_tx,
        }
    }

    pub fn config(&self) -> &WindowingConfig {
        &self.config
    }

    /// Subscribe to registry events.
    pub fn subscribe(&self) -> broadcast::Receiver<WindowEvent> {
        self.event_tx.subscribe()
    }

    /// Cache the host viewport. Call on startup and on every host resize.
    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.write() = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.read()
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn get(&self, id: WindowId) -> Option<WindowRecord> {
        self.inner.read().windows.get(&id).cloned()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.inner.read().windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().windows.is_empty()
    }

    /// All records in registration order.
    pub fn snapshot(&self) -> Vec<WindowRecord> {
        self.inner.read().windows.values().cloned().collect()
    }

    /// Last z value handed out.
    pub fn top_z_index(&self) -> u64 {
        self.inner.read().top_z
    }

    /// Number of renormalizations so far. Any z read before a change of
    /// epoch is out of date.
    pub fn z_epoch(&self) -> u64 {
        self.inner.read().z_epoch
    }

    /// Highest z among on-screen windows, if any are on screen.
    pub fn max_visible_z(&self) -> Option<u64> {
        self.inner
            .read()
            .windows
            .values()
            .filter(|w| w.is_on_screen())
            .map(|w| w.z_index)
            .max()
    }

    /// The focused window: on screen with the highest z.
    pub fn active_window(&self) -> Option<WindowId> {
        self.inner
            .read()
            .windows
            .values()
            .filter(|w| w.is_on_screen())
            .max_by_key(|w| w.z_index)
            .map(|w| w.id)
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    /// Register a window on top of the stack.
    ///
    /// If the new z crosses the renormalize threshold every window is
    /// renumbered; the returned [`Placement`] carries the final z and says
    /// whether that happened.
    ///
    /// Re-adding an existing id replaces the record (last writer wins).
    pub fn add(&self, window: NewWindow) -> Placement {
        let id = window.id;
        let mut effects = Effects::default();
        let placement = {
            let mut inner = self.inner.write();
            let assigned = inner.next_z();
            let record = window.into_record(assigned);
            if inner.windows.insert(id, record).is_some() {
                warn!("window {} registered twice, replacing record", id);
            }
            let renormalized = self.maybe_compact(&mut inner, &mut effects);
            // The new window holds the highest z, before and after compaction.
            let z_index = inner.top_z;
            effects.events.push(WindowEvent::Added { id, z_index });
            Placement { z_index, renormalized }
        };
        debug!("window {} added at z {}", id, placement.z_index);
        self.run(effects);
        placement
    }

    /// Drop a record. No callbacks fire; this is the owner's teardown path.
    pub fn remove(&self, id: WindowId) -> Option<WindowRecord> {
        let removed = self.inner.write().windows.shift_remove(&id);
        match &removed {
            Some(_) => {
                debug!("window {} removed", id);
                let _ = self.event_tx.send(WindowEvent::Removed { id });
            }
            None => debug!("remove: no window {}", id),
        }
        removed
    }

    /// Bring a window to the top and show it.
    ///
    /// Fires `on_activate`, then `on_restore` if it was minimized.
    pub fn activate(&self, id: WindowId) -> bool {
        let mut effects = Effects::default();
        {
            let mut inner = self.inner.write();
            if !inner.windows.contains_key(&id) {
                debug!("activate: no window {}", id);
                return false;
            }
            let z_index = inner.next_z();
            let Some(w) = inner.windows.get_mut(&id) else {
                return false;
            };
            let was_minimized = w.is_minimized;
            w.z_index = z_index;
            w.is_visible = true;
            w.is_minimized = false;
            if let Some(d) = &w.delegate {
                effects.activate = Some((d.clone(), id));
                if was_minimized {
                    effects.restore = Some((d.clone(), id));
                }
            }
            effects.events.push(WindowEvent::Activated { id, z_index });
            self.maybe_compact(&mut inner, &mut effects);
        }
        self.run(effects);
        true
    }

    /// Hide to the taskbar. z is left alone.
    pub fn minimize(&self, id: WindowId) -> bool {
        {
            let mut inner = self.inner.write();
            let Some(w) = inner.windows.get_mut(&id) else {
                debug!("minimize: no window {}", id);
                return false;
            };
            w.is_minimized = true;
            w.is_visible = false;
        }
        let _ = self.event_tx.send(WindowEvent::Minimized { id });
        true
    }

    /// Un-minimize onto the top of the stack. No-op unless minimized.
    pub fn restore(&self, id: WindowId) -> bool {
        let mut effects = Effects::default();
        {
            let mut inner = self.inner.write();
            match inner.windows.get(&id) {
                None => {
                    debug!("restore: no window {}", id);
                    return false;
                }
                Some(w) if !w.is_minimized => return false,
                Some(_) => {}
            }
            let z_index = inner.next_z();
            if let Some(w) = inner.windows.get_mut(&id) {
                w.z_index = z_index;
                w.is_visible = true;
                w.is_minimized = false;
                if let Some(d) = &w.delegate {
                    effects.restore = Some((d.clone(), id));
                }
            }
            effects.events.push(WindowEvent::Restored { id, z_index });
            self.maybe_compact(&mut inner, &mut effects);
        }
        self.run(effects);
        true
    }

    /// Shallow-merge a partial update.
    ///
    /// A z value above the counter moves the counter up with it, so later
    /// activations still land on top.
    pub fn update(&self, id: WindowId, patch: &WindowPatch) -> bool {
        if patch.is_empty() {
            return self.contains(id);
        }
        let mut effects = Effects::default();
        {
            let mut inner = self.inner.write();
            let Some(w) = inner.windows.get_mut(&id) else {
                debug!("update: no window {}", id);
                return false;
            };
            w.apply(patch);
            if let Some(z_index) = patch.z_index {
                inner.top_z = inner.top_z.max(z_index);
            }
            effects.events.push(WindowEvent::Updated { id });
            self.maybe_compact(&mut inner, &mut effects);
        }
        self.run(effects);
        true
    }

    /// Arrange up to `tile_limit` of the given windows in a grid.
    ///
    /// Minimized, hidden, and unknown ids are skipped. The tiled windows get
    /// consecutive z values above everything else in arrangement order and
    /// lose their maximized flag. Returns the ids that were tiled.
    pub fn tile(&self, ids: &[WindowId]) -> Vec<WindowId> {
        let viewport = self.viewport();
        let area = Size::new(
            viewport.width,
            (viewport.height - self.config.taskbar_band).max(0.0),
        );
        let mut effects = Effects::default();
        let tiled = {
            let mut inner = self.inner.write();
            let chosen: Vec<WindowId> = ids
                .iter()
                .copied()
                .filter(|id| inner.windows.get(id).is_some_and(WindowRecord::is_on_screen))
                .take(self.config.tile_limit)
                .collect();
            if chosen.is_empty() {
                return chosen;
            }

            let rects = tile::grid(chosen.len(), area);
            for (id, rect) in chosen.iter().zip(rects) {
                let z_index = inner.next_z();
                if let Some(w) = inner.windows.get_mut(id) {
                    let Rect { position, size } = rect;
                    w.position = position;
                    w.size = size;
                    w.z_index = z_index;
                    w.is_maximized = false;
                }
            }
            effects.events.push(WindowEvent::Tiled { ids: chosen.clone() });
            self.maybe_compact(&mut inner, &mut effects);
            chosen
        };
        info!("tiled {} windows", tiled.len());
        self.run(effects);
        tiled
    }

    /// Ask the owner to close. The record itself is left for the owner to remove.
    pub fn request_close(&self, id: WindowId) -> bool {
        let delegate = self
            .inner
            .read()
            .windows
            .get(&id)
            .and_then(|w| w.delegate.clone());
        match delegate {
            Some(d) => {
                d.on_close(id);
                true
            }
            None => {
                debug!("request_close: no owner for window {}", id);
                false
            }
        }
    }

    /// Compact z values now. Relative order is preserved.
    pub fn renormalize(&self) -> u64 {
        let top = self.inner.write().compact(self.config.base_z_index);
        info!("z values renormalized, top is now {}", top);
        let _ = self.event_tx.send(WindowEvent::Renormalized { top });
        top
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn maybe_compact(&self, inner: &mut Inner, effects: &mut Effects) -> bool {
        if inner.top_z <= self.config.z_renormalize_threshold {
            return false;
        }
        let top = inner.compact(self.config.base_z_index);
        info!("z counter passed threshold, renormalized to {}", top);
        effects.events.push(WindowEvent::Renormalized { top });
        true
    }

    fn run(&self, effects: Effects) {
        for event in effects.events {
            let _ = self.event_tx.send(event);
        }
        if let Some((d, id)) = effects.activate {
            d.on_activate(id);
        }
        if let Some((d, id)) = effects.restore {
            d.on_restore(id);
        }
    }
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new(WindowingConfig::default())
    }
}

/// Thread-safe registry handle.
pub type SharedWindowRegistry = Arc<WindowRegistry>;

/// Create a new shared registry.
pub fn shared_window_registry(config: WindowingConfig) -> SharedWindowRegistry {
    Arc::new(WindowRegistry::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CallbackDelegate;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use qaime_types::{ModalKind, Point, WindowKind};

    fn modal(title: &str) -> NewWindow {
        NewWindow::new(WindowId::new(), title, WindowKind::modal(ModalKind::InvoiceEdit))
    }

    #[test]
    fn test_add_assigns_increasing_z() {
        let reg = WindowRegistry::default();
        let a = reg.add(modal("a"));
        let b = reg.add(modal("b"));
        assert_eq!(a, Placement { z_index: 1001, renormalized: false });
        assert_eq!(b, Placement { z_index: 1002, renormalized: false });
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_activate_puts_window_strictly_on_top() {
        let reg = WindowRegistry::default();
        let ids: Vec<_> = (0..4)
            .map(|i| {
                let w = modal(&format!("w{i}"));
                let id = w.id;
                reg.add(w);
                id
            })
            .collect();

        for &id in ids.iter().rev().chain(ids.iter()) {
            assert!(reg.activate(id));
            let top = reg.get(id).unwrap().z_index;
            for other in reg.snapshot().iter().filter(|w| w.id != id) {
                assert!(top > other.z_index);
            }
            assert_eq!(reg.active_window(), Some(id));
        }
    }

    #[test]
    fn test_minimize_hides_and_restore_only_acts_when_minimized() {
        let reg = WindowRegistry::default();
        let w = modal("a");
        let id = w.id;
        reg.add(w);

        let z_before = reg.get(id).unwrap().z_index;
        assert!(!reg.restore(id));
        assert_eq!(reg.get(id).unwrap().z_index, z_before);

        reg.minimize(id);
        let r = reg.get(id).unwrap();
        assert!(r.is_minimized && !r.is_visible);
        assert_eq!(r.z_index, z_before);
        assert_eq!(reg.active_window(), None);

        assert!(reg.restore(id));
        let r = reg.get(id).unwrap();
        assert!(r.is_on_screen());
        assert!(r.z_index > z_before);
    }

    #[test]
    fn test_activate_minimized_fires_activate_then_restore() {
        let reg = WindowRegistry::default();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (c1, c2) = (calls.clone(), calls.clone());
        let delegate = CallbackDelegate::new()
            .on_activate(move |_| c1.lock().push("activate"))
            .on_restore(move |_| c2.lock().push("restore"))
            .into_arc();
        let w = modal("a").with_delegate(delegate);
        let id = w.id;
        reg.add(w);

        reg.activate(id);
        assert_eq!(*calls.lock(), vec!["activate"]);

        reg.minimize(id);
        reg.activate(id);
        assert_eq!(*calls.lock(), vec!["activate", "activate", "restore"]);
        assert!(reg.get(id).unwrap().is_on_screen());
    }

    #[test]
    fn test_delegate_may_reenter_registry() {
        let reg = Arc::new(WindowRegistry::default());
        let r2 = Arc::downgrade(&reg);
        let delegate = CallbackDelegate::new()
            .on_close(move |id| {
                if let Some(reg) = r2.upgrade() {
                    reg.remove(id);
                }
            })
            .into_arc();
        let w = modal("a").with_delegate(delegate);
        let id = w.id;
        reg.add(w);

        assert!(reg.request_close(id));
        assert!(!reg.contains(id));
    }

    #[test]
    fn test_request_close_never_removes_by_itself() {
        let reg = WindowRegistry::default();
        let closes = Arc::new(Mutex::new(0));
        let c = closes.clone();
        let owned = modal("owned").with_delegate(
            CallbackDelegate::new()
                .on_close(move |_| *c.lock() += 1)
                .into_arc(),
        );
        let orphan = modal("orphan");
        let (owned_id, orphan_id) = (owned.id, orphan.id);
        reg.add(owned);
        reg.add(orphan);

        assert!(reg.request_close(owned_id));
        assert!(!reg.request_close(orphan_id));
        assert_eq!(*closes.lock(), 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_update_with_higher_z_raises_counter() {
        let reg = WindowRegistry::default();
        let a = modal("a");
        let b = modal("b");
        let (ia, ib) = (a.id, b.id);
        reg.add(a);
        reg.add(b);
        reg.update(ia, &WindowPatch::default().z_index(1500));
        assert_eq!(reg.top_z_index(), 1500);
        reg.activate(ib);
        assert_eq!(reg.get(ib).unwrap().z_index, 1501);
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let reg = WindowRegistry::default();
        let ghost = WindowId::new();
        assert!(!reg.activate(ghost));
        assert!(!reg.minimize(ghost));
        assert!(!reg.restore(ghost));
        assert!(!reg.update(ghost, &WindowPatch::default().title("x")));
        assert!(!reg.request_close(ghost));
        assert!(reg.remove(ghost).is_none());
        assert_eq!(reg.top_z_index(), 1000);
    }

    #[test]
    fn test_duplicate_add_last_writer_wins() {
        let reg = WindowRegistry::default();
        let id = WindowId::new();
        reg.add(NewWindow::new(id, "first", WindowKind::modal(ModalKind::Settings)));
        reg.add(NewWindow::new(id, "second", WindowKind::modal(ModalKind::Settings)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(id).unwrap().title, "second");
    }

    #[test]
    fn test_update_merges_shallowly() {
        let reg = WindowRegistry::default();
        let w = modal("a");
        let id = w.id;
        let z = reg.add(w).z_index;
        reg.update(
            id,
            &WindowPatch::default()
                .title("renamed")
                .geometry(Point::new(10.0, 20.0), Size::new(600.0, 500.0)),
        );
        let r = reg.get(id).unwrap();
        assert_eq!(r.title, "renamed");
        assert_eq!(r.position, Point::new(10.0, 20.0));
        assert_eq!(r.z_index, z);
    }

    #[test]
    fn test_tile_skips_minimized_and_caps_at_limit() {
        let reg = WindowRegistry::default();
        reg.set_viewport(Viewport::new(1600.0, 1000.0));
        let ids: Vec<_> = (0..6)
            .map(|i| {
                let w = modal(&format!("w{i}"));
                let id = w.id;
                reg.add(w);
                id
            })
            .collect();
        reg.minimize(ids[1]);

        let tiled = reg.tile(&ids);
        assert_eq!(tiled, vec![ids[0], ids[2], ids[3], ids[4]]);

        let area = Rect::new(0.0, 0.0, 1600.0, 900.0);
        let rects: Vec<Rect> = tiled
            .iter()
            .map(|id| {
                let r = reg.get(*id).unwrap();
                Rect::from_parts(r.position, r.size)
            })
            .collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.right() <= area.right() && a.bottom() <= area.bottom());
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }

        // arrangement order is stacking order, all above the untiled window
        let zs: Vec<u64> = tiled.iter().map(|id| reg.get(*id).unwrap().z_index).collect();
        assert!(zs.windows(2).all(|p| p[0] < p[1]));
        assert!(zs[0] > reg.get(ids[5]).unwrap().z_index);
        assert!(reg.get(ids[1]).unwrap().is_minimized);
    }

    #[test]
    fn test_tile_clears_maximized() {
        let reg = WindowRegistry::default();
        let w = modal("a").maximized(true);
        let id = w.id;
        reg.add(w);
        reg.tile(&[id]);
        let r = reg.get(id).unwrap();
        assert!(!r.is_maximized);
        assert_eq!(r.position, Point::ORIGIN);
        assert_eq!(r.size, Size::new(1920.0, 980.0));
    }

    #[test]
    fn test_renormalize_preserves_order() {
        let config = WindowingConfig {
            z_renormalize_threshold: 1010,
            ..Default::default()
        };
        let reg = WindowRegistry::new(config);
        let a = modal("a");
        let b = modal("b");
        let (ia, ib) = (a.id, b.id);
        reg.add(a);
        reg.add(b);
        for _ in 0..10 {
            reg.activate(ia);
            reg.activate(ib);
        }
        assert!(reg.top_z_index() <= 1010);
        let (za, zb) = (reg.get(ia).unwrap().z_index, reg.get(ib).unwrap().z_index);
        assert!(zb > za);
        assert_eq!(reg.active_window(), Some(ib));
    }

    #[test]
    fn test_add_reports_renormalization() {
        let config = WindowingConfig {
            z_renormalize_threshold: 1003,
            ..Default::default()
        };
        let reg = WindowRegistry::new(config);
        let a = modal("a");
        let b = modal("b");
        let (ia, ib) = (a.id, b.id);
        reg.add(a);
        reg.add(b);
        reg.activate(ia);
        assert_eq!(reg.top_z_index(), 1003);
        assert_eq!(reg.z_epoch(), 0);

        let c = modal("c");
        let ic = c.id;
        let placement = reg.add(c);

        assert_eq!(placement, Placement { z_index: 1003, renormalized: true });
        assert_eq!(reg.z_epoch(), 1);
        assert_eq!(reg.get(ib).unwrap().z_index, 1001);
        assert_eq!(reg.get(ia).unwrap().z_index, 1002);
        assert_eq!(reg.get(ic).unwrap().z_index, placement.z_index);
        assert_eq!(reg.active_window(), Some(ic));
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let reg = WindowRegistry::default();
        let mut rx = reg.subscribe();
        let w = modal("a");
        let id = w.id;
        reg.add(w);
        reg.minimize(id);
        reg.remove(id);

        assert_eq!(rx.recv().await.unwrap(), WindowEvent::Added { id, z_index: 1001 });
        assert_eq!(rx.recv().await.unwrap(), WindowEvent::Minimized { id });
        assert_eq!(rx.recv().await.unwrap(), WindowEvent::Removed { id });
    }
}
