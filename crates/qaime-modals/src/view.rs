//! Window chrome state for one open instance.
//!
//! The view never writes to the registry or the store. Every method returns
//! the [`GeometryPatch`] the page should apply, or `None` when nothing needs
//! committing. Drag commits on every move; resize keeps a live local size
//! and commits once on pointer-up.

use tracing::trace;

use qaime_types::{ModalId, Point, Rect, Size, Viewport};
use qaime_windows::WindowingConfig;

use crate::store::{GeometryPatch, ModalGeometry};

/// Pointer interaction in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Header grabbed; `grab` is the pointer offset from the window origin.
    Dragging { grab: Point },
    /// Corner handle grabbed.
    Resizing {
        start_pointer: Point,
        start_size: Size,
        live: Size,
    },
}

/// What the host paints for an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub rect: Rect,
    pub paint_z: u64,
    pub is_maximized: bool,
    pub interaction: InteractionState,
}

/// Chrome state machine for one modal instance.
#[derive(Debug, Clone)]
pub struct ModalView {
    modal: ModalId,
    interaction: InteractionState,
    /// Geometry saved by maximize, written back by restore.
    restore_slot: Option<Rect>,
}

impl ModalView {
    pub fn new(modal: ModalId) -> Self {
        Self {
            modal,
            interaction: InteractionState::Idle,
            restore_slot: None,
        }
    }

    pub fn modal(&self) -> ModalId {
        self.modal
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    pub fn restore_slot(&self) -> Option<Rect> {
        self.restore_slot
    }

    /// Pointer pressed on the header. Ignored while maximized.
    pub fn header_pointer_down(&mut self, pointer: Point, geometry: &ModalGeometry) -> bool {
        if geometry.is_maximized {
            return false;
        }
        self.interaction = InteractionState::Dragging {
            grab: pointer.delta_from(geometry.position),
        };
        true
    }

    /// Pointer pressed on the resize corner. Ignored while maximized.
    pub fn corner_pointer_down(&mut self, pointer: Point, geometry: &ModalGeometry) -> bool {
        if geometry.is_maximized {
            return false;
        }
        self.interaction = InteractionState::Resizing {
            start_pointer: pointer,
            start_size: geometry.size,
            live: geometry.size,
        };
        true
    }

    pub fn pointer_move(
        &mut self,
        pointer: Point,
        geometry: &ModalGeometry,
        viewport: &Viewport,
        config: &WindowingConfig,
    ) -> Option<GeometryPatch> {
        match &mut self.interaction {
            InteractionState::Idle => None,
            InteractionState::Dragging { grab } => {
                let max = viewport.max_position(geometry.size);
                let position = Point::new(
                    (pointer.x - grab.x).clamp(0.0, max.x),
                    (pointer.y - grab.y).clamp(0.0, max.y),
                );
                trace!("drag {:?} to {:?}", self.modal, position);
                (position != geometry.position).then(|| GeometryPatch::position(position))
            }
            InteractionState::Resizing {
                start_pointer,
                start_size,
                live,
            } => {
                let delta = pointer.delta_from(*start_pointer);
                let requested = Size::new(start_size.width + delta.x, start_size.height + delta.y);
                *live = requested.clamp(config.min_size, viewport.remaining_from(geometry.position));
                None
            }
        }
    }

    /// Pointer released. A resize commits its final size here, once.
    pub fn pointer_up(&mut self, geometry: &ModalGeometry) -> Option<GeometryPatch> {
        let ended = std::mem::take(&mut self.interaction);
        match ended {
            InteractionState::Resizing { live, .. } if live != geometry.size => {
                Some(GeometryPatch::size(live))
            }
            _ => None,
        }
    }

    /// Maximize, or restore when already maximized.
    pub fn toggle_maximize(
        &mut self,
        geometry: &ModalGeometry,
        viewport: &Viewport,
        config: &WindowingConfig,
    ) -> GeometryPatch {
        self.interaction = InteractionState::Idle;
        if geometry.is_maximized {
            let rect = self
                .restore_slot
                .take()
                .unwrap_or_else(|| Rect::centered(config.default_size, viewport.size()));
            GeometryPatch {
                is_maximized: Some(false),
                ..GeometryPatch::rect(rect)
            }
        } else {
            self.restore_slot = Some(geometry.rect());
            let nav = viewport.top_chrome.unwrap_or(config.fallback_nav_height);
            let rect = Rect::new(
                0.0,
                nav,
                viewport.width,
                (viewport.height - nav - config.taskbar_height).max(0.0),
            );
            GeometryPatch {
                is_maximized: Some(true),
                ..GeometryPatch::rect(rect)
            }
        }
    }

    /// Paint state, or `None` while minimized.
    pub fn frame(&self, geometry: &ModalGeometry, config: &WindowingConfig) -> Option<Frame> {
        if geometry.is_minimized {
            return None;
        }
        let size = match self.interaction {
            InteractionState::Resizing { live, .. } => live,
            _ => geometry.size,
        };
        Some(Frame {
            rect: Rect::from_parts(geometry.position, size),
            paint_z: config.paint_z(geometry.z_index),
            is_maximized: geometry.is_maximized,
            interaction: self.interaction,
        })
    }
}
