//! Registry change events.

use qaime_types::WindowId;

/// Broadcast after each registry mutation, once the lock is released.
#[derive(Clone, Debug, PartialEq)]
pub enum WindowEvent {
    Added { id: WindowId, z_index: u64 },
    Removed { id: WindowId },
    Activated { id: WindowId, z_index: u64 },
    Minimized { id: WindowId },
    Restored { id: WindowId, z_index: u64 },
    Updated { id: WindowId },
    /// Tiled windows in arrangement order.
    Tiled { ids: Vec<WindowId> },
    /// All z values were compacted; top is the new counter value.
    Renormalized { top: u64 },
}

impl WindowEvent {
    /// The single window this event concerns, if any.
    pub fn window_id(&self) -> Option<WindowId> {
        match self {
            WindowEvent::Added { id, .. }
            | WindowEvent::Removed { id }
            | WindowEvent::Activated { id, .. }
            | WindowEvent::Minimized { id }
            | WindowEvent::Restored { id, .. }
            | WindowEvent::Updated { id } => Some(*id),
            WindowEvent::Tiled { .. } | WindowEvent::Renormalized { .. } => None,
        }
    }
}
