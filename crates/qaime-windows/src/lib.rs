//! Window registry for qaime.
//!
//! Every top-level surface (a routed page or a floating modal) registers here.
//! The registry owns stacking order and visibility; owners learn about user
//! intent through [`WindowDelegate`] callbacks.
//!
//! ```text
//! WindowRegistry ──owns──▶ WindowRecord (title, kind, z, geometry, flags)
//!       │                        │
//!       │ broadcast              └── delegate: Arc<dyn WindowDelegate>
//!       ▼
//! WindowEvent ──▶ subscribers (bridge, taskbar redraw)
//! ```
//!
//! | Type | Role |
//! |------|------|
//! | [`WindowRegistry`] | z counter, records, viewport cache, tiling |
//! | [`Taskbar`] | sorted button list and click actions |
//! | [`WindowingConfig`] | tunables loaded from RON |

pub mod config;
pub mod events;
pub mod record;
pub mod registry;
pub mod taskbar;
pub mod tile;

pub use config::{ConfigError, WindowingConfig, load_config, load_config_or_default};
pub use events::WindowEvent;
pub use record::{CallbackDelegate, NewWindow, WindowDelegate, WindowPatch, WindowRecord};
pub use registry::{Placement, SharedWindowRegistry, WindowRegistry, shared_window_registry};
pub use taskbar::{Taskbar, TaskbarEntry};
