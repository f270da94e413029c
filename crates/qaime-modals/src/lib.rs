//! Invoice modal windows.
//!
//! An [`InvoicePage`] keeps any number of invoice editors open at once, each
//! a floating window in the shared [`qaime_windows::WindowRegistry`].
//!
//! ```text
//! InvoicePage
//!   ├── ModalStore ──── ModalInstance (buffer, geometry, confirmation)
//!   ├── SyncBridge ──── ModalId ⇄ WindowId, three-way merge per pass
//!   ├── ModalView ───── drag / resize / maximize state per instance
//!   └── Arc<dyn InvoiceApi> (get, create, update, confirm)
//! ```
//!
//! The page is the only writer of its store. The registry talks back through
//! a [`qaime_windows::WindowDelegate`] per window, which just asks the page
//! to re-sync or close.

pub mod api;
pub mod bridge;
pub mod buffer;
pub mod error;
pub mod input;
pub mod notify;
pub mod page;
pub mod print;
pub mod store;
pub mod view;

pub use api::{ApiCall, ApiOp, InvoiceApi, MemoryInvoiceApi};
pub use bridge::{ReconcileReport, SyncBridge};
pub use buffer::{BufferEdit, EditBuffer, EditLine};
pub use error::{ApiError, ApiResult, OpenError, PrintError, SaveError, ValidationError};
pub use input::{KeyEvent, KeyMap, ModalAction};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use page::{InvoicePage, InvoicePageBuilder, ModalUpdate, PageOptions, PendingOpen, SaveOutcome};
pub use print::{InvoicePrinter, TextPrinter, render_text};
pub use store::{Confirmation, GeometryPatch, ModalGeometry, ModalInstance, ModalStore};
pub use view::{Frame, InteractionState, ModalView};
