//! Window kinds: what a registry record stands for.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Modal sub-kind. Drives the taskbar icon and nothing else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ModalKind {
    InvoiceEdit,
    CustomerPicker,
    ProductPicker,
    Settings,
    SupplierPicker,
}

impl ModalKind {
    /// Taskbar glyph.
    pub fn icon(&self) -> &'static str {
        match self {
            ModalKind::InvoiceEdit => "📄",
            ModalKind::CustomerPicker => "👤",
            ModalKind::SupplierPicker => "🏢",
            ModalKind::ProductPicker => "📦",
            ModalKind::Settings => "⚙️",
        }
    }
}

/// Top-level surface kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WindowKind {
    /// A routed page (one per open route).
    Route { path: String },
    /// A floating modal window.
    Modal { modal: ModalKind },
}

impl WindowKind {
    pub fn modal(kind: ModalKind) -> Self {
        WindowKind::Modal { modal: kind }
    }

    pub fn is_modal(&self) -> bool {
        matches!(self, WindowKind::Modal { .. })
    }

    pub fn modal_kind(&self) -> Option<ModalKind> {
        match self {
            WindowKind::Modal { modal } => Some(*modal),
            WindowKind::Route { .. } => None,
        }
    }
}
