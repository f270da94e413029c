//! Error types for the modal layer.

use thiserror::Error;

use qaime_types::{CounterpartKind, InvoiceId, ModalId};

/// Persistence collaborator failure. Opaque to the core; only shown to the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("invoice {0} not found")]
    NotFound(InvoiceId),

    /// The server refused the request (validation, permissions, conflicts).
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Checks run before any network call.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("select at least one product")]
    NoProductLines,

    #[error("select a {0}")]
    NoCounterpart(CounterpartKind),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("save failed: {0}")]
    Api(#[from] ApiError),

    /// No instance with this id when the save began. Returned to the caller
    /// but never shown; see [`SaveError::is_user_visible`].
    #[error("modal {0:?} no longer exists")]
    Stale(ModalId),
}

impl SaveError {
    /// Whether the user should hear about this.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SaveError::Stale(_))
    }
}

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("could not load invoice: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("save the invoice before printing")]
    NotSaved,

    #[error("could not load invoice for printing: {0}")]
    Api(#[from] ApiError),

    #[error("printer failed: {0}")]
    Printer(String),

    #[error("modal {0:?} no longer exists")]
    Stale(ModalId),
}
