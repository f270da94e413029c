//! Shared identity, geometry, and invoice types for qaime.
//!
//! This crate is the leaf of the workspace: typed ids, screen geometry,
//! window kinds, and the invoice shapes the persistence collaborator speaks.
//! It has **no internal qaime dependencies**.
//!
//! # Relationships
//!
//! ```text
//! WindowRecord (WindowId) ← presentation state in the registry
//!     └── correlated with ModalInstance (ModalId) through the bridge map
//!
//! ModalInstance (ModalId) ← one open document on a page
//!     └── entity: Option<InvoiceId> (None = unsaved draft)
//!     └── edit buffer lines reference ProductId
//!     └── counterpart: CounterpartId (customer or supplier)
//! ```
//!
//! # Key Types
//!
//! |-------------------|----------------------------------------------|
//! | Type              | Purpose                                      |
//! |-------------------|----------------------------------------------|
//! | [`WindowId`]      | Which registry record                        |
//! | [`ModalId`]       | Which open document instance                 |
//! | [`InvoiceId`]     | Persisted invoice (server-assigned)          |
//! | [`Rect`]          | Position + size in logical pixels            |
//! | [`Viewport`]      | Screen size + reserved top chrome            |
//! | [`WindowKind`]    | Route or modal (with modal sub-kind)         |
//! | [`Invoice`]       | Entity shape returned by the API             |
//! | [`InvoicePayload`]| Create/update body sent to the API           |
//! |-------------------|----------------------------------------------|

pub mod geometry;
pub mod ids;
pub mod invoice;
pub mod window;

pub use geometry::{Point, Rect, Size, Viewport};
pub use ids::{CounterpartId, InvoiceId, ModalId, ProductId, WindowId};
pub use invoice::{
    Counterpart, CounterpartKind, Invoice, InvoiceKind, InvoiceLine, InvoicePayload, PayloadLine,
    PriceKind, Product,
};
pub use window::{ModalKind, WindowKind};
