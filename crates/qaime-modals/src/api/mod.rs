//! Persistence collaborator seam.
//!
//! The page talks to the invoice REST API only through [`InvoiceApi`]. The
//! HTTP client itself lives outside this workspace; [`MemoryInvoiceApi`] is
//! the in-process stand-in used by the demo and the tests.

mod memory;

pub use memory::{ApiCall, ApiOp, MemoryInvoiceApi};

use async_trait::async_trait;

use qaime_types::{Invoice, InvoiceId, InvoicePayload};

use crate::error::ApiResult;

/// Invoice CRUD as the modal layer consumes it.
#[async_trait]
pub trait InvoiceApi: Send + Sync {
    /// Full invoice including lines.
    async fn get_by_id(&self, id: InvoiceId) -> ApiResult<Invoice>;

    /// Create an invoice. `payload.confirmed` sets the initial state.
    async fn create(&self, payload: &InvoicePayload) -> ApiResult<Invoice>;

    /// Replace lines and header fields. Confirmation is left alone.
    async fn update(&self, id: InvoiceId, payload: &InvoicePayload) -> ApiResult<Invoice>;

    async fn update_confirmation_status(&self, id: InvoiceId, confirmed: bool) -> ApiResult<()>;
}
