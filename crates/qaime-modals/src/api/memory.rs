//! In-memory invoice backend.
//!
//! Ephemeral storage with a call log and one-shot failure injection. Detail
//! fetches and writes each pass through a gate that tests can hold shut.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Notify, watch};
use tracing::debug;

use qaime_types::{
    Counterpart, CounterpartId, Invoice, InvoiceId, InvoiceKind, InvoiceLine, InvoicePayload,
    Product, ProductId,
};

use super::InvoiceApi;
use crate::error::{ApiError, ApiResult};

/// One recorded request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    GetById(InvoiceId),
    Create(InvoicePayload),
    Update(InvoiceId, InvoicePayload),
    UpdateConfirmation(InvoiceId, bool),
}

/// Which request a failure is armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    GetById,
    Create,
    Update,
    UpdateConfirmation,
}

impl ApiCall {
    pub fn op(&self) -> ApiOp {
        match self {
            ApiCall::GetById(_) => ApiOp::GetById,
            ApiCall::Create(_) => ApiOp::Create,
            ApiCall::Update(..) => ApiOp::Update,
            ApiCall::UpdateConfirmation(..) => ApiOp::UpdateConfirmation,
        }
    }
}

/// Lets requests through while open. Counts the requests that reached it.
struct Gate {
    open: watch::Sender<bool>,
    started: AtomicUsize,
    notify: Notify,
}

impl Gate {
    fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            open,
            started: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    fn set(&self, open: bool) {
        self.open.send_replace(open);
    }

    async fn pass(&self) {
        let mut rx = self.open.subscribe();
        self.started.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
        // sender lives in self, so the channel can't close while we wait
        let _ = rx.wait_for(|open| *open).await;
    }

    async fn wait_for(&self, n: usize) {
        loop {
            let notified = self.notify.notified();
            if self.started.load(Ordering::SeqCst) >= n {
                return;
            }
            notified.await;
        }
    }
}

/// In-memory stand-in for the invoice REST API.
pub struct MemoryInvoiceApi {
    kind: InvoiceKind,
    today: String,
    invoices: RwLock<BTreeMap<InvoiceId, Invoice>>,
    products: RwLock<HashMap<ProductId, Product>>,
    counterparts: RwLock<HashMap<CounterpartId, Counterpart>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<HashMap<ApiOp, ApiError>>,
    fetch_gate: Gate,
    write_gate: Gate,
}

impl MemoryInvoiceApi {
    pub fn new(kind: InvoiceKind) -> Self {
        Self {
            kind,
            today: "2026-01-01".to_string(),
            invoices: RwLock::new(BTreeMap::new()),
            products: RwLock::new(HashMap::new()),
            counterparts: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            fetch_gate: Gate::new(),
            write_gate: Gate::new(),
        }
    }

    /// Date stamped on created invoices that don't carry one.
    pub fn with_today(mut self, date: impl Into<String>) -> Self {
        self.today = date.into();
        self
    }

    pub fn add_product(&self, product: Product) {
        self.products.write().insert(product.id, product);
    }

    pub fn add_counterpart(&self, counterpart: Counterpart) {
        self.counterparts.write().insert(counterpart.id, counterpart);
    }

    /// Seed a persisted invoice directly.
    pub fn insert(&self, invoice: Invoice) {
        self.next_id.fetch_max(invoice.id.get() + 1, Ordering::SeqCst);
        self.invoices.write().insert(invoice.id, invoice);
    }

    pub fn invoice(&self, id: InvoiceId) -> Option<Invoice> {
        self.invoices.read().get(&id).cloned()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.read().values().cloned().collect()
    }

    /// Every request made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Fail the next request of `op` with `err`.
    pub fn fail_next(&self, op: ApiOp, err: ApiError) {
        self.failures.lock().insert(op, err);
    }

    /// Hold `get_by_id` calls until [`release_fetches`](Self::release_fetches).
    pub fn hold_fetches(&self) {
        self.fetch_gate.set(false);
    }

    pub fn release_fetches(&self) {
        self.fetch_gate.set(true);
    }

    /// Wait until at least `n` detail fetches have started.
    pub async fn wait_for_fetches(&self, n: usize) {
        self.fetch_gate.wait_for(n).await;
    }

    /// Hold `create`, `update` and `update_confirmation_status` until
    /// [`release_writes`](Self::release_writes).
    pub fn hold_writes(&self) {
        self.write_gate.set(false);
    }

    pub fn release_writes(&self) {
        self.write_gate.set(true);
    }

    /// Wait until at least `n` writes have started.
    pub async fn wait_for_writes(&self, n: usize) {
        self.write_gate.wait_for(n).await;
    }

    fn record(&self, call: ApiCall) -> ApiResult<()> {
        let op = call.op();
        debug!("memory api: {:?}", call);
        self.calls.lock().push(call);
        match self.failures.lock().remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn build_lines(&self, payload: &InvoicePayload) -> Vec<InvoiceLine> {
        let products = self.products.read();
        payload
            .lines
            .iter()
            .map(|l| InvoiceLine {
                product: Some(l.product),
                product_name: products.get(&l.product).map(|p| p.name.clone()),
                quantity: l.quantity,
                unit_price: l.unit_price,
                line_total: l.line_total,
            })
            .collect()
    }

    fn resolve_counterpart(&self, id: Option<CounterpartId>) -> Option<Counterpart> {
        let id = id?;
        Some(
            self.counterparts
                .read()
                .get(&id)
                .cloned()
                .unwrap_or_else(|| Counterpart {
                    id,
                    name: format!("#{id}"),
                }),
        )
    }

    fn number_for(&self, id: InvoiceId) -> String {
        let prefix = match self.kind {
            InvoiceKind::Sale => 'S',
            InvoiceKind::Purchase => 'P',
        };
        format!("{prefix}-{:04}", id.get())
    }
}

#[async_trait]
impl InvoiceApi for MemoryInvoiceApi {
    async fn get_by_id(&self, id: InvoiceId) -> ApiResult<Invoice> {
        self.fetch_gate.pass().await;
        self.record(ApiCall::GetById(id))?;
        self.invoice(id).ok_or(ApiError::NotFound(id))
    }

    async fn create(&self, payload: &InvoicePayload) -> ApiResult<Invoice> {
        self.write_gate.pass().await;
        self.record(ApiCall::Create(payload.clone()))?;
        let id = InvoiceId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let invoice = Invoice {
            id,
            number: payload
                .number
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| self.number_for(id)),
            date: payload.date.clone().or_else(|| Some(self.today.clone())),
            payment_date: payload.payment_date.clone(),
            counterpart: self.resolve_counterpart(payload.counterpart),
            lines: self.build_lines(payload),
            notes: payload.notes.clone(),
            confirmed: payload.confirmed.unwrap_or(false),
        };
        self.invoices.write().insert(id, invoice.clone());
        Ok(invoice)
    }

    async fn update(&self, id: InvoiceId, payload: &InvoicePayload) -> ApiResult<Invoice> {
        self.write_gate.pass().await;
        self.record(ApiCall::Update(id, payload.clone()))?;
        let lines = self.build_lines(payload);
        let counterpart = self.resolve_counterpart(payload.counterpart);
        let mut invoices = self.invoices.write();
        let invoice = invoices.get_mut(&id).ok_or(ApiError::NotFound(id))?;
        invoice.lines = lines;
        invoice.counterpart = counterpart;
        invoice.notes = payload.notes.clone();
        invoice.payment_date = payload.payment_date.clone();
        if let Some(number) = payload.number.clone().filter(|n| !n.is_empty()) {
            invoice.number = number;
        }
        if payload.date.is_some() {
            invoice.date = payload.date.clone();
        }
        Ok(invoice.clone())
    }

    async fn update_confirmation_status(&self, id: InvoiceId, confirmed: bool) -> ApiResult<()> {
        self.write_gate.pass().await;
        self.record(ApiCall::UpdateConfirmation(id, confirmed))?;
        let mut invoices = self.invoices.write();
        let invoice = invoices.get_mut(&id).ok_or(ApiError::NotFound(id))?;
        invoice.confirmed = confirmed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaime_types::PayloadLine;
    use std::sync::Arc;

    fn payload() -> InvoicePayload {
        InvoicePayload {
            counterpart: Some(CounterpartId(3)),
            lines: vec![PayloadLine {
                product: ProductId(1),
                quantity: 2.0,
                unit_price: 10.0,
                line_total: 20.0,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_number_and_date() {
        let api = MemoryInvoiceApi::new(InvoiceKind::Sale).with_today("2026-03-04");
        api.add_counterpart(Counterpart {
            id: CounterpartId(3),
            name: "Acme".into(),
        });
        let inv = api.create(&payload()).await.unwrap();
        assert_eq!(inv.number, "S-0001");
        assert_eq!(inv.date.as_deref(), Some("2026-03-04"));
        assert_eq!(inv.counterpart.unwrap().name, "Acme");
        assert!(!inv.confirmed);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_confirmation() {
        let api = MemoryInvoiceApi::new(InvoiceKind::Purchase);
        let mut p = payload();
        p.confirmed = Some(true);
        let inv = api.create(&p).await.unwrap();
        let mut changed = payload();
        changed.notes = Some("rush".into());
        let updated = api.update(inv.id, &changed).await.unwrap();
        assert!(updated.confirmed);
        assert_eq!(updated.notes.as_deref(), Some("rush"));
        assert_eq!(updated.number, "P-0001");
    }

    #[tokio::test]
    async fn failure_is_one_shot() {
        let api = MemoryInvoiceApi::new(InvoiceKind::Sale);
        api.fail_next(ApiOp::Create, ApiError::Transport("offline".into()));
        assert!(api.create(&payload()).await.is_err());
        assert!(api.create(&payload()).await.is_ok());
        assert_eq!(api.invoices().len(), 1);
    }

    #[tokio::test]
    async fn missing_invoice_is_not_found() {
        let api = MemoryInvoiceApi::new(InvoiceKind::Sale);
        assert_eq!(
            api.get_by_id(InvoiceId(9)).await,
            Err(ApiError::NotFound(InvoiceId(9)))
        );
    }

    #[tokio::test]
    async fn held_fetch_waits_for_release() {
        let api = Arc::new(MemoryInvoiceApi::new(InvoiceKind::Sale));
        let inv = api.create(&payload()).await.unwrap();
        api.hold_fetches();

        let fetch = tokio::spawn({
            let api = api.clone();
            async move { api.get_by_id(inv.id).await }
        });
        api.wait_for_fetches(1).await;
        assert!(!fetch.is_finished());
        assert_eq!(api.call_count(), 1);

        api.release_fetches();
        let got = fetch.await.unwrap().unwrap();
        assert_eq!(got.id, inv.id);
    }

    #[tokio::test]
    async fn held_write_waits_for_release() {
        let api = Arc::new(MemoryInvoiceApi::new(InvoiceKind::Sale));
        api.hold_writes();

        let create = tokio::spawn({
            let api = api.clone();
            async move { api.create(&payload()).await }
        });
        api.wait_for_writes(1).await;
        assert!(!create.is_finished());
        assert_eq!(api.call_count(), 0);
        assert!(api.invoices().is_empty());

        api.release_writes();
        let inv = create.await.unwrap().unwrap();
        assert_eq!(api.invoice(inv.id), Some(inv));
    }
}
