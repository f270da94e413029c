//! Invoice shapes exchanged with the persistence collaborator.
//!
//! These mirror what the REST API returns and accepts. The windowing core
//! never interprets them beyond copying fields into and out of edit buffers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ids::{CounterpartId, InvoiceId, ProductId};

/// Which invoice book a page manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    Sale,
    Purchase,
}

/// Customer for sales, supplier for purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CounterpartKind {
    Customer,
    Supplier,
}

/// Which catalog price a new line picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceKind {
    Sale,
    Purchase,
}

impl InvoiceKind {
    pub fn counterpart_kind(&self) -> CounterpartKind {
        match self {
            InvoiceKind::Sale => CounterpartKind::Customer,
            InvoiceKind::Purchase => CounterpartKind::Supplier,
        }
    }

    pub fn price_kind(&self) -> PriceKind {
        match self {
            InvoiceKind::Sale => PriceKind::Sale,
            InvoiceKind::Purchase => PriceKind::Purchase,
        }
    }

    /// Window title for an instance, given the persisted number if any.
    pub fn window_title(&self, number: Option<&str>) -> String {
        match number {
            Some(n) if !n.is_empty() => format!("{} invoice #{}", self.label(), n),
            _ => format!("New {self} invoice"),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            InvoiceKind::Sale => "Sale",
            InvoiceKind::Purchase => "Purchase",
        }
    }
}

/// A catalog product, as far as invoice lines care.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
}

impl Product {
    pub fn price(&self, kind: PriceKind) -> f64 {
        match kind {
            PriceKind::Sale => self.sale_price,
            PriceKind::Purchase => self.purchase_price,
        }
        .unwrap_or(0.0)
    }
}

/// A customer or supplier reference with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterpart {
    pub id: CounterpartId,
    pub name: String,
}

/// One persisted invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub counterpart: Option<Counterpart>,
    pub lines: Vec<InvoiceLine>,
    #[serde(default)]
    pub notes: Option<String>,
    pub confirmed: bool,
}

impl Invoice {
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.line_total).sum()
    }
}

/// A line in a create/update request. Only lines with a product are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadLine {
    pub product: ProductId,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Create/update request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoicePayload {
    pub counterpart: Option<CounterpartId>,
    pub lines: Vec<PayloadLine>,
    pub notes: Option<String>,
    pub payment_date: Option<String>,
    pub number: Option<String>,
    pub date: Option<String>,
    /// Confirmation flag for creates; updates leave confirmation alone.
    pub confirmed: Option<bool>,
}

impl InvoicePayload {
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.line_total).sum()
    }
}
