//! Edit buffer: the uncommitted copy of an invoice's editable fields.
//!
//! Edits go through [`BufferEdit`] so keyboard accelerators, form widgets,
//! and tests all drive the same code path.

use std::collections::BTreeSet;

use tracing::warn;

use qaime_types::{
    Counterpart, CounterpartKind, Invoice, InvoicePayload, PayloadLine, PriceKind, Product,
    ProductId,
};

use crate::error::ValidationError;

/// One editable line.
#[derive(Debug, Clone, PartialEq)]
pub struct EditLine {
    pub product: Option<ProductId>,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub line_total: f64,
}

impl EditLine {
    /// A fresh row: no product, quantity 1, price 0.
    pub fn empty() -> Self {
        Self {
            product: None,
            product_name: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
            line_total: 0.0,
        }
    }

    pub fn with_product(product: &Product, price: PriceKind, quantity: f64) -> Self {
        let mut line = Self::empty();
        line.set_product(product, price);
        line.set_quantity(quantity);
        line
    }

    fn recompute(&mut self) {
        self.line_total = self.quantity * self.unit_price;
    }

    fn set_product(&mut self, product: &Product, price: PriceKind) {
        self.product = Some(product.id);
        self.product_name = product.name.clone();
        self.unit_price = product.price(price);
        self.recompute();
    }

    fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
        self.recompute();
    }

    fn set_unit_price(&mut self, unit_price: f64) {
        self.unit_price = unit_price;
        self.recompute();
    }
}

/// A single edit applied to a buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferEdit {
    AddLine,
    /// Pick a catalog product for a line; takes the price for the invoice kind.
    SetProduct { line: usize, product: Product },
    SetQuantity { line: usize, quantity: f64 },
    SetUnitPrice { line: usize, unit_price: f64 },
    RemoveLine(usize),
    ToggleSelected(usize),
    /// Select every line, or clear the selection when all are selected.
    ToggleSelectAll,
    ClearSelection,
    DeleteSelected,
    /// Append copies of the selected lines in ascending index order.
    DuplicateSelected,
    MoveSelectedUp,
    MoveSelectedDown,
    SetCounterpart(Option<Counterpart>),
    SetNotes(String),
    SetPaymentDate(Option<String>),
    SetNumber(Option<String>),
    SetDate(Option<String>),
}

/// The in-progress copy of an invoice's editable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBuffer {
    pub counterpart: Option<Counterpart>,
    pub lines: Vec<EditLine>,
    pub notes: String,
    pub payment_date: Option<String>,
    pub number: Option<String>,
    pub date: Option<String>,
    selected: BTreeSet<usize>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror a persisted invoice.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            counterpart: invoice.counterpart.clone(),
            lines: invoice
                .lines
                .iter()
                .map(|l| EditLine {
                    product: l.product,
                    product_name: l.product_name.clone().unwrap_or_default(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total,
                })
                .collect(),
            notes: invoice.notes.clone().unwrap_or_default(),
            payment_date: invoice.payment_date.clone(),
            number: Some(invoice.number.clone()),
            date: invoice.date.clone(),
            selected: BTreeSet::new(),
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    pub fn is_selected(&self, line: usize) -> bool {
        self.selected.contains(&line)
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.line_total).sum()
    }

    /// Lines that reference a product. Only these are persisted.
    pub fn valid_lines(&self) -> impl Iterator<Item = &EditLine> {
        self.lines.iter().filter(|l| l.product.is_some())
    }

    /// Apply one edit. Returns false when it had nothing to act on.
    pub fn apply(&mut self, edit: BufferEdit, price: PriceKind) -> bool {
        match edit {
            BufferEdit::AddLine => {
                self.lines.push(EditLine::empty());
                true
            }
            BufferEdit::SetProduct { line, product } => {
                self.with_line(line, |l| l.set_product(&product, price))
            }
            BufferEdit::SetQuantity { line, quantity } => {
                self.with_line(line, |l| l.set_quantity(quantity))
            }
            BufferEdit::SetUnitPrice { line, unit_price } => {
                self.with_line(line, |l| l.set_unit_price(unit_price))
            }
            BufferEdit::RemoveLine(line) => {
                if line >= self.lines.len() {
                    return false;
                }
                self.lines.remove(line);
                self.selected = self
                    .selected
                    .iter()
                    .filter(|&&i| i != line)
                    .map(|&i| if i > line { i - 1 } else { i })
                    .collect();
                true
            }
            BufferEdit::ToggleSelected(line) => {
                if line >= self.lines.len() {
                    return false;
                }
                if !self.selected.remove(&line) {
                    self.selected.insert(line);
                }
                true
            }
            BufferEdit::ToggleSelectAll => {
                if !self.lines.is_empty() && self.selected.len() == self.lines.len() {
                    self.selected.clear();
                } else {
                    self.selected = (0..self.lines.len()).collect();
                }
                true
            }
            BufferEdit::ClearSelection => {
                let had = !self.selected.is_empty();
                self.selected.clear();
                had
            }
            BufferEdit::DeleteSelected => {
                if self.selected.is_empty() {
                    return false;
                }
                for &i in self.selected.iter().rev() {
                    if i < self.lines.len() {
                        self.lines.remove(i);
                    }
                }
                self.selected.clear();
                true
            }
            BufferEdit::DuplicateSelected => {
                if self.selected.is_empty() {
                    return false;
                }
                let copies: Vec<EditLine> = self
                    .selected
                    .iter()
                    .filter_map(|&i| self.lines.get(i).cloned())
                    .collect();
                self.lines.extend(copies);
                true
            }
            BufferEdit::MoveSelectedUp => self.move_selected(-1),
            BufferEdit::MoveSelectedDown => self.move_selected(1),
            BufferEdit::SetCounterpart(counterpart) => {
                self.counterpart = counterpart;
                true
            }
            BufferEdit::SetNotes(notes) => {
                self.notes = notes;
                true
            }
            BufferEdit::SetPaymentDate(date) => {
                self.payment_date = date;
                true
            }
            BufferEdit::SetNumber(number) => {
                self.number = number;
                true
            }
            BufferEdit::SetDate(date) => {
                self.date = date;
                true
            }
        }
    }

    fn with_line(&mut self, line: usize, f: impl FnOnce(&mut EditLine)) -> bool {
        match self.lines.get_mut(line) {
            Some(l) => {
                f(l);
                true
            }
            None => false,
        }
    }

    fn move_selected(&mut self, step: isize) -> bool {
        if self.selected.len() != 1 {
            warn!("move needs exactly one selected line, have {}", self.selected.len());
            return false;
        }
        let Some(&from) = self.selected.iter().next() else {
            return false;
        };
        let Some(to) = from.checked_add_signed(step).filter(|&t| t < self.lines.len()) else {
            return false;
        };
        self.lines.swap(from, to);
        self.selected.clear();
        self.selected.insert(to);
        true
    }

    /// Pre-save checks. Runs before any network call.
    pub fn validate(&self, required: Option<CounterpartKind>) -> Result<(), ValidationError> {
        if self.valid_lines().next().is_none() {
            return Err(ValidationError::NoProductLines);
        }
        if let Some(kind) = required
            && self.counterpart.is_none()
        {
            return Err(ValidationError::NoCounterpart(kind));
        }
        Ok(())
    }

    /// Request body with only product-bearing lines.
    pub fn to_payload(&self, confirmed: Option<bool>) -> InvoicePayload {
        InvoicePayload {
            counterpart: self.counterpart.as_ref().map(|c| c.id),
            lines: self
                .valid_lines()
                .filter_map(|l| {
                    l.product.map(|product| PayloadLine {
                        product,
                        quantity: l.quantity,
                        unit_price: l.unit_price,
                        line_total: l.line_total,
                    })
                })
                .collect(),
            notes: Some(self.notes.clone()).filter(|n| !n.is_empty()),
            payment_date: self.payment_date.clone(),
            number: self.number.clone(),
            date: self.date.clone(),
            confirmed,
        }
    }
}
