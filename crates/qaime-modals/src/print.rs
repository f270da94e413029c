//! Print collaborator and a plain-text renderer.

use std::fmt::Write as _;
use std::io::Write;

use parking_lot::Mutex;

use qaime_types::{Invoice, InvoiceKind};

use crate::error::PrintError;

/// Receives a persisted invoice to print.
pub trait InvoicePrinter: Send + Sync {
    fn print(&self, kind: InvoiceKind, invoice: &Invoice) -> Result<(), PrintError>;
}

/// Render an invoice as a fixed-width text document.
pub fn render_text(kind: InvoiceKind, invoice: &Invoice) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", kind.window_title(Some(&invoice.number)));
    if let Some(date) = &invoice.date {
        let _ = writeln!(out, "Date: {date}");
    }
    if let Some(c) = &invoice.counterpart {
        let _ = writeln!(out, "{}: {}", capitalize(&kind.counterpart_kind().to_string()), c.name);
    }
    let _ = writeln!(out, "{:-<60}", "");
    let _ = writeln!(out, "{:<28}{:>10}{:>10}{:>12}", "Product", "Qty", "Price", "Total");
    for line in &invoice.lines {
        let name = line
            .product_name
            .clone()
            .or_else(|| line.product.map(|p| format!("#{p}")))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<28}{:>10.2}{:>10.2}{:>12.2}",
            name, line.quantity, line.unit_price, line.line_total
        );
    }
    let _ = writeln!(out, "{:-<60}", "");
    let _ = writeln!(out, "{:<48}{:>12.2}", "Total", invoice.total());
    if let Some(notes) = invoice.notes.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(out, "Notes: {notes}");
    }
    if !invoice.confirmed {
        let _ = writeln!(out, "DRAFT");
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

enum Sink {
    Stdout,
    Buffer(Vec<String>),
}

/// Prints [`render_text`] output to stdout or into an in-memory buffer.
pub struct TextPrinter {
    sink: Mutex<Sink>,
}

impl TextPrinter {
    pub fn stdout() -> Self {
        Self {
            sink: Mutex::new(Sink::Stdout),
        }
    }

    pub fn buffered() -> Self {
        Self {
            sink: Mutex::new(Sink::Buffer(Vec::new())),
        }
    }

    /// Documents printed so far (buffered printers only).
    pub fn take_output(&self) -> Vec<String> {
        match &mut *self.sink.lock() {
            Sink::Buffer(docs) => std::mem::take(docs),
            Sink::Stdout => Vec::new(),
        }
    }
}

impl InvoicePrinter for TextPrinter {
    fn print(&self, kind: InvoiceKind, invoice: &Invoice) -> Result<(), PrintError> {
        let doc = render_text(kind, invoice);
        match &mut *self.sink.lock() {
            Sink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(doc.as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|e| PrintError::Printer(e.to_string()))
            }
            Sink::Buffer(docs) => {
                docs.push(doc);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaime_types::{Counterpart, CounterpartId, InvoiceId, InvoiceLine, ProductId};

    fn invoice() -> Invoice {
        Invoice {
            id: InvoiceId(7),
            number: "S-0007".into(),
            date: Some("2026-05-01".into()),
            payment_date: None,
            counterpart: Some(Counterpart {
                id: CounterpartId(1),
                name: "Acme".into(),
            }),
            lines: vec![InvoiceLine {
                product: Some(ProductId(2)),
                product_name: None,
                quantity: 2.0,
                unit_price: 12.5,
                line_total: 25.0,
            }],
            notes: None,
            confirmed: false,
        }
    }

    #[test]
    fn text_layout() {
        let text = render_text(InvoiceKind::Sale, &invoice());
        assert!(text.starts_with("Sale invoice #S-0007\n"));
        assert!(text.contains("Customer: Acme"));
        assert!(text.contains("#2"));
        assert!(text.contains("25.00"));
        assert!(text.trim_end().ends_with("DRAFT"));
    }

    #[test]
    fn buffered_printer_collects() {
        let printer = TextPrinter::buffered();
        printer.print(InvoiceKind::Purchase, &invoice()).unwrap();
        let docs = printer.take_output();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].contains("Supplier: Acme"));
        assert!(printer.take_output().is_empty());
    }
}
