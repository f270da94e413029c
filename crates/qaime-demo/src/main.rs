//! qaime demo - a scripted multi-window invoice session.
//!
//! Runs the window registry, a sales invoice page, and the taskbar against
//! the in-memory backend, printing the taskbar after each step.
//!
//! Usage:
//!   cargo run -p qaime-demo
//!   cargo run -p qaime-demo -- --config ./windowing.ron --width 1280 --height 800
//!   RUST_LOG=qaime_windows=debug cargo run -p qaime-demo -- --json

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::future::join_all;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use qaime_modals::{
    BufferEdit, InvoicePage, MemoryInvoiceApi, ModalUpdate, TextPrinter, TracingNotifier,
};
use qaime_types::{
    Counterpart, CounterpartId, Invoice, InvoiceId, InvoiceKind, InvoiceLine, ModalId, Product,
    ProductId, Viewport,
};
use qaime_windows::{
    SharedWindowRegistry, Taskbar, load_config, load_config_or_default, shared_window_registry,
};

/// Scripted qaime window session.
#[derive(Parser, Debug)]
#[command(name = "qaime-demo")]
#[command(about = "Drive a multi-window invoice session in memory")]
struct Args {
    /// Windowing config (RON). Defaults to <config_dir>/qaime/windowing.ron
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long, default_value = "/tmp")]
    log_dir: PathBuf,

    /// Viewport width in logical pixels
    #[arg(long, default_value_t = 1600.0)]
    width: f64,

    /// Viewport height in logical pixels
    #[arg(long, default_value_t = 900.0)]
    height: f64,

    /// Dump persisted invoices as JSON at the end
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::never(&args.log_dir, "qaime-demo.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "qaime_demo=debug,qaime_modals=debug,qaime_windows=info,warn".into()
        }))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting qaime demo - logging to {}/qaime-demo.log", args.log_dir.display());

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading windowing config from {}", path.display()))?,
        None => load_config_or_default(),
    };

    let registry = shared_window_registry(config);
    registry.set_viewport(Viewport::new(args.width, args.height).with_top_chrome(64.0));
    spawn_event_logger(&registry);

    let api = Arc::new(seeded_api());
    let page = InvoicePage::builder(InvoiceKind::Sale, api.clone(), registry.clone())
        .notifier(Arc::new(TracingNotifier))
        .printer(Arc::new(TextPrinter::stdout()))
        .build();
    let taskbar = Taskbar::new(registry.clone());

    // Two persisted invoices load side by side.
    let opened = join_all([1, 2].map(|id| page.open(Some(InvoiceId(id))))).await;
    let mut existing = Vec::new();
    for result in opened {
        if let Some(modal) = result? {
            existing.push(modal);
        }
    }
    show(&taskbar, "opened two invoices");

    let draft = page
        .open(None)
        .await?
        .context("draft open was cancelled")?;
    fill_draft(&page, draft);
    let saved = page.save(draft, false).await?;
    info!("draft persisted as invoice {}", saved.entity());
    show(&taskbar, "new invoice saved as draft");

    if let Some(&first) = existing.first() {
        page.minimize(first);
        show(&taskbar, "minimized the first invoice");
    }

    let tiled = page.tile();
    debug!("tiled {} windows", tiled.len());
    for modal in &tiled {
        if let Some(frame) = page.frame(*modal) {
            println!(
                "  {:?} at ({:.0}, {:.0}) {:.0}x{:.0} z={}",
                modal,
                frame.rect.position.x,
                frame.rect.position.y,
                frame.rect.size.width,
                frame.rect.size.height,
                frame.paint_z
            );
        }
    }
    show(&taskbar, "tiled the visible windows");

    page.print(draft).await?;

    if let Some(&first) = existing.first()
        && let Some(window) = page.window_for(first)
    {
        taskbar.click(window);
        show(&taskbar, "restored from the taskbar");
    }

    let outcome = page.save(draft, true).await?;
    info!("invoice {} confirmed", outcome.entity());
    show(&taskbar, "draft confirmed and closed");

    for modal in existing {
        if let Some(window) = page.window_for(modal) {
            taskbar.close(window);
        }
    }
    show(&taskbar, "closed everything from the taskbar");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&api.invoices())?);
    }
    Ok(())
}

fn seeded_api() -> MemoryInvoiceApi {
    let api = MemoryInvoiceApi::new(InvoiceKind::Sale).with_today("2026-10-16");
    for (id, name, price) in [(1, "Espresso beans 1kg", 18.5), (2, "Paper filters", 3.2)] {
        api.add_product(Product {
            id: ProductId(id),
            name: name.to_string(),
            sale_price: Some(price),
            purchase_price: Some(price * 0.6),
        });
    }
    let customer = Counterpart {
        id: CounterpartId(1),
        name: "Corner Café".into(),
    };
    api.add_counterpart(customer.clone());
    for id in [1, 2] {
        api.insert(Invoice {
            id: InvoiceId(id),
            number: format!("S-{id:04}"),
            date: Some("2026-10-01".into()),
            payment_date: None,
            counterpart: Some(customer.clone()),
            lines: vec![InvoiceLine {
                product: Some(ProductId(1)),
                product_name: Some("Espresso beans 1kg".into()),
                quantity: id as f64,
                unit_price: 18.5,
                line_total: 18.5 * id as f64,
            }],
            notes: None,
            confirmed: false,
        });
    }
    api
}

fn fill_draft(page: &InvoicePage, modal: ModalId) {
    let beans = Product {
        id: ProductId(1),
        name: "Espresso beans 1kg".into(),
        sale_price: Some(18.5),
        purchase_price: None,
    };
    let filters = Product {
        id: ProductId(2),
        name: "Paper filters".into(),
        sale_price: Some(3.2),
        purchase_price: None,
    };
    for edit in [
        BufferEdit::AddLine,
        BufferEdit::SetProduct { line: 0, product: beans },
        BufferEdit::SetQuantity { line: 0, quantity: 4.0 },
        BufferEdit::AddLine,
        BufferEdit::SetProduct { line: 1, product: filters },
        BufferEdit::SetNotes("Deliver before noon".into()),
    ] {
        page.update(modal, ModalUpdate::Edit(edit));
    }
}

fn show(taskbar: &Taskbar, step: &str) {
    println!("── {step}");
    for entry in taskbar.entries() {
        let marker = if entry.is_active { '*' } else { ' ' };
        println!(" {marker} {} {}", entry.icon, entry.label());
    }
}

/// Log registry events until the channel closes.
fn spawn_event_logger(registry: &SharedWindowRegistry) {
    let mut rx = registry.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(target: "qaime_demo::events", "{:?}", event),
                Err(RecvError::Lagged(n)) => warn!("event logger lagged by {} events", n),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
