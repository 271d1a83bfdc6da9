//! Output formatting for the CLI.

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use medcart_core::ledger::{Ledger, SurchargeKind, Totals};

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    json: bool,
    term: Term,
}

impl Output {
    /// Create a new output handler.
    pub fn new(json: bool) -> Self {
        Self {
            json,
            term: Term::stdout(),
        }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "warning": msg }));
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  ").trim_end());
    }

    /// Print a ledger with its totals, or its JSON form.
    pub fn ledger(&self, title: &str, ledger: &Ledger, totals: &Totals) {
        if self.json {
            self.json(&serde_json::json!({
                "lines": ledger.lines().iter().map(|line| serde_json::json!({
                    "product_id": line.product_id(),
                    "label": line.label(),
                    "unit_price": line.unit_price().display_amount(),
                    "quantity": line.quantity(),
                    "subtotal": line.subtotal().display_amount(),
                })).collect::<Vec<_>>(),
                "item_count": ledger.item_count(),
                "subtotal": totals.subtotal.display_amount(),
                "surcharge": totals.surcharge.display_amount(),
                "surcharge_label": totals.kind.label(),
                "grand_total": totals.grand_total.display_amount(),
            }));
            return;
        }

        self.header(title);
        if ledger.is_empty() {
            self.info("Nothing here yet.");
            return;
        }

        let name_width = ledger
            .lines()
            .iter()
            .map(|l| l.label().chars().count())
            .max()
            .unwrap_or(0)
            .max(4);
        let widths = [6, name_width, 10, 4, 12];
        println!();
        self.table_row(&["ID", "Name", "Price", "Qty", "Subtotal"], &widths);
        for line in ledger.lines() {
            self.table_row(
                &[
                    &line.product_id().to_string(),
                    line.label(),
                    &line.unit_price().display(),
                    &line.quantity().to_string(),
                    &line.subtotal().display(),
                ],
                &widths,
            );
        }
        println!();
        self.kv("Items", &ledger.item_count().to_string());
        self.kv("Subtotal", &totals.subtotal.display());
        if totals.kind != SurchargeKind::None {
            self.kv(&totals.kind.label(), &totals.surcharge.display());
        }
        println!(
            "  {}: {}",
            style("Total").bold(),
            style(totals.grand_total.display()).bold()
        );
    }

    /// Create a spinner for a backend round trip.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json || !self.term.is_term() {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Stock badge for catalog listings.
pub fn stock_badge(stock: i64, low_stock: bool) -> String {
    if stock <= 0 {
        style("out of stock").red().to_string()
    } else if low_stock {
        style(format!("{stock} (low)")).yellow().to_string()
    } else {
        style(stock.to_string()).green().to_string()
    }
}
