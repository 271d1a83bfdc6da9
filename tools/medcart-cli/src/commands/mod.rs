//! CLI command implementations.

pub mod bill;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod orders;

use std::str::FromStr;

use anyhow::Result;
use clap::{Args, Subcommand};
use medcart_core::checkout::{OrderPaymentMode, SalePaymentMode};
use medcart_core::{OrderId, ProductId};
use medcart_session::SessionError;

use crate::context::Context;
use crate::output::Output;

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart with its totals.
    Show,
    /// Add a catalog product to the cart.
    Add {
        /// Product ID.
        id: ProductId,

        /// Units to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Change a line's quantity by a signed amount.
    Adjust {
        /// Product ID.
        id: ProductId,

        /// Change in units, e.g. 2 or -1.
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove a line from the cart.
    Remove {
        /// Product ID.
        id: ProductId,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Place an order for the whole cart.
    Checkout {
        /// Shipping address.
        #[arg(short, long)]
        address: String,

        /// Payment mode (UPI or COD).
        #[arg(short, long, default_value = "COD")]
        payment: OrderPaymentMode,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Forget the saved cart.
    SignOut,
}

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only list products with stock.
    #[arg(long)]
    pub in_stock: bool,

    /// Read the admin listing instead of the storefront one.
    #[arg(long)]
    pub admin: bool,

    /// Only list this category.
    #[arg(long, conflicts_with = "admin")]
    pub category: Option<String>,

    /// Only list medicines whose name contains this text.
    #[arg(short, long, conflicts_with = "admin")]
    pub search: Option<String>,

    /// List the categories instead of the medicines.
    #[arg(long, conflicts_with_all = ["admin", "category", "search", "in_stock"])]
    pub categories: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List past orders, newest first.
    List {
        /// Only orders still awaiting an online payment.
        #[arg(long)]
        unpaid: bool,
    },
    /// Retry the UPI payment of an order.
    Pay {
        /// Order ID.
        id: OrderId,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the bill command.
#[derive(Args)]
pub struct BillArgs {
    /// Items as ID or ID:QTY.
    #[arg(required = true)]
    pub items: Vec<BillItem>,

    /// Payment mode (Cash, Card or UPI).
    #[arg(short, long, default_value = "Cash")]
    pub payment: SalePaymentMode,

    /// Customer name.
    #[arg(long)]
    pub customer: Option<String>,

    /// Customer phone.
    #[arg(long)]
    pub phone: Option<String>,

    /// Show the bill without recording the sale.
    #[arg(long)]
    pub dry_run: bool,
}

/// One `ID[:QTY]` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillItem {
    pub id: ProductId,
    pub quantity: i64,
}

impl FromStr for BillItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = match s.split_once(':') {
            Some((id, qty)) => (id, qty),
            None => (s, "1"),
        };
        let id = id
            .parse()
            .map_err(|_| format!("invalid product id in '{s}'"))?;
        let quantity = quantity
            .trim()
            .parse()
            .map_err(|_| format!("invalid quantity in '{s}'"))?;
        Ok(Self { id, quantity })
    }
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

/// Whether to print the ledger before submitting it. In JSON mode the
/// submission result is the only document, unless nothing gets submitted.
pub(crate) fn shows_preview(output: &Output, submitting: bool) -> bool {
    !output.is_json() || !submitting
}

/// Report a recoverable session error as a warning instead of failing.
pub(crate) fn soften<T>(ctx: &Context, result: Result<T, SessionError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_warning() => {
            ctx.output.warn(&e.user_message());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
