//! MedCart CLI - command line client for the pharmacy cart and counter billing.
//!
//! Commands:
//! - `medcart cart` - Show and edit the saved cart, and check it out
//! - `medcart catalog` - List medicines
//! - `medcart orders` - Order history and payment retries
//! - `medcart bill` - Ring up a counter sale
//! - `medcart config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use commands::{BillArgs, CartArgs, CatalogArgs, ConfigArgs, OrdersArgs};

/// MedCart CLI - Pharmacy cart and counter billing
#[derive(Parser)]
#[command(name = "medcart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API token (overrides the config file)
    #[arg(long, global = true, env = "MEDCART_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the shopping cart
    Cart(CartArgs),

    /// List medicines from the catalog
    Catalog(CatalogArgs),

    /// List orders and retry payments
    Orders(OrdersArgs),

    /// Bill a counter sale
    Bill(BillArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Default log filter when `MEDCART_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "medcart=info";

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("medcart=debug")
    } else {
        EnvFilter::try_from_env("MEDCART_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let output = output::Output::new(cli.json);
    let ctx = match context::Context::load(cli.config.as_deref(), cli.token, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Bill(args) => commands::bill::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
