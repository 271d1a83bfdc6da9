//! Catalog listing.

use anyhow::Result;
use medcart_core::catalog::{CatalogEntry, CatalogSnapshot};
use medcart_session::{CatalogFilter, CatalogScope, CatalogSource};

use super::CatalogArgs;
use crate::context::Context;
use crate::output::stock_badge;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let scope = if args.admin {
        CatalogScope::Admin
    } else {
        CatalogScope::User
    };
    let client = ctx.api_client(scope)?;

    if args.categories {
        let spinner = ctx.output.spinner("Loading categories...");
        let result = client.fetch_categories().await;
        spinner.finish_and_clear();
        let categories = result?;

        if ctx.output.is_json() {
            ctx.output.json(&categories);
        } else {
            ctx.output.header("Categories");
            for category in &categories {
                ctx.output.info(category);
            }
        }
        return Ok(());
    }

    let client = client.with_filter(CatalogFilter {
        category: args.category,
        search: args.search,
    });
    let spinner = ctx.output.spinner("Loading catalog...");
    let result = client.fetch_catalog().await;
    spinner.finish_and_clear();
    let catalog = CatalogSnapshot::from_records(result?, ctx.config.currency()?);

    let entries: Vec<&CatalogEntry> = if args.in_stock {
        catalog.in_stock().collect()
    } else {
        catalog.entries().iter().collect()
    };

    if ctx.output.is_json() {
        ctx.output.json(&entries);
        return Ok(());
    }

    ctx.output.header(&format!("Catalog ({} products)", entries.len()));
    if entries.is_empty() {
        ctx.output.info("No products found.");
        return Ok(());
    }

    let name_width = entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let widths = [6, name_width, 14, 10, 12];
    println!();
    ctx.output
        .table_row(&["ID", "Name", "Category", "Price", "Stock"], &widths);
    for entry in entries {
        ctx.output.table_row(
            &[
                &entry.id.to_string(),
                &entry.name,
                entry.category.as_deref().unwrap_or("-"),
                &entry.price.display(),
                &stock_badge(entry.stock, entry.is_low_stock()),
            ],
            &widths,
        );
    }
    Ok(())
}
