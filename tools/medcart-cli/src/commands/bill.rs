//! Counter billing.

use anyhow::Result;

use super::{shows_preview, soften, BillArgs};
use crate::context::Context;

/// Run the bill command: ring up the items and record the sale.
pub async fn run(args: BillArgs, ctx: &Context) -> Result<()> {
    let mut bill = ctx.bill()?;

    let spinner = ctx.output.spinner("Loading catalog...");
    let loaded = bill.refresh_catalog().await;
    spinner.finish_and_clear();
    loaded?;

    for item in &args.items {
        if soften(ctx, bill.add(item.id, item.quantity))?.is_none() {
            ctx.output.warn(&format!("Skipped product {}", item.id));
        }
    }

    let totals = bill.totals()?;
    if shows_preview(&ctx.output, !args.dry_run) {
        ctx.output.ledger("Bill", bill.ledger(), &totals);
    }
    if bill.ledger().is_empty() {
        ctx.output.warn("Please add items to the bill");
        return Ok(());
    }
    if args.dry_run {
        ctx.output.info("Dry run; sale not recorded");
        return Ok(());
    }

    let spinner = ctx.output.spinner("Recording sale...");
    let result = bill
        .complete_sale(args.customer.as_deref(), args.phone.as_deref(), args.payment)
        .await;
    spinner.finish_and_clear();

    let Some(sale) = soften(ctx, result)? else {
        return Ok(());
    };

    if ctx.output.is_json() {
        ctx.output.json(&sale);
        return Ok(());
    }

    ctx.output.success("Sale completed");
    ctx.output.kv("Invoice", &sale.invoice_number);
    if let Some(name) = &sale.customer_name {
        ctx.output.kv("Customer", name);
    }
    ctx.output.kv("Payment", sale.payment_mode.as_str());
    ctx.output.kv("Subtotal", &format!("{:.2}", sale.subtotal));
    ctx.output.kv("Tax", &format!("{:.2}", sale.tax));
    ctx.output.kv("Total", &sale.total(&totals.grand_total).display());
    Ok(())
}
