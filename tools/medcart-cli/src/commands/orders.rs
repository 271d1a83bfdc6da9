//! Order history and payment retries.

use anyhow::Result;
use dialoguer::Confirm;
use medcart_core::checkout::PlacedOrder;
use medcart_core::OrderId;

use super::cart::{report_order, report_outcome};
use super::{soften, OrdersArgs, OrdersCommand};
use crate::context::Context;

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(OrdersCommand::List { unpaid: false }) {
        OrdersCommand::List { unpaid } => list(unpaid, ctx).await,
        OrdersCommand::Pay { id, yes } => pay(id, yes, ctx).await,
    }
}

async fn list(unpaid: bool, ctx: &Context) -> Result<()> {
    let history = ctx.orders()?;
    let spinner = ctx.output.spinner("Loading orders...");
    let result = if unpaid {
        history.awaiting_payment().await
    } else {
        history.list().await
    };
    spinner.finish_and_clear();
    let orders = result?;

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    if orders.is_empty() {
        ctx.output.info("No orders yet");
        return Ok(());
    }
    for order in &orders {
        show_order(order, ctx);
    }
    Ok(())
}

fn show_order(order: &PlacedOrder, ctx: &Context) {
    report_order(order, &ctx.output);
    ctx.output.kv("ID", &order.id.to_string());
    if let Some(created_at) = &order.created_at {
        ctx.output.kv("Placed", created_at);
    }
    if !order.shipping_address.is_empty() {
        ctx.output.kv("Address", &order.shipping_address);
    }
    for item in &order.items {
        ctx.output.info(&format!(
            "{} x {}  {:.2}",
            item.medicine_name, item.quantity, item.subtotal
        ));
    }
    if order.awaiting_payment() {
        ctx.output
            .warn(&format!("Awaiting payment; run `medcart orders pay {}`", order.id));
    }
}

async fn pay(id: OrderId, yes: bool, ctx: &Context) -> Result<()> {
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Pay order {id} by UPI?"))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Payment cancelled");
            return Ok(());
        }
    }

    let history = ctx.orders()?;
    let spinner = ctx.output.spinner("Processing payment...");
    let result = history.retry_payment(id).await;
    spinner.finish_and_clear();

    let Some(outcome) = soften(ctx, result)? else {
        return Ok(());
    };
    report_outcome(&outcome, &ctx.output)
}
