//! Customer cart commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use medcart_core::catalog::CatalogEntry;
use medcart_core::checkout::{OrderPaymentMode, PlacedOrder};
use medcart_core::ledger::LedgerChange;
use medcart_core::ProductId;
use medcart_session::CheckoutOutcome;

use super::{shows_preview, soften, CartArgs, CartCommand};
use crate::context::{Cart, Context};
use crate::output::Output;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.cart()?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => show(&cart, ctx),
        CartCommand::Add { id, quantity } => add(&mut cart, id, quantity, ctx).await,
        CartCommand::Adjust { id, delta } => adjust(&mut cart, id, delta, ctx),
        CartCommand::Remove { id } => remove(&mut cart, id, ctx),
        CartCommand::Clear { yes } => clear(&mut cart, yes, ctx),
        CartCommand::Checkout {
            address,
            payment,
            yes,
        } => checkout(&mut cart, &address, payment, yes, ctx).await,
        CartCommand::SignOut => {
            cart.sign_out()?;
            ctx.output.success("Signed out; saved cart removed");
            Ok(())
        }
    }
}

fn show(cart: &Cart, ctx: &Context) -> Result<()> {
    let totals = cart.totals()?;
    ctx.output.ledger("Cart", cart.ledger(), &totals);
    Ok(())
}

async fn add(cart: &mut Cart, id: ProductId, requested: i64, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Loading catalog...");
    let loaded = cart.refresh_catalog().await;
    spinner.finish_and_clear();
    loaded?;

    let quantity = picked_quantity(cart.catalog().get(id), requested);
    if quantity != requested {
        ctx.output
            .warn(&format!("Quantity {requested} adjusted to {quantity}"));
    }
    let Some(change) = soften(ctx, cart.add(id, quantity))? else {
        return Ok(());
    };
    let label = cart
        .ledger()
        .line(id)
        .map(|line| line.label().to_string())
        .unwrap_or_else(|| id.to_string());
    match change {
        LedgerChange::Merged(_) => ctx.output.success(&format!(
            "Added {quantity} more of {label}; cart has {} items",
            cart.ledger().item_count()
        )),
        _ => ctx.output.success(&format!("Added {label} to cart")),
    }
    show(cart, ctx)
}

/// The catalog page's quantity picker: requests are clamped into
/// `1..=stock`. Products missing or out of stock pass through unchanged and
/// are rejected by the cart.
fn picked_quantity(entry: Option<&CatalogEntry>, requested: i64) -> i64 {
    entry
        .and_then(|entry| entry.clamp_selection(requested))
        .unwrap_or(requested)
}

fn adjust(cart: &mut Cart, id: ProductId, delta: i64, ctx: &Context) -> Result<()> {
    let Some(change) = soften(ctx, cart.adjust(id, delta))? else {
        return Ok(());
    };
    if let LedgerChange::Removed(_) = change {
        ctx.output.success(&format!("Removed product {id} from cart"));
    }
    show(cart, ctx)
}

fn remove(cart: &mut Cart, id: ProductId, ctx: &Context) -> Result<()> {
    if cart.remove(id)? {
        ctx.output.success(&format!("Removed product {id} from cart"));
    } else {
        ctx.output.info(&format!("Product {id} is not in the cart"));
    }
    show(cart, ctx)
}

fn clear(cart: &mut Cart, yes: bool, ctx: &Context) -> Result<()> {
    if cart.ledger().is_empty() {
        ctx.output.info("Cart is already empty");
        return Ok(());
    }
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("Remove everything from the cart?")
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }
    cart.clear()?;
    ctx.output.success("Cart cleared");
    Ok(())
}

async fn checkout(
    cart: &mut Cart,
    address: &str,
    payment: OrderPaymentMode,
    yes: bool,
    ctx: &Context,
) -> Result<()> {
    if cart.ledger().is_empty() {
        ctx.output.warn("Your cart is empty");
        return Ok(());
    }

    let totals = cart.totals()?;
    if shows_preview(&ctx.output, true) {
        ctx.output.ledger("Checkout", cart.ledger(), &totals);
    }
    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Place order for {} ({payment})?",
                totals.grand_total.display()
            ))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Checkout cancelled");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Placing order...");
    let result = cart.checkout(address, payment).await;
    spinner.finish_and_clear();

    let Some(outcome) = soften(ctx, result)? else {
        ctx.output.info("Your cart was kept; adjust it and try again");
        return Ok(());
    };
    report_outcome(&outcome, &ctx.output)
}

/// Print how an order's payment ended. A failed payment is an error in
/// both output modes, so the exit code does not depend on `--json`.
pub(crate) fn report_outcome(outcome: &CheckoutOutcome, output: &Output) -> Result<()> {
    let order = outcome.order();
    if output.is_json() {
        output.json(&serde_json::json!({
            "order": order,
            "payment": match outcome {
                CheckoutOutcome::CashOnDelivery { .. } => "cash_on_delivery",
                CheckoutOutcome::Paid { .. } => "paid",
                CheckoutOutcome::PaymentFailed { .. } => "failed",
            },
        }));
    } else {
        report_order(order, output);
        match outcome {
            CheckoutOutcome::CashOnDelivery { .. } => {
                output.success("Order placed; pay on delivery");
            }
            CheckoutOutcome::Paid { message, .. } => {
                output.success(&format!("Payment successful. {message}"));
            }
            CheckoutOutcome::PaymentFailed { message, .. } => {
                output.warn(&format!("Payment failed: {message}"));
            }
        }
    }

    if let CheckoutOutcome::PaymentFailed { .. } = outcome {
        bail!(
            "Payment failed; order {} is pending payment. Retry with `medcart orders pay {}`",
            order.order_number,
            order.id
        );
    }
    Ok(())
}

pub(crate) fn report_order(order: &PlacedOrder, output: &Output) {
    output.header("Order");
    output.kv("Order number", &order.order_number);
    output.kv("Status", order.status.as_str());
    output.kv(
        "Payment",
        &format!("{} ({})", order.payment_mode, order.payment_status.as_str()),
    );
    output.kv("Total", &format!("{:.2}", order.total_amount));
}
