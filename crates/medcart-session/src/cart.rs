//! The customer cart session.

use crate::catalog::{CatalogApply, CatalogState, CatalogTicket};
use crate::gateway::{CatalogSource, OrderGateway};
use crate::observer::{LedgerObserver, Observers};
use crate::{GatewayError, SessionError};
use medcart_core::catalog::{CatalogSnapshot, MedicineRecord};
use medcart_core::checkout::{revalidate, OrderPaymentMode, OrderRequest, PlacedOrder};
use medcart_core::ledger::{Ledger, LedgerChange, SurchargePolicy, Totals};
use medcart_core::{LedgerError, ProductId};
use medcart_store::{KeyValueStore, LedgerRepository};

/// How a successful checkout ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Cash on delivery; nothing left to settle.
    CashOnDelivery { order: PlacedOrder },
    /// Online payment went through.
    Paid { order: PlacedOrder, message: String },
    /// The order exists but payment did not go through.
    PaymentFailed { order: PlacedOrder, message: String },
}

impl CheckoutOutcome {
    pub fn order(&self) -> &PlacedOrder {
        match self {
            CheckoutOutcome::CashOnDelivery { order }
            | CheckoutOutcome::Paid { order, .. }
            | CheckoutOutcome::PaymentFailed { order, .. } => order,
        }
    }
}

/// One customer's cart for the lifetime of a page session.
///
/// Every mutation is saved before it is committed to memory, so the
/// persisted cart and the in-memory cart never disagree.
#[derive(Debug)]
pub struct CartSession<S, C, O> {
    ledger: Ledger,
    repository: LedgerRepository<S>,
    policy: SurchargePolicy,
    catalog: CatalogState,
    source: C,
    orders: O,
    observers: Observers,
}

impl<S, C, O> CartSession<S, C, O>
where
    S: KeyValueStore,
    C: CatalogSource,
    O: OrderGateway,
{
    /// Open the session, restoring whatever cart was persisted.
    pub fn open(
        repository: LedgerRepository<S>,
        policy: SurchargePolicy,
        source: C,
        orders: O,
    ) -> Result<Self, SessionError> {
        let ledger = repository.load()?;
        let currency = repository.currency();
        tracing::debug!(lines = ledger.len(), "cart session opened");
        Ok(Self {
            ledger,
            repository,
            policy,
            catalog: CatalogState::new(currency),
            source,
            orders,
            observers: Observers::default(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn policy(&self) -> &SurchargePolicy {
        &self.policy
    }

    pub fn totals(&self) -> Result<Totals, SessionError> {
        Ok(self.ledger.totals(&self.policy)?)
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        self.catalog.snapshot()
    }

    pub fn catalog_source(&self) -> &C {
        &self.source
    }

    pub fn subscribe(&mut self, observer: impl LedgerObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Add `quantity` units of a catalog product, merging with an existing line.
    pub fn add(&mut self, product_id: ProductId, quantity: i64) -> Result<LedgerChange, SessionError> {
        let entry = self
            .catalog
            .snapshot()
            .get(product_id)
            .ok_or(LedgerError::UnknownProduct(product_id))?
            .clone();

        let mut working = self.ledger.clone();
        let change = warn_on_stock(working.add_or_merge(
            product_id,
            entry.name,
            entry.price,
            entry.stock,
            quantity,
        ))?;
        self.commit(working, change)?;
        Ok(change)
    }

    /// Move a line's quantity by `delta`. Dropping below one removes it.
    pub fn adjust(&mut self, product_id: ProductId, delta: i64) -> Result<LedgerChange, SessionError> {
        let mut working = self.ledger.clone();
        let change = warn_on_stock(working.adjust_quantity(product_id, delta))?.change(product_id);
        self.commit(working, change)?;
        Ok(change)
    }

    /// Remove a line. Returns `false` if there was none.
    pub fn remove(&mut self, product_id: ProductId) -> Result<bool, SessionError> {
        let mut working = self.ledger.clone();
        if !working.remove(product_id) {
            return Ok(false);
        }
        self.commit(working, LedgerChange::Removed(product_id))?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.commit(Ledger::new(self.ledger.currency()), LedgerChange::Cleared)
    }

    /// Re-read the persisted cart, for example after another process changed it.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        self.ledger = self.repository.load()?;
        let totals = self.ledger.totals(&self.policy)?;
        self.observers
            .notify(&LedgerChange::Reloaded, &self.ledger, &totals);
        Ok(())
    }

    /// Forget the cart entirely, in storage and in memory.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.repository.discard()?;
        self.ledger = Ledger::new(self.ledger.currency());
        let totals = self.ledger.totals(&self.policy)?;
        self.observers.notify(&LedgerChange::Cleared, &self.ledger, &totals);
        tracing::info!("signed out, cart discarded");
        Ok(())
    }

    pub fn begin_catalog_load(&mut self) -> CatalogTicket {
        self.catalog.begin()
    }

    pub fn finish_catalog_load(
        &mut self,
        ticket: CatalogTicket,
        result: Result<Vec<MedicineRecord>, GatewayError>,
    ) -> Result<CatalogApply, SessionError> {
        Ok(self.catalog.finish(ticket, result)?)
    }

    pub async fn refresh_catalog(&mut self) -> Result<CatalogApply, SessionError> {
        let ticket = self.catalog.begin();
        let result = self.source.fetch_catalog().await;
        self.finish_catalog_load(ticket, result)
    }

    /// The user navigated away; catalog responses arriving later are dropped.
    pub fn detach(&mut self) {
        self.catalog.detach();
    }

    pub fn is_detached(&self) -> bool {
        self.catalog.is_detached()
    }

    /// Place an order for everything in the cart.
    ///
    /// Stock is re-checked against a fresh catalog first. If placing the
    /// order fails the cart is left as it was. Once the order exists the
    /// cart is cleared, whatever happens to the payment.
    pub async fn checkout(
        &mut self,
        shipping_address: &str,
        payment_mode: OrderPaymentMode,
    ) -> Result<CheckoutOutcome, SessionError> {
        let request = OrderRequest::from_ledger(&self.ledger, shipping_address, payment_mode)?;

        let fresh = CatalogSnapshot::from_records(
            self.source.fetch_catalog().await?,
            self.ledger.currency(),
        );
        let shortfalls = revalidate(&self.ledger, &fresh);
        if !shortfalls.is_empty() {
            tracing::warn!(count = shortfalls.len(), "stock changed since items were added");
            let mut working = self.ledger.clone();
            working.refresh_ceilings(&fresh);
            self.catalog.adopt(fresh);
            if working != self.ledger {
                let totals = working.totals(&self.policy)?;
                self.repository.save(&working)?;
                self.ledger = working;
                self.observers
                    .notify(&LedgerChange::Reloaded, &self.ledger, &totals);
            }
            return Err(LedgerError::StockChanged(shortfalls).into());
        }
        self.catalog.adopt(fresh);

        let order = self.orders.place_order(&request).await?;
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = order.total_amount,
            "order placed"
        );

        // The order exists now; a failure to persist the empty cart must not
        // make the caller think checkout failed and place it again.
        let emptied = Ledger::new(self.ledger.currency());
        if let Err(e) = self.commit(emptied, LedgerChange::Cleared) {
            tracing::error!(error = %e, "order placed but the cart could not be cleared");
        }

        match payment_mode {
            OrderPaymentMode::COD => Ok(CheckoutOutcome::CashOnDelivery { order }),
            OrderPaymentMode::UPI => match self.orders.pay_order(order.id, payment_mode).await {
                Ok(outcome) if outcome.success => {
                    tracing::info!(order_id = %order.id, "payment succeeded");
                    Ok(CheckoutOutcome::Paid {
                        order,
                        message: outcome.message,
                    })
                }
                Ok(outcome) => {
                    tracing::warn!(order_id = %order.id, message = %outcome.message, "payment declined");
                    Ok(CheckoutOutcome::PaymentFailed {
                        order,
                        message: outcome.message,
                    })
                }
                Err(e) => {
                    tracing::warn!(order_id = %order.id, error = %e, "payment call failed");
                    Ok(CheckoutOutcome::PaymentFailed {
                        order,
                        message: e.to_string(),
                    })
                }
            },
        }
    }

    fn commit(&mut self, working: Ledger, change: LedgerChange) -> Result<(), SessionError> {
        let totals = working.totals(&self.policy)?;
        self.repository.save(&working)?;
        self.ledger = working;
        tracing::debug!(?change, lines = self.ledger.len(), "cart updated");
        self.observers.notify(&change, &self.ledger, &totals);
        Ok(())
    }
}

pub(crate) fn warn_on_stock<T>(result: Result<T, LedgerError>) -> Result<T, LedgerError> {
    if let Err(e @ LedgerError::StockLimitExceeded { .. }) = &result {
        tracing::warn!(error = %e, "stock limit");
    }
    result
}
