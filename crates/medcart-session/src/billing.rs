//! The counter billing session.

use crate::cart::warn_on_stock;
use crate::catalog::{CatalogApply, CatalogState, CatalogTicket};
use crate::gateway::{CatalogSource, SaleGateway};
use crate::observer::{LedgerObserver, Observers};
use crate::{GatewayError, SessionError};
use medcart_core::catalog::{CatalogSnapshot, MedicineRecord};
use medcart_core::checkout::{revalidate, CompletedSale, SalePaymentMode, SaleRequest};
use medcart_core::ledger::{Ledger, LedgerChange, SurchargePolicy, Totals};
use medcart_core::{Currency, LedgerError, ProductId};

/// A bill being rung up at the counter.
///
/// The bill lives only in memory; leaving the session loses it.
#[derive(Debug)]
pub struct BillingSession<C, G> {
    ledger: Ledger,
    policy: SurchargePolicy,
    catalog: CatalogState,
    source: C,
    sales: G,
    observers: Observers,
}

impl<C, G> BillingSession<C, G>
where
    C: CatalogSource,
    G: SaleGateway,
{
    pub fn new(currency: Currency, policy: SurchargePolicy, source: C, sales: G) -> Self {
        Self {
            ledger: Ledger::new(currency),
            policy,
            catalog: CatalogState::new(currency),
            source,
            sales,
            observers: Observers::default(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn totals(&self) -> Result<Totals, SessionError> {
        Ok(self.ledger.totals(&self.policy)?)
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        self.catalog.snapshot()
    }

    pub fn subscribe(&mut self, observer: impl LedgerObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

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

    pub fn adjust(&mut self, product_id: ProductId, delta: i64) -> Result<LedgerChange, SessionError> {
        let mut working = self.ledger.clone();
        let change = warn_on_stock(working.adjust_quantity(product_id, delta))?.change(product_id);
        self.commit(working, change)?;
        Ok(change)
    }

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

    pub fn detach(&mut self) {
        self.catalog.detach();
    }

    /// Record the bill as a sale.
    ///
    /// On success the bill is cleared and the catalog reloaded so stock
    /// reflects the sale. On failure the bill is left intact.
    pub async fn complete_sale(
        &mut self,
        customer_name: Option<&str>,
        customer_phone: Option<&str>,
        payment_mode: SalePaymentMode,
    ) -> Result<CompletedSale, SessionError> {
        let request =
            SaleRequest::from_ledger(&self.ledger, customer_name, customer_phone, payment_mode)?;

        let fresh = CatalogSnapshot::from_records(
            self.source.fetch_catalog().await?,
            self.ledger.currency(),
        );
        let shortfalls = revalidate(&self.ledger, &fresh);
        if !shortfalls.is_empty() {
            tracing::warn!(count = shortfalls.len(), "stock changed since items were billed");
            let mut working = self.ledger.clone();
            working.refresh_ceilings(&fresh);
            self.catalog.adopt(fresh);
            if working != self.ledger {
                self.commit(working, LedgerChange::Reloaded)?;
            }
            return Err(LedgerError::StockChanged(shortfalls).into());
        }
        self.catalog.adopt(fresh);

        let sale = self.sales.record_sale(&request).await?;
        tracing::info!(
            sale_id = %sale.id,
            invoice = %sale.invoice_number,
            total = sale.total_amount,
            "sale recorded"
        );

        self.commit(Ledger::new(self.ledger.currency()), LedgerChange::Cleared)?;

        if let Err(e) = self.refresh_catalog().await {
            tracing::warn!(error = %e, "catalog reload after sale failed");
        }
        Ok(sale)
    }

    fn commit(&mut self, working: Ledger, change: LedgerChange) -> Result<(), SessionError> {
        let totals = working.totals(&self.policy)?;
        self.ledger = working;
        tracing::debug!(?change, lines = self.ledger.len(), "bill updated");
        self.observers.notify(&change, &self.ledger, &totals);
        Ok(())
    }
}
