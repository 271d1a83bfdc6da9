//! Offline (counter) sale payloads.

use crate::error::LedgerError;
use crate::ids::{ProductId, SaleId};
use crate::ledger::Ledger;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment mode at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SalePaymentMode {
    #[default]
    Cash,
    Card,
    UPI,
}

impl SalePaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalePaymentMode::Cash => "Cash",
            SalePaymentMode::Card => "Card",
            SalePaymentMode::UPI => "UPI",
        }
    }
}

impl fmt::Display for SalePaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalePaymentMode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(SalePaymentMode::Cash),
            "card" => Ok(SalePaymentMode::Card),
            "upi" => Ok(SalePaymentMode::UPI),
            other => Err(LedgerError::Validation(format!(
                "unknown payment mode: {other}"
            ))),
        }
    }
}

/// One billed line, as the backend stores it on the sale record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleItem {
    pub medicine_id: ProductId,
    pub medicine_name: String,
    pub quantity: i64,
    /// Unit price as a decimal.
    pub price: f64,
    /// Line subtotal as a decimal.
    pub subtotal: f64,
}

/// Body of `POST /admin/offline-sales`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub items: Vec<SaleItem>,
    pub payment_mode: SalePaymentMode,
}

impl SaleRequest {
    /// Build the request from a billing ledger. Blank customer fields become `null`.
    pub fn from_ledger(
        ledger: &Ledger,
        customer_name: Option<&str>,
        customer_phone: Option<&str>,
        payment_mode: SalePaymentMode,
    ) -> Result<Self, LedgerError> {
        if ledger.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }

        Ok(Self {
            customer_name: non_blank(customer_name),
            customer_phone: non_blank(customer_phone),
            items: ledger
                .lines()
                .iter()
                .map(|line| SaleItem {
                    medicine_id: line.product_id(),
                    medicine_name: line.label().to_string(),
                    quantity: line.quantity(),
                    price: line.unit_price().to_decimal(),
                    subtotal: line.subtotal().to_decimal(),
                })
                .collect(),
            payment_mode,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The sale record the backend created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedSale {
    pub id: SaleId,
    pub invoice_number: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub subtotal: f64,
    pub tax: f64,
    pub total_amount: f64,
    pub payment_mode: SalePaymentMode,
}

impl CompletedSale {
    /// Backend total in minor units of `reference`'s currency.
    pub fn total(&self, reference: &Money) -> Money {
        Money::from_decimal(self.total_amount, reference.currency)
    }
}
