//! Surcharge policies and order-level totals.

use crate::error::LedgerError;
use crate::money::{Currency, Money, TaxRate};
use serde::{Deserialize, Serialize};

/// Default flat delivery fee for online orders, in minor units.
pub const DEFAULT_DELIVERY_FEE_CENTS: i64 = 5000;

/// How the flow-specific charge on top of the subtotal is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurchargePolicy {
    /// A fixed fee, charged once when the ledger has any lines.
    FlatDelivery { fee: Money },
    /// A percentage of the subtotal, charged whenever the subtotal is positive.
    ProportionalTax { rate: TaxRate },
    /// No surcharge.
    None,
}

impl SurchargePolicy {
    /// Shopping-cart policy with the default fee.
    pub fn delivery(currency: Currency) -> Self {
        SurchargePolicy::FlatDelivery {
            fee: Money::new(DEFAULT_DELIVERY_FEE_CENTS, currency),
        }
    }

    /// Counter-sale policy with the standard 5% rate.
    pub fn standard_tax() -> Self {
        SurchargePolicy::ProportionalTax {
            rate: TaxRate::STANDARD,
        }
    }

    pub fn kind(&self) -> SurchargeKind {
        match self {
            SurchargePolicy::FlatDelivery { .. } => SurchargeKind::Delivery,
            SurchargePolicy::ProportionalTax { rate } => SurchargeKind::Tax(*rate),
            SurchargePolicy::None => SurchargeKind::None,
        }
    }

    /// Surcharge for a ledger with `line_count` lines and the given subtotal.
    pub fn surcharge(&self, line_count: usize, subtotal: &Money) -> Result<Money, LedgerError> {
        match self {
            SurchargePolicy::FlatDelivery { fee } => {
                if line_count == 0 {
                    return Ok(Money::zero(subtotal.currency));
                }
                if fee.currency != subtotal.currency {
                    return Err(LedgerError::CurrencyMismatch {
                        expected: subtotal.currency.code().to_string(),
                        got: fee.currency.code().to_string(),
                    });
                }
                Ok(*fee)
            }
            SurchargePolicy::ProportionalTax { rate } => {
                if !subtotal.is_positive() {
                    return Ok(Money::zero(subtotal.currency));
                }
                rate.apply(subtotal).ok_or(LedgerError::Overflow)
            }
            SurchargePolicy::None => Ok(Money::zero(subtotal.currency)),
        }
    }
}

/// Which kind of surcharge a total carries, for labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurchargeKind {
    Delivery,
    Tax(TaxRate),
    None,
}

impl SurchargeKind {
    pub fn label(&self) -> String {
        match self {
            SurchargeKind::Delivery => "Delivery".to_string(),
            SurchargeKind::Tax(rate) => format!("Tax ({})", rate.label()),
            SurchargeKind::None => "Surcharge".to_string(),
        }
    }
}

/// Order-level totals for a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line subtotals.
    pub subtotal: Money,
    /// Delivery fee or tax.
    pub surcharge: Money,
    /// subtotal + surcharge.
    pub grand_total: Money,
    pub kind: SurchargeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_only_when_non_empty() {
        let policy = SurchargePolicy::delivery(Currency::INR);
        let zero = Money::zero(Currency::INR);
        assert!(policy.surcharge(0, &zero).unwrap().is_zero());
        assert_eq!(
            policy
                .surcharge(1, &Money::new(100, Currency::INR))
                .unwrap()
                .amount_cents,
            5000
        );
    }

    #[test]
    fn test_tax_only_when_subtotal_positive() {
        let policy = SurchargePolicy::standard_tax();
        assert!(policy
            .surcharge(0, &Money::zero(Currency::INR))
            .unwrap()
            .is_zero());
        assert_eq!(
            policy
                .surcharge(2, &Money::new(20000, Currency::INR))
                .unwrap()
                .amount_cents,
            1000
        );
    }

    #[test]
    fn test_delivery_fee_currency_must_match() {
        let policy = SurchargePolicy::FlatDelivery {
            fee: Money::new(500, Currency::USD),
        };
        let result = policy.surcharge(1, &Money::new(100, Currency::INR));
        assert!(matches!(result, Err(LedgerError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(SurchargePolicy::standard_tax().kind().label(), "Tax (5%)");
        assert_eq!(
            SurchargePolicy::delivery(Currency::INR).kind().label(),
            "Delivery"
        );
    }
}
