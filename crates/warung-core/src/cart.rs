//! # Cart Module
//!
//! Pure checkout math: cart validation, price resolution results, and
//! payment settlement.
//!
//! ## Checkout Math Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart { lines: [(code, qty), ...] }                                     │
//! │       │                                                                 │
//! │       ▼  validate()                                                     │
//! │  ├── no lines?              → EmptyCart                                 │
//! │  ├── qty outside 1..=999?   → InvalidQuantity                           │
//! │       │                                                                 │
//! │       ▼  price resolution (caller looks codes up in the catalog)        │
//! │  PricedLine { code, name, price, cost, qty }                            │
//! │  (unresolved codes degrade to zero price and zero cost basis)           │
//! │       │                                                                 │
//! │       ▼  total_of() then settle(total, paid)                            │
//! │  paid < total?  → InsufficientPayment                                   │
//! │  otherwise      → change = paid - total                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module never touches the database. The store layer resolves
//! prices from the catalog (never from caller-supplied amounts) and
//! feeds the results back through these functions inside its
//! transaction.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{validate_cart_size, validate_quantity};

// =============================================================================
// Cart
// =============================================================================

/// One requested line in a cart: a product code and a quantity.
///
/// Carries no prices. Amounts always come from the catalog at checkout
/// time, so a stale or malicious client cannot set its own prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub code: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(code: impl Into<String>, quantity: i64) -> Self {
        Self {
            code: code.into(),
            quantity,
        }
    }
}

/// A checkout request's cart: the ordered list of requested lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Validates the cart shape before any state is touched.
    ///
    /// ## Validation Order
    /// 1. Cart must have at least one line (`EmptyCart`)
    /// 2. Cart must not exceed the line limit
    /// 3. Every quantity must be within 1..=MAX_LINE_QUANTITY
    ///    (`InvalidQuantity`)
    ///
    /// The upper bound keeps `price * quantity` far inside i64 range, so
    /// line subtotals can never overflow downstream.
    ///
    /// Whether a code resolves in the catalog is NOT checked here:
    /// unresolved codes are tolerated and degrade to zero amounts.
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        validate_cart_size(self.lines.len())?;

        for line in &self.lines {
            if validate_quantity(line.quantity).is_err() {
                return Err(CoreError::InvalidQuantity {
                    code: line.code.clone(),
                    quantity: line.quantity,
                });
            }
        }

        Ok(())
    }
}

// =============================================================================
// Priced Lines
// =============================================================================

/// A cart line after price resolution against the catalog.
///
/// For a resolved code this snapshots the product's current name, sell
/// price, and cost basis. For an unresolved code the name falls back to
/// the code itself and both amounts are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub code: String,
    pub name: String,
    pub price_minor: i64,
    pub cost_minor: i64,
    pub quantity: i64,
}

impl PricedLine {
    /// Builds a priced line for an unresolved product code.
    /// The line stays billable at zero amounts.
    pub fn unresolved(code: impl Into<String>, quantity: i64) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            price_minor: 0,
            cost_minor: 0,
            quantity,
        }
    }

    /// Line subtotal (unit price × quantity).
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.price_minor).multiply_quantity(self.quantity)
    }
}

/// Sums the subtotals of a set of priced lines.
pub fn total_of(lines: &[PricedLine]) -> Money {
    lines.iter().map(|l| l.subtotal()).sum()
}

// =============================================================================
// Settlement
// =============================================================================

/// Settles a payment against a transaction total.
///
/// Returns the change due (`paid - total`, never negative) or
/// `InsufficientPayment` when the tendered amount does not cover the
/// total. Callers check this BEFORE minting a transaction number or
/// touching stock, so a rejected payment leaves no side effects.
///
/// ## Example
/// ```rust
/// use warung_core::cart::settle;
/// use warung_core::money::Money;
///
/// let change = settle(Money::from_minor(4500), Money::from_minor(5000)).unwrap();
/// assert_eq!(change.minor(), 500);
///
/// assert!(settle(Money::from_minor(4500), Money::from_minor(4000)).is_err());
/// ```
pub fn settle(total: Money, paid: Money) -> CoreResult<Money> {
    if paid < total {
        return Err(CoreError::InsufficientPayment {
            total_minor: total.minor(),
            paid_minor: paid.minor(),
        });
    }

    Ok(paid - total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(code: &str, price: i64, cost: i64, qty: i64) -> PricedLine {
        PricedLine {
            code: code.to_string(),
            name: code.to_string(),
            price_minor: price,
            cost_minor: cost,
            quantity: qty,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let cart = Cart::default();
        assert!(matches!(cart.validate(), Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_nonpositive_quantity_rejected() {
        let cart = Cart::new(vec![CartLine::new("SKU1", 0)]);
        assert!(matches!(
            cart.validate(),
            Err(CoreError::InvalidQuantity { quantity: 0, .. })
        ));

        let cart = Cart::new(vec![CartLine::new("SKU1", 2), CartLine::new("SKU2", -3)]);
        assert!(matches!(
            cart.validate(),
            Err(CoreError::InvalidQuantity { quantity: -3, .. })
        ));
    }

    #[test]
    fn test_excessive_quantity_rejected() {
        // An unbounded quantity would overflow price * quantity math.
        for qty in [1_000, 10_000_000_000_000_000] {
            let cart = Cart::new(vec![CartLine::new("SKU1", qty)]);
            assert!(matches!(
                cart.validate(),
                Err(CoreError::InvalidQuantity { quantity, .. }) if quantity == qty
            ));
        }

        let cart = Cart::new(vec![CartLine::new("SKU1", 999)]);
        assert!(cart.validate().is_ok());
    }

    #[test]
    fn test_valid_cart_passes() {
        let cart = Cart::new(vec![CartLine::new("SKU1", 3), CartLine::new("SKU2", 1)]);
        assert!(cart.validate().is_ok());
    }

    #[test]
    fn test_oversized_cart_rejected() {
        let lines = (0..101)
            .map(|i| CartLine::new(format!("SKU{i}"), 1))
            .collect();
        let cart = Cart::new(lines);
        assert!(cart.validate().is_err());
    }

    #[test]
    fn test_total_of_sums_subtotals() {
        let lines = vec![priced("SKU1", 1500, 1000, 3), priced("SKU2", 2000, 1200, 2)];
        assert_eq!(total_of(&lines).minor(), 4500 + 4000);
    }

    #[test]
    fn test_unresolved_line_is_free() {
        let line = PricedLine::unresolved("GHOST", 4);
        assert_eq!(line.subtotal().minor(), 0);
        assert_eq!(line.cost_minor, 0);
        assert_eq!(line.name, "GHOST");
    }

    #[test]
    fn test_settle_exact_payment() {
        let change = settle(Money::from_minor(4500), Money::from_minor(4500)).unwrap();
        assert!(change.is_zero());
    }

    #[test]
    fn test_settle_overpayment() {
        let change = settle(Money::from_minor(4500), Money::from_minor(5000)).unwrap();
        assert_eq!(change.minor(), 500);
    }

    #[test]
    fn test_settle_underpayment() {
        let err = settle(Money::from_minor(4500), Money::from_minor(4000)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                total_minor: 4500,
                paid_minor: 4000,
            }
        ));
    }

    #[test]
    fn test_settle_zero_total_zero_paid() {
        let change = settle(Money::zero(), Money::zero()).unwrap();
        assert!(change.is_zero());
    }
}
