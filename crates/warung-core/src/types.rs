//! # Domain Types
//!
//! Core domain types used throughout Warung POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐  ┌──────────────────┐  ┌────────────────────┐  │
//! │  │    Product     │  │ SalesTransaction │  │ ReplenishmentEvent │  │
//! │  │  ───────────── │  │  ──────────────  │  │  ───────────────── │  │
//! │  │  id (UUID)     │  │  id (UUID)       │  │  id (UUID)         │  │
//! │  │  code (biz)    │  │  trx_no (biz)    │  │  product snapshot  │  │
//! │  │  price/cost    │  │  total/paid      │  │  before/after      │  │
//! │  │  stock         │  │  lines: Vec<..>  │  │  expenditure       │  │
//! │  └────────────────┘  └──────────────────┘  └────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (code, trx_no) - human-readable, what operators see
//!
//! ## Snapshot Pattern
//! Sales lines and replenishment events copy product code, name, price
//! and cost basis at write time. Later catalog edits (or even product
//! deletion) never rewrite history, so margin reports stay accurate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// Lifecycle status of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Product is sellable and shows up in stock-health reports.
    Active,
    /// Product is hidden from sale but kept for ledger history.
    Inactive,
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Active
    }
}

/// A product in the catalog.
///
/// Stock only increases through the replenishment ledger and only
/// decreases through checkout; catalog edits touch name/price/cost but
/// never stock. The `stock >= 0` invariant is enforced by the clamped
/// decrement and backed by a database CHECK constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique business code (immutable key, e.g. "SKU1").
    pub code: String,

    /// Display name shown to cashier and on receipts.
    pub name: String,

    /// Sell price in minor units (>= 0).
    pub price_minor: i64,

    /// Cost basis (acquisition cost per unit) in minor units (>= 0).
    /// Mutable; sales lines snapshot it at sale time.
    pub cost_minor: i64,

    /// Current stock level (>= 0 invariant).
    pub stock: i64,

    /// Lifecycle status (active/inactive).
    pub status: ProductStatus,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sell price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor)
    }

    /// Returns the cost basis as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_minor(self.cost_minor)
    }

    /// Checks whether the product is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// QRIS (Indonesian standard QR) payment.
    Qris,
    /// Bank transfer.
    Transfer,
}

// =============================================================================
// Sales Transaction
// =============================================================================

/// A completed checkout.
///
/// Immutable once committed: there is no update or delete path anywhere
/// in the API (financial record integrity). The header and all lines
/// are created together in one atomic unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesTransaction {
    pub id: String,

    /// Generated identifier, unique and monotonic within a calendar
    /// day: `PREFIX-YYYYMMDD-NNNN`.
    pub trx_no: String,

    /// Creation instant (UTC).
    pub created_at: DateTime<Utc>,

    /// Cashier display name (pre-authenticated actor identity).
    pub cashier: String,

    pub payment_method: PaymentMethod,

    /// Sum of the lines' subtotals, in minor units.
    pub total_minor: i64,

    /// Amount tendered, in minor units.
    pub paid_minor: i64,

    /// `paid - total`, never negative at commit time.
    pub change_minor: i64,

    /// Ordered line items, created atomically with the header.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<SalesLine>,
}

impl SalesTransaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_minor(self.paid_minor)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_minor(self.change_minor)
    }
}

// =============================================================================
// Sales Line
// =============================================================================

/// A line item in a sales transaction.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesLine {
    pub id: String,
    pub transaction_id: String,
    /// Product code at time of sale (frozen).
    pub product_code: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit sell price in minor units at time of sale (frozen).
    pub price_minor: i64,
    /// Unit cost basis in minor units at time of sale (frozen).
    /// A snapshot, not a live reference: later cost edits never change
    /// historical margins.
    pub cost_minor: i64,
    /// Quantity sold (> 0).
    pub quantity: i64,
    /// Line subtotal (price × quantity).
    pub subtotal_minor: i64,
}

impl SalesLine {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal_minor)
    }

    /// Cost of goods for this line (cost basis × quantity).
    #[inline]
    pub fn cost_of_goods(&self) -> Money {
        Money::from_minor(self.cost_minor * self.quantity)
    }
}

// =============================================================================
// Replenishment Event
// =============================================================================

/// A stock-increase event with its cost basis, forming the append-only
/// replenishment audit trail.
///
/// `added` is always positive: stock reductions must never flow through
/// this path. Product code and name are denormalized snapshots so the
/// event survives product deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReplenishmentEvent {
    pub id: String,
    /// Product code at time of replenishment (snapshot).
    pub product_code: String,
    /// Product name at time of replenishment (snapshot).
    pub product_name: String,
    /// Stock level before the increase.
    pub stock_before: i64,
    /// Stock level after the increase (= before + added).
    pub stock_after: i64,
    /// Units added (> 0).
    pub added: i64,
    /// Unit cost basis in effect at the time, in minor units.
    pub cost_minor: i64,
    /// Total expenditure (= cost × added), in minor units.
    pub expenditure_minor: i64,
    /// Creation instant (UTC).
    pub created_at: DateTime<Utc>,
    /// Who performed the update (pre-authenticated actor identity).
    pub actor: String,
}

impl ReplenishmentEvent {
    #[inline]
    pub fn expenditure(&self) -> Money {
        Money::from_minor(self.expenditure_minor)
    }
}

// =============================================================================
// Reporting Values
// =============================================================================

/// Financial aggregation over a caller-supplied window.
///
/// Revenue and cost of goods come from the sales ledger, stock
/// expenditure from the replenishment ledger. Net margin is always
/// `revenue - cost_of_goods`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub revenue_minor: i64,
    pub cost_of_goods_minor: i64,
    pub net_margin_minor: i64,
    pub stock_expenditure_minor: i64,
    pub transaction_count: i64,
}

impl FinancialSummary {
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_minor(self.revenue_minor)
    }

    #[inline]
    pub fn net_margin(&self) -> Money {
        Money::from_minor(self.net_margin_minor)
    }
}

/// Units sold per product (top/rarely-sold breakdowns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductQuantity {
    pub code: String,
    pub name: String,
    pub quantity_sold: i64,
}

/// Revenue per product (top-by-revenue breakdown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductRevenue {
    pub code: String,
    pub name: String,
    pub revenue_minor: i64,
}

/// Stock level per product (low-stock / overstock lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductStock {
    pub code: String,
    pub name: String,
    pub stock: i64,
}

/// Revenue for one calendar month ("YYYY-MM"), for the sales trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue_minor: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
