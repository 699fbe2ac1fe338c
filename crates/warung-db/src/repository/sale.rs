//! # Sales Ledger
//!
//! Checkout and the immutable sales ledger.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout (single transaction)                      │
//! │                                                                         │
//! │  validate cart (EmptyCart, InvalidQuantity)  ← before anything else    │
//! │       │                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │  mint trx_no (per-date counter)             ← FIRST statement writes,  │
//! │       │                                       so concurrent checkouts  │
//! │       │                                       queue on busy_timeout    │
//! │  resolve prices from the catalog            ← never from the payload   │
//! │  (unresolved code → zero price, zero cost basis; still billable)       │
//! │       │                                                                 │
//! │  settle(total, paid)                                                    │
//! │       │   paid < total → InsufficientPayment, whole tx rolls back      │
//! │       │   (counter bump included, so sequences stay dense)             │
//! │       ▼                                                                 │
//! │  clamp-decrement stock per resolved line                               │
//! │  INSERT header + all lines                                             │
//! │       │                                                                 │
//! │  COMMIT                                     ← all-or-nothing           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Committed transactions are never updated or deleted: there is no
//! void or edit path anywhere in this API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::repository::catalog;
use crate::repository::numbering::{self, NumberingConfig};
use warung_core::validation::{validate_actor, validate_payment_minor, validate_uuid};
use warung_core::{
    settle, total_of, Cart, CoreError, Money, PaymentMethod, PricedLine, SalesLine,
    SalesTransaction,
};

/// Everything a checkout needs, supplied by the caller.
///
/// `business_date` is the already-localized calendar date used to scope
/// the transaction number; instants are stored in UTC regardless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub cart: Cart,
    pub payment_method: PaymentMethod,
    pub paid_minor: i64,
    pub cashier: String,
    pub business_date: chrono::NaiveDate,
}

/// Repository for checkout and sales ledger reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    numbering: NumberingConfig,
}

const HEADER_COLUMNS: &str =
    "id, trx_no, created_at, cashier, payment_method, total_minor, paid_minor, change_minor";

const LINE_COLUMNS: &str =
    "id, transaction_id, product_code, product_name, price_minor, cost_minor, quantity, subtotal_minor";

impl SaleRepository {
    /// Creates a new SaleRepository with the default numbering config.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository {
            pool,
            numbering: NumberingConfig::default(),
        }
    }

    /// Overrides the transaction number prefix configuration.
    pub fn with_numbering(mut self, numbering: NumberingConfig) -> Self {
        self.numbering = numbering;
        self
    }

    /// Processes a checkout atomically.
    ///
    /// ## Validation Order
    /// 1. Cart shape (EmptyCart, InvalidQuantity) - before anything
    /// 2. Actor and payment amount shape
    /// 3. Price resolution from the catalog (unresolved codes tolerated)
    /// 4. `paid >= total` - BEFORE any durable mutation (only the
    ///    counter bump precedes it, and that rolls back with the tx)
    ///
    /// On success the sale header, its lines, the stock decrements, and
    /// the number counter bump have all committed together.
    pub async fn checkout(&self, request: &CheckoutRequest) -> StoreResult<SalesTransaction> {
        request.cart.validate()?;
        validate_actor(&request.cashier).map_err(CoreError::from)?;
        validate_payment_minor(request.paid_minor).map_err(CoreError::from)?;

        debug!(
            lines = request.cart.len(),
            paid = request.paid_minor,
            "Processing checkout"
        );

        let mut tx = self.pool.begin().await?;

        // Bump the counter before any read so this transaction takes
        // the write lock up front. Competing checkouts then wait on
        // busy_timeout instead of failing on a stale WAL snapshot at
        // their first write.
        let trx_no = numbering::next_in_tx(&mut tx, &self.numbering, request.business_date).await?;

        // Resolve every line at current catalog prices. The client
        // payload carries codes and quantities only.
        let mut priced: Vec<(PricedLine, bool)> = Vec::with_capacity(request.cart.len());
        for line in &request.cart.lines {
            let row: Option<(String, i64, i64)> = sqlx::query_as(
                "SELECT name, price_minor, cost_minor FROM products WHERE code = ?1",
            )
            .bind(&line.code)
            .fetch_optional(&mut *tx)
            .await?;

            match row {
                Some((name, price_minor, cost_minor)) => priced.push((
                    PricedLine {
                        code: line.code.clone(),
                        name,
                        price_minor,
                        cost_minor,
                        quantity: line.quantity,
                    },
                    true,
                )),
                // Unresolved code: keep the line at zero price and zero
                // cost basis rather than failing the whole sale.
                None => priced.push((PricedLine::unresolved(&line.code, line.quantity), false)),
            }
        }

        let lines_only: Vec<PricedLine> = priced.iter().map(|(l, _)| l.clone()).collect();
        let total = total_of(&lines_only);

        // A rejected payment rolls the whole transaction back, counter
        // bump included: no number is consumed, no stock is touched.
        let change = settle(total, Money::from_minor(request.paid_minor))?;

        for (line, resolved) in &priced {
            if *resolved {
                catalog::decrease_stock_clamped_conn(&mut tx, &line.code, line.quantity).await?;
            }
        }

        let transaction = SalesTransaction {
            id: Uuid::new_v4().to_string(),
            trx_no,
            created_at: Utc::now(),
            cashier: request.cashier.trim().to_string(),
            payment_method: request.payment_method,
            total_minor: total.minor(),
            paid_minor: request.paid_minor,
            change_minor: change.minor(),
            lines: Vec::new(),
        };

        sqlx::query(
            "INSERT INTO sales_transactions (
                 id, trx_no, created_at, cashier, payment_method,
                 total_minor, paid_minor, change_minor
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&transaction.id)
        .bind(&transaction.trx_no)
        .bind(transaction.created_at)
        .bind(&transaction.cashier)
        .bind(transaction.payment_method)
        .bind(transaction.total_minor)
        .bind(transaction.paid_minor)
        .bind(transaction.change_minor)
        .execute(&mut *tx)
        .await?;

        let mut stored_lines = Vec::with_capacity(priced.len());
        for (line, _) in &priced {
            let stored = SalesLine {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction.id.clone(),
                product_code: line.code.clone(),
                product_name: line.name.clone(),
                price_minor: line.price_minor,
                cost_minor: line.cost_minor,
                quantity: line.quantity,
                subtotal_minor: line.subtotal().minor(),
            };

            sqlx::query(
                "INSERT INTO sales_lines (
                     id, transaction_id, product_code, product_name,
                     price_minor, cost_minor, quantity, subtotal_minor
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&stored.id)
            .bind(&stored.transaction_id)
            .bind(&stored.product_code)
            .bind(&stored.product_name)
            .bind(stored.price_minor)
            .bind(stored.cost_minor)
            .bind(stored.quantity)
            .bind(stored.subtotal_minor)
            .execute(&mut *tx)
            .await?;

            stored_lines.push(stored);
        }

        tx.commit().await?;

        debug!(trx_no = %transaction.trx_no, total = transaction.total_minor, "Checkout committed");

        Ok(SalesTransaction {
            lines: stored_lines,
            ..transaction
        })
    }

    /// Gets a transaction (with lines) by its UUID.
    ///
    /// A malformed id is a caller bug, not a miss, so it errors rather
    /// than returning `None`.
    pub async fn get(&self, id: &str) -> StoreResult<Option<SalesTransaction>> {
        validate_uuid(id).map_err(CoreError::from)?;

        let header = sqlx::query_as::<_, SalesTransaction>(&format!(
            "SELECT {HEADER_COLUMNS} FROM sales_transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match header {
            Some(header) => Ok(Some(self.attach_lines(header).await?)),
            None => Ok(None),
        }
    }

    /// Gets a transaction (with lines) by its business number.
    pub async fn get_by_trx_no(&self, trx_no: &str) -> StoreResult<Option<SalesTransaction>> {
        let header = sqlx::query_as::<_, SalesTransaction>(&format!(
            "SELECT {HEADER_COLUMNS} FROM sales_transactions WHERE trx_no = ?1"
        ))
        .bind(trx_no)
        .fetch_optional(&self.pool)
        .await?;

        match header {
            Some(header) => Ok(Some(self.attach_lines(header).await?)),
            None => Ok(None),
        }
    }

    /// Lists transactions inside a window (inclusive bounds), oldest
    /// first, lines attached.
    pub async fn list_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<SalesTransaction>> {
        let headers = sqlx::query_as::<_, SalesTransaction>(&format!(
            "SELECT {HEADER_COLUMNS} FROM sales_transactions
             WHERE created_at BETWEEN ?1 AND ?2
             ORDER BY created_at, trx_no"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(headers.len());
        for header in headers {
            out.push(self.attach_lines(header).await?);
        }

        Ok(out)
    }

    /// Counts all transactions (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn attach_lines(&self, mut header: SalesTransaction) -> StoreResult<SalesTransaction> {
        header.lines = sqlx::query_as::<_, SalesLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM sales_lines
             WHERE transaction_id = ?1
             ORDER BY rowid"
        ))
        .bind(&header.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(header)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
// End-to-end checkout behavior lives in tests/checkout_flow.rs; these
// cover the narrower request plumbing.
