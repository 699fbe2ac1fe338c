//! # Replenishment Ledger
//!
//! Append-only ledger of stock increases and their cost basis.
//!
//! ## Atomic Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record("SKU1", added: 10, cost: 1000, actor: "Budi")                   │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    1. stock += 10, cost_minor = 1000 (single UPDATE, RETURNING;         │
//! │         first statement writes, so the tx holds the write lock          │
//! │         up front; missing product → ProductNotFound)                    │
//! │    2. snapshot the product name                                         │
//! │    3. INSERT replenishment_events                                       │
//! │         stock_before = 2, stock_after = 12                              │
//! │         expenditure = 1000 × 10 = 10000                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The stock change and its audit row commit or roll back together.      │
//! │  Events are append-only: there is no update or delete API.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::repository::catalog;
use warung_core::validation::{
    validate_actor, validate_code, validate_price_minor, validate_stock_delta,
};
use warung_core::{CoreError, Money, ReplenishmentEvent};

/// One requested replenishment row (bulk import input).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplenishmentRequest {
    pub code: String,
    pub added: i64,
    pub cost_minor: i64,
}

/// A failed row in a batch replenishment.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// Zero-based index of the failed row in the submitted batch.
    pub row: usize,
    pub code: String,
    pub message: String,
}

/// Outcome of a batch replenishment: applied events plus per-row
/// failures. Failures never roll back earlier rows.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub applied: Vec<ReplenishmentEvent>,
    pub failures: Vec<BatchFailure>,
}

/// Repository for the replenishment ledger.
#[derive(Debug, Clone)]
pub struct ReplenishmentRepository {
    pool: SqlitePool,
}

const EVENT_COLUMNS: &str = "id, product_code, product_name, stock_before, stock_after, \
     added, cost_minor, expenditure_minor, created_at, actor";

impl ReplenishmentRepository {
    /// Creates a new ReplenishmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReplenishmentRepository { pool }
    }

    /// Records one replenishment: stock increase + ledger row, atomic.
    ///
    /// ## Arguments
    /// * `code` - Product code (must exist; fatal here, unlike checkout)
    /// * `added` - Units added, must be positive
    /// * `cost_minor` - Unit cost basis for this delivery; becomes the
    ///   product's current cost basis
    /// * `actor` - Who performed the update
    pub async fn record(
        &self,
        code: &str,
        added: i64,
        cost_minor: i64,
        actor: &str,
    ) -> StoreResult<ReplenishmentEvent> {
        validate_code(code).map_err(CoreError::from)?;
        if validate_stock_delta(added).is_err() {
            return Err(StoreError::Domain(CoreError::InvalidStockDelta { added }));
        }
        validate_price_minor(cost_minor).map_err(CoreError::from)?;
        validate_actor(actor).map_err(CoreError::from)?;

        debug!(code = %code, added = %added, "Recording replenishment");

        let mut tx = self.pool.begin().await?;

        // The stock UPDATE opens the transaction so it takes the write
        // lock with its first statement; competing writers queue on
        // busy_timeout instead of conflicting at a later write.
        let (before, after) =
            match catalog::increase_stock_conn(&mut tx, code, added, cost_minor).await {
                Ok(pair) => pair,
                Err(StoreError::NotFound { .. }) => {
                    return Err(StoreError::Domain(CoreError::ProductNotFound(
                        code.to_string(),
                    )))
                }
                Err(err) => return Err(err),
            };

        // Snapshot the name inside the same transaction; the event must
        // survive a later product deletion.
        let name: String = sqlx::query_scalar("SELECT name FROM products WHERE code = ?1")
            .bind(code)
            .fetch_one(&mut *tx)
            .await?;

        let event = ReplenishmentEvent {
            id: Uuid::new_v4().to_string(),
            product_code: code.to_string(),
            product_name: name,
            stock_before: before,
            stock_after: after,
            added,
            cost_minor,
            expenditure_minor: Money::from_minor(cost_minor).multiply_quantity(added).minor(),
            created_at: Utc::now(),
            actor: actor.trim().to_string(),
        };

        sqlx::query(
            "INSERT INTO replenishment_events (
                 id, product_code, product_name, stock_before, stock_after,
                 added, cost_minor, expenditure_minor, created_at, actor
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&event.id)
        .bind(&event.product_code)
        .bind(&event.product_name)
        .bind(event.stock_before)
        .bind(event.stock_after)
        .bind(event.added)
        .bind(event.cost_minor)
        .bind(event.expenditure_minor)
        .bind(event.created_at)
        .bind(&event.actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(event)
    }

    /// Records a batch of replenishments with partial-success semantics.
    ///
    /// Each row is its own atomic unit: a bad row (unknown code,
    /// non-positive delta) is reported in `failures` and never affects
    /// the rows around it. This is the bulk-import path.
    pub async fn record_batch(
        &self,
        rows: &[ReplenishmentRequest],
        actor: &str,
    ) -> StoreResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for (row, req) in rows.iter().enumerate() {
            match self
                .record(&req.code, req.added, req.cost_minor, actor)
                .await
            {
                Ok(event) => outcome.applied.push(event),
                Err(err) => outcome.failures.push(BatchFailure {
                    row,
                    code: req.code.clone(),
                    message: err.to_string(),
                }),
            }
        }

        debug!(
            applied = outcome.applied.len(),
            failed = outcome.failures.len(),
            "Batch replenishment complete"
        );

        Ok(outcome)
    }

    /// Lists events inside a window (inclusive bounds), oldest first.
    pub async fn list_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<ReplenishmentEvent>> {
        let events = sqlx::query_as::<_, ReplenishmentEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM replenishment_events
             WHERE created_at BETWEEN ?1 AND ?2
             ORDER BY created_at, id"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Counts all events (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM replenishment_events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
