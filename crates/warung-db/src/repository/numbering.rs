//! # Transaction Numbering
//!
//! Per-date counter backing transaction number generation.
//!
//! ## Number Format
//! ```text
//! TRX-20260828-0001
//! ─┬─ ────┬─── ─┬──
//!  │      │     └── Sequence within the day, zero-padded to 4 digits
//!  │      └──────── Business date (caller-supplied, already localized)
//!  └─────────────── Configurable prefix
//! ```
//!
//! ## Why a Counter Row
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: count-then-insert                                            │
//! │     SELECT COUNT(*) ... ; INSERT ... seq = count + 1                    │
//! │     Two checkouts can read the same count and mint the same number.    │
//! │                                                                         │
//! │  ✅ CORRECT: atomic upsert on a per-date counter row                    │
//! │     INSERT INTO trx_counters (day, seq) VALUES (?, 1)                   │
//! │     ON CONFLICT(day) DO UPDATE SET seq = seq + 1                        │
//! │     RETURNING seq                                                       │
//! │                                                                         │
//! │  One statement, serialized by the write lock. Executed INSIDE the      │
//! │  checkout transaction: a rolled-back checkout rolls the counter back   │
//! │  too, so committed numbers stay dense (1..N, no gaps).                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::StoreResult;

/// Configuration for transaction number generation.
///
/// Explicit value passed by the caller; there is no global mutable
/// settings object.
#[derive(Debug, Clone)]
pub struct NumberingConfig {
    /// Prefix for generated numbers (default "TRX").
    pub prefix: String,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        NumberingConfig {
            prefix: "TRX".to_string(),
        }
    }
}

impl NumberingConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        NumberingConfig {
            prefix: prefix.into(),
        }
    }

    /// Formats a transaction number from a business date and sequence.
    pub fn format(&self, day: NaiveDate, seq: i64) -> String {
        format!("{}-{}-{:04}", self.prefix, day.format("%Y%m%d"), seq)
    }
}

/// Mints the next transaction number for a business date.
///
/// Must be called on the checkout's own transaction so the counter bump
/// commits or rolls back together with the sale.
pub(crate) async fn next_in_tx(
    conn: &mut SqliteConnection,
    config: &NumberingConfig,
    day: NaiveDate,
) -> StoreResult<String> {
    let day_key = day.format("%Y%m%d").to_string();

    let seq: i64 = sqlx::query_scalar(
        "INSERT INTO trx_counters (day, seq) VALUES (?1, 1)
         ON CONFLICT(day) DO UPDATE SET seq = seq + 1
         RETURNING seq",
    )
    .bind(&day_key)
    .fetch_one(&mut *conn)
    .await?;

    let trx_no = config.format(day, seq);
    debug!(trx_no = %trx_no, "Minted transaction number");

    Ok(trx_no)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    #[test]
    fn test_format() {
        let config = NumberingConfig::default();
        let day = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

        assert_eq!(config.format(day, 1), "TRX-20260828-0001");
        assert_eq!(config.format(day, 42), "TRX-20260828-0042");
        assert_eq!(config.format(day, 12345), "TRX-20260828-12345");
    }

    #[test]
    fn test_custom_prefix() {
        let config = NumberingConfig::new("WRG");
        let day = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();

        assert_eq!(config.format(day, 7), "WRG-20260102-0007");
    }

    #[tokio::test]
    async fn test_sequence_is_dense_per_day() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let config = NumberingConfig::default();
        let day = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

        for expected in 1..=3 {
            let mut tx = store.pool().begin().await.unwrap();
            let trx_no = next_in_tx(&mut tx, &config, day).await.unwrap();
            tx.commit().await.unwrap();

            assert_eq!(trx_no, format!("TRX-20260828-{:04}", expected));
        }

        // A different day starts its own sequence.
        let other = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let mut tx = store.pool().begin().await.unwrap();
        let trx_no = next_in_tx(&mut tx, &config, other).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(trx_no, "TRX-20260829-0001");
    }

    #[tokio::test]
    async fn test_rollback_keeps_sequence_dense() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let config = NumberingConfig::default();
        let day = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

        let mut tx = store.pool().begin().await.unwrap();
        let first = next_in_tx(&mut tx, &config, day).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(first, "TRX-20260828-0001");

        // The aborted bump was rolled back, so the next commit reuses
        // sequence 1.
        let mut tx = store.pool().begin().await.unwrap();
        let second = next_in_tx(&mut tx, &config, day).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(second, "TRX-20260828-0001");
    }
}
