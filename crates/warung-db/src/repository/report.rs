//! # Reporting Engine
//!
//! Read-only financial aggregation over the two ledgers and the
//! catalog.
//!
//! ## Data Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      What Feeds Which Report                            │
//! │                                                                         │
//! │  sales_transactions ──► revenue, transaction count, monthly trend      │
//! │  sales_lines        ──► cost of goods (snapshot cost × qty),           │
//! │                         top / rarely-sold breakdowns                   │
//! │  replenishment_events ► stock expenditure                              │
//! │  products           ──► low stock / overstock health lists            │
//! │                                                                         │
//! │  net margin = revenue - cost of goods (expenditure shown separately,   │
//! │  NOT subtracted - it is cash out, not cost of goods sold)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation is a pure SELECT. `summarize` runs its aggregates
//! inside one read transaction so the numbers come from a single WAL
//! snapshot even while checkouts commit concurrently.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use warung_core::{FinancialSummary, MonthlyRevenue, ProductQuantity, ProductRevenue, ProductStock};

// =============================================================================
// Configuration
// =============================================================================

/// Reporting thresholds, passed explicitly (no global settings).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// A product with lifetime sales below this count is "rarely sold".
    pub rarely_sold_threshold: i64,
    /// Active products with stock below this are "low stock".
    pub low_stock_threshold: i64,
    /// Active products with stock above this are "overstocked".
    pub overstock_threshold: i64,
    /// Row limit for the top-N breakdowns.
    pub top_limit: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            rarely_sold_threshold: 5,
            low_stock_threshold: 10,
            overstock_threshold: 100,
            top_limit: 5,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
    config: ReportConfig,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool, config: ReportConfig) -> Self {
        ReportRepository { pool, config }
    }

    /// Aggregates the financial summary for a window (inclusive bounds).
    ///
    /// All four aggregates run inside one read transaction, so the
    /// summary is internally consistent: a checkout committing halfway
    /// through cannot appear in revenue but not in cost of goods.
    pub async fn summarize(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<FinancialSummary> {
        debug!(%start, %end, "Summarizing window");

        let mut tx = self.pool.begin().await?;

        let (revenue_minor, transaction_count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_minor), 0), COUNT(*)
             FROM sales_transactions
             WHERE created_at BETWEEN ?1 AND ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await?;

        let cost_of_goods_minor: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(l.cost_minor * l.quantity), 0)
             FROM sales_lines l
             JOIN sales_transactions t ON t.id = l.transaction_id
             WHERE t.created_at BETWEEN ?1 AND ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await?;

        let stock_expenditure_minor: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(expenditure_minor), 0)
             FROM replenishment_events
             WHERE created_at BETWEEN ?1 AND ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(FinancialSummary {
            revenue_minor,
            cost_of_goods_minor,
            net_margin_minor: revenue_minor - cost_of_goods_minor,
            stock_expenditure_minor,
            transaction_count,
        })
    }

    /// Top products by lifetime units sold.
    /// Ties break on product code for a stable order.
    pub async fn top_by_quantity(&self) -> StoreResult<Vec<ProductQuantity>> {
        let rows = sqlx::query_as::<_, ProductQuantity>(
            "SELECT product_code AS code,
                    MAX(product_name) AS name,
                    SUM(quantity) AS quantity_sold
             FROM sales_lines
             GROUP BY product_code
             ORDER BY quantity_sold DESC, code
             LIMIT ?1",
        )
        .bind(self.config.top_limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Top products by lifetime revenue.
    pub async fn top_by_revenue(&self) -> StoreResult<Vec<ProductRevenue>> {
        let rows = sqlx::query_as::<_, ProductRevenue>(
            "SELECT product_code AS code,
                    MAX(product_name) AS name,
                    SUM(subtotal_minor) AS revenue_minor
             FROM sales_lines
             GROUP BY product_code
             ORDER BY revenue_minor DESC, code
             LIMIT ?1",
        )
        .bind(self.config.top_limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active products whose lifetime sales fall below the threshold
    /// (including zero), slowest first.
    pub async fn rarely_sold(&self) -> StoreResult<Vec<ProductQuantity>> {
        let rows = sqlx::query_as::<_, ProductQuantity>(
            "SELECT p.code AS code,
                    p.name AS name,
                    COALESCE(SUM(l.quantity), 0) AS quantity_sold
             FROM products p
             LEFT JOIN sales_lines l ON l.product_code = p.code
             WHERE p.status = 'active'
             GROUP BY p.code
             HAVING quantity_sold < ?1
             ORDER BY quantity_sold, p.code",
        )
        .bind(self.config.rarely_sold_threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active products with no sales at all.
    pub async fn never_sold(&self) -> StoreResult<Vec<ProductStock>> {
        let rows = sqlx::query_as::<_, ProductStock>(
            "SELECT p.code AS code, p.name AS name, p.stock AS stock
             FROM products p
             WHERE p.status = 'active'
               AND NOT EXISTS (
                   SELECT 1 FROM sales_lines l WHERE l.product_code = p.code
               )
             ORDER BY p.code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active products running low on stock, emptiest shelf first.
    pub async fn low_stock(&self) -> StoreResult<Vec<ProductStock>> {
        let rows = sqlx::query_as::<_, ProductStock>(
            "SELECT code, name, stock
             FROM products
             WHERE status = 'active' AND stock < ?1
             ORDER BY stock, code",
        )
        .bind(self.config.low_stock_threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active products holding excess stock, fullest shelf first.
    pub async fn overstock(&self) -> StoreResult<Vec<ProductStock>> {
        let rows = sqlx::query_as::<_, ProductStock>(
            "SELECT code, name, stock
             FROM products
             WHERE status = 'active' AND stock > ?1
             ORDER BY stock DESC, code",
        )
        .bind(self.config.overstock_threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue per calendar month ("YYYY-MM"), oldest first.
    pub async fn monthly_trend(&self) -> StoreResult<Vec<MonthlyRevenue>> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            "SELECT strftime('%Y-%m', created_at) AS month,
                    COALESCE(SUM(total_minor), 0) AS revenue_minor
             FROM sales_transactions
             GROUP BY month
             ORDER BY month",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
// Window arithmetic over real checkouts is covered by
// tests/checkout_flow.rs; these exercise the health lists directly.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use crate::repository::catalog::NewProduct;

    async fn store_with_stock(levels: &[(&str, i64)]) -> Store {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        for (code, stock) in levels {
            store
                .catalog()
                .upsert(&NewProduct {
                    code: code.to_string(),
                    name: format!("Product {code}"),
                    price_minor: 1500,
                    cost_minor: 1000,
                    stock: *stock,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_empty_window_summary_is_zeros() {
        let store = store_with_stock(&[]).await;

        let start = Utc::now() - chrono::Duration::days(1);
        let end = Utc::now();
        let summary = store.reports().summarize(start, end).await.unwrap();

        assert_eq!(summary.revenue_minor, 0);
        assert_eq!(summary.cost_of_goods_minor, 0);
        assert_eq!(summary.net_margin_minor, 0);
        assert_eq!(summary.stock_expenditure_minor, 0);
        assert_eq!(summary.transaction_count, 0);
    }

    #[tokio::test]
    async fn test_low_stock_and_overstock_lists() {
        let store = store_with_stock(&[("A", 2), ("B", 9), ("C", 50), ("D", 150)]).await;
        let reports = store.reports();

        let low = reports.low_stock().await.unwrap();
        let low_codes: Vec<&str> = low.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(low_codes, ["A", "B"]);

        let over = reports.overstock().await.unwrap();
        let over_codes: Vec<&str> = over.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(over_codes, ["D"]);
    }

    #[tokio::test]
    async fn test_custom_thresholds() {
        let store = store_with_stock(&[("A", 2), ("B", 9)]).await;

        let reports = store.reports_with(ReportConfig {
            low_stock_threshold: 5,
            ..ReportConfig::default()
        });

        let low = reports.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].code, "A");
    }

    #[tokio::test]
    async fn test_never_sold_lists_unsold_products() {
        let store = store_with_stock(&[("A", 5), ("B", 5)]).await;

        let never = store.reports().never_sold().await.unwrap();
        assert_eq!(never.len(), 2);

        // Rarely-sold includes the zero-sales products too.
        let rare = store.reports().rarely_sold().await.unwrap();
        assert_eq!(rare.len(), 2);
        assert_eq!(rare[0].quantity_sold, 0);
    }

    #[tokio::test]
    async fn test_monthly_trend_empty_ledger() {
        let store = store_with_stock(&[]).await;
        let trend = store.reports().monthly_trend().await.unwrap();
        assert!(trend.is_empty());
    }
}
