//! # Catalog Repository
//!
//! Database operations for the product catalog.
//!
//! ## Stock Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who May Touch `products.stock`                       │
//! │                                                                         │
//! │  upsert (bulk import)        → sets stock absolutely                    │
//! │  increase_stock              → replenishment ledger only (+delta)       │
//! │  decrease_stock_clamped      → checkout only (-delta, floor at 0)       │
//! │                                                                         │
//! │  update_details              → name / price / cost ONLY, never stock    │
//! │                                                                         │
//! │  The interface enforces the policy: a catalog edit physically cannot    │
//! │  change a stock level. The database backs it with CHECK (stock >= 0).   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use warung_core::validation::{
    validate_code, validate_price_minor, validate_product_name, validate_uuid,
};
use warung_core::{Product, ProductStatus};

/// Input for creating or bulk-importing a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub price_minor: i64,
    pub cost_minor: i64,
    pub stock: i64,
}

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = store.catalog();
///
/// let product = catalog.get("SKU1").await?;
/// catalog.update_details("SKU1", "Indomie Goreng", 3500, 2800).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str =
    "id, code, name, price_minor, cost_minor, stock, status, created_at, updated_at";

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a product by its business code.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, code: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its UUID.
    ///
    /// A malformed id is a caller bug, not a miss, so it errors rather
    /// than returning `None`.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        validate_uuid(id).map_err(warung_core::CoreError::from)?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products ordered by code.
    pub async fn list_active(&self, limit: u32) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE status = 'active'
             ORDER BY code
             LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a product, or fully updates it if the code exists.
    ///
    /// ## Bulk Import Semantics
    /// This is the import path: stock is set ABSOLUTELY, because an
    /// import describes the shelf as counted. Interactive stock changes
    /// must go through the replenishment ledger or checkout instead.
    ///
    /// ## Returns
    /// The product as stored after the upsert.
    pub async fn upsert(&self, new: &NewProduct) -> StoreResult<Product> {
        validate_code(&new.code).map_err(warung_core::CoreError::from)?;
        validate_product_name(&new.name).map_err(warung_core::CoreError::from)?;
        validate_price_minor(new.price_minor).map_err(warung_core::CoreError::from)?;
        validate_price_minor(new.cost_minor).map_err(warung_core::CoreError::from)?;
        if new.stock < 0 {
            return Err(StoreError::Domain(
                warung_core::ValidationError::OutOfRange {
                    field: "stock".to_string(),
                    min: 0,
                    max: i64::MAX,
                }
                .into(),
            ));
        }

        debug!(code = %new.code, "Upserting product");

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (id, code, name, price_minor, cost_minor, stock, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(code) DO UPDATE SET
                 name = excluded.name,
                 price_minor = excluded.price_minor,
                 cost_minor = excluded.cost_minor,
                 stock = excluded.stock,
                 updated_at = excluded.updated_at
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&id)
        .bind(new.code.trim())
        .bind(new.name.trim())
        .bind(new.price_minor)
        .bind(new.cost_minor)
        .bind(new.stock)
        .bind(ProductStatus::Active)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates a product's display details and prices.
    ///
    /// Deliberately has no stock parameter: catalog edits cannot touch
    /// stock levels.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(StoreError::NotFound)` - Product doesn't exist
    pub async fn update_details(
        &self,
        code: &str,
        name: &str,
        price_minor: i64,
        cost_minor: i64,
    ) -> StoreResult<()> {
        validate_product_name(name).map_err(warung_core::CoreError::from)?;
        validate_price_minor(price_minor).map_err(warung_core::CoreError::from)?;
        validate_price_minor(cost_minor).map_err(warung_core::CoreError::from)?;

        debug!(code = %code, "Updating product details");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                 name = ?2,
                 price_minor = ?3,
                 cost_minor = ?4,
                 updated_at = ?5
             WHERE code = ?1",
        )
        .bind(code)
        .bind(name.trim())
        .bind(price_minor)
        .bind(cost_minor)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", code));
        }

        Ok(())
    }

    /// Marks a product inactive without deleting it.
    pub async fn deactivate(&self, code: &str) -> StoreResult<()> {
        debug!(code = %code, "Deactivating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET status = 'inactive', updated_at = ?2 WHERE code = ?1",
        )
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", code));
        }

        Ok(())
    }

    /// Increases a product's stock and updates its cost basis.
    ///
    /// ## Returns
    /// `(stock_before, stock_after)`.
    ///
    /// Most callers should use the replenishment ledger instead, which
    /// wraps this mutation together with its audit row in one
    /// transaction.
    pub async fn increase_stock(
        &self,
        code: &str,
        added: i64,
        cost_minor: i64,
    ) -> StoreResult<(i64, i64)> {
        let mut tx = self.pool.begin().await?;
        let result = increase_stock_conn(&mut tx, code, added, cost_minor).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Decreases a product's stock, clamped at zero.
    ///
    /// ## Returns
    /// The actual units removed (`min(qty, stock)`). Never errors on a
    /// shortfall: selling 5 of a stock of 3 removes 3 and floors at 0.
    pub async fn decrease_stock_clamped(&self, code: &str, qty: i64) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;
        let actual = decrease_stock_clamped_conn(&mut tx, code, qty).await?;
        tx.commit().await?;
        Ok(actual)
    }

    /// Physically deletes a product.
    ///
    /// Permitted because both ledgers snapshot product code and name:
    /// deleting a product never leaves dangling history.
    pub async fn delete(&self, code: &str) -> StoreResult<()> {
        debug!(code = %code, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", code));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-Level Stock Mutations
// =============================================================================
// The ledgers run these inside their own transactions so the stock
// change and its ledger row commit or roll back together.

/// Applies a stock increase on an open connection/transaction.
///
/// Returns `(stock_before, stock_after)`. The UPDATE is a single
/// read-modify-write statement; `before` is derived from RETURNING.
pub(crate) async fn increase_stock_conn(
    conn: &mut SqliteConnection,
    code: &str,
    added: i64,
    cost_minor: i64,
) -> StoreResult<(i64, i64)> {
    debug!(code = %code, added = %added, "Increasing stock");

    let now = Utc::now();

    let after: Option<i64> = sqlx::query_scalar(
        "UPDATE products SET
             stock = stock + ?2,
             cost_minor = ?3,
             updated_at = ?4
         WHERE code = ?1
         RETURNING stock",
    )
    .bind(code)
    .bind(added)
    .bind(cost_minor)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    match after {
        Some(after) => Ok((after - added, after)),
        None => Err(StoreError::not_found("Product", code)),
    }
}

/// Applies a clamped stock decrease on an open connection/transaction.
///
/// Returns the actual units removed. The caller's transaction holds the
/// write lock, so the before-read and the UPDATE cannot interleave with
/// another writer.
pub(crate) async fn decrease_stock_clamped_conn(
    conn: &mut SqliteConnection,
    code: &str,
    qty: i64,
) -> StoreResult<i64> {
    debug!(code = %code, qty = %qty, "Decreasing stock (clamped)");

    let now = Utc::now();

    let before: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE code = ?1")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

    let before = match before {
        Some(stock) => stock,
        None => return Err(StoreError::not_found("Product", code)),
    };

    sqlx::query(
        "UPDATE products SET stock = MAX(stock - ?2, 0), updated_at = ?3 WHERE code = ?1",
    )
    .bind(code)
    .bind(qty)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(qty.min(before))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};

    async fn test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    fn sku(code: &str, price: i64, cost: i64, stock: i64) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            name: format!("Product {code}"),
            price_minor: price,
            cost_minor: cost,
            stock,
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = test_store().await;
        let catalog = store.catalog();

        let created = catalog.upsert(&sku("SKU1", 1500, 1000, 3)).await.unwrap();
        assert_eq!(created.stock, 3);

        // Second upsert with the same code replaces details and stock,
        // but keeps the identity.
        let updated = catalog.upsert(&sku("SKU1", 1600, 1100, 8)).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price_minor, 1600);
        assert_eq!(updated.stock, 8);

        assert_eq!(catalog.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_details_never_touches_stock() {
        let store = test_store().await;
        let catalog = store.catalog();

        catalog.upsert(&sku("SKU1", 1500, 1000, 7)).await.unwrap();
        catalog
            .update_details("SKU1", "Renamed", 1800, 1200)
            .await
            .unwrap();

        let product = catalog.get("SKU1").await.unwrap().unwrap();
        assert_eq!(product.name, "Renamed");
        assert_eq!(product.price_minor, 1800);
        assert_eq!(product.stock, 7);
    }

    #[tokio::test]
    async fn test_update_details_missing_product() {
        let store = test_store().await;
        let err = store
            .catalog()
            .update_details("GHOST", "Name", 100, 50)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_increase_stock_reports_before_and_after() {
        let store = test_store().await;
        let catalog = store.catalog();

        catalog.upsert(&sku("SKU1", 1500, 1000, 2)).await.unwrap();
        let (before, after) = catalog.increase_stock("SKU1", 10, 900).await.unwrap();
        assert_eq!((before, after), (2, 12));

        let product = catalog.get("SKU1").await.unwrap().unwrap();
        assert_eq!(product.stock, 12);
        assert_eq!(product.cost_minor, 900);
    }

    #[tokio::test]
    async fn test_decrease_stock_clamps_at_zero() {
        let store = test_store().await;
        let catalog = store.catalog();

        catalog.upsert(&sku("SKU1", 1500, 1000, 3)).await.unwrap();

        let actual = catalog.decrease_stock_clamped("SKU1", 5).await.unwrap();
        assert_eq!(actual, 3);

        let product = catalog.get("SKU1").await.unwrap().unwrap();
        assert_eq!(product.stock, 0);
    }

    #[tokio::test]
    async fn test_get_by_id_validates_uuid_format() {
        let store = test_store().await;
        let catalog = store.catalog();

        let created = catalog.upsert(&sku("SKU1", 1500, 1000, 0)).await.unwrap();
        let fetched = catalog.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.code, "SKU1");

        let err = catalog.get_by_id("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_returns_none() {
        let store = test_store().await;
        let catalog = store.catalog();

        catalog.upsert(&sku("SKU1", 1500, 1000, 0)).await.unwrap();
        catalog.delete("SKU1").await.unwrap();

        assert!(catalog.get("SKU1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_input() {
        let store = test_store().await;
        let catalog = store.catalog();

        let err = catalog.upsert(&sku("", 1500, 1000, 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));

        let err = catalog.upsert(&sku("SKU1", -1, 1000, 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
    }
}
