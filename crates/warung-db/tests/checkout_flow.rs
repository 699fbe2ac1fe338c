//! End-to-end tests for the transactional core: checkout, the two
//! ledgers, numbering, and the reporting aggregates, all against an
//! in-memory store.

use chrono::{NaiveDate, Utc};
use warung_core::{Cart, CartLine, CoreError, PaymentMethod};
use warung_db::{
    CheckoutRequest, NewProduct, ReplenishmentRequest, Store, StoreConfig, StoreError,
};

async fn fresh_store() -> Store {
    Store::new(StoreConfig::in_memory()).await.unwrap()
}

async fn add_product(store: &Store, code: &str, price: i64, cost: i64, stock: i64) {
    store
        .catalog()
        .upsert(&NewProduct {
            code: code.to_string(),
            name: format!("Product {code}"),
            price_minor: price,
            cost_minor: cost,
            stock,
        })
        .await
        .unwrap();
}

fn business_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
}

fn cash_checkout(lines: Vec<CartLine>, paid: i64) -> CheckoutRequest {
    CheckoutRequest {
        cart: Cart::new(lines),
        payment_method: PaymentMethod::Cash,
        paid_minor: paid,
        cashier: "Budi".to_string(),
        business_date: business_date(),
    }
}

// =============================================================================
// The full round trip: replenish, sell, summarize
// =============================================================================

#[tokio::test]
async fn round_trip_replenish_sell_summarize() {
    let store = fresh_store().await;
    let window_start = Utc::now();

    add_product(&store, "SKU1", 1500, 1000, 0).await;

    // Replenish +10 at cost 1000: stock 10, expenditure 10000.
    let event = store
        .replenishments()
        .record("SKU1", 10, 1000, "Budi")
        .await
        .unwrap();
    assert_eq!(event.stock_after, 10);
    assert_eq!(event.expenditure_minor, 10_000);

    // Sell 3 at 1500 paid exactly 4500.
    let trx = store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 3)], 4500))
        .await
        .unwrap();

    assert_eq!(trx.total_minor, 4500);
    assert_eq!(trx.change_minor, 0);
    assert_eq!(trx.lines.len(), 1);
    assert_eq!(trx.lines[0].cost_minor, 1000);

    let product = store.catalog().get("SKU1").await.unwrap().unwrap();
    assert_eq!(product.stock, 7);

    // Summary over the window reflects both ledgers.
    let summary = store
        .reports()
        .summarize(window_start, Utc::now())
        .await
        .unwrap();

    assert_eq!(summary.revenue_minor, 4500);
    assert_eq!(summary.cost_of_goods_minor, 3000);
    assert_eq!(summary.net_margin_minor, 1500);
    assert_eq!(summary.stock_expenditure_minor, 10_000);
    assert_eq!(summary.transaction_count, 1);
}

// =============================================================================
// Checkout behavior
// =============================================================================

#[tokio::test]
async fn oversell_clamps_stock_but_bills_requested_quantity() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 3).await;

    // Sell 5 of a stock of 3: commits, bills all 5, floors stock at 0.
    let trx = store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 5)], 7500))
        .await
        .unwrap();

    assert_eq!(trx.total_minor, 7500);
    assert_eq!(trx.lines[0].quantity, 5);

    let product = store.catalog().get("SKU1").await.unwrap().unwrap();
    assert_eq!(product.stock, 0);
}

#[tokio::test]
async fn insufficient_payment_leaves_no_side_effects() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 10).await;

    let err = store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 3)], 4000))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Domain(CoreError::InsufficientPayment {
            total_minor: 4500,
            paid_minor: 4000,
        })
    ));

    // No ledger row, no stock movement.
    assert_eq!(store.sales().count().await.unwrap(), 0);
    let product = store.catalog().get("SKU1").await.unwrap().unwrap();
    assert_eq!(product.stock, 10);

    // The rejected attempt consumed no sequence number.
    let trx = store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 1)], 1500))
        .await
        .unwrap();
    assert_eq!(trx.trx_no, "TRX-20260828-0001");
}

#[tokio::test]
async fn absurd_quantity_is_rejected_before_any_mutation() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1000, 500, 10).await;

    // A quantity this large would overflow price * quantity if it ever
    // reached the subtotal math.
    let err = store
        .sales()
        .checkout(&cash_checkout(
            vec![CartLine::new("SKU1", 10_000_000_000_000_000)],
            1000,
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Domain(CoreError::InvalidQuantity {
            quantity: 10_000_000_000_000_000,
            ..
        })
    ));

    assert_eq!(store.sales().count().await.unwrap(), 0);
    let product = store.catalog().get("SKU1").await.unwrap().unwrap();
    assert_eq!(product.stock, 10);
}

#[tokio::test]
async fn trx_numbers_are_dense_and_date_scoped() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 100).await;

    for expected in 1..=3 {
        let trx = store
            .sales()
            .checkout(&cash_checkout(vec![CartLine::new("SKU1", 1)], 1500))
            .await
            .unwrap();
        assert_eq!(trx.trx_no, format!("TRX-20260828-{:04}", expected));
    }

    // A different business date restarts the sequence.
    let next_day = CheckoutRequest {
        business_date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        ..cash_checkout(vec![CartLine::new("SKU1", 1)], 1500)
    };
    let trx = store.sales().checkout(&next_day).await.unwrap();
    assert_eq!(trx.trx_no, "TRX-20260829-0001");
}

#[tokio::test]
async fn unresolved_code_degrades_to_zero_amounts() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 10).await;

    let trx = store
        .sales()
        .checkout(&cash_checkout(
            vec![CartLine::new("SKU1", 2), CartLine::new("GHOST", 4)],
            3000,
        ))
        .await
        .unwrap();

    // The ghost line is billable at zero and contributes nothing to
    // revenue or cost of goods.
    assert_eq!(trx.total_minor, 3000);
    assert_eq!(trx.lines.len(), 2);

    let ghost = &trx.lines[1];
    assert_eq!(ghost.product_code, "GHOST");
    assert_eq!(ghost.price_minor, 0);
    assert_eq!(ghost.cost_minor, 0);
    assert_eq!(ghost.subtotal_minor, 0);
}

#[tokio::test]
async fn change_is_paid_minus_total() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 10).await;
    add_product(&store, "SKU2", 2000, 1200, 10).await;

    let trx = store
        .sales()
        .checkout(&cash_checkout(
            vec![CartLine::new("SKU1", 3), CartLine::new("SKU2", 2)],
            10_000,
        ))
        .await
        .unwrap();

    assert_eq!(trx.total_minor, 8500);
    assert_eq!(trx.change_minor, 1500);

    // Lines keep the cart's order and their own subtotals.
    assert_eq!(trx.lines[0].subtotal_minor, 4500);
    assert_eq!(trx.lines[1].subtotal_minor, 4000);
}

#[tokio::test]
async fn sales_snapshot_survives_catalog_edits() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 10).await;

    let trx = store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 2)], 3000))
        .await
        .unwrap();

    // Reprice and rename after the sale; then delete the product.
    store
        .catalog()
        .update_details("SKU1", "New Name", 9999, 9000)
        .await
        .unwrap();
    store.catalog().delete("SKU1").await.unwrap();

    let fetched = store.sales().get(&trx.id).await.unwrap().unwrap();
    assert_eq!(fetched.lines[0].product_name, "Product SKU1");
    assert_eq!(fetched.lines[0].price_minor, 1500);
    assert_eq!(fetched.lines[0].cost_minor, 1000);
}

#[tokio::test]
async fn list_window_returns_transactions_with_lines() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 10).await;

    let start = Utc::now();
    store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 1)], 1500))
        .await
        .unwrap();
    store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 2)], 3000))
        .await
        .unwrap();

    let listed = store.sales().list_window(start, Utc::now()).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|t| !t.lines.is_empty()));

    // Outside the window: nothing.
    let empty = store
        .sales()
        .list_window(
            start - chrono::Duration::days(2),
            start - chrono::Duration::days(1),
        )
        .await
        .unwrap();
    assert!(empty.is_empty());
}

// =============================================================================
// Batch replenishment
// =============================================================================

#[tokio::test]
async fn batch_import_applies_good_rows_and_reports_bad_ones() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 0).await;
    add_product(&store, "SKU2", 2000, 1200, 0).await;

    let rows = vec![
        ReplenishmentRequest {
            code: "SKU1".to_string(),
            added: 10,
            cost_minor: 1000,
        },
        ReplenishmentRequest {
            code: "GHOST".to_string(),
            added: 4,
            cost_minor: 100,
        },
        ReplenishmentRequest {
            code: "SKU2".to_string(),
            added: 0, // invalid delta
            cost_minor: 1200,
        },
        ReplenishmentRequest {
            code: "SKU2".to_string(),
            added: 6,
            cost_minor: 1200,
        },
    ];

    let outcome = store
        .replenishments()
        .record_batch(&rows, "Budi")
        .await
        .unwrap();

    assert_eq!(outcome.applied.len(), 2);
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].row, 1);
    assert_eq!(outcome.failures[1].row, 2);

    let sku1 = store.catalog().get("SKU1").await.unwrap().unwrap();
    let sku2 = store.catalog().get("SKU2").await.unwrap().unwrap();
    assert_eq!(sku1.stock, 10);
    assert_eq!(sku2.stock, 6);
}

// =============================================================================
// Reporting over real sales
// =============================================================================

#[tokio::test]
async fn top_products_rank_by_quantity_and_revenue() {
    let store = fresh_store().await;
    add_product(&store, "CHEAP", 1000, 500, 100).await;
    add_product(&store, "DEAR", 10_000, 6000, 100).await;

    // CHEAP: 7 units, 7000 revenue. DEAR: 2 units, 20000 revenue.
    store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("CHEAP", 7)], 7000))
        .await
        .unwrap();
    store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("DEAR", 2)], 20_000))
        .await
        .unwrap();

    let by_qty = store.reports().top_by_quantity().await.unwrap();
    assert_eq!(by_qty[0].code, "CHEAP");
    assert_eq!(by_qty[0].quantity_sold, 7);

    let by_revenue = store.reports().top_by_revenue().await.unwrap();
    assert_eq!(by_revenue[0].code, "DEAR");
    assert_eq!(by_revenue[0].revenue_minor, 20_000);
}

#[tokio::test]
async fn monthly_trend_groups_revenue_by_month() {
    let store = fresh_store().await;
    add_product(&store, "SKU1", 1500, 1000, 10).await;

    store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SKU1", 2)], 3000))
        .await
        .unwrap();

    let trend = store.reports().monthly_trend().await.unwrap();
    assert_eq!(trend.len(), 1);
    assert_eq!(trend[0].month, Utc::now().format("%Y-%m").to_string());
    assert_eq!(trend[0].revenue_minor, 3000);
}

#[tokio::test]
async fn rarely_sold_excludes_active_sellers() {
    let store = fresh_store().await;
    add_product(&store, "FAST", 1000, 500, 50).await;
    add_product(&store, "SLOW", 1000, 500, 50).await;

    // FAST sells 6 units (at/over the threshold of 5), SLOW sells 1.
    store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("FAST", 6)], 6000))
        .await
        .unwrap();
    store
        .sales()
        .checkout(&cash_checkout(vec![CartLine::new("SLOW", 1)], 1000))
        .await
        .unwrap();

    let rare = store.reports().rarely_sold().await.unwrap();
    let codes: Vec<&str> = rare.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, ["SLOW"]);

    let never = store.reports().never_sold().await.unwrap();
    assert!(never.is_empty());
}
