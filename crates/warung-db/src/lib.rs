//! # warung-db: Database Layer for Warung POS
//!
//! This crate provides persistence for the Warung POS transactional
//! core. It uses SQLite for local storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Warung POS Data Flow                             │
//! │                                                                         │
//! │  Caller (checkout lane, back office, reports)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     warung-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │     Store     │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ catalog, sale │    │  (embedded)  │  │   │
//! │  │   │               │    │ replenishment │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ report        │    │ 0001_init    │  │   │
//! │  │   │ WAL + FK +    │    │ numbering     │    │ ...          │  │   │
//! │  │   │ busy_timeout  │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (warung.db)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Repositories (catalog, replenishment, sale, report)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warung_db::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("path/to/warung.db")).await?;
//!
//! let trx = store.sales().checkout(&request).await?;
//! let summary = store.reports().summarize(start, end).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::catalog::{CatalogRepository, NewProduct};
pub use repository::numbering::NumberingConfig;
pub use repository::replenishment::{
    BatchFailure, BatchOutcome, ReplenishmentRepository, ReplenishmentRequest,
};
pub use repository::report::{ReportConfig, ReportRepository};
pub use repository::sale::{CheckoutRequest, SaleRepository};
