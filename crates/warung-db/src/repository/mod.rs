//! # Repository Module
//!
//! Database repository implementations for Warung POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  store.sales().checkout(request)                               │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── checkout(&self, request)      ← owns the transaction boundary     │
//! │  ├── get(&self, id)                                                    │
//! │  ├── get_by_trx_no(&self, trx_no)                                      │
//! │  └── list_window(&self, start, end)                                    │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Transaction boundaries live with the operation that needs them      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Product catalog CRUD and stock mutations
//! - [`replenishment::ReplenishmentRepository`] - Append-only stock-in ledger
//! - [`sale::SaleRepository`] - Checkout and the sales ledger
//! - [`report::ReportRepository`] - Read-only financial aggregation
//! - [`numbering`] - Per-date transaction number counter

pub mod catalog;
pub mod numbering;
pub mod replenishment;
pub mod report;
pub mod sale;
