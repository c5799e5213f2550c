//! # farmgate-db: Storage Layer and Commitment Engine for FarmGate
//!
//! This crate provides database access for the FarmGate marketplace.
//! It uses SQLite for storage with sqlx for async operations, and hosts the
//! commitment engine that turns carts into orders.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        FarmGate Data Flow                               │
//! │                                                                         │
//! │  Caller (checkout endpoint, CLI, test)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                    farmgate-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐   ┌──────────────────┐   ┌──────────────┐   │    │
//! │  │   │   Database    │   │   Repositories   │   │  Commitment  │   │    │
//! │  │   │   (pool.rs)   │   │  product, stock  │   │    Engine    │   │    │
//! │  │   │               │◄──│  order, loyalty  │◄──│ (checkout.rs)│   │    │
//! │  │   │ SqlitePool    │   │                  │   │ one tx per   │   │    │
//! │  │   │ + migrations  │   │                  │   │ checkout     │   │    │
//! │  │   └───────────────┘   └──────────────────┘   └──────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database (WAL)                       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories (product, stock, order, loyalty)
//! - [`checkout`] - The commitment engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farmgate_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/farmgate.db")).await?;
//!
//! let mut cart = farmgate_core::Cart::new();
//! cart.add(&product_id, 2)?;
//!
//! let result = db.checkout().place_order(&customer_id, &cart, 10).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutError, CommitmentEngine};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::loyalty::{LoyaltyRepository, RedeemOutcome};
pub use repository::order::OrderStore;
pub use repository::product::ProductRepository;
pub use repository::stock::{ReserveOutcome, StockLedger};
