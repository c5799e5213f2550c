//! # Stock Ledger
//!
//! Authoritative count of units available per product, the contended shared
//! resource of the whole marketplace.
//!
//! ## Concurrency Control
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                  Why a Conditional Update                          │
//! │                                                                    │
//! │  ❌ WRONG: read-then-write (race window between the two)           │
//! │     SELECT quantity_available ...   ← both checkouts read 5        │
//! │     UPDATE ... SET quantity = 5-3   ← both "succeed", stock -1     │
//! │                                                                    │
//! │  ✅ CORRECT: single conditional update                             │
//! │     UPDATE products                                                │
//! │     SET quantity_available = quantity_available - ?                │
//! │     WHERE id = ? AND quantity_available >= ?                       │
//! │                                                                    │
//! │  Two concurrent decrements of the same row can never both pass     │
//! │  the WHERE clause if their combined quantity exceeds availability. │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `peek` is advisory only: it exists for cart rendering and pre-flight
//! messages, and the number it returns may be stale the moment it is read.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The decrement was applied.
    Reserved,
    /// The condition failed; `available` is the quantity observed afterwards,
    /// a hint for user-facing messaging only.
    Short { available: i64 },
}

/// The stock ledger. Rows are mutated only through the atomic operations
/// here, never read-modify-written elsewhere.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Advisory, non-transactional read of a product's available quantity.
    ///
    /// Returns `None` for unknown or deactivated products. The returned
    /// quantity is a display hint; the authoritative check is
    /// [`reserve_and_decrement`](Self::reserve_and_decrement).
    pub async fn peek(&self, product_id: &str) -> DbResult<Option<i64>> {
        let available: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT quantity_available
            FROM products
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(available)
    }

    /// Atomically decrements a product's stock if enough units remain.
    ///
    /// Takes a `&mut SqliteConnection` so the decrement joins the caller's
    /// transaction; a later rollback undoes it. Two concurrent calls against
    /// the same product can never both succeed past availability.
    pub async fn reserve_and_decrement(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<ReserveOutcome> {
        debug!(product_id = %product_id, quantity = %quantity, "Reserving stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity_available = quantity_available - ?2,
                updated_at = ?3
            WHERE id = ?1
              AND is_active = 1
              AND quantity_available >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(ReserveOutcome::Reserved);
        }

        // Lost the condition: report the quantity observed now as a hint.
        let available: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT quantity_available
            FROM products
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        match available {
            Some(available) => Ok(ReserveOutcome::Short { available }),
            None => Err(DbError::not_found("Product", product_id)),
        }
    }

    /// Atomically adds units back to a product (farmer replenishment).
    pub async fn restock(&self, product_id: &str, delta: i64) -> DbResult<()> {
        debug!(product_id = %product_id, delta = %delta, "Restocking");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity_available = quantity_available + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
