//! # Loyalty Accounts
//!
//! Per-customer loyalty point balances. One point is worth one rupee at
//! redemption time; points are earned and spent in whole units.
//!
//! Redemption follows the same discipline as the stock ledger: a single
//! conditional update, run inside the checkout transaction, so a balance can
//! never go negative even under concurrent checkouts by the same customer.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Outcome of a conditional point redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The points were deducted.
    Redeemed,
    /// The balance was below the requested amount at execution time;
    /// `balance` is the amount observed afterwards.
    InsufficientPoints { balance: i64 },
}

/// Repository for loyalty account balances.
#[derive(Debug, Clone)]
pub struct LoyaltyRepository {
    pool: SqlitePool,
}

impl LoyaltyRepository {
    /// Creates a new LoyaltyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoyaltyRepository { pool }
    }

    /// Returns a customer's point balance. Customers without an account row
    /// simply have a balance of zero.
    pub async fn balance(&self, customer_id: &str) -> DbResult<i64> {
        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT points FROM loyalty_accounts WHERE customer_id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance.unwrap_or(0))
    }

    /// Credits points to a customer, creating the account row if needed.
    pub async fn credit(&self, customer_id: &str, points: i64) -> DbResult<()> {
        if points <= 0 {
            return Err(DbError::ConstraintViolation(
                "credit amount must be positive".to_string(),
            ));
        }

        debug!(customer_id = %customer_id, points = %points, "Crediting loyalty points");

        sqlx::query(
            r#"
            INSERT INTO loyalty_accounts (customer_id, points, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(customer_id)
            DO UPDATE SET points = points + excluded.points,
                          updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(customer_id)
        .bind(points)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically deducts points inside the caller's transaction.
    ///
    /// The deduction only applies when the balance still covers `points`; a
    /// concurrent checkout that spent the balance first makes this return
    /// [`RedeemOutcome::InsufficientPoints`] instead of going negative.
    pub async fn redeem(
        conn: &mut SqliteConnection,
        customer_id: &str,
        points: i64,
    ) -> DbResult<RedeemOutcome> {
        debug!(customer_id = %customer_id, points = %points, "Redeeming loyalty points");

        let result = sqlx::query(
            r#"
            UPDATE loyalty_accounts
            SET points = points - ?2,
                updated_at = CURRENT_TIMESTAMP
            WHERE customer_id = ?1
              AND points >= ?2
            "#,
        )
        .bind(customer_id)
        .bind(points)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(RedeemOutcome::Redeemed);
        }

        let balance: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT points FROM loyalty_accounts WHERE customer_id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(RedeemOutcome::InsufficientPoints {
            balance: balance.unwrap_or(0),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
