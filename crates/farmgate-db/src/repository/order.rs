//! # Order Store
//!
//! Durable record of committed orders and their lines.
//!
//! ## Write Path
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  Orders are written ONLY by the commitment engine, and only        │
//! │  inside its checkout transaction:                                  │
//! │                                                                    │
//! │    insert_order(&mut tx, order)                                    │
//! │    insert_line(&mut tx, line)   × per cart entry                   │
//! │                                                                    │
//! │  There is no update/delete here; status transitions beyond         │
//! │  placement belong to downstream fulfillment.                       │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use farmgate_core::{Order, OrderLine};

const ORDER_COLUMNS: &str = r#"
    id,
    customer_id,
    status,
    subtotal_paise,
    discount_paise,
    total_paise,
    created_at
"#;

const LINE_COLUMNS: &str = r#"
    id,
    order_id,
    product_id,
    name_snapshot,
    unit_price_paise,
    quantity,
    line_total_paise,
    created_at
"#;

/// Repository for order reads and transaction-scoped writes.
#[derive(Debug, Clone)]
pub struct OrderStore {
    pool: SqlitePool,
}

impl OrderStore {
    /// Creates a new OrderStore.
    pub fn new(pool: SqlitePool) -> Self {
        OrderStore { pool }
    }

    /// Inserts an order inside the caller's transaction.
    pub async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, customer_id = %order.customer_id, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, status,
                subtotal_paise, discount_paise, total_paise,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.status)
        .bind(order.subtotal_paise)
        .bind(order.discount_paise)
        .bind(order.total_paise)
        .bind(order.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts an order line inside the caller's transaction.
    ///
    /// The line carries the name and unit price frozen at quote time.
    pub async fn insert_line(conn: &mut SqliteConnection, line: &OrderLine) -> DbResult<()> {
        debug!(order_id = %line.order_id, product_id = %line.product_id, "Inserting order line");

        sqlx::query(
            r#"
            INSERT INTO order_lines (
                id, order_id, product_id,
                name_snapshot, unit_price_paise,
                quantity, line_total_paise, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(&line.product_id)
        .bind(&line.name_snapshot)
        .bind(line.unit_price_paise)
        .bind(line.quantity)
        .bind(line.line_total_paise)
        .bind(line.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Gets an order, scoped to its owning customer.
    ///
    /// A customer can never read another customer's order: a wrong
    /// `customer_id` behaves exactly like a missing order.
    pub async fn get_order(&self, order_id: &str, customer_id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1 AND customer_id = ?2"
        ))
        .bind(order_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all lines for an order, in insertion (ascending product id) order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY product_id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Sum of committed quantities for a product across all orders.
    ///
    /// Used by tests and reporting to check the oversell invariant.
    pub async fn committed_quantity(&self, product_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(quantity) FROM order_lines WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}

/// Generates a new order id.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new order line id.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
