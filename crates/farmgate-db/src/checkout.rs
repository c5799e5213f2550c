//! # Commitment Engine
//!
//! Turns a cart into a durably committed order, or tells the caller exactly
//! why it could not.
//!
//! ## Checkout State Machine
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │   validate ──► pre-flight ──► quote ──► transaction ──► committed  │
//! │      │             │                         │                     │
//! │      ▼             ▼                         ▼                     │
//! │  Err(Validation)  Rejected              RolledBack                 │
//! │                   (nothing mutated)     (everything undone)        │
//! │                                                                    │
//! │  Rejected and RolledBack are business outcomes (CommitResult);     │
//! │  the error channel is reserved for bad input and storage faults.   │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Every mutation of a checkout (stock decrements, the order row, its lines,
//! the loyalty deduction) happens inside one transaction. The pre-flight
//! check is advisory; the conditional decrement inside the transaction is the
//! authoritative gate, so a pre-flight pass followed by a concurrent sale
//! still rolls back cleanly instead of overselling.
//!
//! Decrements run in ascending product-id order (the order `Cart::snapshot`
//! yields), so two overlapping checkouts never acquire row locks in opposite
//! orders.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::repository::loyalty::{LoyaltyRepository, RedeemOutcome};
use crate::repository::order::{generate_line_id, generate_order_id, OrderStore};
use crate::repository::product::ProductRepository;
use crate::repository::stock::{ReserveOutcome, StockLedger};
use farmgate_core::{
    price_cart, validate_cart, validate_redemption, Cart, CartQuote, CommitResult, Order,
    OrderLine, OrderStatus, QuoteLine, StockShortage, ValidationError,
};

// =============================================================================
// Errors
// =============================================================================

/// Errors from the checkout path.
///
/// Expected business outcomes (shortages, lost races) are NOT here; they are
/// [`CommitResult`] variants.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request itself was malformed (empty cart, negative redemption).
    #[error("invalid checkout request: {0}")]
    Validation(#[from] ValidationError),

    /// A cart entry references a product that does not exist or is no longer
    /// listed.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The storage layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

// =============================================================================
// Engine
// =============================================================================

/// The commitment engine: the only writer of orders and the only caller of
/// the stock ledger's decrement path.
#[derive(Debug, Clone)]
pub struct CommitmentEngine {
    pool: SqlitePool,
}

impl CommitmentEngine {
    /// Creates a new CommitmentEngine.
    pub fn new(pool: SqlitePool) -> Self {
        CommitmentEngine { pool }
    }

    /// Attempts to commit the cart as an order.
    ///
    /// ## Outcomes
    /// - `Ok(Success { .. })`: stock decremented, order and lines written,
    ///   points deducted, all in one transaction.
    /// - `Ok(Rejected { shortages })`: pre-flight found unfulfillable
    ///   entries; every one is reported so the customer can fix the whole
    ///   cart in one pass. Nothing was mutated.
    /// - `Ok(RolledBack { .. })`: a conditional update lost a race after
    ///   pre-flight passed; the transaction was rolled back in full.
    ///
    /// The caller's cart is untouched; clearing it on success is the
    /// caller's decision.
    pub async fn place_order(
        &self,
        customer_id: &str,
        cart: &Cart,
        requested_redemption: i64,
    ) -> Result<CommitResult, CheckoutError> {
        validate_cart(cart)?;
        validate_redemption(requested_redemption)?;

        let shortages = self.preflight(cart).await?;
        if !shortages.is_empty() {
            debug!(
                customer_id = %customer_id,
                shortages = shortages.len(),
                "Checkout rejected at pre-flight"
            );
            return Ok(CommitResult::Rejected { shortages });
        }

        let quote = self.quote(customer_id, cart, requested_redemption).await?;
        self.commit_quote(customer_id, &quote).await
    }

    /// Advisory stock check across the whole cart.
    ///
    /// Collects ALL shortages rather than stopping at the first, so the
    /// customer sees every problem at once. An empty result means the cart
    /// looked fulfillable at read time; the transaction still re-checks.
    pub async fn preflight(&self, cart: &Cart) -> Result<Vec<StockShortage>, CheckoutError> {
        let stock = StockLedger::new(self.pool.clone());
        let mut shortages = Vec::new();

        for entry in cart.snapshot() {
            let available = stock
                .peek(&entry.product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(entry.product_id.clone()))?;

            if let Some(shortage) =
                StockShortage::classify(&entry.product_id, available, entry.quantity)
            {
                shortages.push(shortage);
            }
        }

        Ok(shortages)
    }

    /// Prices the cart against the current catalog and loyalty balance.
    ///
    /// Names and unit prices are frozen here; the commit reuses this snapshot
    /// even if the catalog changes in between.
    pub async fn quote(
        &self,
        customer_id: &str,
        cart: &Cart,
        requested_redemption: i64,
    ) -> Result<CartQuote, CheckoutError> {
        let products = ProductRepository::new(self.pool.clone());
        let mut lines = Vec::with_capacity(cart.item_count());

        for entry in cart.snapshot() {
            let product = products
                .get_by_id(&entry.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CheckoutError::ProductNotFound(entry.product_id.clone()))?;

            lines.push(QuoteLine {
                product_id: product.id,
                name: product.name,
                unit_price: farmgate_core::Money::from_paise(product.price_paise),
                quantity: entry.quantity,
            });
        }

        let balance = LoyaltyRepository::new(self.pool.clone())
            .balance(customer_id)
            .await?;

        Ok(price_cart(lines, balance, requested_redemption))
    }

    /// Commits a priced quote in one transaction.
    ///
    /// Quote lines arrive in ascending product-id order; decrements follow
    /// that order.
    async fn commit_quote(
        &self,
        customer_id: &str,
        quote: &CartQuote,
    ) -> Result<CommitResult, CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        for line in &quote.lines {
            match StockLedger::reserve_and_decrement(&mut tx, &line.product_id, line.quantity)
                .await
            {
                Ok(ReserveOutcome::Reserved) => {}
                Ok(ReserveOutcome::Short { available }) => {
                    tx.rollback().await.map_err(DbError::from)?;
                    warn!(
                        customer_id = %customer_id,
                        product_id = %line.product_id,
                        available,
                        requested = line.quantity,
                        "Checkout lost stock race; rolled back"
                    );
                    return Ok(CommitResult::RolledBack {
                        product_id: Some(line.product_id.clone()),
                        reason: format!(
                            "only {available} of {} requested units still available",
                            line.quantity
                        ),
                    });
                }
                Err(DbError::NotFound { .. }) => {
                    tx.rollback().await.map_err(DbError::from)?;
                    return Err(CheckoutError::ProductNotFound(line.product_id.clone()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let now = Utc::now();
        let order = Order {
            id: generate_order_id(),
            customer_id: customer_id.to_string(),
            status: OrderStatus::Placed,
            subtotal_paise: quote.subtotal.paise(),
            discount_paise: quote.discount.paise(),
            total_paise: quote.total_due.paise(),
            created_at: now,
        };
        OrderStore::insert_order(&mut tx, &order).await?;

        for line in &quote.lines {
            let order_line = OrderLine {
                id: generate_line_id(),
                order_id: order.id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                unit_price_paise: line.unit_price.paise(),
                quantity: line.quantity,
                line_total_paise: line.line_total().paise(),
                created_at: now,
            };
            OrderStore::insert_line(&mut tx, &order_line).await?;
        }

        if quote.redeemed_points > 0 {
            match LoyaltyRepository::redeem(&mut tx, customer_id, quote.redeemed_points).await? {
                RedeemOutcome::Redeemed => {}
                RedeemOutcome::InsufficientPoints { balance } => {
                    tx.rollback().await.map_err(DbError::from)?;
                    warn!(
                        customer_id = %customer_id,
                        balance,
                        requested = quote.redeemed_points,
                        "Checkout lost loyalty race; rolled back"
                    );
                    return Ok(CommitResult::RolledBack {
                        product_id: None,
                        reason: format!(
                            "loyalty balance changed: {balance} points remain, {} needed",
                            quote.redeemed_points
                        ),
                    });
                }
            }
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            customer_id = %customer_id,
            order_id = %order.id,
            lines = quote.lines.len(),
            subtotal_paise = order.subtotal_paise,
            discount_paise = order.discount_paise,
            total_paise = order.total_paise,
            "Order committed"
        );

        Ok(CommitResult::Success {
            order_id: order.id,
            discount_applied: quote.discount,
            total_due: quote.total_due,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::test_support::seeded_product;
    use farmgate_core::{Money, ShortageKind};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn cart_of(entries: &[(&str, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (id, qty) in entries {
            cart.add(id, *qty).unwrap();
        }
        cart
    }

    #[tokio::test]
    async fn test_successful_checkout_commits_everything() {
        let db = test_db().await;
        let apples = seeded_product(&db, 2000, 5).await; // ₹20 each
        let milk = seeded_product(&db, 1000, 3).await; // ₹10 each
        db.loyalty().credit("customer-1", 40).await.unwrap();

        let cart = cart_of(&[(&apples.id, 2), (&milk.id, 1)]);
        let result = db
            .checkout()
            .place_order("customer-1", &cart, 10)
            .await
            .unwrap();

        let order_id = match result {
            CommitResult::Success {
                order_id,
                discount_applied,
                total_due,
            } => {
                // subtotal ₹50, 10 points redeemed → ₹40 due
                assert_eq!(discount_applied, Money::from_rupees(10));
                assert_eq!(total_due, Money::from_rupees(40));
                order_id
            }
            other => panic!("expected success, got {other:?}"),
        };

        // Stock decremented.
        assert_eq!(db.stock().peek(&apples.id).await.unwrap(), Some(3));
        assert_eq!(db.stock().peek(&milk.id).await.unwrap(), Some(2));

        // Order durably recorded with snapshot lines.
        let order = db
            .orders()
            .get_order(&order_id, "customer-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.subtotal_paise, 5000);
        assert_eq!(order.discount_paise, 1000);
        assert_eq!(order.total_paise, 4000);

        let lines = db.orders().get_lines(&order_id).await.unwrap();
        assert_eq!(lines.len(), 2);

        // Points spent.
        assert_eq!(db.loyalty().balance("customer-1").await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_checkout_drains_small_loyalty_balance() {
        let db = test_db().await;
        let mangoes = seeded_product(&db, 1000, 5).await; // ₹10 each
        let honey = seeded_product(&db, 3000, 1).await; // ₹30, last unit
        db.loyalty().credit("customer-1", 5).await.unwrap();

        let cart = cart_of(&[(&mangoes.id, 2), (&honey.id, 1)]);
        let result = db
            .checkout()
            .place_order("customer-1", &cart, 5)
            .await
            .unwrap();

        match result {
            CommitResult::Success { total_due, .. } => {
                // ₹50 subtotal, all 5 points redeemed.
                assert_eq!(total_due, Money::from_rupees(45));
            }
            other => panic!("expected success, got {other:?}"),
        }

        assert_eq!(db.stock().peek(&mangoes.id).await.unwrap(), Some(3));
        assert_eq!(db.stock().peek(&honey.id).await.unwrap(), Some(0));
        assert_eq!(db.loyalty().balance("customer-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejection_reports_all_shortages_and_mutates_nothing() {
        let db = test_db().await;
        let plenty = seeded_product(&db, 1000, 10).await;
        let empty = seeded_product(&db, 1000, 0).await;
        let scarce = seeded_product(&db, 1000, 2).await;

        let cart = cart_of(&[(&plenty.id, 1), (&empty.id, 1), (&scarce.id, 5)]);
        let result = db
            .checkout()
            .place_order("customer-1", &cart, 0)
            .await
            .unwrap();

        match result {
            CommitResult::Rejected { shortages } => {
                assert_eq!(shortages.len(), 2);
                let for_product = |id: &str| {
                    shortages
                        .iter()
                        .find(|s| s.product_id == id)
                        .unwrap_or_else(|| panic!("no shortage for {id}"))
                };
                assert_eq!(for_product(&empty.id).kind, ShortageKind::OutOfStock);
                assert_eq!(for_product(&scarce.id).kind, ShortageKind::Insufficient);
                assert_eq!(for_product(&scarce.id).available, 2);
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        // Nothing mutated, including the fulfillable entry.
        assert_eq!(db.stock().peek(&plenty.id).await.unwrap(), Some(10));
        assert!(db
            .orders()
            .list_for_customer("customer-1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_rejection_is_repeatable() {
        let db = test_db().await;
        let empty = seeded_product(&db, 1000, 0).await;
        let cart = cart_of(&[(&empty.id, 1)]);

        for _ in 0..3 {
            let result = db
                .checkout()
                .place_order("customer-1", &cart, 0)
                .await
                .unwrap();
            assert!(matches!(result, CommitResult::Rejected { .. }));
        }
        assert_eq!(db.stock().peek(&empty.id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_empty_cart_is_validation_error() {
        let db = test_db().await;
        let err = db
            .checkout()
            .place_order("customer-1", &Cart::new(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[tokio::test]
    async fn test_negative_redemption_is_validation_error() {
        let db = test_db().await;
        let product = seeded_product(&db, 1000, 5).await;
        let cart = cart_of(&[(&product.id, 1)]);

        let err = db
            .checkout()
            .place_order("customer-1", &cart, -5)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_product_is_error_not_rejection() {
        let db = test_db().await;
        let cart = cart_of(&[("does-not-exist", 1)]);

        let err = db
            .checkout()
            .place_order("customer-1", &cart, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ProductNotFound(id) if id == "does-not-exist"));
    }

    #[tokio::test]
    async fn test_deactivated_product_is_not_found() {
        let db = test_db().await;
        let product = seeded_product(&db, 1000, 5).await;
        db.products().soft_delete(&product.id).await.unwrap();

        let cart = cart_of(&[(&product.id, 1)]);
        let err = db
            .checkout()
            .place_order("customer-1", &cart, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_discount_bounded_by_cart_total() {
        let db = test_db().await;
        let product = seeded_product(&db, 2500, 5).await; // ₹25
        db.loyalty().credit("customer-1", 40).await.unwrap();

        let cart = cart_of(&[(&product.id, 1)]);
        let result = db
            .checkout()
            .place_order("customer-1", &cart, 100)
            .await
            .unwrap();

        match result {
            CommitResult::Success {
                discount_applied,
                total_due,
                ..
            } => {
                assert_eq!(discount_applied, Money::from_rupees(25));
                assert_eq!(total_due, Money::zero());
            }
            other => panic!("expected success, got {other:?}"),
        }
        // Only the 25 points actually used were deducted.
        assert_eq!(db.loyalty().balance("customer-1").await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_zero_redemption_leaves_balance_alone() {
        let db = test_db().await;
        let product = seeded_product(&db, 1000, 5).await;
        db.loyalty().credit("customer-1", 40).await.unwrap();

        let cart = cart_of(&[(&product.id, 1)]);
        let result = db
            .checkout()
            .place_order("customer-1", &cart, 0)
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(db.loyalty().balance("customer-1").await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_order_lines_keep_quoted_price() {
        let db = test_db().await;
        let mut product = seeded_product(&db, 1000, 5).await;
        let cart = cart_of(&[(&product.id, 2)]);

        let result = db
            .checkout()
            .place_order("customer-1", &cart, 0)
            .await
            .unwrap();
        let order_id = match result {
            CommitResult::Success { order_id, .. } => order_id,
            other => panic!("expected success, got {other:?}"),
        };

        // Catalog price changes after the fact; the committed line does not.
        product.price_paise = 9999;
        db.products().update(&product).await.unwrap();

        let lines = db.orders().get_lines(&order_id).await.unwrap();
        assert_eq!(lines[0].unit_price_paise, 1000);
        assert_eq!(lines[0].line_total_paise, 2000);
    }

    #[tokio::test]
    async fn test_stock_race_rolls_back_whole_checkout() {
        let db = test_db().await;
        let apples = seeded_product(&db, 1000, 10).await;
        let milk = seeded_product(&db, 1000, 10).await;

        // Build a quote that passed pre-flight, then lose the milk stock
        // before commit: exactly the window a concurrent sale exploits.
        let engine = db.checkout();
        let cart = cart_of(&[(&apples.id, 3), (&milk.id, 5)]);
        let quote = engine.quote("customer-1", &cart, 0).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        StockLedger::reserve_and_decrement(&mut conn, &milk.id, 8)
            .await
            .unwrap();
        drop(conn);

        let result = engine.commit_quote("customer-1", &quote).await.unwrap();
        match result {
            CommitResult::RolledBack { product_id, .. } => {
                assert_eq!(product_id.as_deref(), Some(milk.id.as_str()));
            }
            other => panic!("expected rollback, got {other:?}"),
        }

        // The apples decrement was undone and no order exists.
        assert_eq!(db.stock().peek(&apples.id).await.unwrap(), Some(10));
        assert_eq!(db.stock().peek(&milk.id).await.unwrap(), Some(2));
        assert!(db
            .orders()
            .list_for_customer("customer-1")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_loyalty_race_rolls_back_whole_checkout() {
        let db = test_db().await;
        let product = seeded_product(&db, 5000, 10).await;
        db.loyalty().credit("customer-1", 30).await.unwrap();

        let engine = db.checkout();
        let cart = cart_of(&[(&product.id, 1)]);
        let quote = engine.quote("customer-1", &cart, 30).await.unwrap();
        assert_eq!(quote.redeemed_points, 30);

        // A parallel checkout spends the balance first.
        let mut conn = db.pool().acquire().await.unwrap();
        LoyaltyRepository::redeem(&mut conn, "customer-1", 25)
            .await
            .unwrap();
        drop(conn);

        let result = engine.commit_quote("customer-1", &quote).await.unwrap();
        match result {
            CommitResult::RolledBack { product_id, .. } => assert!(product_id.is_none()),
            other => panic!("expected rollback, got {other:?}"),
        }

        // Stock restored, balance untouched by the failed attempt.
        assert_eq!(db.stock().peek(&product.id).await.unwrap(), Some(10));
        assert_eq!(db.loyalty().balance("customer-1").await.unwrap(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_never_oversell() {
        let db = test_db().await;
        let product = seeded_product(&db, 1000, 5).await;

        // Four buyers racing for 5 units, 2 each: exactly two can win.
        let mut handles = Vec::new();
        for i in 0..4 {
            let db = db.clone();
            let product_id = product.id.clone();
            handles.push(tokio::spawn(async move {
                let mut cart = Cart::new();
                cart.add(&product_id, 2).unwrap();
                db.checkout()
                    .place_order(&format!("customer-{i}"), &cart, 0)
                    .await
                    .unwrap()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_success() {
                successes += 1;
            }
        }

        assert_eq!(successes, 2);
        assert_eq!(db.stock().peek(&product.id).await.unwrap(), Some(1));
        assert_eq!(db.orders().committed_quantity(&product.id).await.unwrap(), 4);
    }
}
