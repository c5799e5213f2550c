//! # Domain Types
//!
//! Core domain types used throughout FarmGate.
//!
//! ## Type Hierarchy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                               │
//! │                                                                    │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐     │
//! │  │    Product     │   │     Order      │   │   OrderLine    │     │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │     │
//! │  │  id (UUID)     │   │  id (UUID)     │   │  order_id (FK) │     │
//! │  │  farmer_id     │   │  customer_id   │   │  product_id    │     │
//! │  │  price_paise   │   │  status        │   │  unit price    │     │
//! │  │  qty available │   │  total_paise   │   │  (snapshot)    │     │
//! │  └────────────────┘   └────────────────┘   └────────────────┘     │
//! │                                                                    │
//! │  CommitResult / StockShortage: structured checkout outcomes        │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product listed by a farmer.
///
/// `quantity_available` is the authoritative stock count. It is mutated
/// exclusively through the stock ledger's atomic conditional updates and is
/// never read-modify-written outside a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Farmer who owns this listing.
    pub farmer_id: String,

    /// Display name shown to customers and frozen into order lines.
    pub name: String,

    /// Optional description for the product page.
    pub description: Option<String>,

    /// Unit price in paise (smallest currency unit).
    pub price_paise: i64,

    /// Units currently available for sale. Never negative.
    pub quantity_available: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Advisory check against current stock. The authoritative check is the
    /// conditional decrement at commit time.
    #[inline]
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.quantity_available >= quantity
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// The commitment engine only ever writes `Placed`; downstream fulfillment
/// owns the later transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Durably committed by a successful checkout.
    Placed,
    /// Delivered and settled (accrues loyalty points downstream).
    Completed,
    /// Cancelled after placement.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Placed
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed order. One order is created per checkout, spanning all of the
/// cart's products as order lines.
///
/// Invariant: `total_paise = subtotal_paise - discount_paise`, never negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub subtotal_paise: i64,
    pub discount_paise: i64,
    pub total_paise: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the payable total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item in an order.
///
/// Uses the snapshot pattern: name and unit price are frozen at quote time,
/// so order history stays accurate even if the catalog changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at quote time (frozen).
    pub name_snapshot: String,
    /// Unit price in paise at quote time (frozen).
    pub unit_price_paise: i64,
    /// Quantity committed.
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_paise: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_paise(self.line_total_paise)
    }
}

// =============================================================================
// Checkout Outcomes
// =============================================================================

/// Why a cart entry cannot be fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortageKind {
    /// Zero units available.
    OutOfStock,
    /// Some units available, but fewer than requested.
    Insufficient,
}

/// A single unfulfillable cart entry, reported to the caller so the customer
/// can adjust the cart.
///
/// `available` is a hint: by the time it is displayed it may already be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortage {
    pub product_id: String,
    pub kind: ShortageKind,
    pub available: i64,
    pub requested: i64,
}

impl StockShortage {
    /// Classifies an availability/request pair, or `None` if it is satisfiable.
    pub fn classify(product_id: &str, available: i64, requested: i64) -> Option<Self> {
        let kind = if available == 0 {
            ShortageKind::OutOfStock
        } else if available < requested {
            ShortageKind::Insufficient
        } else {
            return None;
        };
        Some(StockShortage {
            product_id: product_id.to_string(),
            kind,
            available,
            requested,
        })
    }
}

/// The outcome of a checkout attempt.
///
/// All three variants are expected business outcomes, returned as values,
/// never raised through the error channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitResult {
    /// The order was durably committed.
    Success {
        order_id: String,
        discount_applied: Money,
        total_due: Money,
    },
    /// Pre-flight validation found shortages; nothing was mutated.
    Rejected { shortages: Vec<StockShortage> },
    /// A conditional decrement lost the race between pre-flight and commit;
    /// the whole unit of work was rolled back. `product_id` names the product
    /// that lost availability, or is `None` when the loyalty balance lost.
    RolledBack {
        product_id: Option<String>,
        reason: String,
    },
}

impl CommitResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, CommitResult::Success { .. })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Placed);
    }

    #[test]
    fn test_shortage_classify() {
        let out = StockShortage::classify("p1", 0, 2).unwrap();
        assert_eq!(out.kind, ShortageKind::OutOfStock);
        assert_eq!(out.available, 0);

        let short = StockShortage::classify("p1", 3, 5).unwrap();
        assert_eq!(short.kind, ShortageKind::Insufficient);
        assert_eq!(short.requested, 5);

        assert!(StockShortage::classify("p1", 5, 5).is_none());
        assert!(StockShortage::classify("p1", 9, 5).is_none());
    }

    #[test]
    fn test_product_can_supply() {
        let product = Product {
            id: "p1".to_string(),
            farmer_id: "f1".to_string(),
            name: "Tomatoes".to_string(),
            description: None,
            price_paise: 1000,
            quantity_available: 4,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.can_supply(4));
        assert!(!product.can_supply(5));
    }

    #[test]
    fn test_commit_result_serializes_with_tag() {
        let result = CommitResult::Rejected {
            shortages: vec![StockShortage {
                product_id: "p2".to_string(),
                kind: ShortageKind::OutOfStock,
                available: 0,
                requested: 1,
            }],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"outcome\":\"rejected\""));
        assert!(json.contains("\"out_of_stock\""));
    }
}
