//! # Pricing Calculator
//!
//! Derives line subtotals, the cart total, and the loyalty discount from a
//! priced cart snapshot.
//!
//! ## Price Snapshot
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  Catalog price (now)  ──►  QuoteLine.unit_price  ──►  OrderLine    │
//! │                                                                    │
//! │  The unit price is read from the catalog ONCE, at quote time.      │
//! │  The committed order line reuses that snapshot; it is never        │
//! │  recomputed from the catalog, even if the price changes between    │
//! │  quote and commit.                                                 │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Loyalty Redemption
//! One point redeems for ₹1. Redemption is whole-point:
//! `discount = min(requested, balance, whole-rupee cart total)` points.
//! A request above the balance or the cart total is silently clamped,
//! never rejected.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A cart entry with its catalog data captured at quote time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub product_id: String,
    /// Product name at quote time (frozen into the order line).
    pub name: String,
    /// Unit price at quote time (frozen into the order line).
    pub unit_price: Money,
    pub quantity: i64,
}

impl QuoteLine {
    /// Line subtotal: unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A fully priced cart, ready for the commitment engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartQuote {
    pub lines: Vec<QuoteLine>,
    /// Sum of line subtotals.
    pub subtotal: Money,
    /// Loyalty points consumed by this quote.
    pub redeemed_points: i64,
    /// Monetary value of the redeemed points.
    pub discount: Money,
    /// subtotal − discount. Never negative.
    pub total_due: Money,
}

/// Prices a cart snapshot and computes the bounded loyalty discount.
///
/// The discount never exceeds the redemption request, the loyalty balance,
/// or the cart total; whichever is smallest wins, silently.
pub fn price_cart(lines: Vec<QuoteLine>, loyalty_balance: i64, requested_redemption: i64) -> CartQuote {
    let subtotal: Money = lines.iter().map(QuoteLine::line_total).sum();

    let redeemed_points = requested_redemption
        .min(loyalty_balance)
        .min(subtotal.rupees())
        .max(0);
    let discount = Money::from_rupees(redeemed_points);
    let total_due = subtotal.saturating_sub(discount);

    CartQuote {
        lines,
        subtotal,
        redeemed_points,
        discount,
        total_due,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, unit_price_paise: i64, quantity: i64) -> QuoteLine {
        QuoteLine {
            product_id: product_id.to_string(),
            name: format!("Product {product_id}"),
            unit_price: Money::from_paise(unit_price_paise),
            quantity,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line("p1", 1000, 2).line_total().paise(), 2000);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let quote = price_cart(vec![line("p1", 1000, 2), line("p2", 3000, 1)], 0, 0);
        assert_eq!(quote.subtotal.paise(), 5000);
        assert_eq!(quote.discount, Money::zero());
        assert_eq!(quote.total_due.paise(), 5000);
    }

    #[test]
    fn test_discount_bounded_by_cart_total() {
        // Balance 40, cart total ₹25, request 100 → discount ₹25, due ₹0.
        let quote = price_cart(vec![line("p1", 2500, 1)], 40, 100);
        assert_eq!(quote.redeemed_points, 25);
        assert_eq!(quote.discount, Money::from_rupees(25));
        assert_eq!(quote.total_due, Money::zero());
    }

    #[test]
    fn test_discount_bounded_by_balance() {
        let quote = price_cart(vec![line("p1", 10000, 1)], 5, 100);
        assert_eq!(quote.redeemed_points, 5);
        assert_eq!(quote.total_due.paise(), 9500);
    }

    #[test]
    fn test_discount_bounded_by_request() {
        let quote = price_cart(vec![line("p1", 10000, 1)], 50, 10);
        assert_eq!(quote.redeemed_points, 10);
        assert_eq!(quote.total_due.paise(), 9000);
    }

    #[test]
    fn test_whole_point_redemption() {
        // Total ₹45.50: at most 45 whole points redeem, leaving ₹0.50 due.
        let quote = price_cart(vec![line("p1", 4550, 1)], 100, 100);
        assert_eq!(quote.redeemed_points, 45);
        assert_eq!(quote.total_due.paise(), 50);
    }

    #[test]
    fn test_negative_request_clamps_to_zero() {
        let quote = price_cart(vec![line("p1", 1000, 1)], 50, -3);
        assert_eq!(quote.redeemed_points, 0);
        assert_eq!(quote.total_due.paise(), 1000);
    }

    #[test]
    fn test_empty_cart_quotes_to_zero() {
        let quote = price_cart(Vec::new(), 50, 50);
        assert_eq!(quote.subtotal, Money::zero());
        assert_eq!(quote.redeemed_points, 0);
        assert_eq!(quote.total_due, Money::zero());
    }
}
