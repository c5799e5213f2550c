//! # Cart Module
//!
//! The customer's in-progress cart: a per-session mapping of product id to
//! requested quantity.
//!
//! ## Design Notes
//! The cart is an explicit value passed into the commitment engine, not
//! ambient session state. It never touches the database; the advisory stock
//! check lives in the engine's pre-flight, and the authoritative check is the
//! conditional decrement at commit time.
//!
//! Entries are keyed in a `BTreeMap`, so `snapshot()` always yields entries in
//! ascending product-id order, the same fixed order the engine uses for
//! stock decrements to avoid deadlock on row locks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A single (product, quantity) pair from a cart snapshot. Quantity is
/// always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: String,
    pub quantity: i64,
}

/// The shopping cart.
///
/// ## Invariants
/// - Entries are unique by product id.
/// - Quantities are always positive; setting a quantity `<= 0` removes the
///   entry.
/// - At most [`MAX_CART_ITEMS`] distinct products, each at most
///   [`MAX_ITEM_QUANTITY`] units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    entries: BTreeMap<String, i64>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            entries: BTreeMap::new(),
        }
    }

    /// Adds `delta` units of a product, accumulating with any existing entry.
    ///
    /// A zero or negative resulting quantity removes the entry.
    ///
    /// ## Errors
    /// Returns an error message if the cart is full or the resulting quantity
    /// would exceed the per-item maximum.
    pub fn add(&mut self, product_id: &str, delta: i64) -> Result<(), String> {
        let current = self.entries.get(product_id).copied().unwrap_or(0);
        self.set(product_id, current + delta)
    }

    /// Sets the quantity for a product outright.
    ///
    /// Quantities `<= 0` remove the entry (matching the remove-on-zero
    /// behavior of the cart update endpoint this replaces).
    pub fn set(&mut self, product_id: &str, quantity: i64) -> Result<(), String> {
        if quantity <= 0 {
            self.entries.remove(product_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(format!("Quantity cannot exceed {MAX_ITEM_QUANTITY}"));
        }

        if !self.entries.contains_key(product_id) && self.entries.len() >= MAX_CART_ITEMS {
            return Err(format!("Cart cannot have more than {MAX_CART_ITEMS} items"));
        }

        self.entries.insert(product_id.to_string(), quantity);
        Ok(())
    }

    /// Removes a product from the cart. Removing an absent product is a no-op.
    pub fn remove(&mut self, product_id: &str) {
        self.entries.remove(product_id);
    }

    /// Returns the cart's entries in ascending product-id order.
    pub fn snapshot(&self) -> Vec<CartEntry> {
        self.entries
            .iter()
            .map(|(product_id, &quantity)| CartEntry {
                product_id: product_id.clone(),
                quantity,
            })
            .collect()
    }

    /// Returns the requested quantity for a product, zero if absent.
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.entries.get(product_id).copied().unwrap_or(0)
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    /// Total units across all entries.
    pub fn total_quantity(&self) -> i64 {
        self.entries.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let mut cart = Cart::new();
        cart.add("p1", 2).unwrap();
        cart.add("p1", 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of("p1"), 5);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_set_overwrites() {
        let mut cart = Cart::new();
        cart.add("p1", 2).unwrap();
        cart.set("p1", 7).unwrap();

        assert_eq!(cart.quantity_of("p1"), 7);
    }

    #[test]
    fn test_non_positive_quantity_removes_entry() {
        let mut cart = Cart::new();
        cart.add("p1", 2).unwrap();

        cart.set("p1", 0).unwrap();
        assert!(cart.is_empty());

        cart.add("p2", 3).unwrap();
        cart.add("p2", -5).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.remove("missing");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_snapshot_ordered_by_product_id() {
        let mut cart = Cart::new();
        cart.add("p9", 1).unwrap();
        cart.add("p1", 2).unwrap();
        cart.add("p5", 3).unwrap();

        let snapshot = cart.snapshot();
        let ids: Vec<&str> = snapshot
            .iter()
            .map(|e| e.product_id.as_str())
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
        assert_eq!(ids, vec!["p1", "p5", "p9"]);
    }

    #[test]
    fn test_quantity_cap() {
        let mut cart = Cart::new();
        assert!(cart.set("p1", MAX_ITEM_QUANTITY).is_ok());
        assert!(cart.set("p1", MAX_ITEM_QUANTITY + 1).is_err());
        // Failed set leaves the previous quantity intact.
        assert_eq!(cart.quantity_of("p1"), MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_cart_size_cap() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add(&format!("p{i:03}"), 1).unwrap();
        }
        assert!(cart.add("overflow", 1).is_err());
        // Updating an existing entry is still allowed at capacity.
        assert!(cart.set("p000", 2).is_ok());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add("p1", 2).unwrap();
        cart.clear();
        assert!(cart.is_empty());
    }
}
