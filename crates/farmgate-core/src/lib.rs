//! # farmgate-core: Pure Business Logic for FarmGate
//!
//! This crate is the **heart** of the FarmGate marketplace. It contains the
//! checkout domain as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                      FarmGate Architecture                         │
//! │                                                                    │
//! │  Calling layer (HTTP endpoint, CLI, ...)                           │
//! │       │                                                            │
//! │  ┌────▼───────────────────────────────────────────────────────┐    │
//! │  │             ★ farmgate-core (THIS CRATE) ★                 │    │
//! │  │                                                            │    │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐    │    │
//! │  │   │  types  │  │  money  │  │  cart   │  │  pricing   │    │    │
//! │  │   │ Product │  │  Money  │  │  Cart   │  │ CartQuote  │    │    │
//! │  │   │  Order  │  │ (paise) │  │ entries │  │  discount  │    │    │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └────────────┘    │    │
//! │  │                                                            │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS       │    │
//! │  └────┬───────────────────────────────────────────────────────┘    │
//! │       │                                                            │
//! │  ┌────▼───────────────────────────────────────────────────────┐    │
//! │  │            farmgate-db (storage + commitment engine)       │    │
//! │  │      SQLite repositories, the checkout transaction         │    │
//! │  └────────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderLine, CommitResult, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The customer's in-progress cart, a pure value type
//! - [`pricing`] - Cart quoting and the bounded loyalty discount
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, always
//! 2. **No I/O**: database, network, and file access are FORBIDDEN here
//! 3. **Integer Money**: all monetary values are paise (i64), never floats
//! 4. **Explicit Errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartEntry};
pub use error::ValidationError;
pub use money::Money;
pub use pricing::{price_cart, CartQuote, QuoteLine};
pub use types::*;
pub use validation::{validate_cart, validate_redemption};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products allowed in a single cart.
///
/// Keeps checkout transactions bounded: the commit phase decrements one row
/// per distinct product, all inside one unit of work.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single product in a cart.
///
/// Guards against accidental over-ordering (1000 typed instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
