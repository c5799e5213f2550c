//! # Repository Layer
//!
//! Data access for FarmGate, organized by aggregate:
//!
//! - [`product`]: catalog reads and writes (never touches stock quantities)
//! - [`stock`]: the stock ledger, the only writer of `quantity_available`
//! - [`order`]: committed orders and their lines
//! - [`loyalty`]: customer point balances
//!
//! Operations that must participate in the checkout transaction are
//! associated functions taking `&mut SqliteConnection`; everything else runs
//! on the shared pool.

pub mod loyalty;
pub mod order;
pub mod product;
pub mod stock;
