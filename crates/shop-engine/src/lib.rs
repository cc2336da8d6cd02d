//! Purchase and refund settlement engine.
//!
//! This crate holds the transactional core of the shop: the purchase
//! operation (debit wallet, decrement stock, snapshot a purchase record),
//! the refund lifecycle (request within a window, admin approve/decline),
//! bulk resolution with per-item error isolation, and the post-commit
//! replenishment hook that restocks a good when a sale empties it.
//!
//! All state transitions flow through [`shop_store::Store::apply`] as
//! atomic [`shop_store::Settlement`] batches; the engine contributes the
//! precondition ordering, the error taxonomy, and the snapshot semantics.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod engine;
pub mod error;

pub use engine::{BulkReport, SettlementEngine};
pub use error::{EngineError, Result};
