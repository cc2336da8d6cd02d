//! Core types for the shop settlement service.
//!
//! This crate provides the foundational types used throughout the platform:
//!
//! - **Identifiers**: `UserId`, `GoodId`, `PurchaseId`, `RefundId`
//! - **Catalog**: `Good`
//! - **Users**: `User` (with wallet balance and admin capability)
//! - **Settlement records**: `Purchase`, `Refund`, `RefundDecision`
//! - **Configuration**: `SettlementConfig`
//!
//! # Money
//!
//! All amounts are integer cents stored as `i64` to avoid floating point
//! precision issues. A wallet balance of `10_000` is $100.00.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod good;
pub mod ids;
pub mod purchase;
pub mod refund;
pub mod user;

pub use config::SettlementConfig;
pub use good::Good;
pub use ids::{GoodId, IdError, PurchaseId, RefundId, UserId};
pub use purchase::Purchase;
pub use refund::{DecisionParseError, Refund, RefundDecision};
pub use user::User;
