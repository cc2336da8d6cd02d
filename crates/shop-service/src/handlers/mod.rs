//! API handlers.

pub mod goods;
pub mod health;
pub mod purchases;
pub mod refunds;
pub mod users;
