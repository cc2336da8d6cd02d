//! Shop HTTP API Service.
//!
//! This crate provides the HTTP boundary over the settlement engine:
//!
//! - Goods listing and purchases
//! - Account page with refund eligibility
//! - Refund requests and admin resolution (single and bulk)
//! - Admin catalog management
//!
//! # Authentication
//!
//! Requests authenticate with a bearer token carrying the user id; admin
//! routes additionally require the user record's admin capability.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod worker;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use worker::{WorkerError, WorkerHandle};
