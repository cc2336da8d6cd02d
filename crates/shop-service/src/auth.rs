//! Authentication extractors.
//!
//! This module provides extractors for:
//! - `AuthUser` - an authenticated shopper, from a bearer token
//! - `AdminUser` - an authenticated user holding the admin capability
//!
//! Session handling is owned by the surrounding platform; this service
//! accepts the `test-token:<user-uuid>` bearer format it issues.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shop_core::{User, UserId};
use shop_engine::SettlementEngine;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated user extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
}

fn bearer_user_id(parts: &Parts) -> Result<UserId, ApiError> {
    let auth_header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let user_id_str = token
        .strip_prefix("test-token:")
        .ok_or(ApiError::Unauthorized)?;

    user_id_str
        .parse::<UserId>()
        .map_err(|_| ApiError::Unauthorized)
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = bearer_user_id(parts)?;
            Ok(AuthUser { user_id })
        })
    }
}

/// An authenticated user who holds the admin capability.
///
/// The capability predicate runs before every admin operation; users
/// without it receive `Forbidden` regardless of the route.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// The full user record (capability already verified).
    pub user: User,
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = bearer_user_id(parts)?;
            let user = state
                .store
                .get_user(&user_id)?
                .ok_or(ApiError::Unauthorized)?;
            SettlementEngine::ensure_admin(&user)?;
            Ok(AdminUser { user })
        })
    }
}
