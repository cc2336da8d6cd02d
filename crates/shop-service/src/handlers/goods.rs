//! Goods listing and admin catalog handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use shop_core::{Good, GoodId};

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Good response.
#[derive(Debug, Serialize)]
pub struct GoodResponse {
    /// Good ID.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Unit price in cents.
    pub price_cents: i64,
    /// Units in stock.
    pub in_stock: u32,
    /// Image URL or path.
    pub image: String,
}

impl From<&Good> for GoodResponse {
    fn from(good: &Good) -> Self {
        Self {
            id: good.id.to_string(),
            title: good.title.clone(),
            description: good.description.clone(),
            price_cents: good.price_cents,
            in_stock: good.in_stock,
            image: good.image.clone(),
        }
    }
}

/// Goods list response.
#[derive(Debug, Serialize)]
pub struct GoodsListResponse {
    /// The goods.
    pub goods: Vec<GoodResponse>,
}

/// List goods available for purchase (`in_stock > 0`). Public.
pub async fn list_goods(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GoodsListResponse>, ApiError> {
    let goods = state
        .store
        .list_goods()?
        .iter()
        .filter(|g| g.is_available())
        .map(GoodResponse::from)
        .collect();
    Ok(Json(GoodsListResponse { goods }))
}

/// List all goods including sold-out ones. Admin only.
pub async fn admin_list_goods(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<GoodsListResponse>, ApiError> {
    let goods = state
        .store
        .list_goods()?
        .iter()
        .map(GoodResponse::from)
        .collect();
    Ok(Json(GoodsListResponse { goods }))
}

/// All fields of a good, for add and edit.
#[derive(Debug, Deserialize)]
pub struct GoodForm {
    /// Display title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Unit price in cents.
    pub price_cents: i64,
    /// Units in stock.
    pub in_stock: u32,
    /// Image URL or path.
    pub image: String,
}

impl GoodForm {
    fn validate(&self) -> Result<(), ApiError> {
        if self.price_cents < 0 {
            return Err(ApiError::BadRequest("price must not be negative".into()));
        }
        if self.title.trim().is_empty() {
            return Err(ApiError::BadRequest("title must not be empty".into()));
        }
        Ok(())
    }
}

/// Add a new good to the catalog. Admin only.
pub async fn admin_add_good(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(form): Json<GoodForm>,
) -> Result<Json<GoodResponse>, ApiError> {
    form.validate()?;

    let good = Good::new(
        form.title,
        form.description,
        form.price_cents,
        form.in_stock,
        form.image,
    );
    state.store.put_good(&good)?;

    tracing::info!(
        admin = %admin.user.id,
        good_id = %good.id,
        title = %good.title,
        "Good added"
    );
    Ok(Json(GoodResponse::from(&good)))
}

/// Edit a good: direct overwrite of all fields. Admin only.
///
/// Existing purchase records keep their price snapshots; edits never apply
/// retroactively.
pub async fn admin_edit_good(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(good_id): Path<GoodId>,
    Json(form): Json<GoodForm>,
) -> Result<Json<GoodResponse>, ApiError> {
    form.validate()?;

    let mut good = state
        .store
        .get_good(&good_id)?
        .ok_or_else(|| ApiError::NotFound(format!("good: {good_id}")))?;

    good.title = form.title;
    good.description = form.description;
    good.price_cents = form.price_cents;
    good.in_stock = form.in_stock;
    good.image = form.image;
    good.updated_at = chrono::Utc::now();
    state.store.put_good(&good)?;

    tracing::info!(admin = %admin.user.id, good_id = %good.id, "Good edited");
    Ok(Json(GoodResponse::from(&good)))
}
