//! Layout CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::layout::{LayoutConfiguration, LayoutDraft, LayoutId, LayoutStyle};

use super::super::state::AppState;
use super::{ApiError, ScopeQuery, api_error, get_in_scope};

/// GET /api/layouts - List layouts of the scope, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<LayoutConfiguration>>, ApiError> {
    let layouts = state.repo.list(&query.scope()).await.map_err(api_error)?;
    Ok(Json(layouts))
}

/// GET /api/layouts/defaults - The safe-default style.
pub async fn defaults() -> Json<LayoutStyle> {
    Json(LayoutStyle::default())
}

/// POST /api/layouts - Create a layout.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
    Json(draft): Json<LayoutDraft>,
) -> Result<(StatusCode, Json<LayoutConfiguration>), ApiError> {
    let layout = state
        .repo
        .create(&query.scope(), draft)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(layout)))
}

/// GET /api/layouts/:id - Fetch one layout.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LayoutId>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<LayoutConfiguration>, ApiError> {
    get_in_scope(&state, id, &query.scope()).await.map(Json)
}

/// PUT /api/layouts/:id - Replace name and style.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LayoutId>,
    Query(query): Query<ScopeQuery>,
    Json(draft): Json<LayoutDraft>,
) -> Result<Json<LayoutConfiguration>, ApiError> {
    get_in_scope(&state, id, &query.scope()).await?;
    let layout = state.repo.update(id, draft).await.map_err(api_error)?;
    Ok(Json(layout))
}

/// POST /api/layouts/:id/default - Make a layout the scope default.
pub async fn set_default(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LayoutId>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<LayoutConfiguration>, ApiError> {
    let layout = state
        .repo
        .set_default(id, &query.scope())
        .await
        .map_err(api_error)?;
    Ok(Json(layout))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub user: Option<String>,
    /// New default when deleting the current one.
    #[serde(default)]
    pub replacement: Option<LayoutId>,
}

/// DELETE /api/layouts/:id - Delete a layout.
///
/// Deleting the scope default needs `?replacement=<id>`.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LayoutId>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, ApiError> {
    let scope = ScopeQuery { user: query.user }.scope();
    get_in_scope(&state, id, &scope).await?;

    match query.replacement {
        Some(replacement) => {
            state
                .repo
                .delete_with_replacement(id, replacement)
                .await
                .map_err(api_error)?;
        }
        None => state.repo.delete(id).await.map_err(api_error)?,
    }
    Ok(StatusCode::NO_CONTENT)
}
