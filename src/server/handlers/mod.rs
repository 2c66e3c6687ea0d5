//! HTTP handlers for the server.

pub mod layouts;
pub mod logos;
pub mod preview;

use axum::{Json, http::StatusCode};
use serde::Deserialize;

use crate::error::EtiketError;
use crate::layout::{LayoutConfiguration, LayoutId, OwnerScope};

use super::state::AppState;

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

/// Map a crate error onto a status code and message.
pub fn api_error(e: EtiketError) -> ApiError {
    let status = match &e {
        EtiketError::ValidationFailed { .. } | EtiketError::Encoding(_) => StatusCode::BAD_REQUEST,
        EtiketError::NotFound(_) => StatusCode::NOT_FOUND,
        EtiketError::ForbiddenOperation(_)
        | EtiketError::UnsavedChanges
        | EtiketError::SaveInProgress => StatusCode::CONFLICT,
        EtiketError::StorageFailure(_) => StatusCode::BAD_GATEWAY,
        EtiketError::Transport(_) | EtiketError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::warn!(error = %e, "request failed");
    }
    (status, e.to_string())
}

/// Fetch `id`, treating layouts of other scopes as missing.
pub async fn get_in_scope(
    state: &AppState,
    id: LayoutId,
    scope: &OwnerScope,
) -> Result<LayoutConfiguration, ApiError> {
    let layout = state.repo.get(id).await.map_err(api_error)?;
    if &layout.owner_scope != scope {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Not found: layout {} not found in scope {}", id, scope),
        ));
    }
    Ok(layout)
}

/// `?user=<id>` selects a user scope; absent or blank means tenant.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    #[serde(default)]
    pub user: Option<String>,
}

impl ScopeQuery {
    pub fn scope(&self) -> OwnerScope {
        match self.user.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => OwnerScope::user(user),
            _ => OwnerScope::Tenant,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Liveness probe.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
