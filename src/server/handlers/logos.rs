//! Logo upload handler.

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;

use super::super::state::AppState;
use super::{ApiError, ScopeQuery, api_error};

/// Response from the upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub size: usize,
}

/// POST /api/logos - Upload a logo file (multipart field `logo`).
pub async fn upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut logo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("logo") {
            let file_name = field.file_name().unwrap_or("logo").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read logo: {}", e)))?;
            logo = Some((file_name, bytes.to_vec()));
            break;
        }
    }

    let (file_name, bytes) =
        logo.ok_or((StatusCode::BAD_REQUEST, "No logo field found".to_string()))?;

    let url = state
        .assets
        .upload_logo(&query.scope(), &bytes, &file_name)
        .await
        .map_err(api_error)?;

    Ok(Json(UploadResponse {
        url,
        size: bytes.len(),
    }))
}
