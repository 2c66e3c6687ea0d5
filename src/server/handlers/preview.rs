//! Label preview handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::layout::{LayoutId, LayoutStyle};
use crate::render::{ShipmentRenderContext, VisualTree, render as render_label};

use super::super::state::AppState;
use super::{ApiError, ScopeQuery, get_in_scope};

/// Request body for the preview endpoint.
///
/// A stored `layout_id` wins over an inline `style`; with neither, the safe
/// defaults are rendered. Stored layouts are looked up in the `?user=` scope.
/// Without a `context` the mock shipment is used.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub layout_id: Option<LayoutId>,
    #[serde(default)]
    pub style: Option<LayoutStyle>,
    #[serde(default)]
    pub context: Option<ShipmentRenderContext>,
}

/// POST /api/preview - Render a label to its visual tree.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScopeQuery>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<VisualTree>, ApiError> {
    let style = match (req.layout_id, req.style) {
        (Some(id), _) => get_in_scope(&state, id, &query.scope()).await?.style,
        (None, Some(style)) => style.normalized(),
        (None, None) => LayoutStyle::default(),
    };
    let context = req.context.unwrap_or_else(ShipmentRenderContext::mock);
    Ok(Json(render_label(&style, &context)))
}
