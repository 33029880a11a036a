//! Bulk actions over selected items
//!
//! The whole request is validated up front, then executed in one transaction:
//! either every selected item changes or none does.

use axum::{Extension, Json, Router, extract::State, routing::post};
use shared::catalog::{BulkAction, BulkActionRequest, BulkActionResult};
use shared::error::ApiResponse;
use shared::realtime::{ChangeEvent, ChangeTable};

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::db::items;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/items/bulk", post(bulk_action))
}

/// POST /api/items/bulk
pub async fn bulk_action(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<BulkActionRequest>,
) -> ApiResult<BulkActionResult> {
    request.validate()?;

    let (affected, events) = match &request.action {
        BulkAction::Delete => {
            let ids = items::bulk_delete(&state.pool, identity.user_id, &request.ids).await?;
            let events: Vec<ChangeEvent> = ids
                .iter()
                .map(|id| ChangeEvent::deleted(ChangeTable::Items, *id))
                .collect();
            (ids, events)
        }
        BulkAction::SetStatus { status, .. } => {
            let updated =
                items::bulk_set_status(&state.pool, identity.user_id, &request, *status).await?;
            let ids = updated.iter().map(|item| item.id).collect();
            let events = updated.iter().map(ChangeEvent::item_updated).collect();
            (ids, events)
        }
    };

    tracing::info!(
        user_id = %identity.user_id,
        count = affected.len(),
        "Bulk action applied"
    );
    state.changes.publish_all(identity.user_id, events);
    Ok(ApiResponse::success(BulkActionResult { affected }))
}
