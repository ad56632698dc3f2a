//! User-management handlers (admin only).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use facture_policy::{ensure_not_self_delete, require_admin};
use facture_storage::StoreError;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::handlers::parse_user_id;
use crate::server::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&principal)?;
    let users = state.store.list_users().await?;
    Ok(Json(users))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&principal)?;
    let target = parse_user_id(&id)?;

    // The self-deletion guard runs before the existence check: deleting your
    // own id is Forbidden even when that id matches no record.
    ensure_not_self_delete(&principal.id, &target)?;

    match state.store.delete_user(&target).await {
        Ok(()) => Ok(Json(json!({"message": "User deleted successfully"}))),
        Err(StoreError::NotFound) => Err(ApiError::not_found("User")),
        Err(e) => Err(e.into()),
    }
}
