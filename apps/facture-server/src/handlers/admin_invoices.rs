//! Admin invoice handlers: operations over any invoice, regardless of owner.
//!
//! All of these resolve to [`InvoiceScope::Any`] through the policy, which
//! denies the scope to non-admin callers with `Forbidden` (403) — unlike the
//! owner-scoped surface, existence is not a secret to admins.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use facture_policy::{invoice_scope, parse_status, InvoiceAction, InvoiceUpdate};
use facture_storage::InvoicePatch;

use crate::error::ApiError;
use crate::extract::{AppJson, CurrentUser};
use crate::handlers::invoices::not_found_or;
use crate::handlers::parse_invoice_id;
use crate::server::AppState;

/// `GET /invoices/all` and `GET /admin/invoices/all`: every invoice, newest
/// first, owner populated with name/email (`null` when the owner was
/// deleted).
pub async fn list_all(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    invoice_scope(&principal, InvoiceAction::ListAny)?;
    let invoices = state.store.list_invoices_with_owner().await?;
    Ok(Json(invoices))
}

pub async fn get_any(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_invoice_id(&id)?;
    let scope = invoice_scope(&principal, InvoiceAction::ReadAny)?;
    let invoice = state
        .store
        .get_invoice(&id, &scope)
        .await
        .map_err(not_found_or)?;
    Ok(Json(invoice))
}

/// Restricted-field update of any invoice. The permitted field set is
/// statically enumerated by [`InvoiceUpdate`]; the owner reference is not in
/// it and unknown keys are rejected.
pub async fn update_any(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
    AppJson(update): AppJson<InvoiceUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_invoice_id(&id)?;
    let scope = invoice_scope(&principal, InvoiceAction::UpdateAny)?;
    let patch = update.into_patch()?;
    let invoice = state
        .store
        .update_invoice(&id, &scope, &patch)
        .await
        .map_err(not_found_or)?;
    Ok(Json(invoice))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Status-only update. The status value is validated before authorization or
/// persistence, so a bad value is a 400 for everyone and never reaches the
/// store.
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_invoice_id(&id)?;
    let status = parse_status(&req.status)?;
    let scope = invoice_scope(&principal, InvoiceAction::UpdateStatusAny)?;

    let patch = InvoicePatch {
        status: Some(status),
        ..Default::default()
    };
    let invoice = state
        .store
        .update_invoice(&id, &scope, &patch)
        .await
        .map_err(not_found_or)?;
    Ok(Json(invoice))
}

pub async fn delete_any(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_invoice_id(&id)?;
    let scope = invoice_scope(&principal, InvoiceAction::DeleteAny)?;
    state
        .store
        .delete_invoice(&id, &scope)
        .await
        .map_err(not_found_or)?;
    Ok(Json(json!({"message": "Invoice deleted successfully"})))
}
