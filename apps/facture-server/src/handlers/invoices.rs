//! Owner-scoped invoice handlers.
//!
//! Every lookup here goes through an [`InvoiceScope::OwnedBy`] filter built
//! into the query, so an invoice owned by someone else is indistinguishable
//! from one that doesn't exist (404, never 403).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use facture_policy::{invoice_scope, InvoiceAction, InvoiceDraft, InvoiceUpdate};
use facture_storage::StoreError;

use crate::error::ApiError;
use crate::extract::{AppJson, CurrentUser};
use crate::handlers::parse_invoice_id;
use crate::server::AppState;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    AppJson(draft): AppJson<InvoiceDraft>,
) -> Result<impl IntoResponse, ApiError> {
    // Per the decision table, Create always binds owner = creator.
    let params = draft.into_params(principal.id.clone())?;
    let invoice = state.store.create_invoice(&params).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let scope = invoice_scope(&principal, InvoiceAction::ListOwn)?;
    let invoices = state.store.list_invoices(&scope).await?;
    Ok(Json(invoices))
}

pub async fn get_one(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_invoice_id(&id)?;
    let scope = invoice_scope(&principal, InvoiceAction::ReadOwn)?;
    let invoice = state
        .store
        .get_invoice(&id, &scope)
        .await
        .map_err(not_found_or)?;
    Ok(Json(invoice))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
    AppJson(update): AppJson<InvoiceUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_invoice_id(&id)?;
    let scope = invoice_scope(&principal, InvoiceAction::UpdateOwn)?;
    let patch = update.into_patch()?;
    let invoice = state
        .store
        .update_invoice(&id, &scope, &patch)
        .await
        .map_err(not_found_or)?;
    Ok(Json(invoice))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_invoice_id(&id)?;
    let scope = invoice_scope(&principal, InvoiceAction::DeleteOwn)?;
    state
        .store
        .delete_invoice(&id, &scope)
        .await
        .map_err(not_found_or)?;
    Ok(Json(json!({"message": "Invoice deleted successfully"})))
}

pub(crate) fn not_found_or(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => ApiError::not_found("Invoice"),
        e => e.into(),
    }
}
