//! Handler modules, organized by surface:
//! - auth: register, login, logout, me
//! - invoices: owner-scoped create/list/get/update/delete
//! - admin_invoices: admin-only list-all, any-invoice get/update/delete,
//!   status updates
//! - users: admin-only user listing and deletion

pub mod admin_invoices;
pub mod auth;
pub mod invoices;
pub mod users;

use uuid::Uuid;

use facture_storage::{InvoiceId, UserId};

use crate::error::ApiError;

/// Path ids are validated up front: a malformed id is rejected input (400),
/// not a missing resource (404).
pub(crate) fn parse_invoice_id(raw: &str) -> Result<InvoiceId, ApiError> {
    Uuid::try_parse(raw)
        .map(InvoiceId)
        .map_err(|_| ApiError::Validation(format!("Invalid invoice id: {}", raw)))
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    Uuid::try_parse(raw)
        .map(UserId)
        .map_err(|_| ApiError::Validation(format!("Invalid user id: {}", raw)))
}
