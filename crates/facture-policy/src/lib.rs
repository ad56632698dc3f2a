//! Authorization policy and input validation for facture.
//!
//! This crate is the rule layer between the API surface and the store. It
//! decides, for every invoice and user operation, whether the acting principal
//! may perform it and which visibility scope applies — and it owns the typed
//! partial-update structures so that permitted fields are statically
//! enumerated rather than picked dynamically at request time.
//!
//! Ownership scoping deserves a note: sales principals are never told that an
//! invoice they don't own exists. The policy hands back an
//! [`InvoiceScope::OwnedBy`] that backends fold into the lookup query itself,
//! so a non-owner sees `NotFound` where a naive design would say `Forbidden`.
//! That 404-instead-of-403 behavior is deliberate anti-enumeration.

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use validator::ValidateEmail;

use facture_storage::{
    CreateInvoiceParams, InvoicePatch, InvoiceScope, InvoiceStatus, Principal, Role, UserId,
};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Validation(String),
}

/// Invoice operations, split by surface.
///
/// The `Own*` actions back the plain `/invoices` endpoints and are scoped to
/// the caller for *every* role — an admin using the plain surface sees only
/// their own invoices, exactly like a sales principal. The `Any*` actions back
/// the admin surface and require the admin role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvoiceAction {
    /// Create an invoice; the creator becomes the immutable owner.
    Create,
    /// List the caller's own invoices.
    ListOwn,
    /// Point lookup of one of the caller's own invoices.
    ReadOwn,
    /// Full-field update (including status) of one of the caller's invoices.
    UpdateOwn,
    /// Delete one of the caller's invoices.
    DeleteOwn,
    /// List every invoice in the system.
    ListAny,
    /// Point lookup of any invoice.
    ReadAny,
    /// Restricted-field update of any invoice (never the owner reference).
    UpdateAny,
    /// Status-only update of any invoice.
    UpdateStatusAny,
    /// Delete any invoice.
    DeleteAny,
}

/// The decision table: maps (role, action) to a visibility scope or a denial.
///
/// | Action            | Sales            | Admin            |
/// |-------------------|------------------|------------------|
/// | Create            | owner = self     | owner = self     |
/// | ListOwn/ReadOwn   | scoped to self   | scoped to self   |
/// | UpdateOwn/DeleteOwn | scoped to self | scoped to self   |
/// | ListAny/ReadAny   | Forbidden        | any invoice      |
/// | UpdateAny/UpdateStatusAny/DeleteAny | Forbidden | any invoice |
pub fn invoice_scope(
    principal: &Principal,
    action: InvoiceAction,
) -> Result<InvoiceScope, PolicyError> {
    use InvoiceAction::*;

    match action {
        Create | ListOwn | ReadOwn | UpdateOwn | DeleteOwn => {
            Ok(InvoiceScope::OwnedBy(principal.id.clone()))
        }
        ListAny | ReadAny | UpdateAny | UpdateStatusAny | DeleteAny => match principal.role {
            Role::Admin => Ok(InvoiceScope::Any),
            Role::Sales => Err(PolicyError::Forbidden("Admin access required")),
        },
    }
}

/// Gate for the user-management surface (list/delete users).
pub fn require_admin(principal: &Principal) -> Result<(), PolicyError> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::Sales => Err(PolicyError::Forbidden("Admin access required")),
    }
}

/// Self-deletion guard. Checked *before* the target's existence, so deleting
/// one's own id is `Forbidden` even when that id matches no record.
pub fn ensure_not_self_delete(actor: &UserId, target: &UserId) -> Result<(), PolicyError> {
    if actor == target {
        return Err(PolicyError::Forbidden("Cannot delete your own account"));
    }
    Ok(())
}

/// Parse and validate a status value, naming the allowed set on rejection.
pub fn parse_status(raw: &str) -> Result<InvoiceStatus, PolicyError> {
    InvoiceStatus::from_str(raw.trim()).map_err(PolicyError::Validation)
}

// ───────────────────────────── Request shapes ─────────────────────────────

/// New-invoice request body. Unknown keys are rejected rather than silently
/// ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub amount: f64,
    pub description: String,
}

impl InvoiceDraft {
    /// Validate and normalize into store parameters, with `owner` fixed to
    /// the acting principal. New invoices always start `pending`.
    pub fn into_params(self, owner: UserId) -> Result<CreateInvoiceParams, PolicyError> {
        let customer_name = require_nonempty("customer_name", &self.customer_name)?;
        let description = require_nonempty("description", &self.description)?;
        let customer_email = normalize_email(&self.customer_email)?;
        let amount = validate_amount(self.amount)?;

        Ok(CreateInvoiceParams {
            customer_name,
            customer_email,
            amount,
            description,
            status: InvoiceStatus::default(),
            owner,
        })
    }
}

/// Partial invoice update. One statically-enumerated shape serves both roles:
/// the owner's full update and the admin's restricted-field update permit the
/// same field set (status included), and neither can touch the owner
/// reference — it is simply not a field here. Unknown keys are rejected.
///
/// `status` arrives as a raw string so that a bad value yields a
/// `ValidationError` naming the allowed set, before any persistence.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceUpdate {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl InvoiceUpdate {
    /// Validate and normalize into a store patch.
    pub fn into_patch(self) -> Result<InvoicePatch, PolicyError> {
        let customer_name = self
            .customer_name
            .map(|v| require_nonempty("customer_name", &v))
            .transpose()?;
        let description = self
            .description
            .map(|v| require_nonempty("description", &v))
            .transpose()?;
        let customer_email = self
            .customer_email
            .map(|v| normalize_email(&v))
            .transpose()?;
        let amount = self.amount.map(validate_amount).transpose()?;
        let status = self.status.map(|v| parse_status(&v)).transpose()?;

        Ok(InvoicePatch {
            customer_name,
            customer_email,
            amount,
            description,
            status,
        })
    }
}

// ─────────────────────────────── Validation ───────────────────────────────

fn require_nonempty(field: &str, value: &str) -> Result<String, PolicyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PolicyError::Validation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim and lowercase an email address, rejecting invalid syntax. Shared by
/// registration and invoice validation so both store the same normal form.
pub fn normalize_email(value: &str) -> Result<String, PolicyError> {
    let email = value.trim().to_lowercase();
    if !email.validate_email() {
        return Err(PolicyError::Validation("Invalid email format".into()));
    }
    Ok(email)
}

fn validate_amount(amount: f64) -> Result<f64, PolicyError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PolicyError::Validation(
            "amount must be a non-negative number".into(),
        ));
    }
    Ok(amount)
}
