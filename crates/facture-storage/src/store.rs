use async_trait::async_trait;

use crate::{
    CreateInvoiceParams, CreateSessionParams, CreateUserParams, Invoice, InvoiceId, InvoicePatch,
    InvoiceScope, InvoiceWithOwner, Principal, PrincipalSummary, Session, StoreError, UserId,
};

/// The storage trait the policy layer and server depend on.
///
/// Plain persistence only: no business rules live here. The one deliberate
/// exception is [`InvoiceScope`], which backends must apply *inside* the
/// lookup query so that out-of-scope invoices are indistinguishable from
/// absent ones.
///
/// Listing methods return invoices ordered by creation time, descending
/// (newest first). The API surface depends on this ordering for its "recent
/// invoices" views.
#[async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────── Users ─────────────────────────────────

    /// Create a new user. Fails with `AlreadyExists` when the email is taken
    /// (case-insensitive).
    async fn create_user(&self, params: &CreateUserParams) -> Result<Principal, StoreError>;

    /// Get user by email (comparison-insensitive).
    async fn get_user_by_email(&self, email: &str) -> Result<Principal, StoreError>;

    /// Get user by ID.
    async fn get_user_by_id(&self, id: &UserId) -> Result<Principal, StoreError>;

    /// List all users (reduced field set; never includes password hashes).
    async fn list_users(&self) -> Result<Vec<PrincipalSummary>, StoreError>;

    /// Delete a user by ID. Their invoices are left untouched.
    async fn delete_user(&self, id: &UserId) -> Result<(), StoreError>;

    // ──────────────────────────────── Sessions ───────────────────────────────

    /// Persist a session row.
    async fn create_session(&self, params: &CreateSessionParams) -> Result<(), StoreError>;

    /// Resolve a session token. Expired sessions are removed and reported as
    /// `NotFound`.
    async fn get_session(&self, token: &str) -> Result<Session, StoreError>;

    /// Invalidate a session token. Idempotent: deleting an unknown token
    /// succeeds.
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;

    // ──────────────────────────────── Invoices ───────────────────────────────

    /// Persist a new invoice and return the stored record.
    async fn create_invoice(&self, params: &CreateInvoiceParams) -> Result<Invoice, StoreError>;

    /// Point lookup within `scope`.
    async fn get_invoice(
        &self,
        id: &InvoiceId,
        scope: &InvoiceScope,
    ) -> Result<Invoice, StoreError>;

    /// List invoices within `scope`, newest first.
    async fn list_invoices(&self, scope: &InvoiceScope) -> Result<Vec<Invoice>, StoreError>;

    /// List all invoices with owner info populated, newest first. Owner info
    /// is `None` for invoices whose owning user has been deleted.
    async fn list_invoices_with_owner(&self) -> Result<Vec<InvoiceWithOwner>, StoreError>;

    /// Apply a partial update within `scope` and return the updated record.
    async fn update_invoice(
        &self,
        id: &InvoiceId,
        scope: &InvoiceScope,
        patch: &InvoicePatch,
    ) -> Result<Invoice, StoreError>;

    /// Delete an invoice within `scope`.
    async fn delete_invoice(&self, id: &InvoiceId, scope: &InvoiceScope)
        -> Result<(), StoreError>;
}
