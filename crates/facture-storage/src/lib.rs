//! Storage abstraction for facture.
//!
//! Backend crates (e.g., facture-store-sqlite) implement the [`Store`] trait so
//! the policy layer and the server don't depend on any specific database engine
//! or schema details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

mod store;
pub use store::Store;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Strongly-typed identifiers (avoid mixing raw strings arbitrarily).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub Uuid);

/// Principal role. `Sales` manages their own invoices; `Admin` manages all
/// invoices and users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Sales,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Sales => write!(f, "sales"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "sales" => Ok(Self::Sales),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Account status. Stored and reported; this version attaches no behavioral
/// gate to `Inactive`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Unknown account status: {}", s)),
        }
    }
}

/// Invoice status. A flat set, not a state machine: any status may move to any
/// other status by a permitted actor. The only rejection is an unrecognized
/// value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
    Overdue,
}

impl InvoiceStatus {
    /// The full set of recognized status values, for error messages.
    pub const ALLOWED: [&'static str; 4] = ["pending", "paid", "cancelled", "overdue"];
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            "overdue" => Ok(Self::Overdue),
            _ => Err(format!(
                "Invalid status value: {}. Allowed: {}",
                s,
                Self::ALLOWED.join(", ")
            )),
        }
    }
}

/// Registered user record. The password hash never leaves the backend layers;
/// it is skipped during serialization so no API payload can carry it.
#[derive(Clone, Debug, Serialize)]
pub struct Principal {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reduced principal view for listings and invoice owner population.
#[derive(Clone, Debug, Serialize)]
pub struct PrincipalSummary {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

/// Server-side session row. The cookie only carries `token`; everything else
/// is resolved from the store on each request.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Invoice record. `owner` is set at creation and immutable thereafter: no
/// update path accepts it.
#[derive(Clone, Debug, Serialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: f64,
    pub description: String,
    pub status: InvoiceStatus,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invoice joined with its owner, for admin listings. `owner` is `None` when
/// the owning user has been deleted (dangling references are kept by design).
#[derive(Clone, Debug, Serialize)]
pub struct InvoiceWithOwner {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub owner_info: Option<PrincipalSummary>,
}

/// Parameters for creating a user. `email` must already be normalized
/// (trimmed, lowercased) and `password_hash` must be a one-way hash; the store
/// never sees a clear-text password.
#[derive(Clone, Debug)]
pub struct CreateUserParams {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
}

/// Parameters for persisting a session.
#[derive(Clone, Debug)]
pub struct CreateSessionParams {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Parameters for creating an invoice. Fields must already be validated and
/// normalized by the policy layer.
#[derive(Clone, Debug)]
pub struct CreateInvoiceParams {
    pub customer_name: String,
    pub customer_email: String,
    pub amount: f64,
    pub description: String,
    pub status: InvoiceStatus,
    pub owner: UserId,
}

/// Partial invoice update. `None` fields are left untouched. The owner
/// reference is deliberately absent: it cannot be patched through any path.
#[derive(Clone, Debug, Default)]
pub struct InvoicePatch {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub status: Option<InvoiceStatus>,
}

/// Visibility scope for invoice lookups.
///
/// `OwnedBy` is applied inside the query (`id AND owner`), never as a check
/// after an unscoped lookup, so a non-owner observes `NotFound` rather than
/// `Forbidden`. This 404-instead-of-403 shape is an anti-enumeration policy
/// decision, not a bug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvoiceScope {
    Any,
    OwnedBy(UserId),
}
