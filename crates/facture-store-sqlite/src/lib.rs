//! SQLite implementation of the facture [`Store`] trait, built on sqlx.
//!
//! Invoice visibility scoping happens inside the SQL itself: owner-scoped
//! queries add `AND owner_id = ?` to the WHERE clause, so out-of-scope rows
//! and absent rows are indistinguishable to callers.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use facture_storage::{
    AccountStatus, CreateInvoiceParams, CreateSessionParams, CreateUserParams, Invoice, InvoiceId,
    InvoicePatch, InvoiceScope, InvoiceStatus, InvoiceWithOwner, Principal, PrincipalSummary, Role,
    Session, Store, StoreError, UserId,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Map sqlx errors, turning UNIQUE violations into `AlreadyExists`.
fn insert_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

fn to_datetime(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Backend(format!("invalid stored timestamp: {}", micros)))
}

fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(raw).map_err(backend)
}

type UserRow = (String, String, String, String, String, String, i64, i64);

fn user_from_row(row: UserRow) -> Result<Principal, StoreError> {
    let (id, full_name, email, password_hash, role, status, created, updated) = row;
    Ok(Principal {
        id: UserId(parse_id(&id)?),
        full_name,
        email,
        password_hash,
        role: Role::from_str(&role).map_err(StoreError::Backend)?,
        status: AccountStatus::from_str(&status).map_err(StoreError::Backend)?,
        created_at: to_datetime(created)?,
        updated_at: to_datetime(updated)?,
    })
}

type InvoiceRow = (String, String, String, f64, String, String, String, i64, i64);

fn invoice_from_row(row: InvoiceRow) -> Result<Invoice, StoreError> {
    let (id, customer_name, customer_email, amount, description, status, owner, created, updated) =
        row;
    Ok(Invoice {
        id: InvoiceId(parse_id(&id)?),
        customer_name,
        customer_email,
        amount,
        description,
        status: InvoiceStatus::from_str(&status).map_err(StoreError::Backend)?,
        owner: UserId(parse_id(&owner)?),
        created_at: to_datetime(created)?,
        updated_at: to_datetime(updated)?,
    })
}

const INVOICE_COLUMNS: &str =
    "id, customer_name, customer_email, amount, description, status, owner_id, created_at, updated_at";

#[async_trait]
impl Store for SqliteStore {
    // ───────────────────────────────── Users ─────────────────────────────────

    async fn create_user(&self, params: &CreateUserParams) -> Result<Principal, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users(id,full_name,email,password_hash,role,status,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.full_name)
        .bind(&params.email)
        .bind(&params.password_hash)
        .bind(params.role.to_string())
        .bind(params.status.to_string())
        .bind(now.timestamp_micros())
        .bind(now.timestamp_micros())
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        Ok(Principal {
            id: UserId(id),
            full_name: params.full_name.clone(),
            email: params.email.clone(),
            password_hash: params.password_hash.clone(),
            role: params.role,
            status: params.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Principal, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id,full_name,email,password_hash,role,status,created_at,updated_at
             FROM users WHERE email = ? COLLATE NOCASE",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => user_from_row(row),
        }
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<Principal, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id,full_name,email,password_hash,role,status,created_at,updated_at
             FROM users WHERE id = ?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => user_from_row(row),
        }
    }

    async fn list_users(&self) -> Result<Vec<PrincipalSummary>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id,full_name,email,role FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, full_name, email, role) in rows {
            out.push(PrincipalSummary {
                id: UserId(parse_id(&id)?),
                full_name,
                email,
                role: Role::from_str(&role).map_err(StoreError::Backend)?,
            });
        }
        Ok(out)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ──────────────────────────────── Sessions ───────────────────────────────

    async fn create_session(&self, params: &CreateSessionParams) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO sessions(token,user_id,created_at,expires_at) VALUES(?,?,?,?)")
            .bind(&params.token)
            .bind(params.user_id.0.to_string())
            .bind(Utc::now().timestamp_micros())
            .bind(params.expires_at.timestamp_micros())
            .execute(&self.pool)
            .await
            .map_err(insert_err)?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Session, StoreError> {
        let row = sqlx::query_as::<_, (String, String, i64, i64)>(
            "SELECT token,user_id,created_at,expires_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let (token, user_id, created, expires) = match row {
            None => return Err(StoreError::NotFound),
            Some(row) => row,
        };

        let expires_at = to_datetime(expires)?;
        if expires_at <= Utc::now() {
            // Lazy cleanup; the caller just sees an invalid token.
            self.delete_session(&token).await?;
            return Err(StoreError::NotFound);
        }

        Ok(Session {
            token,
            user_id: UserId(parse_id(&user_id)?),
            created_at: to_datetime(created)?,
            expires_at,
        })
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    // ──────────────────────────────── Invoices ───────────────────────────────

    async fn create_invoice(&self, params: &CreateInvoiceParams) -> Result<Invoice, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO invoices(id,customer_name,customer_email,amount,description,status,owner_id,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.customer_name)
        .bind(&params.customer_email)
        .bind(params.amount)
        .bind(&params.description)
        .bind(params.status.to_string())
        .bind(params.owner.0.to_string())
        .bind(now.timestamp_micros())
        .bind(now.timestamp_micros())
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        Ok(Invoice {
            id: InvoiceId(id),
            customer_name: params.customer_name.clone(),
            customer_email: params.customer_email.clone(),
            amount: params.amount,
            description: params.description.clone(),
            status: params.status,
            owner: params.owner.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_invoice(
        &self,
        id: &InvoiceId,
        scope: &InvoiceScope,
    ) -> Result<Invoice, StoreError> {
        let row = match scope {
            InvoiceScope::Any => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {} FROM invoices WHERE id = ?",
                    INVOICE_COLUMNS
                ))
                .bind(id.0.to_string())
                .fetch_optional(&self.pool)
                .await
            }
            InvoiceScope::OwnedBy(owner) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {} FROM invoices WHERE id = ? AND owner_id = ?",
                    INVOICE_COLUMNS
                ))
                .bind(id.0.to_string())
                .bind(owner.0.to_string())
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(backend)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => invoice_from_row(row),
        }
    }

    async fn list_invoices(&self, scope: &InvoiceScope) -> Result<Vec<Invoice>, StoreError> {
        let rows = match scope {
            InvoiceScope::Any => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {} FROM invoices ORDER BY created_at DESC, id DESC",
                    INVOICE_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
            InvoiceScope::OwnedBy(owner) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {} FROM invoices WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
                    INVOICE_COLUMNS
                ))
                .bind(owner.0.to_string())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(backend)?;

        rows.into_iter().map(invoice_from_row).collect()
    }

    async fn list_invoices_with_owner(&self) -> Result<Vec<InvoiceWithOwner>, StoreError> {
        type JoinedRow = (
            String,
            String,
            String,
            f64,
            String,
            String,
            String,
            i64,
            i64,
            Option<String>,
            Option<String>,
            Option<String>,
        );

        let rows = sqlx::query_as::<_, JoinedRow>(
            "SELECT i.id, i.customer_name, i.customer_email, i.amount, i.description,
                    i.status, i.owner_id, i.created_at, i.updated_at,
                    u.full_name, u.email, u.role
             FROM invoices i
             LEFT JOIN users u ON u.id = i.owner_id
             ORDER BY i.created_at DESC, i.id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, name, email, amount, desc, status, owner, created, updated, u_name, u_email, u_role) in
            rows
        {
            let invoice = invoice_from_row((
                id, name, email, amount, desc, status, owner, created, updated,
            ))?;
            let owner_info = match (u_name, u_email, u_role) {
                (Some(full_name), Some(email), Some(role)) => Some(PrincipalSummary {
                    id: invoice.owner.clone(),
                    full_name,
                    email,
                    role: Role::from_str(&role).map_err(StoreError::Backend)?,
                }),
                // Owner was deleted; the invoice stays, unowned.
                _ => None,
            };
            out.push(InvoiceWithOwner {
                invoice,
                owner_info,
            });
        }
        Ok(out)
    }

    async fn update_invoice(
        &self,
        id: &InvoiceId,
        scope: &InvoiceScope,
        patch: &InvoicePatch,
    ) -> Result<Invoice, StoreError> {
        let set_clause = "customer_name = COALESCE(?, customer_name),
                          customer_email = COALESCE(?, customer_email),
                          amount = COALESCE(?, amount),
                          description = COALESCE(?, description),
                          status = COALESCE(?, status),
                          updated_at = ?";
        let now = Utc::now().timestamp_micros();
        let status = patch.status.map(|s| s.to_string());

        let result = match scope {
            InvoiceScope::Any => {
                sqlx::query(&format!(
                    "UPDATE invoices SET {} WHERE id = ?",
                    set_clause
                ))
                .bind(&patch.customer_name)
                .bind(&patch.customer_email)
                .bind(patch.amount)
                .bind(&patch.description)
                .bind(status)
                .bind(now)
                .bind(id.0.to_string())
                .execute(&self.pool)
                .await
            }
            InvoiceScope::OwnedBy(owner) => {
                sqlx::query(&format!(
                    "UPDATE invoices SET {} WHERE id = ? AND owner_id = ?",
                    set_clause
                ))
                .bind(&patch.customer_name)
                .bind(&patch.customer_email)
                .bind(patch.amount)
                .bind(&patch.description)
                .bind(status)
                .bind(now)
                .bind(id.0.to_string())
                .bind(owner.0.to_string())
                .execute(&self.pool)
                .await
            }
        }
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_invoice(id, scope).await
    }

    async fn delete_invoice(
        &self,
        id: &InvoiceId,
        scope: &InvoiceScope,
    ) -> Result<(), StoreError> {
        let result = match scope {
            InvoiceScope::Any => {
                sqlx::query("DELETE FROM invoices WHERE id = ?")
                    .bind(id.0.to_string())
                    .execute(&self.pool)
                    .await
            }
            InvoiceScope::OwnedBy(owner) => {
                sqlx::query("DELETE FROM invoices WHERE id = ? AND owner_id = ?")
                    .bind(id.0.to_string())
                    .bind(owner.0.to_string())
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
