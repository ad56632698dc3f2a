//! Server tests: drive the real router end to end over in-memory SQLite.

mod common;

mod admin_invoices;
mod users;
