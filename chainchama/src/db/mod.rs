//! Database layer for data persistence and access.
//!
//! ```text
//! api::handlers ──► db::handlers (repositories) ──► db::models ──► PostgreSQL
//! ```
//!
//! - [`handlers`]: repositories, one per table plus the multi-table [`handlers::Ledger`]
//! - [`models`]: request and response records for those repositories
//! - [`errors`]: [`errors::DbError`], a categorisation of `sqlx::Error`
//!
//! Migrations live in `migrations/` and are embedded through [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
