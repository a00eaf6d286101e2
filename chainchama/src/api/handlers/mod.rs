//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates its input, runs the work through the repositories in
//! [`crate::db::handlers`] on a pooled connection and converts the result into an API model.
//!
//! # Handler Modules
//!
//! - [`users`]: User CRUD and the groups a user belongs to
//! - [`organizations`]: Group creation and lookup
//! - [`members`]: Enrolling members and listing them
//! - [`ledger`]: Contributions, withdrawals, archiving and round status

pub mod ledger;
pub mod members;
pub mod organizations;
pub mod users;
