//! Database record models matching table schemas.
//!
//! Repositories in [`crate::db::handlers`] accept the `*DBRequest` types defined here and return the
//! `*DBResponse` types. API models convert from these with `From` impls, so the storage and wire
//! representations can evolve independently.
//!
//! - [`users`], [`accounts`], [`sessions`]: users and their OAuth bookkeeping
//! - [`organizations`]: chama groups and the users linked to them
//! - [`members`]: wallets enrolled into a group
//! - [`ledger`]: contributions, payouts and the derived group status

pub mod accounts;
pub mod ledger;
pub mod members;
pub mod organizations;
pub mod sessions;
pub mod users;
