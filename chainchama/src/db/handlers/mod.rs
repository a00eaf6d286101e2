//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection` (a pooled connection or an open transaction) and
//! returns models from [`crate::db::models`]. Table-shaped repositories implement [`Repository`];
//! [`Ledger`] is the exception, as its operations span several tables and enforce the rules in
//! [`crate::chama`].
//!
//! - [`Users`], [`Accounts`], [`Sessions`]: users and OAuth bookkeeping
//! - [`Organizations`]: chama groups, linked to their creator on insert
//! - [`Members`]: wallets enrolled into groups
//! - [`Ledger`]: contributions, round closing, withdrawals, archiving and status
//!
//! ```ignore
//! use chainchama::db::handlers::{Repository, Users};
//!
//! let mut conn = pool.acquire().await?;
//! let mut repo = Users::new(&mut conn);
//! let user = repo.get_by_id(user_id).await?;
//! ```

pub mod accounts;
pub mod ledger;
pub mod members;
pub mod organizations;
pub mod repository;
pub mod sessions;
pub mod users;

pub use accounts::Accounts;
pub use ledger::Ledger;
pub use members::Members;
pub use organizations::Organizations;
pub use repository::Repository;
pub use sessions::Sessions;
pub use users::Users;
