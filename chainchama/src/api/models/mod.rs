//! API request/response models.
//!
//! JSON field names are camelCase so existing front-end clients keep working unchanged.
//! Group endpoints wrap their payloads in a `{ "success": true, ... }` envelope; user endpoints
//! return bare records.

pub mod ledger;
pub mod members;
pub mod organizations;
pub mod pagination;
pub mod users;
