//! Common type definitions.
//!
//! # ID Types
//!
//! - [`UserId`]: User account identifier (UUID)
//! - [`AccountId`], [`SessionId`]: OAuth bookkeeping identifiers (UUID)
//! - [`OrganizationId`]: Chama group identifier (sequential, as exposed to the front end)
//! - [`MemberId`]: Group member identifier (sequential)
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type AccountId = Uuid;
pub type SessionId = Uuid;
pub type OrganizationId = i64;
pub type MemberId = i64;
pub type Round = i64;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
