//! API request/response models for group members.

use super::pagination::Pagination;
use crate::db::models::members::MemberDBResponse;
use crate::errors::{Error, Result};
use crate::types::{MemberId, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Role of a person within a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "member_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Chairperson,
    Member,
}

/// Enroll a wallet into a group.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreate {
    #[schema(example = "Otieno")]
    pub name: String,
    /// EVM address, `0x` followed by 40 hex digits
    #[schema(example = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F")]
    pub wallet: String,
    pub role: MemberRole,
    /// Accepts a number or a numeric string, as sent by HTML forms
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(value_type = i64)]
    pub organization_id: OrganizationId,
}

impl MemberCreate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("Member name is required"));
        }
        if !is_wallet_address(&self.wallet) {
            return Err(Error::bad_request("Wallet must be a 0x-prefixed 40 character hex address"));
        }
        Ok(())
    }
}

/// `0x` followed by exactly 40 hex digits, any case.
pub fn is_wallet_address(wallet: &str) -> bool {
    wallet
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: MemberId,
    pub name: String,
    pub wallet: String,
    pub role: MemberRole,
    pub organization_id: OrganizationId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberEnvelope {
    pub success: bool,
    pub member: MemberResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembersEnvelope {
    pub success: bool,
    pub members: Vec<MemberResponse>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListMembersQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

impl From<MemberDBResponse> for MemberResponse {
    fn from(db: MemberDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            wallet: db.wallet,
            role: db.role,
            organization_id: db.organization_id,
            created_at: db.created_at,
        }
    }
}

impl MembersEnvelope {
    pub fn new(members: Vec<MemberDBResponse>) -> Self {
        Self {
            success: true,
            members: members.into_iter().map(MemberResponse::from).collect(),
        }
    }
}
