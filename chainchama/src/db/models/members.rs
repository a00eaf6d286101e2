//! Database models for group members.

use crate::api::models::members::{MemberCreate, MemberRole};
use crate::types::{MemberId, OrganizationId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct MemberCreateDBRequest {
    pub name: String,
    pub wallet: String,
    pub role: MemberRole,
    pub organization_id: OrganizationId,
}

impl From<MemberCreate> for MemberCreateDBRequest {
    fn from(api: MemberCreate) -> Self {
        Self {
            name: api.name.trim().to_string(),
            wallet: api.wallet,
            role: api.role,
            organization_id: api.organization_id,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberDBResponse {
    pub id: MemberId,
    pub name: String,
    pub wallet: String,
    pub role: MemberRole,
    pub organization_id: OrganizationId,
    pub created_at: DateTime<Utc>,
}
