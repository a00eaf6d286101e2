//! Database models for chama groups.

use crate::api::models::members::MemberRole;
use crate::api::models::organizations::{GroupCreate, GroupStatus, GroupType};
use crate::config::ChamaConfig;
use crate::types::{MemberId, OrganizationId, Round, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a group, with configured defaults already applied
#[derive(Debug, Clone)]
pub struct OrganizationCreateDBRequest {
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    pub role: MemberRole,
    pub created_by: UserId,
    pub contribution_amount: Option<Decimal>,
    pub contribution_period_secs: i64,
    pub savings_ratio_bps: i32,
}

impl OrganizationCreateDBRequest {
    pub fn new(created_by: UserId, create: GroupCreate, defaults: &ChamaConfig) -> Self {
        Self {
            name: create.name.trim().to_string(),
            description: create.description,
            group_type: create.group_type,
            role: create.role,
            created_by,
            contribution_amount: create.contribution_amount,
            contribution_period_secs: create
                .contribution_period_secs
                .unwrap_or(defaults.default_contribution_period.as_secs() as i64),
            savings_ratio_bps: create.savings_ratio_bps.unwrap_or(defaults.default_savings_ratio_bps),
        }
    }
}

/// Database response for a group
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationDBResponse {
    pub id: OrganizationId,
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    pub role: MemberRole,
    pub status: GroupStatus,
    pub created_by: Option<UserId>,
    pub contribution_amount: Option<Decimal>,
    pub contribution_period_secs: i64,
    pub savings_ratio_bps: i32,
    pub current_round: Round,
    pub selected_grantee_id: Option<MemberId>,
    pub savings_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
