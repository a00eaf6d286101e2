//! API request/response models for chama groups (organizations).

use super::members::MemberRole;
use crate::db::models::organizations::OrganizationDBResponse;
use crate::errors::{Error, Result};
use crate::types::{MemberId, OrganizationId, Round, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of savings group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "group_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupType {
    MerryGoRound,
    Sacco,
    Other,
}

/// Lifecycle state of a group. Archived groups accept no further contributions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "group_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    Active,
    Archived,
}

/// Request body for creating a new group. The group is linked to the user identified by `email`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreate {
    #[schema(example = "Umoja Merry-Go-Round")]
    pub name: String,
    #[schema(example = "Monthly rotating savings for the Umoja estate")]
    pub description: String,
    pub group_type: GroupType,
    /// Role of the creating user within the group
    pub role: MemberRole,
    /// Email of the creating user
    #[schema(example = "wanjiru@example.com")]
    pub email: String,
    /// Fixed amount every member contributes per round (any positive amount when absent)
    #[schema(value_type = Option<String>, example = "10")]
    pub contribution_amount: Option<Decimal>,
    /// Intended length of a contribution round in seconds. A schedule hint for clients: rounds
    /// close when every member has paid, not when the period elapses.
    #[schema(example = 3600)]
    pub contribution_period_secs: Option<i64>,
    /// Share of each contribution kept as group savings, in basis points (5000 = 50%)
    #[schema(example = 5000)]
    pub savings_ratio_bps: Option<i32>,
}

impl GroupCreate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::bad_request("Organization name is required"));
        }
        if self.description.trim().is_empty() {
            return Err(Error::bad_request("Description is required"));
        }
        if self.email.trim().is_empty() {
            return Err(Error::bad_request("Email is required"));
        }
        if let Some(amount) = self.contribution_amount
            && amount <= Decimal::ZERO
        {
            return Err(Error::bad_request("Contribution amount must be positive"));
        }
        if let Some(period) = self.contribution_period_secs
            && period <= 0
        {
            return Err(Error::bad_request("Contribution period must be positive"));
        }
        if let Some(ratio) = self.savings_ratio_bps
            && !(0..=crate::chama::BASIS_POINTS).contains(&ratio)
        {
            return Err(Error::bad_request("Savings ratio must be between 0 and 10000 basis points"));
        }
        Ok(())
    }
}

/// Full group details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: OrganizationId,
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    pub role: MemberRole,
    pub status: GroupStatus,
    /// Null once the creating user has been deleted
    #[schema(value_type = Option<String>, format = "uuid")]
    pub created_by: Option<UserId>,
    #[schema(value_type = Option<String>)]
    pub contribution_amount: Option<Decimal>,
    /// Schedule hint, not enforced by the ledger
    pub contribution_period_secs: i64,
    pub savings_ratio_bps: i32,
    pub current_round: Round,
    pub selected_grantee_id: Option<MemberId>,
    #[schema(value_type = String)]
    pub savings_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `{ "success": true, "organization": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationEnvelope {
    pub success: bool,
    pub organization: OrganizationResponse,
}

impl From<OrganizationDBResponse> for OrganizationResponse {
    fn from(db: OrganizationDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            group_type: db.group_type,
            role: db.role,
            status: db.status,
            created_by: db.created_by,
            contribution_amount: db.contribution_amount,
            contribution_period_secs: db.contribution_period_secs,
            savings_ratio_bps: db.savings_ratio_bps,
            current_round: db.current_round,
            selected_grantee_id: db.selected_grantee_id,
            savings_balance: db.savings_balance,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl OrganizationEnvelope {
    pub fn new(organization: impl Into<OrganizationResponse>) -> Self {
        Self {
            success: true,
            organization: organization.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "name": "Umoja",
            "description": "Estate savings",
            "groupType": "MERRY_GO_ROUND",
            "role": "CHAIRPERSON",
            "email": "wanjiru@example.com"
        })
    }

    #[test]
    fn test_group_create_parses_front_end_payload() {
        let create: GroupCreate = serde_json::from_value(create_body()).unwrap();
        assert_eq!(create.group_type, GroupType::MerryGoRound);
        assert_eq!(create.role, MemberRole::Chairperson);
        assert!(create.contribution_amount.is_none());
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_group_create_rejects_unknown_group_type() {
        let mut body = create_body();
        body["groupType"] = json!("PONZI");
        assert!(serde_json::from_value::<GroupCreate>(body).is_err());
    }

    #[test]
    fn test_group_create_validation() {
        let mut body = create_body();
        body["name"] = json!("   ");
        let create: GroupCreate = serde_json::from_value(body).unwrap();
        assert!(matches!(create.validate(), Err(Error::BadRequest { .. })));

        let mut body = create_body();
        body["savingsRatioBps"] = json!(12_000);
        let create: GroupCreate = serde_json::from_value(body).unwrap();
        assert!(matches!(create.validate(), Err(Error::BadRequest { .. })));

        let mut body = create_body();
        body["contributionAmount"] = json!("0");
        let create: GroupCreate = serde_json::from_value(body).unwrap();
        assert!(matches!(create.validate(), Err(Error::BadRequest { .. })));

        let mut body = create_body();
        body["contributionPeriodSecs"] = json!(-60);
        let create: GroupCreate = serde_json::from_value(body).unwrap();
        assert!(matches!(create.validate(), Err(Error::BadRequest { .. })));
    }
}
