//! API request/response models for contributions, withdrawals, archiving and group status.

use super::organizations::GroupStatus;
use crate::db::models::ledger::{ContributionDBResponse, ContributionOutcome, GroupStatusDBResponse, WithdrawalDBResponse};
use crate::types::{MemberId, OrganizationId, Round};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Record a member's contribution for the current round.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCreate {
    pub member_id: MemberId,
    /// Decimal amount, as a string or number
    #[schema(value_type = String, example = "10")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributionResponse {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub member_id: MemberId,
    pub round: Round,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub savings_portion: Decimal,
    #[schema(value_type = String)]
    pub payout_portion: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Result of a contribution. `selectedGrantee` is set when this contribution closed the round.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributionReceipt {
    pub success: bool,
    pub contribution: ContributionResponse,
    pub round_closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_grantee: Option<MemberId>,
    /// Pooled payout assigned to the grantee when the round closed
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub payout_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub member_id: MemberId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    pub success: bool,
    pub member_id: MemberId,
    /// Everything released: claimed payouts plus `savings`
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// The member's own savings share released by this withdrawal
    #[schema(value_type = String)]
    pub savings: Decimal,
    /// Rounds whose payouts were claimed
    pub rounds: Vec<Round>,
}

/// Archive a group. Only the user who created it may do so.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchiveRequest {
    #[schema(example = "wanjiru@example.com")]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatusResponse {
    pub success: bool,
    pub organization_id: OrganizationId,
    pub status: GroupStatus,
    pub current_round: Round,
    pub selected_grantee: Option<MemberId>,
    /// Member who will receive the current round's payout once it closes
    pub next_grantee: Option<MemberId>,
    pub contributed: Vec<MemberId>,
    pub outstanding: Vec<MemberId>,
    #[schema(value_type = String)]
    pub savings_balance: Decimal,
    #[schema(value_type = String)]
    pub unclaimed_payouts: Decimal,
}

impl From<ContributionDBResponse> for ContributionResponse {
    fn from(db: ContributionDBResponse) -> Self {
        Self {
            id: db.id,
            organization_id: db.organization_id,
            member_id: db.member_id,
            round: db.round,
            amount: db.amount,
            savings_portion: db.savings_portion,
            payout_portion: db.payout_portion,
            created_at: db.created_at,
        }
    }
}

impl From<ContributionOutcome> for ContributionReceipt {
    fn from(outcome: ContributionOutcome) -> Self {
        Self {
            success: true,
            round_closed: outcome.payout.is_some(),
            selected_grantee: outcome.payout.as_ref().map(|p| p.member_id),
            payout_amount: outcome.payout.as_ref().map(|p| p.amount),
            contribution: outcome.contribution.into(),
        }
    }
}

impl From<WithdrawalDBResponse> for WithdrawalResponse {
    fn from(db: WithdrawalDBResponse) -> Self {
        Self {
            success: true,
            member_id: db.member_id,
            amount: db.total(),
            savings: db.savings,
            rounds: db.payouts.iter().map(|p| p.round).collect(),
        }
    }
}

impl From<GroupStatusDBResponse> for GroupStatusResponse {
    fn from(db: GroupStatusDBResponse) -> Self {
        Self {
            success: true,
            organization_id: db.organization.id,
            status: db.organization.status,
            current_round: db.organization.current_round,
            selected_grantee: db.organization.selected_grantee_id,
            next_grantee: db.next_grantee,
            contributed: db.progress.contributed,
            outstanding: db.progress.outstanding,
            savings_balance: db.organization.savings_balance,
            unclaimed_payouts: db.unclaimed_payouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_contribution_amount_accepts_string_and_number() {
        let from_string: ContributionCreate = serde_json::from_value(json!({"memberId": 1, "amount": "10.5"})).unwrap();
        assert_eq!(from_string.amount, Decimal::from_str("10.5").unwrap());

        let from_number: ContributionCreate = serde_json::from_value(json!({"memberId": 1, "amount": 10})).unwrap();
        assert_eq!(from_number.amount, Decimal::from(10));
    }

    #[test]
    fn test_open_round_receipt_omits_grantee() {
        let now = Utc::now();
        let outcome = ContributionOutcome {
            contribution: ContributionDBResponse {
                id: 1,
                organization_id: 1,
                member_id: 1,
                round: 0,
                amount: Decimal::from(10),
                savings_portion: Decimal::from(5),
                payout_portion: Decimal::from(5),
                created_at: now,
            },
            payout: None,
        };

        let json = serde_json::to_value(ContributionReceipt::from(outcome)).unwrap();
        assert_eq!(json["roundClosed"], json!(false));
        assert!(json.get("selectedGrantee").is_none());
        assert_eq!(json["contribution"]["savingsPortion"], json!("5"));
    }
}
