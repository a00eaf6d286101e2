//! Database models for contributions, payouts and group status.

use super::organizations::OrganizationDBResponse;
use crate::chama::RoundProgress;
use crate::types::{MemberId, OrganizationId, Round};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct ContributionCreateDBRequest {
    pub organization_id: OrganizationId,
    pub member_id: MemberId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContributionDBResponse {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub member_id: MemberId,
    pub round: Round,
    pub amount: Decimal,
    pub savings_portion: Decimal,
    pub payout_portion: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Pooled payout of a closed round, owed to that round's grantee
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PayoutDBResponse {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub member_id: MemberId,
    pub round: Round,
    pub amount: Decimal,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A recorded contribution, plus the payout created if it closed the round
#[derive(Debug, Clone)]
pub struct ContributionOutcome {
    pub contribution: ContributionDBResponse,
    pub payout: Option<PayoutDBResponse>,
}

/// What a single withdrawal released: claimed payouts plus the member's own savings share
#[derive(Debug, Clone)]
pub struct WithdrawalDBResponse {
    pub member_id: MemberId,
    pub payouts: Vec<PayoutDBResponse>,
    pub savings: Decimal,
}

impl WithdrawalDBResponse {
    pub fn payout_total(&self) -> Decimal {
        self.payouts.iter().map(|p| p.amount).sum()
    }

    pub fn total(&self) -> Decimal {
        self.payout_total() + self.savings
    }
}

#[derive(Debug, Clone)]
pub struct GroupStatusDBResponse {
    pub organization: OrganizationDBResponse,
    pub progress: RoundProgress,
    pub next_grantee: Option<MemberId>,
    pub unclaimed_payouts: Decimal,
}
