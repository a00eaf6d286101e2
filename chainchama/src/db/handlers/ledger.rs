//! Database repository for the chama ledger: contributions, round closing, withdrawals and archiving.
//!
//! Every mutation runs in its own transaction and row-locks the organization first, so concurrent
//! contributions to the same group are applied one after another.

use crate::api::models::organizations::GroupStatus;
use crate::chama::{self, LedgerError, RoundProgress, grantee_for_round, round_progress, split_contribution, validate_contribution};
use crate::db::errors::DbError;
use crate::db::models::{
    ledger::{ContributionCreateDBRequest, ContributionDBResponse, ContributionOutcome, GroupStatusDBResponse, PayoutDBResponse, WithdrawalDBResponse},
    organizations::OrganizationDBResponse,
};
use crate::types::{MemberId, OrganizationId, Round, UserId, abbrev_uuid};
use rust_decimal::Decimal;
use sqlx::{Connection, PgConnection};
use tracing::instrument;

pub struct Ledger<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Ledger<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Record a contribution for the group's current round, closing the round if it was the last
    /// one outstanding.
    #[instrument(skip(self, request), fields(organization_id = request.organization_id, member_id = request.member_id), err)]
    pub async fn contribute(&mut self, request: &ContributionCreateDBRequest) -> chama::Result<ContributionOutcome> {
        let mut tx = self.db.begin().await?;

        let organization = lock_organization(&mut tx, request.organization_id).await?;
        validate_contribution(organization.status, organization.contribution_amount, request.amount)?;

        let members = member_ids(&mut tx, organization.id).await?;
        if !members.contains(&request.member_id) {
            return Err(LedgerError::NotAMember {
                member_id: request.member_id,
            }
            .into());
        }

        let round = organization.current_round;
        let mut contributed = contributor_ids(&mut tx, organization.id, round).await?;
        if contributed.contains(&request.member_id) {
            return Err(LedgerError::AlreadyContributed {
                member_id: request.member_id,
                round,
            }
            .into());
        }

        let split = split_contribution(request.amount, organization.savings_ratio_bps)?;

        let contribution = sqlx::query_as::<_, ContributionDBResponse>(
            r#"
            INSERT INTO contributions (organization_id, member_id, round, amount, savings_portion, payout_portion)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(organization.id)
        .bind(request.member_id)
        .bind(round)
        .bind(request.amount)
        .bind(split.savings)
        .bind(split.payout)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE organizations SET savings_balance = savings_balance + $2, updated_at = NOW() WHERE id = $1")
            .bind(organization.id)
            .bind(split.savings)
            .execute(&mut *tx)
            .await?;

        contributed.push(request.member_id);
        let progress = round_progress(&members, &contributed);

        let payout = match grantee_for_round(&members, round) {
            Some(grantee) if progress.is_complete() => Some(close_round(&mut tx, organization.id, round, grantee).await?),
            _ => None,
        };

        tx.commit().await?;

        if let Some(payout) = &payout {
            tracing::info!(round, grantee = payout.member_id, amount = %payout.amount, "Round closed");
        }

        Ok(ContributionOutcome { contribution, payout })
    }

    /// Claim every unclaimed payout owed to `member_id` in this group, together with the savings
    /// share of the member's own contributions not yet released. Allowed after archiving.
    #[instrument(skip(self), err)]
    pub async fn withdraw(&mut self, organization_id: OrganizationId, member_id: MemberId) -> chama::Result<WithdrawalDBResponse> {
        let mut tx = self.db.begin().await?;

        let organization = lock_organization(&mut tx, organization_id).await?;
        if !member_ids(&mut tx, organization.id).await?.contains(&member_id) {
            return Err(LedgerError::NotAMember { member_id }.into());
        }

        let mut payouts = sqlx::query_as::<_, PayoutDBResponse>(
            r#"
            UPDATE payouts SET claimed_at = NOW()
            WHERE organization_id = $1 AND member_id = $2 AND claimed_at IS NULL
            RETURNING *
            "#,
        )
        .bind(organization.id)
        .bind(member_id)
        .fetch_all(&mut *tx)
        .await?;

        let savings = sqlx::query_scalar::<_, Decimal>(
            r#"
            WITH released AS (
                UPDATE contributions SET savings_withdrawn_at = NOW()
                WHERE organization_id = $1 AND member_id = $2
                  AND savings_withdrawn_at IS NULL AND savings_portion > 0
                RETURNING savings_portion
            )
            SELECT COALESCE(SUM(savings_portion), 0) FROM released
            "#,
        )
        .bind(organization.id)
        .bind(member_id)
        .fetch_one(&mut *tx)
        .await?;

        if payouts.is_empty() && savings.is_zero() {
            return Err(LedgerError::NothingToWithdraw.into());
        }
        payouts.sort_by_key(|p| p.round);

        if !savings.is_zero() {
            sqlx::query("UPDATE organizations SET savings_balance = savings_balance - $2, updated_at = NOW() WHERE id = $1")
                .bind(organization.id)
                .bind(savings)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(WithdrawalDBResponse { member_id, payouts, savings })
    }

    /// Archive the group. Only its creator may do so.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn archive(&mut self, organization_id: OrganizationId, user_id: UserId) -> chama::Result<OrganizationDBResponse> {
        let mut tx = self.db.begin().await?;

        let organization = lock_organization(&mut tx, organization_id).await?;
        if organization.created_by != Some(user_id) {
            return Err(LedgerError::NotCreator.into());
        }
        if organization.status == GroupStatus::Archived {
            return Err(LedgerError::AlreadyArchived.into());
        }

        let archived = sqlx::query_as::<_, OrganizationDBResponse>(
            "UPDATE organizations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(organization.id)
        .bind(GroupStatus::Archived)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(archived)
    }

    /// Current round progress, upcoming grantee and balances of a group.
    #[instrument(skip(self), err)]
    pub async fn status(&mut self, organization_id: OrganizationId) -> chama::Result<GroupStatusDBResponse> {
        let organization = sqlx::query_as::<_, OrganizationDBResponse>("SELECT * FROM organizations WHERE id = $1")
            .bind(organization_id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        // An archived group has no open round
        let (progress, next_grantee) = match organization.status {
            GroupStatus::Active => {
                let members = member_ids(&mut *self.db, organization.id).await?;
                let contributed = contributor_ids(&mut *self.db, organization.id, organization.current_round).await?;
                (
                    round_progress(&members, &contributed),
                    grantee_for_round(&members, organization.current_round),
                )
            }
            GroupStatus::Archived => (RoundProgress::default(), None),
        };

        let unclaimed_payouts = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM payouts WHERE organization_id = $1 AND claimed_at IS NULL",
        )
        .bind(organization.id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(GroupStatusDBResponse {
            organization,
            progress,
            next_grantee,
            unclaimed_payouts,
        })
    }
}

async fn lock_organization(conn: &mut PgConnection, id: OrganizationId) -> chama::Result<OrganizationDBResponse> {
    let organization = sqlx::query_as::<_, OrganizationDBResponse>("SELECT * FROM organizations WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(organization)
}

/// Member ids in join order
async fn member_ids(conn: &mut PgConnection, organization_id: OrganizationId) -> chama::Result<Vec<MemberId>> {
    let ids = sqlx::query_scalar::<_, MemberId>("SELECT id FROM members WHERE organization_id = $1 ORDER BY id")
        .bind(organization_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(ids)
}

async fn contributor_ids(conn: &mut PgConnection, organization_id: OrganizationId, round: Round) -> chama::Result<Vec<MemberId>> {
    let ids = sqlx::query_scalar::<_, MemberId>("SELECT member_id FROM contributions WHERE organization_id = $1 AND round = $2 ORDER BY id")
        .bind(organization_id)
        .bind(round)
        .fetch_all(&mut *conn)
        .await?;

    Ok(ids)
}

/// Pool the round's payout portions for the grantee and advance the group to the next round.
async fn close_round(conn: &mut PgConnection, organization_id: OrganizationId, round: Round, grantee: MemberId) -> chama::Result<PayoutDBResponse> {
    let payout = sqlx::query_as::<_, PayoutDBResponse>(
        r#"
        INSERT INTO payouts (organization_id, member_id, round, amount)
        SELECT $1, $3, $2, COALESCE(SUM(payout_portion), 0)
        FROM contributions
        WHERE organization_id = $1 AND round = $2
        RETURNING *
        "#,
    )
    .bind(organization_id)
    .bind(round)
    .bind(grantee)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        UPDATE organizations SET
            selected_grantee_id = $2,
            current_round = current_round + 1,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(organization_id)
    .bind(grantee)
    .execute(&mut *conn)
    .await?;

    Ok(payout)
}
