use crate::AppState;
use crate::api::models::ledger::{ArchiveRequest, ContributionCreate, ContributionReceipt, GroupStatusResponse, WithdrawRequest, WithdrawalResponse};
use crate::api::models::organizations::OrganizationEnvelope;
use crate::chama::ChamaError;
use crate::db::errors::DbError;
use crate::db::handlers::{Ledger, Users};
use crate::db::models::ledger::ContributionCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::OrganizationId;
use axum::{
    Json,
    extract::{Path, State},
};

/// A missing row inside a ledger operation is always the group itself.
fn group_error(err: ChamaError) -> Error {
    match err {
        ChamaError::Database(DbError::NotFound) => Error::not_found("Organization not found"),
        other => other.into(),
    }
}

#[utoipa::path(
    post,
    path = "/group/{id}/contributions",
    tag = "ledger",
    summary = "Contribute",
    description = "Record a member's contribution for the current round. The contribution that completes the round closes it and assigns the pooled payout to the round's grantee.",
    request_body = ContributionCreate,
    params(("id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Contribution recorded", body = ContributionReceipt),
        (status = 400, description = "Invalid amount", body = crate::errors::ErrorEnvelope),
        (status = 403, description = "Not a member of this group", body = crate::errors::ErrorEnvelope),
        (status = 404, description = "Organization not found", body = crate::errors::ErrorEnvelope),
        (status = 409, description = "Group archived or member already contributed this round", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(organization_id = id))]
pub async fn contribute(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
    Json(create): Json<ContributionCreate>,
) -> Result<Json<ContributionReceipt>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let outcome = Ledger::new(&mut conn)
        .contribute(&ContributionCreateDBRequest {
            organization_id: id,
            member_id: create.member_id,
            amount: create.amount,
        })
        .await
        .map_err(group_error)?;

    Ok(Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/group/{id}/withdraw",
    tag = "ledger",
    summary = "Withdraw",
    description = "Claim every unclaimed payout owed to the member, plus the savings share of their own contributions not yet withdrawn. Also allowed once the group is archived.",
    request_body = WithdrawRequest,
    params(("id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Payouts and savings released", body = WithdrawalResponse),
        (status = 400, description = "Nothing to withdraw", body = crate::errors::ErrorEnvelope),
        (status = 403, description = "Not a member of this group", body = crate::errors::ErrorEnvelope),
        (status = 404, description = "Organization not found", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(organization_id = id))]
pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<WithdrawalResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let withdrawal = Ledger::new(&mut conn).withdraw(id, request.member_id).await.map_err(group_error)?;

    tracing::info!(member_id = withdrawal.member_id, amount = %withdrawal.total(), savings = %withdrawal.savings, "Withdrawal released");

    Ok(Json(withdrawal.into()))
}

#[utoipa::path(
    post,
    path = "/group/{id}/archive",
    tag = "ledger",
    summary = "Archive group",
    description = "Stop accepting contributions. Only the user who created the group may archive it.",
    request_body = ArchiveRequest,
    params(("id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group archived", body = OrganizationEnvelope),
        (status = 403, description = "Caller is not the group creator", body = crate::errors::ErrorEnvelope),
        (status = 404, description = "User or organization not found", body = crate::errors::ErrorEnvelope),
        (status = 409, description = "Group already archived", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(organization_id = id))]
pub async fn archive(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
    Json(request): Json<ArchiveRequest>,
) -> Result<Json<OrganizationEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = Users::new(&mut conn)
        .get_user_by_email(request.email.trim())
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;

    let organization = Ledger::new(&mut conn).archive(id, user.id).await.map_err(group_error)?;

    tracing::info!("Group archived");

    Ok(Json(OrganizationEnvelope::new(organization)))
}

#[utoipa::path(
    get,
    path = "/group/{id}/status",
    tag = "ledger",
    summary = "Group status",
    description = "Current round, who has and has not contributed, the upcoming grantee and balances.",
    params(("id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group status", body = GroupStatusResponse),
        (status = 404, description = "Organization not found", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all, fields(organization_id = id))]
pub async fn group_status(State(state): State<AppState>, Path(id): Path<OrganizationId>) -> Result<Json<GroupStatusResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let status = Ledger::new(&mut conn).status(id).await.map_err(group_error)?;

    Ok(Json(status.into()))
}

#[cfg(test)]
mod tests {
    use crate::api::models::ledger::{ContributionReceipt, GroupStatusResponse, WithdrawalResponse};
    use crate::api::models::organizations::{GroupStatus, OrganizationEnvelope};
    use crate::errors::ErrorEnvelope;
    use crate::test_utils::{create_test_app, create_test_member, create_test_organization, create_test_user};
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_full_round_then_withdraw(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "chair@example.com").await;
        let organization = create_test_organization(&pool, user.id).await;
        let a = create_test_member(&pool, organization.id, 1).await;
        let b = create_test_member(&pool, organization.id, 2).await;

        let response = app
            .post(&format!("/api/group/{}/contributions", organization.id))
            .json(&json!({"memberId": a.id, "amount": "10"}))
            .await;
        response.assert_status_ok();
        let receipt: ContributionReceipt = response.json();
        assert!(!receipt.round_closed);
        assert!(!response.text().contains("selectedGrantee"));
        assert_eq!(receipt.contribution.savings_portion, dec("5"));

        let response = app.get(&format!("/api/group/{}/status", organization.id)).await;
        response.assert_status_ok();
        let status: GroupStatusResponse = response.json();
        assert_eq!(status.contributed, vec![a.id]);
        assert_eq!(status.outstanding, vec![b.id]);
        assert_eq!(status.next_grantee, Some(a.id));

        let response = app
            .post(&format!("/api/group/{}/contributions", organization.id))
            .json(&json!({"memberId": b.id, "amount": 20}))
            .await;
        response.assert_status_ok();
        let receipt: ContributionReceipt = response.json();
        assert!(receipt.round_closed);
        assert_eq!(receipt.selected_grantee, Some(a.id));
        assert_eq!(receipt.payout_amount, Some(dec("15")));

        let response = app.get(&format!("/api/group/{}/status", organization.id)).await;
        let status: GroupStatusResponse = response.json();
        assert_eq!(status.current_round, 1);
        assert_eq!(status.selected_grantee, Some(a.id));
        assert_eq!(status.next_grantee, Some(b.id));
        assert_eq!(status.savings_balance, dec("15"));
        assert_eq!(status.unclaimed_payouts, dec("15"));

        let response = app
            .post(&format!("/api/group/{}/withdraw", organization.id))
            .json(&json!({"memberId": a.id}))
            .await;
        response.assert_status_ok();
        let withdrawal: WithdrawalResponse = response.json();
        assert_eq!(withdrawal.amount, dec("20"));
        assert_eq!(withdrawal.savings, dec("5"));
        assert_eq!(withdrawal.rounds, vec![0]);

        let status: GroupStatusResponse = app.get(&format!("/api/group/{}/status", organization.id)).await.json();
        assert_eq!(status.savings_balance, dec("10"));
        assert_eq!(status.unclaimed_payouts, Decimal::ZERO);

        let response = app
            .post(&format!("/api/group/{}/withdraw", organization.id))
            .json(&json!({"memberId": a.id}))
            .await;
        response.assert_status_bad_request();
        let error: ErrorEnvelope = response.json();
        assert_eq!(error.error, "Nothing to withdraw");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_contribution_errors(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "chair@example.com").await;
        let organization = create_test_organization(&pool, user.id).await;
        let other = create_test_organization(&pool, user.id).await;
        let a = create_test_member(&pool, organization.id, 1).await;
        create_test_member(&pool, organization.id, 2).await;
        let outsider = create_test_member(&pool, other.id, 3).await;

        let url = format!("/api/group/{}/contributions", organization.id);

        app.post(&url)
            .json(&json!({"memberId": a.id, "amount": "0"}))
            .await
            .assert_status_bad_request();

        app.post(&url)
            .json(&json!({"memberId": outsider.id, "amount": "1"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        app.post(&url).json(&json!({"memberId": a.id, "amount": "1"})).await.assert_status_ok();
        let response = app.post(&url).json(&json!({"memberId": a.id, "amount": "1"})).await;
        response.assert_status(StatusCode::CONFLICT);

        let response = app
            .post("/api/group/999/contributions")
            .json(&json!({"memberId": a.id, "amount": "1"}))
            .await;
        response.assert_status_not_found();
        let error: ErrorEnvelope = response.json();
        assert_eq!(error.error, "Organization not found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_archive_only_by_creator(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let creator = create_test_user(&pool, "chair@example.com").await;
        create_test_user(&pool, "member@example.com").await;
        let organization = create_test_organization(&pool, creator.id).await;
        let a = create_test_member(&pool, organization.id, 1).await;
        let url = format!("/api/group/{}/archive", organization.id);

        app.post(&url)
            .json(&json!({"email": "member@example.com"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = app.post(&url).json(&json!({"email": "nobody@example.com"})).await;
        response.assert_status_not_found();
        let error: ErrorEnvelope = response.json();
        assert_eq!(error.error, "User not found");

        let response = app.post(&url).json(&json!({"email": "chair@example.com"})).await;
        response.assert_status_ok();
        let body: OrganizationEnvelope = response.json();
        assert_eq!(body.organization.status, GroupStatus::Archived);

        app.post(&url)
            .json(&json!({"email": "chair@example.com"}))
            .await
            .assert_status(StatusCode::CONFLICT);

        let response = app
            .post(&format!("/api/group/{}/contributions", organization.id))
            .json(&json!({"memberId": a.id, "amount": "1"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let error: ErrorEnvelope = response.json();
        assert_eq!(error.error, "Group is archived");

        let status: GroupStatusResponse = app.get(&format!("/api/group/{}/status", organization.id)).await.json();
        assert_eq!(status.status, GroupStatus::Archived);
        assert_eq!(status.next_grantee, None);
        assert!(status.contributed.is_empty());
        assert!(status.outstanding.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_grantee_withdraws_at_least_ninety_percent_of_contribution(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "chair@example.com").await;
        let organization = create_test_organization(&pool, user.id).await;
        let a = create_test_member(&pool, organization.id, 1).await;

        let receipt: ContributionReceipt = app
            .post(&format!("/api/group/{}/contributions", organization.id))
            .json(&json!({"memberId": a.id, "amount": "1"}))
            .await
            .json();
        assert_eq!(receipt.selected_grantee, Some(a.id));

        let response = app
            .post(&format!("/api/group/{}/withdraw", organization.id))
            .json(&json!({"memberId": a.id}))
            .await;
        response.assert_status_ok();
        let withdrawal: WithdrawalResponse = response.json();
        assert!(withdrawal.amount > dec("0.9"));
        assert_eq!(withdrawal.amount, dec("1"));
    }
}
