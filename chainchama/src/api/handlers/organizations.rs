use crate::AppState;
use crate::api::models::organizations::{GroupCreate, OrganizationEnvelope};
use crate::db::handlers::{Organizations, Repository, Users};
use crate::db::models::organizations::OrganizationCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::OrganizationId;
use axum::{
    Json,
    extract::{Path, State},
};

#[utoipa::path(
    post,
    path = "/group/create",
    tag = "groups",
    summary = "Create group",
    description = "Create a chama group owned by the user with the given email. Round length and savings ratio fall back to the configured defaults.",
    request_body = GroupCreate,
    responses(
        (status = 200, description = "Group created", body = OrganizationEnvelope),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorEnvelope),
        (status = 404, description = "User not found", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_group(State(state): State<AppState>, Json(create): Json<GroupCreate>) -> Result<Json<OrganizationEnvelope>> {
    create.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = Users::new(&mut conn)
        .get_user_by_email(create.email.trim())
        .await?
        .ok_or_else(|| Error::not_found("User not found"))?;

    let request = OrganizationCreateDBRequest::new(user.id, create, &state.config.chama);
    let organization = Organizations::new(&mut conn).create(&request).await?;

    tracing::info!(organization_id = organization.id, "Group created");

    Ok(Json(OrganizationEnvelope::new(organization)))
}

#[utoipa::path(
    get,
    path = "/group/{id}",
    tag = "groups",
    summary = "Get group",
    params(("id" = i64, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group details", body = OrganizationEnvelope),
        (status = 404, description = "Organization not found", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_group(State(state): State<AppState>, Path(id): Path<OrganizationId>) -> Result<Json<OrganizationEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let organization = Organizations::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found("Organization not found"))?;

    Ok(Json(OrganizationEnvelope::new(organization)))
}

#[cfg(test)]
mod tests {
    use crate::api::models::organizations::{GroupStatus, GroupType, OrganizationEnvelope};
    use crate::errors::ErrorEnvelope;
    use crate::test_utils::{create_test_app, create_test_user};
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_group_applies_defaults(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "chair@example.com").await;

        let response = app
            .post("/api/group/create")
            .json(&json!({
                "name": "  Umoja  ",
                "description": "Estate savings",
                "groupType": "MERRY_GO_ROUND",
                "role": "CHAIRPERSON",
                "email": "chair@example.com"
            }))
            .await;
        response.assert_status_ok();

        let body: OrganizationEnvelope = response.json();
        assert!(body.success);
        assert_eq!(body.organization.name, "Umoja");
        assert_eq!(body.organization.group_type, GroupType::MerryGoRound);
        assert_eq!(body.organization.status, GroupStatus::Active);
        assert_eq!(body.organization.created_by, Some(user.id));
        assert_eq!(body.organization.contribution_period_secs, 3600);
        assert_eq!(body.organization.savings_ratio_bps, 5000);
        assert_eq!(body.organization.current_round, 0);
        assert_eq!(body.organization.savings_balance, Decimal::ZERO);

        let response = app.get(&format!("/api/group/{}", body.organization.id)).await;
        response.assert_status_ok();
        let fetched: OrganizationEnvelope = response.json();
        assert_eq!(fetched.organization.id, body.organization.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_group_for_unknown_email(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/api/group/create")
            .json(&json!({
                "name": "Umoja",
                "description": "Estate savings",
                "groupType": "SACCO",
                "role": "CHAIRPERSON",
                "email": "nobody@example.com"
            }))
            .await;
        response.assert_status_not_found();
        let body: ErrorEnvelope = response.json();
        assert_eq!(body.error, "User not found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_group_rejects_invalid_terms(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_user(&pool, "chair@example.com").await;

        let response = app
            .post("/api/group/create")
            .json(&json!({
                "name": "Umoja",
                "description": "Estate savings",
                "groupType": "OTHER",
                "role": "CHAIRPERSON",
                "email": "chair@example.com",
                "savingsRatioBps": 12000
            }))
            .await;
        response.assert_status_bad_request();
        let body: ErrorEnvelope = response.json();
        assert!(!body.success);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_missing_group(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app.get("/api/group/999").await;
        response.assert_status_not_found();
        let body: ErrorEnvelope = response.json();
        assert_eq!(body.error, "Organization not found");
    }
}
