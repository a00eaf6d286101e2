use crate::AppState;
use crate::api::models::organizations::OrganizationResponse;
use crate::api::models::users::{ListUsersQuery, UserCreate, UserDeleted, UserGroupsResponse, UserResponse, UserUpdate};
use crate::db::errors::DbError;
use crate::db::handlers::{
    Accounts, Organizations, Repository, Sessions, Users, accounts::AccountFilter, organizations::OrganizationFilter,
    sessions::SessionFilter, users::UserFilter,
};
use crate::db::models::users::{UserCreateDBRequest, UserUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::UserId;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::collections::HashMap;

const USER_NOT_FOUND: &str = "User not found";

#[utoipa::path(
    get,
    path = "/user",
    tag = "users",
    summary = "List users",
    description = "Users with their linked accounts and sessions. Provider tokens are never returned.",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, Query(query): Query<ListUsersQuery>) -> Result<Json<Vec<UserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let users = Users::new(&mut conn)
        .list(&UserFilter::new(query.pagination.skip(), query.pagination.limit()))
        .await?;

    let user_ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
    let mut accounts: HashMap<UserId, Vec<_>> = HashMap::new();
    for account in Accounts::new(&mut conn).list(&AccountFilter::for_users(user_ids.clone())).await? {
        accounts.entry(account.user_id).or_default().push(account);
    }
    let mut sessions: HashMap<UserId, Vec<_>> = HashMap::new();
    for session in Sessions::new(&mut conn).list(&SessionFilter::for_users(user_ids)).await? {
        sessions.entry(session.user_id).or_default().push(session);
    }

    let response = users
        .into_iter()
        .map(|user| {
            let id = user.id;
            UserResponse::from(user).with_relationships(accounts.remove(&id).unwrap_or_default(), sessions.remove(&id).unwrap_or_default())
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/user",
    tag = "users",
    summary = "Create user",
    request_body = UserCreate,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 409, description = "A user with this email already exists", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, Json(create): Json<UserCreate>) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = Users::new(&mut conn).create(&UserCreateDBRequest::from(create)).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "users",
    summary = "Get user",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with accounts and sessions", body = UserResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = Users::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
    let accounts = Accounts::new(&mut conn).list(&AccountFilter::for_users(vec![id])).await?;
    let sessions = Sessions::new(&mut conn).list(&SessionFilter::for_users(vec![id])).await?;

    Ok(Json(UserResponse::from(user).with_relationships(accounts, sessions)))
}

#[utoipa::path(
    put,
    path = "/user/{id}",
    tag = "users",
    summary = "Update user",
    request_body = UserUpdate,
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorEnvelope),
        (status = 409, description = "A user with this email already exists", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(State(state): State<AppState>, Path(id): Path<UserId>, Json(update): Json<UserUpdate>) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = Users::new(&mut conn)
        .update(id, &UserUpdateDBRequest::from(update))
        .await
        .map_err(|e| match e {
            DbError::NotFound => Error::not_found(USER_NOT_FOUND),
            other => Error::Database(other),
        })?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "users",
    summary = "Delete user",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = UserDeleted),
        (status = 404, description = "User not found", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<UserDeleted>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Users::new(&mut conn).delete(id).await? {
        Ok(Json(UserDeleted {
            message: "User deleted successfully".to_string(),
        }))
    } else {
        Err(Error::not_found(USER_NOT_FOUND))
    }
}

#[utoipa::path(
    get,
    path = "/user/{id}/groups",
    tag = "users",
    summary = "List a user's groups",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Groups linked to the user", body = UserGroupsResponse),
        (status = 404, description = "No organizations found for this user", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_groups(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<UserGroupsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let organizations = Organizations::new(&mut conn)
        .list(&OrganizationFilter::new(0, i64::MAX).for_user(id))
        .await?;

    if organizations.is_empty() {
        return Err(Error::not_found("No organizations found for this user"));
    }

    Ok(Json(UserGroupsResponse {
        success: true,
        organizations: organizations.into_iter().map(OrganizationResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::organizations::OrganizationEnvelope;
    use crate::api::models::users::{UserGroupsResponse, UserResponse};
    use crate::auth::{OidcProfile, ProviderTokens, sign_in};
    use crate::config::AuthConfig;
    use crate::errors::ErrorEnvelope;
    use crate::test_utils::{create_test_app, create_test_organization, create_test_user};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_then_get_user(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/api/user")
            .json(&json!({"name": "Wanjiru Kamau", "email": "wanjiru@example.com"}))
            .await;
        response.assert_status_ok();
        let created: UserResponse = response.json();
        assert_eq!(created.email.as_deref(), Some("wanjiru@example.com"));

        let response = app.get(&format!("/api/user/{}", created.id)).await;
        response.assert_status_ok();
        let fetched: UserResponse = response.json();
        assert_eq!(fetched.id, created.id);
        assert!(fetched.accounts.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_conflicts(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_user(&pool, "dup@example.com").await;

        let response = app.post("/api/user").json(&json!({"email": "dup@example.com"})).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorEnvelope = response.json();
        assert!(!body.success);
        assert_eq!(body.error, "A user with this email address already exists");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_user_is_404(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let missing = Uuid::new_v4();

        let response = app.get(&format!("/api/user/{missing}")).await;
        response.assert_status_not_found();
        let body: ErrorEnvelope = response.json();
        assert_eq!(body.error, "User not found");

        app.put(&format!("/api/user/{missing}"))
            .json(&json!({"name": "Nobody"}))
            .await
            .assert_status_not_found();
        app.delete(&format!("/api/user/{missing}")).await.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete_user(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "update@example.com").await;

        let response = app.put(&format!("/api/user/{}", user.id)).json(&json!({"name": "Achieng"})).await;
        response.assert_status_ok();
        let updated: UserResponse = response.json();
        assert_eq!(updated.name.as_deref(), Some("Achieng"));
        assert_eq!(updated.email.as_deref(), Some("update@example.com"));

        let response = app.delete(&format!("/api/user/{}", user.id)).await;
        response.assert_status_ok();
        response.assert_json(&json!({"message": "User deleted successfully"}));

        app.get(&format!("/api/user/{}", user.id)).await.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_group_creator_keeps_group(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let creator = create_test_user(&pool, "creator@example.com").await;
        create_test_user(&pool, "other@example.com").await;
        let organization = create_test_organization(&pool, creator.id).await;

        let response = app.delete(&format!("/api/user/{}", creator.id)).await;
        response.assert_status_ok();
        response.assert_json(&json!({"message": "User deleted successfully"}));

        let response = app.get(&format!("/api/group/{}", organization.id)).await;
        response.assert_status_ok();
        let body: OrganizationEnvelope = response.json();
        assert_eq!(body.organization.created_by, None);

        // With no creator left, nobody may archive the group
        app.post(&format!("/api/group/{}/archive", organization.id))
            .json(&json!({"email": "other@example.com"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_user_listing_hides_tokens(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            let profile = OidcProfile {
                sub: "0xsubject".to_string(),
                name: None,
                email: Some("oidc@example.com".to_string()),
            };
            let tokens = ProviderTokens {
                access_token: Some("very-secret-access-token".to_string()),
                ..Default::default()
            };
            sign_in(&mut conn, &AuthConfig::default(), "worldcoin", &profile, tokens).await.unwrap();
        }

        let response = app.get("/api/user").await;
        response.assert_status_ok();
        assert!(!response.text().contains("very-secret-access-token"));

        let users: Vec<UserResponse> = response.json();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].accounts.len(), 1);
        assert_eq!(users[0].sessions.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_user_groups(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, "groups@example.com").await;

        let response = app.get(&format!("/api/user/{}/groups", user.id)).await;
        response.assert_status_not_found();
        let body: ErrorEnvelope = response.json();
        assert_eq!(body.error, "No organizations found for this user");

        let organization = create_test_organization(&pool, user.id).await;
        let response = app.get(&format!("/api/user/{}/groups", user.id)).await;
        response.assert_status_ok();
        let body: UserGroupsResponse = response.json();
        assert!(body.success);
        assert_eq!(body.organizations.len(), 1);
        assert_eq!(body.organizations[0].id, organization.id);
    }
}
