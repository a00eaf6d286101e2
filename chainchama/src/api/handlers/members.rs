use crate::AppState;
use crate::api::models::members::{ListMembersQuery, MemberCreate, MemberEnvelope, MemberResponse, MembersEnvelope};
use crate::db::handlers::{Members, Organizations, Repository, members::MemberFilter};
use crate::db::models::members::MemberCreateDBRequest;
use crate::errors::{Error, Result};
use crate::types::OrganizationId;
use axum::{
    Json,
    extract::{Path, Query, State},
};

#[utoipa::path(
    post,
    path = "/group/members/create",
    tag = "members",
    summary = "Add member",
    description = "Enroll a wallet into a group. A wallet can join a given group once, compared case-insensitively.",
    request_body = MemberCreate,
    responses(
        (status = 200, description = "Member created", body = MemberEnvelope),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorEnvelope),
        (status = 404, description = "Organization not found", body = crate::errors::ErrorEnvelope),
        (status = 409, description = "Wallet already a member of the group", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_member(State(state): State<AppState>, Json(create): Json<MemberCreate>) -> Result<Json<MemberEnvelope>> {
    create.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Organizations::new(&mut conn).get_by_id(create.organization_id).await?.is_none() {
        return Err(Error::not_found("Organization not found"));
    }

    let member = Members::new(&mut conn).create(&MemberCreateDBRequest::from(create)).await?;

    Ok(Json(MemberEnvelope {
        success: true,
        member: MemberResponse::from(member),
    }))
}

#[utoipa::path(
    get,
    path = "/group/members/create",
    tag = "members",
    summary = "List all members",
    params(ListMembersQuery),
    responses(
        (status = 200, description = "Members across all groups", body = MembersEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_members(State(state): State<AppState>, Query(query): Query<ListMembersQuery>) -> Result<Json<MembersEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let (skip, limit) = query.pagination.params();
    let members = Members::new(&mut conn).list(&MemberFilter::new(skip, limit)).await?;

    Ok(Json(MembersEnvelope::new(members)))
}

#[utoipa::path(
    get,
    path = "/group/members/{organization_id}",
    tag = "members",
    summary = "List group members",
    params(
        ("organization_id" = i64, Path, description = "Group ID"),
        ListMembersQuery
    ),
    responses(
        (status = 200, description = "Members of the group in join order", body = MembersEnvelope),
        (status = 404, description = "No members found for this organization", body = crate::errors::ErrorEnvelope),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_organization_members(
    State(state): State<AppState>,
    Path(organization_id): Path<OrganizationId>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<MembersEnvelope>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let (skip, limit) = query.pagination.params();
    let members = Members::new(&mut conn)
        .list(&MemberFilter::new(skip, limit).in_organization(organization_id))
        .await?;

    if members.is_empty() {
        return Err(Error::not_found("No members found for this organization"));
    }

    Ok(Json(MembersEnvelope::new(members)))
}
