//! Database repository for group members.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::members::{MemberCreateDBRequest, MemberDBResponse},
};
use crate::types::{MemberId, OrganizationId};
use sqlx::{PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing members
#[derive(Debug, Clone)]
pub struct MemberFilter {
    pub skip: i64,
    pub limit: i64,
    pub organization_id: Option<OrganizationId>,
}

impl MemberFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            organization_id: None,
        }
    }

    pub fn in_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }
}

pub struct Members<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Members<'c> {
    type CreateRequest = MemberCreateDBRequest;
    type Response = MemberDBResponse;
    type Id = MemberId;
    type Filter = MemberFilter;

    #[instrument(skip(self, request), fields(organization_id = request.organization_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let member = sqlx::query_as::<_, MemberDBResponse>(
            r#"
            INSERT INTO members (name, wallet, role, organization_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.wallet)
        .bind(request.role)
        .bind(request.organization_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(member)
    }

    #[instrument(skip(self), fields(member_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let member = sqlx::query_as::<_, MemberDBResponse>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(member)
    }

    /// Members in join order.
    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip, organization_id = ?filter.organization_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM members WHERE 1=1");

        if let Some(organization_id) = filter.organization_id {
            query.push(" AND organization_id = ");
            query.push_bind(organization_id);
        }

        query.push(" ORDER BY id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let members = query.build_query_as::<MemberDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(members)
    }
}

impl<'c> Members<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}
