//! Database repository for chama groups and the users linked to them.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::organizations::{OrganizationCreateDBRequest, OrganizationDBResponse},
};
use crate::types::{OrganizationId, UserId, abbrev_uuid};
use sqlx::{Connection, PgConnection, QueryBuilder};
use tracing::instrument;

/// Filter for listing groups
#[derive(Debug, Clone)]
pub struct OrganizationFilter {
    pub skip: i64,
    pub limit: i64,
    /// Only groups linked to this user
    pub user_id: Option<UserId>,
}

impl OrganizationFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, user_id: None }
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

pub struct Organizations<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Organizations<'c> {
    type CreateRequest = OrganizationCreateDBRequest;
    type Response = OrganizationDBResponse;
    type Id = OrganizationId;
    type Filter = OrganizationFilter;

    /// Creates the group and links it to its creator.
    #[instrument(skip(self, request), fields(name = %request.name, created_by = %abbrev_uuid(&request.created_by)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let organization = sqlx::query_as::<_, OrganizationDBResponse>(
            r#"
            INSERT INTO organizations (
                name, description, group_type, role, created_by,
                contribution_amount, contribution_period_secs, savings_ratio_bps
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.group_type)
        .bind(request.role)
        .bind(request.created_by)
        .bind(request.contribution_amount)
        .bind(request.contribution_period_secs)
        .bind(request.savings_ratio_bps)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_organizations (user_id, organization_id) VALUES ($1, $2)")
            .bind(request.created_by)
            .bind(organization.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(organization)
    }

    #[instrument(skip(self), fields(organization_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let organization = sqlx::query_as::<_, OrganizationDBResponse>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(organization)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT o.* FROM organizations o WHERE 1=1");

        if let Some(user_id) = filter.user_id {
            query.push(" AND EXISTS (SELECT 1 FROM user_organizations uo WHERE uo.organization_id = o.id AND uo.user_id = ");
            query.push_bind(user_id);
            query.push(")");
        }

        query.push(" ORDER BY o.id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let organizations = query.build_query_as::<OrganizationDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(organizations)
    }
}

impl<'c> Organizations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{members::MemberRole, organizations::{GroupStatus, GroupType}};
    use crate::test_utils::create_test_user;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn organization_create(name: &str, created_by: UserId) -> OrganizationCreateDBRequest {
        OrganizationCreateDBRequest {
            name: name.to_string(),
            description: "Estate savings".to_string(),
            group_type: GroupType::MerryGoRound,
            role: MemberRole::Chairperson,
            created_by,
            contribution_amount: Some(Decimal::from(10)),
            contribution_period_secs: 3600,
            savings_ratio_bps: 5000,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_links_creator(pool: PgPool) {
        let user = create_test_user(&pool, "creator@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Organizations::new(&mut conn);

        let organization = repo.create(&organization_create("Umoja", user.id)).await.unwrap();
        assert_eq!(organization.status, GroupStatus::Active);
        assert_eq!(organization.current_round, 0);
        assert_eq!(organization.savings_balance, Decimal::ZERO);
        assert!(organization.selected_grantee_id.is_none());

        let linked = repo.list(&OrganizationFilter::new(0, 10).for_user(user.id)).await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, organization.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_ids_increase_monotonically(pool: PgPool) {
        let user = create_test_user(&pool, "creator@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Organizations::new(&mut conn);

        let first = repo.create(&organization_create("First", user.id)).await.unwrap();
        let second = repo.create(&organization_create("Second", user.id)).await.unwrap();
        assert!(second.id > first.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_for_user_excludes_other_groups(pool: PgPool) {
        let alice = create_test_user(&pool, "alice@example.com").await;
        let bob = create_test_user(&pool, "bob@example.com").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Organizations::new(&mut conn);

        repo.create(&organization_create("Alice's", alice.id)).await.unwrap();
        repo.create(&organization_create("Bob's", bob.id)).await.unwrap();

        let for_alice = repo.list(&OrganizationFilter::new(0, 10).for_user(alice.id)).await.unwrap();
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].name, "Alice's");

        let all = repo.list(&OrganizationFilter::new(0, 10)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_missing_organization(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Organizations::new(&mut conn);
        assert!(repo.get_by_id(9999).await.unwrap().is_none());
    }
}
