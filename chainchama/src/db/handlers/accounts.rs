//! Database repository for linked OAuth accounts.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::accounts::{AccountCreateDBRequest, AccountDBResponse},
};
use crate::types::{AccountId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing accounts
#[derive(Debug, Clone)]
pub struct AccountFilter {
    pub user_ids: Vec<UserId>,
}

impl AccountFilter {
    pub fn for_users(user_ids: Vec<UserId>) -> Self {
        Self { user_ids }
    }
}

pub struct Accounts<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Accounts<'c> {
    type CreateRequest = AccountCreateDBRequest;
    type Response = AccountDBResponse;
    type Id = AccountId;
    type Filter = AccountFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), provider = %request.provider), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let account = sqlx::query_as::<_, AccountDBResponse>(
            r#"
            INSERT INTO accounts (
                id, user_id, type, provider, provider_account_id,
                token_type, refresh_token, access_token, expires_at, scope, id_token
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.account_type)
        .bind(&request.provider)
        .bind(&request.provider_account_id)
        .bind(&request.token_type)
        .bind(&request.refresh_token)
        .bind(&request.access_token)
        .bind(request.expires_at)
        .bind(&request.scope)
        .bind(&request.id_token)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(account)
    }

    #[instrument(skip(self), fields(account_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let account = sqlx::query_as::<_, AccountDBResponse>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    #[instrument(skip(self, filter), fields(users = filter.user_ids.len()), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        if filter.user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let accounts = sqlx::query_as::<_, AccountDBResponse>("SELECT * FROM accounts WHERE user_id = ANY($1) ORDER BY created_at, id")
            .bind(filter.user_ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(accounts)
    }
}

impl<'c> Accounts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, provider_account_id), fields(provider = %provider), err)]
    pub async fn get_by_provider_account(&mut self, provider: &str, provider_account_id: &str) -> Result<Option<AccountDBResponse>> {
        let account = sqlx::query_as::<_, AccountDBResponse>("SELECT * FROM accounts WHERE provider = $1 AND provider_account_id = $2")
            .bind(provider)
            .bind(provider_account_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }
}
