//! Database repository for sessions.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::sessions::{SessionCreateDBRequest, SessionDBResponse},
};
use crate::types::{SessionId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing sessions
#[derive(Debug, Clone)]
pub struct SessionFilter {
    pub user_ids: Vec<UserId>,
}

impl SessionFilter {
    pub fn for_users(user_ids: Vec<UserId>) -> Self {
        Self { user_ids }
    }
}

pub struct Sessions<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Sessions<'c> {
    type CreateRequest = SessionCreateDBRequest;
    type Response = SessionDBResponse;
    type Id = SessionId;
    type Filter = SessionFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let session = sqlx::query_as::<_, SessionDBResponse>(
            r#"
            INSERT INTO sessions (id, user_id, session_token, expires)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(&request.session_token)
        .bind(request.expires)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(session)
    }

    #[instrument(skip(self), fields(session_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let session = sqlx::query_as::<_, SessionDBResponse>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(session)
    }

    #[instrument(skip(self, filter), fields(users = filter.user_ids.len()), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        if filter.user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sessions = sqlx::query_as::<_, SessionDBResponse>("SELECT * FROM sessions WHERE user_id = ANY($1) ORDER BY created_at, id")
            .bind(filter.user_ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(sessions)
    }
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}
