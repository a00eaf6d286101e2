//! Database models for sessions.

use crate::types::{SessionId, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct SessionCreateDBRequest {
    pub user_id: UserId,
    pub session_token: String,
    pub expires: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionDBResponse {
    pub id: SessionId,
    pub user_id: UserId,
    pub session_token: String,
    pub expires: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
