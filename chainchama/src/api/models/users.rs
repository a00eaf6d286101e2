//! API request/response models for users and their OAuth bookkeeping.

use super::organizations::OrganizationResponse;
use super::pagination::Pagination;
use crate::db::models::{accounts::AccountDBResponse, sessions::SessionDBResponse, users::UserDBResponse};
use crate::types::{AccountId, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    #[schema(example = "Wanjiru Kamau")]
    pub name: Option<String>,
    #[schema(example = "wanjiru@example.com")]
    pub email: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// Linked OAuth account. Provider tokens are never returned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AccountId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
    pub scope: Option<String>,
    pub expires_at: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Active or expired session. The session token itself is never returned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SessionId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub expires: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accounts: Vec<AccountResponse>,
    pub sessions: Vec<SessionResponse>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListUsersQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDeleted {
    #[schema(example = "User deleted successfully")]
    pub message: String,
}

/// Organizations a user belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserGroupsResponse {
    pub success: bool,
    pub organizations: Vec<OrganizationResponse>,
}

impl From<AccountDBResponse> for AccountResponse {
    fn from(db: AccountDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            account_type: db.account_type,
            provider: db.provider,
            provider_account_id: db.provider_account_id,
            scope: db.scope,
            expires_at: db.expires_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<SessionDBResponse> for SessionResponse {
    fn from(db: SessionDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            expires: db.expires,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            email_verified: db.email_verified,
            image: db.image,
            created_at: db.created_at,
            updated_at: db.updated_at,
            accounts: Vec::new(), // By default, relationships are not included
            sessions: Vec::new(),
        }
    }
}

impl UserResponse {
    pub fn with_relationships(mut self, accounts: Vec<AccountDBResponse>, sessions: Vec<SessionDBResponse>) -> Self {
        self.accounts = accounts.into_iter().map(AccountResponse::from).collect();
        self.sessions = sessions.into_iter().map(SessionResponse::from).collect();
        self
    }
}
