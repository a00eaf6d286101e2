//! Database models for linked OAuth accounts.

use crate::types::{AccountId, UserId};
use chrono::{DateTime, Utc};

/// Database request for linking a provider account to a user
#[derive(Debug, Clone)]
pub struct AccountCreateDBRequest {
    pub user_id: UserId,
    pub account_type: String,
    pub provider: String,
    /// Subject identifier issued by the provider
    pub provider_account_id: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
}

/// Database response for an account. Carries provider tokens; API responses strip them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountDBResponse {
    pub id: AccountId,
    pub user_id: UserId,
    #[sqlx(rename = "type")]
    pub account_type: Option<String>,
    pub provider: String,
    pub provider_account_id: String,
    pub token_type: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
