//! Database models for users.

use crate::api::models::users::{UserCreate, UserUpdate};
use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone, Default)]
pub struct UserCreateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

impl From<UserCreate> for UserCreateDBRequest {
    fn from(api: UserCreate) -> Self {
        Self {
            name: api.name,
            email: api.email,
            email_verified: api.email_verified,
            image: api.image,
        }
    }
}

/// Database request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

impl From<UserUpdate> for UserUpdateDBRequest {
    fn from(api: UserUpdate) -> Self {
        Self {
            name: api.name,
            email: api.email,
            image: api.image,
        }
    }
}

/// Database response for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
