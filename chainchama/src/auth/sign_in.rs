//! Persisting a completed OIDC sign-in.

use super::profile::{OidcProfile, map_profile};
use crate::config::AuthConfig;
use crate::db::{
    errors::{DbError, Result},
    handlers::{Accounts, Repository, Sessions, Users},
    models::{
        accounts::AccountCreateDBRequest,
        sessions::{SessionCreateDBRequest, SessionDBResponse},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use rand::prelude::RngExt;
use rand::rng;
use sqlx::{Connection, PgConnection};
use tracing::instrument;

/// Tokens handed back by the provider's token endpoint.
#[derive(Debug, Clone, Default)]
pub struct ProviderTokens {
    pub token_type: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    /// Unix timestamp (seconds)
    pub expires_at: Option<i64>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: UserDBResponse,
    pub session: SessionDBResponse,
    /// The user record was created by this sign-in
    pub created_user: bool,
}

/// Record a sign-in: reuse the user linked to `(provider, sub)`, else one with the same email, else
/// create one from the mapped profile. Then link the account and issue a fresh session.
#[instrument(skip(conn, config, profile, tokens), fields(provider = %provider), err)]
pub async fn sign_in(
    conn: &mut PgConnection,
    config: &AuthConfig,
    provider: &str,
    profile: &OidcProfile,
    tokens: ProviderTokens,
) -> Result<SignIn> {
    let mapped = map_profile(profile, &config.avatar);
    let mut tx = conn.begin().await?;

    let linked = Accounts::new(&mut tx).get_by_provider_account(provider, &mapped.id).await?;

    let (user, created_user) = match linked {
        Some(account) => {
            let user = Users::new(&mut tx).get_by_id(account.user_id).await?.ok_or(DbError::NotFound)?;
            (user, false)
        }
        None => {
            let existing = match &mapped.email {
                Some(email) => Users::new(&mut tx).get_user_by_email(email).await?,
                None => None,
            };

            let (user, created) = match existing {
                Some(user) => (user, false),
                None => {
                    let request = UserCreateDBRequest {
                        name: mapped.name.clone(),
                        email: mapped.email.clone(),
                        email_verified: None,
                        image: Some(mapped.image.clone()),
                    };
                    (Users::new(&mut tx).create(&request).await?, true)
                }
            };

            Accounts::new(&mut tx)
                .create(&AccountCreateDBRequest {
                    user_id: user.id,
                    account_type: "oauth".to_string(),
                    provider: provider.to_string(),
                    provider_account_id: mapped.id.clone(),
                    token_type: tokens.token_type,
                    refresh_token: tokens.refresh_token,
                    access_token: tokens.access_token,
                    expires_at: tokens.expires_at,
                    scope: tokens.scope,
                    id_token: tokens.id_token,
                })
                .await?;

            (user, created)
        }
    };

    let session = Sessions::new(&mut tx)
        .create(&SessionCreateDBRequest {
            user_id: user.id,
            session_token: generate_session_token(),
            expires: Utc::now() + config.session_ttl,
        })
        .await?;

    tx.commit().await?;

    tracing::debug!(created_user, "Sign-in recorded");

    Ok(SignIn {
        user,
        session,
        created_user,
    })
}

/// 256 random bits, base64url without padding
fn generate_session_token() -> String {
    let mut token_bytes = [0u8; 32];
    rng().fill(&mut token_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}
