//! Test utilities for integration testing (available with `test-utils` feature).

use crate::api::models::{members::MemberRole, organizations::GroupType};
use crate::config::{Config, PoolSettings};
use crate::db::{
    handlers::{Members, Organizations, Repository, Users},
    models::{
        members::{MemberCreateDBRequest, MemberDBResponse},
        organizations::{OrganizationCreateDBRequest, OrganizationDBResponse},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use crate::types::{OrganizationId, UserId};
use axum_test::TestServer;
use sqlx::PgPool;

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let app = crate::Application::new_with_pool(create_test_config(), Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.database.pool = PoolSettings {
        max_connections: 2,
        min_connections: 0,
        ..Default::default()
    };
    config
}

pub async fn create_test_user(pool: &PgPool, email: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            name: Some("Test User".to_string()),
            email: Some(email.to_string()),
            email_verified: None,
            image: None,
        })
        .await
        .expect("Failed to create test user")
}

/// Open-amount merry-go-round, one hour rounds, half of each contribution saved.
pub async fn create_test_organization(pool: &PgPool, created_by: UserId) -> OrganizationDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Organizations::new(&mut conn)
        .create(&OrganizationCreateDBRequest {
            name: "Test Chama".to_string(),
            description: "Test savings group".to_string(),
            group_type: GroupType::MerryGoRound,
            role: MemberRole::Chairperson,
            created_by,
            contribution_amount: None,
            contribution_period_secs: 3600,
            savings_ratio_bps: 5000,
        })
        .await
        .expect("Failed to create test organization")
}

/// Enroll a member whose wallet is derived from `n`, so different `n` never collide.
pub async fn create_test_member(pool: &PgPool, organization_id: OrganizationId, n: u32) -> MemberDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Members::new(&mut conn)
        .create(&MemberCreateDBRequest {
            name: format!("Member {n}"),
            wallet: test_wallet(n),
            role: MemberRole::Member,
            organization_id,
        })
        .await
        .expect("Failed to create test member")
}

pub fn test_wallet(n: u32) -> String {
    format!("0x{n:040x}")
}
