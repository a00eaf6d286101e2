//! OpenAPI documentation for the HTTP API served under `/api`.

use utoipa::OpenApi;

use crate::api;
use crate::errors::ErrorEnvelope;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ChainChama API",
        description = "Community savings groups: users, groups, members and contribution rounds."
    ),
    servers(
        (url = "/api", description = "ChainChama API server")
    ),
    paths(
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        api::handlers::users::get_user_groups,
        api::handlers::organizations::create_group,
        api::handlers::organizations::get_group,
        api::handlers::members::create_member,
        api::handlers::members::list_members,
        api::handlers::members::list_organization_members,
        api::handlers::ledger::contribute,
        api::handlers::ledger::withdraw,
        api::handlers::ledger::archive,
        api::handlers::ledger::group_status,
    ),
    components(
        schemas(
            ErrorEnvelope,
            api::models::users::UserCreate,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::models::users::AccountResponse,
            api::models::users::SessionResponse,
            api::models::users::UserDeleted,
            api::models::users::UserGroupsResponse,
            api::models::organizations::GroupType,
            api::models::organizations::GroupStatus,
            api::models::organizations::GroupCreate,
            api::models::organizations::OrganizationResponse,
            api::models::organizations::OrganizationEnvelope,
            api::models::members::MemberRole,
            api::models::members::MemberCreate,
            api::models::members::MemberResponse,
            api::models::members::MemberEnvelope,
            api::models::members::MembersEnvelope,
            api::models::ledger::ContributionCreate,
            api::models::ledger::ContributionResponse,
            api::models::ledger::ContributionReceipt,
            api::models::ledger::WithdrawRequest,
            api::models::ledger::WithdrawalResponse,
            api::models::ledger::ArchiveRequest,
            api::models::ledger::GroupStatusResponse,
        )
    ),
    tags(
        (name = "users", description = "Users, with their linked OAuth accounts and sessions"),
        (name = "groups", description = "Chama groups"),
        (name = "members", description = "Group membership"),
        (name = "ledger", description = "Contributions, payouts, withdrawals and archiving"),
    )
)]
pub struct ApiDoc;
