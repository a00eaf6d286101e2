//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! Every route lives under `/api`:
//!
//! - **Users** (`/api/user/*`): user records with their linked accounts and sessions
//! - **Groups** (`/api/group/create`, `/api/group/{id}`): chama creation and lookup
//! - **Members** (`/api/group/members/*`): enrolling wallets and listing group membership
//! - **Ledger** (`/api/group/{id}/contributions`, `.../withdraw`, `.../archive`, `.../status`):
//!   contribution rounds, payouts and archiving
//!
//! Failed requests always answer with `{ "success": false, "error": "..." }`, see
//! [`crate::errors::ErrorEnvelope`].

pub mod handlers;
pub mod models;
