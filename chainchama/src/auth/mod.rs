//! Sign-in support for the OIDC provider.
//!
//! The provider handshake (redirects, code exchange, nonce and PKCE checks) happens in front of this
//! service. What arrives here is the verified profile and the provider tokens:
//!
//! - [`profile`]: maps an OIDC profile to a user record with a deterministic avatar URL
//! - [`sign_in`]: finds or creates the user, links the provider account and issues a session

pub mod profile;
pub mod sign_in;

pub use profile::{MappedProfile, OidcProfile, avatar_url, map_profile};
pub use sign_in::{ProviderTokens, SignIn, sign_in};
