//! OIDC profile mapping.

use crate::config::AvatarConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Claims returned by the provider's userinfo endpoint / ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcProfile {
    /// Stable subject identifier
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// User fields derived from a profile. `id` is the provider subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: String,
}

/// Map a provider profile onto user fields. Empty names and emails are treated as absent.
pub fn map_profile(profile: &OidcProfile, avatars: &AvatarConfig) -> MappedProfile {
    MappedProfile {
        id: profile.sub.clone(),
        name: profile.name.clone().filter(|n| !n.is_empty()),
        email: profile.email.clone().filter(|e| !e.is_empty()),
        image: avatar_url(&profile.sub, avatars),
    }
}

/// Gravatar URL keyed by `hex(sha256(subject))`, falling back to a dicebear image seeded by the same hash.
pub fn avatar_url(subject: &str, avatars: &AvatarConfig) -> String {
    let hash = hex::encode(Sha256::digest(subject.as_bytes()));

    let fallback = format!("{}/seed={hash}", avatars.dicebear_base.as_str().trim_end_matches('/'));
    let fallback: String = url::form_urlencoded::byte_serialize(fallback.as_bytes()).collect();

    format!("{}/{hash}?d={fallback}", avatars.gravatar_base.as_str().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    // sha256("abc")
    const ABC_HASH: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_avatar_url_default_bases() {
        let url = avatar_url("abc", &AvatarConfig::default());
        assert_eq!(
            url,
            format!(
                "https://www.gravatar.com/avatar/{ABC_HASH}?d=https%3A%2F%2Fapi.dicebear.com%2F9.x%2Fadventurer%2Fpng%2Fseed%3D{ABC_HASH}"
            )
        );
    }

    #[test]
    fn test_avatar_url_is_deterministic_per_subject() {
        let avatars = AvatarConfig::default();
        assert_eq!(avatar_url("0xabc", &avatars), avatar_url("0xabc", &avatars));
        assert_ne!(avatar_url("0xabc", &avatars), avatar_url("0xabd", &avatars));
    }

    #[test]
    fn test_avatar_url_custom_bases_with_trailing_slash() {
        let avatars = AvatarConfig {
            gravatar_base: Url::parse("https://avatars.example.com/g/").unwrap(),
            dicebear_base: Url::parse("https://dice.example.com/png/").unwrap(),
        };
        let url = avatar_url("abc", &avatars);
        assert!(url.starts_with(&format!("https://avatars.example.com/g/{ABC_HASH}?d=")));
        assert!(url.ends_with(&format!("https%3A%2F%2Fdice.example.com%2Fpng%2Fseed%3D{ABC_HASH}")));
    }

    #[test]
    fn test_map_profile() {
        let profile = OidcProfile {
            sub: "abc".to_string(),
            name: Some(String::new()),
            email: Some("wanjiru@example.com".to_string()),
        };

        let mapped = map_profile(&profile, &AvatarConfig::default());
        assert_eq!(mapped.id, "abc");
        assert_eq!(mapped.name, None);
        assert_eq!(mapped.email.as_deref(), Some("wanjiru@example.com"));
        assert!(mapped.image.contains(ABC_HASH));
    }

    #[test]
    fn test_profile_missing_optional_claims() {
        let profile: OidcProfile = serde_json::from_str(r#"{"sub":"0x2ae8"}"#).unwrap();
        let mapped = map_profile(&profile, &AvatarConfig::default());
        assert!(mapped.name.is_none());
        assert!(mapped.email.is_none());
    }
}
