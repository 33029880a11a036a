//! Profile Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Username length bounds
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;

/// Per-field public visibility toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub email: bool,
    pub bio: bool,
    pub location: bool,
    pub website: bool,
    pub socials: bool,
    pub collection_value: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            email: false,
            bio: true,
            location: true,
            website: true,
            socials: true,
            collection_value: false,
        }
    }
}

/// Social network handles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SocialHandles {
    #[validate(length(max = 64))]
    pub instagram: Option<String>,
    #[validate(length(max = 64))]
    pub twitter: Option<String>,
    #[validate(length(max = 64))]
    pub discord: Option<String>,
}

/// Profile entity (owner view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub socials: SocialHandles,
    pub visibility: Visibility,
    pub featured_item_ids: Vec<i64>,
    pub featured_collection_ids: Vec<i64>,
    /// Section order preference for the public profile page
    pub display_order: Vec<String>,
    pub created_at: i64,
}

/// Profile as seen by other users: hidden fields removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socials: Option<SocialHandles>,
    pub featured_item_ids: Vec<i64>,
    pub featured_collection_ids: Vec<i64>,
    pub display_order: Vec<String>,
}

impl Profile {
    /// Project onto the fields the owner chose to show
    pub fn to_public(&self) -> PublicProfile {
        let v = &self.visibility;
        PublicProfile {
            username: self.username.clone(),
            email: v.email.then(|| self.email.clone()),
            bio: self.bio.clone().filter(|_| v.bio),
            location: self.location.clone().filter(|_| v.location),
            website: self.website.clone().filter(|_| v.website),
            socials: v.socials.then(|| self.socials.clone()),
            featured_item_ids: self.featured_item_ids.clone(),
            featured_collection_ids: self.featured_collection_ids.clone(),
            display_order: self.display_order.clone(),
        }
    }
}

/// Username setup payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameSetup {
    pub username: String,
}

/// Profile update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(length(max = 100))]
    pub location: Option<String>,
    #[validate(url, length(max = 300))]
    pub website: Option<String>,
    #[validate(nested)]
    pub socials: Option<SocialHandles>,
    pub visibility: Option<Visibility>,
    #[validate(length(max = 24))]
    pub featured_item_ids: Option<Vec<i64>>,
    #[validate(length(max = 12))]
    pub featured_collection_ids: Option<Vec<i64>>,
    #[validate(length(max = 16))]
    pub display_order: Option<Vec<String>>,
}

/// Normalize and check a requested username; returns the lower-cased form
pub fn normalize_username(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    let len = name.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return None;
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return None;
    }
    Some(name)
}

/// Everything a visitor sees on `/api/users/{username}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfilePage {
    pub profile: PublicProfile,
    /// Featured items that are not Private, in featured order
    pub featured_items: Vec<super::CatalogItem>,
    pub featured_collections: Vec<super::Collection>,
    /// Only present when the owner shows it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub collection_value: Option<rust_decimal::Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            id: Uuid::nil(),
            username: "collector".into(),
            email: "c@example.com".into(),
            bio: Some("vintage tees".into()),
            location: Some("Austin".into()),
            website: None,
            socials: SocialHandles {
                instagram: Some("@tees".into()),
                ..Default::default()
            },
            visibility: Visibility::default(),
            featured_item_ids: vec![1, 2],
            featured_collection_ids: vec![],
            display_order: vec!["featured".into(), "collections".into()],
            created_at: 0,
        }
    }

    #[test]
    fn public_profile_hides_email_by_default() {
        let public = profile().to_public();
        assert_eq!(public.email, None);
        assert_eq!(public.bio.as_deref(), Some("vintage tees"));
        assert!(public.socials.is_some());
    }

    #[test]
    fn public_profile_respects_toggles() {
        let mut p = profile();
        p.visibility.bio = false;
        p.visibility.socials = false;
        p.visibility.email = true;
        let public = p.to_public();
        assert_eq!(public.bio, None);
        assert_eq!(public.socials, None);
        assert_eq!(public.email.as_deref(), Some("c@example.com"));
    }

    #[test]
    fn username_rules() {
        assert_eq!(normalize_username("  Tee_Fan99 ").as_deref(), Some("tee_fan99"));
        assert_eq!(normalize_username("ab"), None);
        assert_eq!(normalize_username("has space"), None);
        assert_eq!(normalize_username("dash-ed"), None);
        assert_eq!(normalize_username(&"a".repeat(31)), None);
        assert!(normalize_username(&"a".repeat(30)).is_some());
    }

    #[test]
    fn visibility_defaults_fill_missing_fields() {
        let v: Visibility = serde_json::from_str(r#"{"email":true}"#).unwrap();
        assert!(v.email);
        assert!(v.bio);
        assert!(!v.collection_value);
    }
}
