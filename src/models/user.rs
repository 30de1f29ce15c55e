//! User domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Full user record as stored by the repository.
///
/// Deliberately not `Serialize`: the only way to hand a user to a caller is
/// through one of the projections below, none of which carries the hash.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile_data: Value,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("last_login", &self.last_login)
            .finish()
    }
}

/// Fields for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub profile_data: Value,
}

/// Partial update applied by `update_by_id`. `None` leaves the column untouched.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile_data: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl UserChanges {
    /// An update that only bumps `updated_at`
    pub fn touch(now: DateTime<Utc>) -> Self {
        Self {
            name: None,
            password_hash: None,
            is_active: None,
            last_login: None,
            profile_data: None,
            updated_at: now,
        }
    }
}

/// Default profile attached to every new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileData {
    pub avatar: Option<String>,
    pub bio: String,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: String,
    pub notifications: bool,
    pub language: String,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            avatar: None,
            bio: String::new(),
            preferences: Preferences {
                theme: "space".to_string(),
                notifications: true,
                language: "en".to_string(),
            },
        }
    }
}

impl ProfileData {
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// User response (without sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile_data: Value,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: user.last_login,
            profile_data: user.profile_data,
        }
    }
}

/// Own profile, as returned by `GET /api/users/profile`
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile_data: Value,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            last_login: user.last_login,
            profile_data: user.profile_data,
        }
    }
}

/// Profile visible to anyone who knows the user id
#[derive(Debug, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub profile_data: Value,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            profile_data: user.profile_data,
        }
    }
}

/// Update profile request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: Option<String>,

    #[validate(nested)]
    pub profile_data: Option<ProfileDataUpdate>,
}

impl UpdateProfileRequest {
    /// Trim free-text fields before validation
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        if let Some(profile) = self.profile_data.as_mut() {
            profile.bio = profile.bio.take().map(|b| b.trim().to_string());
        }
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProfileDataUpdate {
    /// `Some(None)` clears the stored avatar
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    pub bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub preferences: Option<PreferencesUpdate>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PreferencesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_theme"))]
    pub theme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 2, message = "Language must be a 2-letter code"))]
    pub language: Option<String>,
}

/// Present field (null included) becomes `Some`; a missing field stays `None` via `default`
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_theme(theme: &str) -> Result<(), ValidationError> {
    match theme {
        "space" | "dark" | "light" => Ok(()),
        _ => {
            let mut err = ValidationError::new("theme");
            err.message = Some("Theme must be one of: space, dark, light".into());
            Err(err)
        }
    }
}

/// Change password request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ann@x.com".to_string(),
            name: "Ann".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$ZGlnZXN0".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login: None,
            profile_data: ProfileData::default().into_value(),
        }
    }

    #[test]
    fn test_user_response_has_no_password_hash() {
        let json = serde_json::to_value(UserResponse::from(sample_user())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ann@x.com");
        assert_eq!(json["profile_data"]["preferences"]["theme"], "space");
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let rendered = format!("{:?}", sample_user());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("argon2id"));
    }

    #[test]
    fn test_default_profile_data() {
        let value = ProfileData::default().into_value();
        assert!(value["avatar"].is_null());
        assert_eq!(value["bio"], "");
        assert_eq!(value["preferences"]["notifications"], true);
        assert_eq!(value["preferences"]["language"], "en");
    }

    #[test]
    fn test_update_profile_validation() {
        let ok = UpdateProfileRequest {
            name: Some("  Ann  ".to_string()),
            profile_data: Some(ProfileDataUpdate {
                preferences: Some(PreferencesUpdate {
                    theme: Some("dark".to_string()),
                    language: Some("fr".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        }
        .normalized();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.name.as_deref(), Some("Ann"));

        let short_name = UpdateProfileRequest {
            name: Some(" A ".to_string()),
            profile_data: None,
        }
        .normalized();
        assert!(short_name.validate().is_err());

        let bad_theme = UpdateProfileRequest {
            name: None,
            profile_data: Some(ProfileDataUpdate {
                preferences: Some(PreferencesUpdate {
                    theme: Some("neon".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };
        assert!(bad_theme.validate().is_err());

        let bad_language = UpdateProfileRequest {
            name: None,
            profile_data: Some(ProfileDataUpdate {
                preferences: Some(PreferencesUpdate {
                    language: Some("eng".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };
        assert!(bad_language.validate().is_err());
    }

    #[test]
    fn test_avatar_null_differs_from_missing() {
        let cleared: ProfileDataUpdate = serde_json::from_str(r#"{"avatar": null}"#).unwrap();
        assert_eq!(cleared.avatar, Some(None));
        assert_eq!(serde_json::to_value(&cleared).unwrap()["avatar"], Value::Null);

        let untouched: ProfileDataUpdate = serde_json::from_str(r#"{"bio": "hi"}"#).unwrap();
        assert_eq!(untouched.avatar, None);
        assert!(serde_json::to_value(&untouched).unwrap().get("avatar").is_none());

        let set: ProfileDataUpdate = serde_json::from_str(r#"{"avatar": "a.png"}"#).unwrap();
        assert_eq!(set.avatar, Some(Some("a.png".to_string())));
    }

    #[test]
    fn test_profile_update_rejects_unknown_fields() {
        let result: Result<UpdateProfileRequest, _> =
            serde_json::from_str(r#"{"name": "Ann", "password_hash": "x"}"#);
        assert!(result.is_err());
    }
}
