use mongodb::bson::Document;
use serde::{Deserialize, Deserializer, Serialize};

/// Platform role. Anything unrecognised reads as `Student`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "instructor" => Role::Instructor,
            _ => Role::Student,
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(Role::from).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(default = "default_achievement_icon")]
    pub icon: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

fn default_achievement_icon() -> String {
    "medal".to_string()
}

/// Profile document in "users", keyed by the identity provider's uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<i64>,
    #[serde(default)]
    pub progress: Document,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

fn default_true() -> bool {
    true
}

/// Identity as reported by the identity provider after sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

impl User {
    /// Fresh profile for a first sign-in.
    pub fn new_profile(identity: &IdentityUser, now: i64) -> Self {
        Self {
            id: identity.uid.clone(),
            uid: identity.uid.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
            email: identity.email.clone(),
            role: Role::Student,
            is_active: true,
            created_at: now,
            last_login: Some(now),
            progress: Document::new(),
            achievements: Vec::new(),
        }
    }
}
