use serde::{Deserialize, Serialize};

/// Entry in the admin "recent activity" feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// "user", "course", "purchase", "upload" ...
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub created_at: i64,
}
