use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Video,
    Image,
    Document,
    #[default]
    #[serde(other)]
    Other,
}

impl MediaCategory {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("video/") {
            MediaCategory::Video
        } else if mime_type.starts_with("image/") {
            MediaCategory::Image
        } else if mime_type.contains("pdf") {
            MediaCategory::Document
        } else {
            MediaCategory::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaCategory::Video => "video",
            MediaCategory::Image => "image",
            MediaCategory::Document => "document",
            MediaCategory::Other => "other",
        }
    }
}

/// Media document in "media". The url points at where the file would live;
/// no bytes are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub uploaded_by: String,
    #[serde(default)]
    pub uploaded_at: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: MediaCategory,
}
