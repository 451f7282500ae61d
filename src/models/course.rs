use serde::{Deserialize, Serialize};

/// Course document in "courses".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub enrolled_count: i64,
    #[serde(default)]
    pub lessons: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Admin form payload for creating or editing a course.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Raw text from the form; blank or unparsable means free
    #[serde(default)]
    pub price: String,
    /// HTML checkboxes are only sent when ticked
    #[serde(default)]
    pub featured: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
}

impl CourseForm {
    pub fn price_value(&self) -> f64 {
        self.price
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn is_featured(&self) -> bool {
        self.featured.is_some()
    }

    pub fn is_published(&self) -> bool {
        self.published.is_some()
    }
}
