use serde::{Deserialize, Serialize};

use super::Course;

/// Enrollment document in "enrollments". Written by an external process;
/// this service only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    #[serde(default)]
    pub progress: f64,
    /// Hours
    #[serde(default)]
    pub time_spent: f64,
    #[serde(default)]
    pub enrolled_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Exactly 100 is completed and exactly 0 is not started. Progress isn't
    /// clamped on write, so anything else (out-of-range values included)
    /// counts as in progress.
    pub fn from_progress(progress: f64) -> Self {
        if progress == 100.0 {
            ProgressStatus::Completed
        } else if progress == 0.0 {
            ProgressStatus::NotStarted
        } else {
            ProgressStatus::InProgress
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not-started",
            ProgressStatus::InProgress => "in-progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

impl Enrollment {
    pub fn status(&self) -> ProgressStatus {
        ProgressStatus::from_progress(self.progress)
    }

    /// Progress as shown on a bar.
    pub fn display_progress(&self) -> f64 {
        self.progress.clamp(0.0, 100.0)
    }
}

/// An enrollment joined with its course document.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrolledCourse {
    pub enrollment: Enrollment,
    pub course: Course,
}
