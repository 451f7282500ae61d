use futures::future::join_all;

use crate::database::{decode_all, DocumentStore, Query, SortOrder, COURSES, ENROLLMENTS};
use crate::models::{Course, EnrolledCourse, Enrollment, ProgressStatus, User};
use crate::services::profile_service;
use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseFilter {
    #[default]
    All,
    InProgress,
    Completed,
    NotStarted,
}

impl CourseFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("in-progress") => CourseFilter::InProgress,
            Some("completed") => CourseFilter::Completed,
            Some("not-started") => CourseFilter::NotStarted,
            _ => CourseFilter::All,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            CourseFilter::All => "all",
            CourseFilter::InProgress => "in-progress",
            CourseFilter::Completed => "completed",
            CourseFilter::NotStarted => "not-started",
        }
    }

    pub fn matches(self, status: ProgressStatus) -> bool {
        match self {
            CourseFilter::All => true,
            CourseFilter::InProgress => status == ProgressStatus::InProgress,
            CourseFilter::Completed => status == ProgressStatus::Completed,
            CourseFilter::NotStarted => status == ProgressStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardStats {
    pub enrolled: usize,
    pub completed: usize,
    pub study_hours: f64,
}

pub fn stats(enrollments: &[Enrollment]) -> DashboardStats {
    DashboardStats {
        enrolled: enrollments.len(),
        completed: enrollments
            .iter()
            .filter(|e| e.status() == ProgressStatus::Completed)
            .count(),
        study_hours: enrollments.iter().map(|e| e.time_spent).sum(),
    }
}

/// A user's enrollments, newest first.
pub async fn load_enrollments(store: &dyn DocumentStore, uid: &str) -> Result<Vec<Enrollment>, AppError> {
    let query = Query::collection(ENROLLMENTS)
        .filter("userId", uid)
        .order_by("enrolledAt", SortOrder::Desc);
    Ok(decode_all(ENROLLMENTS, store.find(&query).await?))
}

/// Joins each enrollment with its course, reading the courses in parallel.
/// Enrollments whose course is gone or unreadable are dropped.
pub async fn join_courses(store: &dyn DocumentStore, enrollments: &[Enrollment]) -> Vec<EnrolledCourse> {
    let lookups = enrollments.iter().map(|enrollment| async move {
        match store.get(COURSES, &enrollment.course_id).await {
            Ok(Some(record)) => match record.into_model::<Course>() {
                Ok(course) => Some(EnrolledCourse {
                    enrollment: enrollment.clone(),
                    course,
                }),
                Err(e) => {
                    log::warn!("⚠️ Unreadable course {}: {}", enrollment.course_id, e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("Enrollment {} points at missing course {}", enrollment.id, enrollment.course_id);
                None
            }
            Err(e) => {
                log::error!("❌ Failed to load course {}: {}", enrollment.course_id, e);
                None
            }
        }
    });

    join_all(lookups).await.into_iter().flatten().collect()
}

#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub profile: Option<User>,
    pub stats: DashboardStats,
    pub in_progress: Vec<EnrolledCourse>,
    pub courses: Vec<EnrolledCourse>,
    pub filter: CourseFilter,
}

/// Everything the student dashboard shows. Read failures are logged and the
/// affected sections come back empty.
pub async fn load_dashboard(store: &dyn DocumentStore, uid: &str, filter: CourseFilter) -> DashboardData {
    let (profile, enrollments) = tokio::join!(
        profile_service::get_profile(store, uid),
        load_enrollments(store, uid)
    );

    let profile = profile.unwrap_or_else(|e| {
        log::error!("❌ Failed to load profile {}: {}", uid, e);
        None
    });
    let enrollments = enrollments.unwrap_or_else(|e| {
        log::error!("❌ Failed to load enrollments for {}: {}", uid, e);
        Vec::new()
    });

    let joined = join_courses(store, &enrollments).await;

    let in_progress = joined
        .iter()
        .filter(|item| item.enrollment.status() == ProgressStatus::InProgress)
        .cloned()
        .collect();
    let courses = joined
        .into_iter()
        .filter(|item| filter.matches(item.enrollment.status()))
        .collect();

    DashboardData {
        profile,
        stats: stats(&enrollments),
        in_progress,
        courses,
        filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use mongodb::bson::doc;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for id in ["rust", "go", "zig"] {
            store
                .create(COURSES, doc! { "id": id, "title": id.to_uppercase(), "published": true })
                .await
                .unwrap();
        }
        let rows = [
            ("e1", "uid-ana", "rust", 100.0, 4.5, 1),
            ("e2", "uid-ana", "go", 40.0, 2.0, 2),
            ("e3", "uid-ana", "zig", 0.0, 0.0, 3),
            ("e4", "uid-ana", "deleted", 10.0, 1.5, 4),
            ("e5", "uid-bob", "rust", 50.0, 9.0, 5),
            ("e6", "uid-cid", "rust", 140.0, 1.0, 6),
            ("e7", "uid-cid", "go", 100.0, 1.0, 7),
        ];
        for (id, user, course, progress, spent, at) in rows {
            store
                .create(
                    ENROLLMENTS,
                    doc! {
                        "id": id,
                        "userId": user,
                        "courseId": course,
                        "progress": progress,
                        "timeSpent": spent,
                        "enrolledAt": at as i64,
                    },
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_enrollments_are_per_user_newest_first() {
        let store = seeded().await;
        let enrollments = load_enrollments(&store, "uid-ana").await.unwrap();
        let ids: Vec<_> = enrollments.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e4", "e3", "e2", "e1"]);
    }

    #[tokio::test]
    async fn test_stats_count_completed_and_sum_hours() {
        let store = seeded().await;
        let enrollments = load_enrollments(&store, "uid-ana").await.unwrap();
        let stats = stats(&enrollments);

        assert_eq!(stats.enrolled, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.study_hours, 8.0);
    }

    #[tokio::test]
    async fn test_dashboard_joins_courses_and_drops_missing() {
        let store = seeded().await;
        let data = load_dashboard(&store, "uid-ana", CourseFilter::All).await;

        let titles: Vec<_> = data.courses.iter().map(|c| c.course.title.as_str()).collect();
        assert_eq!(titles, vec!["ZIG", "GO", "RUST"]);

        let in_progress: Vec<_> = data.in_progress.iter().map(|c| c.course.id.as_str()).collect();
        assert_eq!(in_progress, vec!["go"]);
        assert!(data.profile.is_none());
    }

    #[tokio::test]
    async fn test_filter_narrows_course_list_only() {
        let store = seeded().await;
        let data = load_dashboard(&store, "uid-ana", CourseFilter::Completed).await;

        assert_eq!(data.courses.len(), 1);
        assert_eq!(data.courses[0].course.id, "rust");
        assert_eq!(data.stats.enrolled, 4);
        assert_eq!(data.in_progress.len(), 1);
    }

    #[tokio::test]
    async fn test_progress_past_100_is_not_completed() {
        let store = seeded().await;
        let data = load_dashboard(&store, "uid-cid", CourseFilter::Completed).await;

        assert_eq!(data.stats.completed, 1);
        assert_eq!(data.courses.len(), 1);
        assert_eq!(data.courses[0].course.id, "go");

        let in_progress: Vec<_> = data.in_progress.iter().map(|c| c.course.id.as_str()).collect();
        assert_eq!(in_progress, vec!["rust"]);
    }

    #[test]
    fn test_filter_parse_falls_back_to_all() {
        assert_eq!(CourseFilter::parse(Some("not-started")), CourseFilter::NotStarted);
        assert_eq!(CourseFilter::parse(Some("whatever")), CourseFilter::All);
        assert_eq!(CourseFilter::parse(None), CourseFilter::All);
    }
}
