use mongodb::bson::doc;

use crate::database::{decode_all, to_fields, DocumentStore, Query, SortOrder, COURSES, MEDIA, USERS};
use crate::models::{Course, CourseForm, MediaAsset, Role, User};
use crate::services::activity_service;
use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_courses: u64,
    pub total_enrollments: i64,
    pub total_revenue: f64,
}

/// Headline numbers for the admin dashboard. The two reads run in parallel.
pub async fn load_stats(store: &dyn DocumentStore) -> Result<AdminStats, AppError> {
    let (users, courses) = tokio::join!(store.count(USERS), list_courses(store));
    let users = users?;
    let courses = courses?;

    Ok(AdminStats {
        total_users: users,
        total_courses: courses.len() as u64,
        total_enrollments: courses.iter().map(|c| c.enrolled_count).sum(),
        total_revenue: courses.iter().map(|c| c.price * c.enrolled_count as f64).sum(),
    })
}

pub async fn list_courses(store: &dyn DocumentStore) -> Result<Vec<Course>, AppError> {
    let query = Query::collection(COURSES).order_by("createdAt", SortOrder::Desc);
    Ok(decode_all(COURSES, store.find(&query).await?))
}

pub async fn list_users(store: &dyn DocumentStore) -> Result<Vec<User>, AppError> {
    let query = Query::collection(USERS).order_by("createdAt", SortOrder::Desc);
    Ok(decode_all(USERS, store.find(&query).await?))
}

pub async fn list_media(store: &dyn DocumentStore) -> Result<Vec<MediaAsset>, AppError> {
    let query = Query::collection(MEDIA).order_by("uploadedAt", SortOrder::Desc);
    Ok(decode_all(MEDIA, store.find(&query).await?))
}

fn validate(form: &CourseForm) -> Result<(), AppError> {
    if form.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Course title is required".to_string()));
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Creates a course authored by the signed-in admin and returns its id.
pub async fn create_course(
    store: &dyn DocumentStore,
    form: &CourseForm,
    author_uid: &str,
    author_name: &str,
    now: i64,
) -> Result<String, AppError> {
    validate(form)?;

    let course = Course {
        id: String::new(),
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        category: optional(&form.category),
        instructor: Some(author_name.to_string()),
        instructor_id: Some(author_uid.to_string()),
        price: form.price_value(),
        published: form.is_published(),
        featured: form.is_featured(),
        thumbnail: None,
        rating: Some(5.0),
        duration: Some("0h".to_string()),
        enrolled_count: 0,
        lessons: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let id = store.create(COURSES, to_fields(&course)?).await?;
    log::info!("✅ Course created: {} ({})", course.title, id);

    if course.published {
        activity_service::record_quietly(store, "course", format!("Course published: {}", course.title), now).await;
    }
    Ok(id)
}

/// Applies the form over an existing course. Authorship, counters and
/// creation time are left alone.
pub async fn update_course(store: &dyn DocumentStore, id: &str, form: &CourseForm, now: i64) -> Result<(), AppError> {
    validate(form)?;

    let existing: Course = store
        .get(COURSES, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {}", id)))?
        .into_model()?;

    let category = optional(&form.category);
    let fields = doc! {
        "title": form.title.trim(),
        "description": form.description.trim(),
        "category": category,
        "price": form.price_value(),
        "featured": form.is_featured(),
        "published": form.is_published(),
        "updatedAt": now,
    };
    store.merge(COURSES, id, fields).await?;
    log::info!("✅ Course updated: {}", id);

    if form.is_published() && !existing.published {
        activity_service::record_quietly(store, "course", format!("Course published: {}", form.title.trim()), now).await;
    }
    Ok(())
}

pub async fn delete_course(store: &dyn DocumentStore, id: &str) -> Result<(), AppError> {
    if !store.delete(COURSES, id).await? {
        return Err(AppError::NotFound(format!("course {}", id)));
    }
    log::info!("🗑️ Course deleted: {}", id);
    Ok(())
}

pub async fn set_user_role(store: &dyn DocumentStore, uid: &str, role: Role) -> Result<(), AppError> {
    if store.get(USERS, uid).await?.is_none() {
        return Err(AppError::NotFound(format!("user {}", uid)));
    }
    store.merge(USERS, uid, doc! { "role": role.as_str() }).await?;
    log::info!("✅ Role of {} set to {}", uid, role.as_str());
    Ok(())
}

/// Flips `isActive` and returns the new value.
pub async fn toggle_user_status(store: &dyn DocumentStore, uid: &str) -> Result<bool, AppError> {
    let user: User = store
        .get(USERS, uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", uid)))?
        .into_model()?;

    let active = !user.is_active;
    store.merge(USERS, uid, doc! { "isActive": active }).await?;
    log::info!("✅ User {} is now {}", uid, if active { "active" } else { "suspended" });
    Ok(active)
}

pub async fn delete_media(store: &dyn DocumentStore, id: &str) -> Result<(), AppError> {
    if !store.delete(MEDIA, id).await? {
        return Err(AppError::NotFound(format!("media {}", id)));
    }
    log::info!("🗑️ Media deleted: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, ACTIVITY};

    fn form(title: &str, price: &str, published: bool) -> CourseForm {
        CourseForm {
            title: title.to_string(),
            description: "About it".to_string(),
            category: "programming".to_string(),
            price: price.to_string(),
            featured: None,
            published: published.then(|| "on".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_course_fills_defaults() {
        let store = MemoryStore::new();
        let id = create_course(&store, &form("Rust 101", "", true), "uid-admin", "Root", 500)
            .await
            .unwrap();

        let course: Course = store.get(COURSES, &id).await.unwrap().unwrap().into_model().unwrap();
        assert_eq!(course.title, "Rust 101");
        assert_eq!(course.price, 0.0);
        assert_eq!(course.rating, Some(5.0));
        assert_eq!(course.duration.as_deref(), Some("0h"));
        assert_eq!(course.enrolled_count, 0);
        assert!(course.lessons.is_empty());
        assert_eq!(course.instructor_id.as_deref(), Some("uid-admin"));
        assert_eq!(store.count(ACTIVITY).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_course_requires_title() {
        let store = MemoryStore::new();
        let result = create_course(&store, &form("   ", "10", false), "u", "n", 1).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(store.count(COURSES).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_counters() {
        let store = MemoryStore::new();
        let id = create_course(&store, &form("Draft", "10", false), "uid-admin", "Root", 1)
            .await
            .unwrap();
        store.merge(COURSES, &id, doc! { "enrolledCount": 7_i64 }).await.unwrap();

        update_course(&store, &id, &form("Final", "19,90", true), 2).await.unwrap();

        let course: Course = store.get(COURSES, &id).await.unwrap().unwrap().into_model().unwrap();
        assert_eq!(course.title, "Final");
        assert_eq!(course.price, 19.9);
        assert!(course.published);
        assert_eq!(course.enrolled_count, 7);
        assert_eq!(course.created_at, 1);
        assert_eq!(course.updated_at, 2);
        assert_eq!(store.count(ACTIVITY).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_course_is_not_found() {
        let store = MemoryStore::new();
        let result = update_course(&store, "ghost", &form("X", "", false), 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.count(COURSES).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stats_sum_enrollments_and_revenue() {
        let store = MemoryStore::new();
        store.merge(USERS, "a", doc! { "role": "student" }).await.unwrap();
        store.merge(USERS, "b", doc! { "role": "admin" }).await.unwrap();
        store
            .create(COURSES, doc! { "title": "Paid", "price": 50.0, "enrolledCount": 3_i64 })
            .await
            .unwrap();
        store
            .create(COURSES, doc! { "title": "Free", "price": 0.0, "enrolledCount": 10_i64 })
            .await
            .unwrap();

        let stats = load_stats(&store).await.unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_courses, 2);
        assert_eq!(stats.total_enrollments, 13);
        assert_eq!(stats.total_revenue, 150.0);
    }

    #[tokio::test]
    async fn test_role_and_status_changes() {
        let store = MemoryStore::new();
        store.merge(USERS, "u1", doc! { "uid": "u1", "role": "student" }).await.unwrap();

        set_user_role(&store, "u1", Role::Instructor).await.unwrap();
        assert!(!toggle_user_status(&store, "u1").await.unwrap());
        assert!(toggle_user_status(&store, "u1").await.unwrap());

        let user: User = store.get(USERS, "u1").await.unwrap().unwrap().into_model().unwrap();
        assert_eq!(user.role, Role::Instructor);
        assert!(user.is_active);

        assert!(matches!(set_user_role(&store, "ghost", Role::Admin).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let store = MemoryStore::new();
        let id = store.create(MEDIA, doc! { "name": "a.png" }).await.unwrap();

        delete_media(&store, &id).await.unwrap();
        assert!(matches!(delete_media(&store, &id).await, Err(AppError::NotFound(_))));
        assert!(matches!(delete_course(&store, "nope").await, Err(AppError::NotFound(_))));
    }
}
