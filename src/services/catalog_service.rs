use crate::database::{decode_all, DocumentStore, Query, SortOrder, COURSES};
use crate::models::Course;
use crate::utils::AppError;

pub const FEATURED_LIMIT: i64 = 6;

/// Newest featured, published courses for the landing page.
pub async fn featured_courses(store: &dyn DocumentStore) -> Result<Vec<Course>, AppError> {
    let query = Query::collection(COURSES)
        .filter("featured", true)
        .filter("published", true)
        .order_by("createdAt", SortOrder::Desc)
        .limit(FEATURED_LIMIT);

    let records = store.find(&query).await?;
    Ok(decode_all(COURSES, records))
}

/// Published course by id; drafts are not visible here.
pub async fn published_course(store: &dyn DocumentStore, id: &str) -> Result<Course, AppError> {
    let record = store
        .get(COURSES, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course {}", id)))?;

    let course: Course = record.into_model()?;
    if !course.published {
        return Err(AppError::NotFound(format!("course {}", id)));
    }
    Ok(course)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use mongodb::bson::doc;

    async fn add(store: &MemoryStore, id: &str, featured: bool, published: bool, created_at: i64) {
        store
            .create(
                COURSES,
                doc! {
                    "id": id,
                    "title": format!("Course {}", id),
                    "featured": featured,
                    "published": published,
                    "createdAt": created_at,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_featured_requires_both_flags_and_caps_at_six() {
        let store = MemoryStore::new();
        for i in 0..8 {
            add(&store, &format!("f{}", i), true, true, i).await;
        }
        add(&store, "draft", true, false, 100).await;
        add(&store, "plain", false, true, 101).await;

        let courses = featured_courses(&store).await.unwrap();
        let ids: Vec<_> = courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["f7", "f6", "f5", "f4", "f3", "f2"]);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let store = MemoryStore::new();
        assert!(featured_courses(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drafts_are_not_found() {
        let store = MemoryStore::new();
        add(&store, "live", false, true, 1).await;
        add(&store, "draft", false, false, 2).await;

        assert_eq!(published_course(&store, "live").await.unwrap().title, "Course live");
        assert!(matches!(published_course(&store, "draft").await, Err(AppError::NotFound(_))));
        assert!(matches!(published_course(&store, "nope").await, Err(AppError::NotFound(_))));
    }
}
