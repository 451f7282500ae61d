use crate::database::{decode_all, to_fields, DocumentStore, Query, SortOrder, ACTIVITY};
use crate::models::Activity;
use crate::utils::AppError;

pub const RECENT_LIMIT: i64 = 10;

pub async fn record(store: &dyn DocumentStore, kind: &str, message: String, now: i64) -> Result<(), AppError> {
    let activity = Activity {
        id: String::new(),
        kind: kind.to_string(),
        message,
        created_at: now,
    };
    store.create(ACTIVITY, to_fields(&activity)?).await?;
    Ok(())
}

/// Like `record`, but a failure only gets logged. The feed is best-effort.
pub async fn record_quietly(store: &dyn DocumentStore, kind: &str, message: String, now: i64) {
    if let Err(e) = record(store, kind, message, now).await {
        log::warn!("⚠️ Failed to record {} activity: {}", kind, e);
    }
}

pub async fn recent(store: &dyn DocumentStore) -> Result<Vec<Activity>, AppError> {
    let query = Query::collection(ACTIVITY)
        .order_by("createdAt", SortOrder::Desc)
        .limit(RECENT_LIMIT);
    Ok(decode_all(ACTIVITY, store.find(&query).await?))
}
