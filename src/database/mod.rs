pub mod memory;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::{Client, Collection, Database, IndexModel};

pub use memory::MemoryStore;
pub use store::{decode_all, to_fields, DocumentStore, Query, Record, SortOrder};

use crate::utils::AppError;
use store::take_key;

pub const USERS: &str = "users";
pub const COURSES: &str = "courses";
pub const ENROLLMENTS: &str = "enrollments";
pub const MEDIA: &str = "media";
pub const ACTIVITY: &str = "activity";

const DEFAULT_DATABASE: &str = "learning_platform";

/// Opens the store named by `DATABASE_URL`. `memory://` selects the
/// in-process store; anything else is handed to the Mongo driver.
pub async fn connect(url: &str) -> Result<Arc<dyn DocumentStore>, AppError> {
    if url.starts_with("memory://") {
        log::warn!("⚠️ Using in-memory store, data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(MongoStore::new(url).await?))
}

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn new(uri: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Database name is the URI path, if any
        let db_name = uri
            .rsplit('/')
            .next()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':') && !s.contains('@'))
            .unwrap_or(DEFAULT_DATABASE);

        let db = client.database(db_name);
        db.list_collection_names().await?;
        log::info!("✅ Connected to MongoDB database: {}", db_name);

        let store = Self { db };
        store.ensure_indexes().await;
        Ok(store)
    }

    /// Indexes backing the loaders' filter and sort fields.
    async fn ensure_indexes(&self) {
        log::info!("🔧 Creating database indexes...");

        let indexes: [(&str, Document); 5] = [
            (COURSES, doc! { "featured": 1, "published": 1, "createdAt": -1 }),
            (COURSES, doc! { "createdAt": -1 }),
            (ENROLLMENTS, doc! { "userId": 1, "enrolledAt": -1 }),
            (MEDIA, doc! { "uploadedAt": -1 }),
            (ACTIVITY, doc! { "createdAt": -1 }),
        ];

        for (collection, keys) in indexes {
            let description = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
            let index = IndexModel::builder().keys(keys).build();
            match self.collection(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index ready: {}", description),
                Err(e) => log::debug!("   ℹ️  Index not created {}: {}", description, e),
            }
        }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

/// Matches string keys and, for documents written by other tools, ObjectId keys.
fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "$or": [ { "_id": id }, { "_id": oid } ] },
        Err(_) => doc! { "_id": id },
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn create(&self, collection: &str, mut fields: Document) -> Result<String, AppError> {
        let id = take_key(&mut fields);
        fields.insert("_id", Bson::String(id.clone()));
        self.collection(collection).insert_one(fields).await?;
        Ok(id)
    }

    async fn find(&self, query: &Query) -> Result<Vec<Record>, AppError> {
        let collection = self.collection(&query.collection);
        let mut action = collection.find(query.filter_document());
        if let Some((field, order)) = &query.sort {
            let mut sort = Document::new();
            sort.insert(field.clone(), order.as_i32());
            action = action.sort(sort);
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }

        let documents: Vec<Document> = action.await?.try_collect().await?;
        Ok(documents.into_iter().filter_map(Record::from_document).collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, AppError> {
        let found = self.collection(collection).find_one(id_filter(id)).await?;
        Ok(found.and_then(Record::from_document))
    }

    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), AppError> {
        self.collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let result = self.collection(collection).delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self, collection: &str) -> Result<u64, AppError> {
        Ok(self.collection(collection).count_documents(doc! {}).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_filter_accepts_object_ids() {
        let oid = ObjectId::new();
        let filter = id_filter(&oid.to_hex());
        assert!(filter.contains_key("$or"));

        assert_eq!(id_filter("user-1"), doc! { "_id": "user-1" });
    }

    #[tokio::test]
    async fn test_memory_url_selects_memory_store() {
        let store = connect("memory://").await.unwrap();
        assert_eq!(store.count(USERS).await.unwrap(), 0);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "mongodb://localhost:27017/learning_platform_test".to_string());
        let store = MongoStore::new(&url).await.unwrap();

        let query = Query::collection(COURSES)
            .filter("published", true)
            .order_by("createdAt", SortOrder::Desc)
            .limit(1);
        assert!(store.find(&query).await.unwrap().len() <= 1);
    }
}
