use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::utils::AppError;

/// Direction of the single sort field a query may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_i32(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Collection-scoped read: equality filters, one sort field and a row limit.
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Bson)>,
    pub sort: Option<(String, SortOrder)>,
    pub limit: Option<i64>,
}

impl Query {
    pub fn collection(name: &str) -> Self {
        Self {
            collection: name.to_string(),
            filters: Vec::new(),
            sort: None,
            limit: None,
        }
    }

    pub fn filter(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter_document(&self) -> Document {
        let mut filter = Document::new();
        for (field, value) in &self.filters {
            filter.insert(field.clone(), value.clone());
        }
        filter
    }
}

/// A stored document with its key split out of the field data.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub fields: Document,
}

impl Record {
    /// Splits `_id` out of a raw document. String and ObjectId keys are accepted.
    pub fn from_document(mut doc: Document) -> Option<Self> {
        let id = match doc.remove("_id")? {
            Bson::String(s) => s,
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        Some(Self { id, fields: doc })
    }

    /// Merges the id into the field data as `id` and decodes the model.
    pub fn into_model<T: DeserializeOwned>(self) -> Result<T, AppError> {
        let mut doc = self.fields;
        doc.insert("id", self.id);
        Ok(bson::from_document(doc)?)
    }
}

/// Encodes a model for writing. An `id` field, if present, is dropped; keys
/// live outside the field data.
pub fn to_fields<T: Serialize>(model: &T) -> Result<Document, AppError> {
    let mut doc = bson::to_document(model)?;
    doc.remove("id");
    Ok(doc)
}

/// Decodes every record, skipping (and logging) documents that don't fit the model.
pub fn decode_all<T: DeserializeOwned>(collection: &str, records: Vec<Record>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match record.into_model::<T>() {
                Ok(model) => Some(model),
                Err(e) => {
                    log::warn!("⚠️ Skipping {}/{}: {}", collection, id, e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document and returns its key. A non-empty string `id`
    /// field is used as the key; otherwise one is generated.
    async fn create(&self, collection: &str, fields: Document) -> Result<String, AppError>;

    async fn find(&self, query: &Query) -> Result<Vec<Record>, AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, AppError>;

    /// Update-with-merge: sets the given fields, leaves the rest untouched and
    /// creates the document if it does not exist.
    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), AppError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError>;

    async fn count(&self, collection: &str) -> Result<u64, AppError>;
}

/// Pulls the caller-chosen key out of `fields`, or generates a fresh one.
pub(crate) fn take_key(fields: &mut Document) -> String {
    match fields.remove("id") {
        Some(Bson::String(id)) if !id.is_empty() => id,
        _ => uuid::Uuid::new_v4().simple().to_string(),
    }
}
