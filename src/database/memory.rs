use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use super::store::{take_key, DocumentStore, Query, Record, SortOrder};
use crate::utils::AppError;

/// In-process document store. Collections keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, mut fields: Document) -> Result<String, AppError> {
        let id = take_key(&mut fields);
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection.to_string()).or_default();

        if rows.iter().any(|(key, _)| *key == id) {
            return Err(AppError::DatabaseError(format!(
                "Document {}/{} already exists",
                collection, id
            )));
        }

        rows.push((id.clone(), fields));
        Ok(id)
    }

    async fn find(&self, query: &Query) -> Result<Vec<Record>, AppError> {
        let collections = self.collections.read().await;
        let rows = match collections.get(&query.collection) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        let mut matched: Vec<Record> = rows
            .iter()
            .filter(|(_, doc)| {
                query
                    .filters
                    .iter()
                    .all(|(field, value)| doc.get(field).is_some_and(|v| bson_eq(v, value)))
            })
            .map(|(id, doc)| Record {
                id: id.clone(),
                fields: doc.clone(),
            })
            .collect();

        if let Some((field, order)) = &query.sort {
            // Stable sort keeps insertion order among equal keys
            matched.sort_by(|a, b| {
                let ordering = compare_bson(a.fields.get(field), b.fields.get(field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit.max(0) as usize);
        }

        Ok(matched)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|rows| {
            rows.iter().find(|(key, _)| key == id).map(|(key, doc)| Record {
                id: key.clone(),
                fields: doc.clone(),
            })
        }))
    }

    async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection.to_string()).or_default();

        match rows.iter_mut().find(|(key, _)| key == id) {
            Some((_, doc)) => {
                for (field, value) in fields {
                    doc.insert(field, value);
                }
            }
            None => rows.push((id.to_string(), fields)),
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        let Some(rows) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|(key, _)| key != id);
        Ok(rows.len() != before)
    }

    async fn count(&self, collection: &str) -> Result<u64, AppError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |rows| rows.len() as u64))
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Equality that treats the numeric BSON types as one kind, the way the
/// server compares them.
fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering used for sorts. Missing and null values sort first.
fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    fn rank(value: Option<&Bson>) -> u8 {
        match value {
            None | Some(Bson::Null) => 0,
            Some(v) if as_number(v).is_some() => 1,
            Some(Bson::String(_)) => 2,
            Some(Bson::Boolean(_)) => 3,
            Some(Bson::DateTime(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (as_number(x), as_number(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => rank(a).cmp(&rank(b)),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}
