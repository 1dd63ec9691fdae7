//! In-process backend used for `BACKEND=memory` and by the test suite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::data::store::{
    CREATED_AT, DocumentList, DocumentStore, FileStorage, ID, Query, SessionProvider,
};
use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;
use crate::domain::session::{Credentials, SessionUser};

#[derive(Debug, Clone)]
struct StoredSession {
    user: SessionUser,
    teams: Vec<String>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    files: RwLock<Vec<(StoredFile, Vec<u8>)>>,
    sessions: RwLock<HashMap<String, StoredSession>>,
    reject_contains: AtomicBool,
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `Equal` is exact; substring matching ignores case, like the hosted
/// backend's collation.
fn field_matches(value: Option<&Value>, expected: &str, substring: bool) -> bool {
    match value {
        Some(Value::String(s)) if substring => {
            s.to_lowercase().contains(&expected.to_lowercase())
        }
        Some(Value::String(s)) => s == expected,
        Some(Value::Array(items)) => items.iter().any(|item| match item {
            Value::String(s) => s == expected,
            Value::Object(obj) => obj.get(ID).and_then(Value::as_str) == Some(expected),
            _ => false,
        }),
        _ => false,
    }
}

fn sort_key(doc: &Value, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `Contains` query fail, as a backend without the needed
    /// index would.
    pub fn reject_contains_queries(&self, reject: bool) {
        self.reject_contains.store(reject, Ordering::SeqCst);
    }

    /// Stores `document` as-is; `$id` and `$createdAt` are filled in when absent.
    pub async fn insert_document(&self, collection: &str, mut document: Value) -> Value {
        if let Value::Object(map) = &mut document {
            map.entry(ID)
                .or_insert_with(|| Value::String(Uuid::new_v4().simple().to_string()));
            map.entry(CREATED_AT)
                .or_insert_with(|| Value::String(timestamp()));
        }
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        document
    }

    pub async fn add_session(&self, secret: &str, user: SessionUser, teams: Vec<String>) {
        self.sessions
            .write()
            .await
            .insert(secret.to_string(), StoredSession { user, teams });
    }

    fn lookup_key(credentials: &Credentials) -> &str {
        match credentials {
            Credentials::SessionSecret(secret) => secret,
            Credentials::Jwt(token) => token,
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryBackend {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, DomainError> {
        let collections = self.collections.read().await;
        let mut documents: Vec<Value> = collections.get(collection).cloned().unwrap_or_default();
        let mut limit = None;
        let mut offset = 0;

        for query in queries {
            match query {
                Query::Equal(field, value) => {
                    documents.retain(|doc| field_matches(doc.get(field), value, false));
                }
                Query::Contains(field, value) => {
                    if self.reject_contains.load(Ordering::SeqCst) {
                        return Err(DomainError::Upstream(format!(
                            "index not found for attribute {field}"
                        )));
                    }
                    documents.retain(|doc| field_matches(doc.get(field), value, true));
                }
                Query::OrderDesc(field) => {
                    documents.sort_by(|a, b| sort_key(b, field).cmp(&sort_key(a, field)));
                }
                Query::Limit(n) => limit = Some(*n),
                Query::Offset(n) => offset = *n,
            }
        }

        let total = documents.len();
        let documents = documents
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(25))
            .collect();
        Ok(DocumentList { total, documents })
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, DomainError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.get(ID).and_then(Value::as_str) == Some(id)))
            .cloned())
    }

    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        mut data: Map<String, Value>,
    ) -> Result<Value, DomainError> {
        if self.get_document(collection, id).await?.is_some() {
            return Err(DomainError::Upstream(format!(
                "document {id} already exists in {collection}"
            )));
        }
        data.insert(ID.into(), Value::String(id.to_string()));
        Ok(self.insert_document(collection, Value::Object(data)).await)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, DomainError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections.get_mut(collection).and_then(|docs| {
            docs.iter_mut()
                .find(|d| d.get(ID).and_then(Value::as_str) == Some(id))
        }) else {
            return Ok(None);
        };

        if let Value::Object(map) = document {
            map.extend(data);
            map.insert("$updatedAt".into(), Value::String(timestamp()));
        }
        Ok(Some(document.clone()))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, DomainError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.get(ID).and_then(Value::as_str) != Some(id));
        Ok(docs.len() != before)
    }
}

#[async_trait]
impl FileStorage for InMemoryBackend {
    async fn list_files(&self) -> Result<Vec<StoredFile>, DomainError> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .map(|(file, _)| file.clone())
            .collect())
    }

    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, DomainError> {
        let id = Uuid::new_v4().simple().to_string();
        let file = StoredFile {
            url: format!("/files/{id}"),
            id,
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            created_at: Utc::now(),
        };
        self.files.write().await.push((file.clone(), bytes));
        Ok(file)
    }

    async fn delete_file(&self, id: &str) -> Result<bool, DomainError> {
        let mut files = self.files.write().await;
        let before = files.len();
        files.retain(|(file, _)| file.id != id);
        Ok(files.len() != before)
    }
}

#[async_trait]
impl SessionProvider for InMemoryBackend {
    async fn current_user(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<SessionUser>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(Self::lookup_key(credentials))
            .map(|s| s.user.clone()))
    }

    async fn team_ids(&self, credentials: &Credentials) -> Result<Vec<String>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(Self::lookup_key(credentials))
            .map(|s| s.teams.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn filters_orders_and_pages() {
        let store = InMemoryBackend::new();
        for (i, status) in ["published", "draft", "published", "published"].iter().enumerate() {
            store
                .insert_document(
                    "posts",
                    json!({
                        "$id": format!("p{i}"),
                        "$createdAt": format!("2024-01-0{}T00:00:00.000Z", i + 1),
                        "status": status,
                    }),
                )
                .await;
        }

        let list = store
            .list_documents(
                "posts",
                &[
                    Query::equal("status", "published"),
                    Query::newest_first(),
                    Query::Limit(2),
                    Query::Offset(1),
                ],
            )
            .await
            .unwrap();

        assert_eq!(list.total, 3);
        let ids: Vec<&str> = list.documents.iter().filter_map(|d| d["$id"].as_str()).collect();
        assert_eq!(ids, vec!["p2", "p0"]);
    }

    #[tokio::test]
    async fn contains_can_be_rejected() {
        let store = InMemoryBackend::new();
        store.insert_document("posts", json!({ "title": "Next steps" })).await;

        let found = store
            .list_documents("posts", &[Query::contains("title", "Next")])
            .await
            .unwrap();
        assert_eq!(found.total, 1);

        let lowered = store
            .list_documents("posts", &[Query::contains("title", "next")])
            .await
            .unwrap();
        assert_eq!(lowered.total, 1);

        store.reject_contains_queries(true);
        assert!(
            store
                .list_documents("posts", &[Query::contains("title", "Next")])
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_documents() {
        let store = InMemoryBackend::new();
        assert!(store.update_document("posts", "nope", Map::new()).await.unwrap().is_none());
        assert!(!store.delete_document("posts", "nope").await.unwrap());

        store.create_document("posts", "p1", Map::new()).await.unwrap();
        assert!(store.create_document("posts", "p1", Map::new()).await.is_err());
        assert!(store.delete_document("posts", "p1").await.unwrap());
    }
}
