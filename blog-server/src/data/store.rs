//! Seams to the hosted backend: document collections, file storage and the
//! session/team service.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;
use crate::domain::session::{Credentials, SessionUser};

pub const CREATED_AT: &str = "$createdAt";
pub const ID: &str = "$id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Equal(String, String),
    Contains(String, String),
    OrderDesc(String),
    Limit(usize),
    Offset(usize),
}

impl Query {
    pub fn equal(field: &str, value: impl Into<String>) -> Self {
        Query::Equal(field.to_string(), value.into())
    }

    pub fn contains(field: &str, value: impl Into<String>) -> Self {
        Query::Contains(field.to_string(), value.into())
    }

    pub fn newest_first() -> Self {
        Query::OrderDesc(CREATED_AT.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentList {
    pub total: usize,
    pub documents: Vec<Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, DomainError>;
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, DomainError>;
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Value, DomainError>;
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, DomainError>;
    /// `false` when nothing was stored under `id`.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn list_files(&self) -> Result<Vec<StoredFile>, DomainError>;
    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, DomainError>;
    async fn delete_file(&self, id: &str) -> Result<bool, DomainError>;
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// `Ok(None)` when the credentials do not map to a live session.
    async fn current_user(&self, credentials: &Credentials)
    -> Result<Option<SessionUser>, DomainError>;
    async fn team_ids(&self, credentials: &Credentials) -> Result<Vec<String>, DomainError>;
}
