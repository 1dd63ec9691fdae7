use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::data::document::PostDocument;
use crate::data::store::{DocumentStore, Query};
use crate::domain::error::DomainError;

/// Largest page the backend hands out in one list call.
pub const MAX_BATCH: usize = 100;

#[derive(Clone)]
pub struct PostRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl PostRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    fn decode(documents: Vec<Value>) -> Result<Vec<PostDocument>, DomainError> {
        documents.into_iter().map(PostDocument::from_value).collect()
    }

    /// One backend page plus the backend's count of all matching documents.
    pub async fn list(&self, queries: &[Query]) -> Result<(usize, Vec<PostDocument>), DomainError> {
        let list = self.store.list_documents(&self.collection, queries).await?;
        Ok((list.total, Self::decode(list.documents)?))
    }

    /// Walks every page matching `filters`, newest first.
    pub async fn list_all(&self, filters: &[Query]) -> Result<Vec<PostDocument>, DomainError> {
        let mut posts = Vec::new();
        loop {
            let mut queries = filters.to_vec();
            queries.push(Query::newest_first());
            queries.push(Query::Limit(MAX_BATCH));
            queries.push(Query::Offset(posts.len()));

            let (total, batch) = self.list(&queries).await?;
            let fetched = batch.len();
            posts.extend(batch);
            if fetched < MAX_BATCH || posts.len() >= total {
                break;
            }
        }
        debug!(count = posts.len(), "fetched post documents");
        Ok(posts)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<PostDocument>, DomainError> {
        self.store
            .get_document(&self.collection, id)
            .await?
            .map(PostDocument::from_value)
            .transpose()
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<PostDocument>, DomainError> {
        let (_, mut posts) = self
            .list(&[Query::equal("slug", slug), Query::Limit(1)])
            .await?;
        Ok(posts.pop())
    }

    pub async fn create(
        &self,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<PostDocument, DomainError> {
        let created = self
            .store
            .create_document(&self.collection, id, fields)
            .await?;
        let post = PostDocument::from_value(created)?;
        info!(post_id = %post.id, slug = %post.slug, "post created");
        Ok(post)
    }

    pub async fn update(
        &self,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<PostDocument>, DomainError> {
        let updated = self
            .store
            .update_document(&self.collection, id, fields)
            .await?
            .map(PostDocument::from_value)
            .transpose()?;
        if updated.is_some() {
            info!(post_id = %id, "post updated");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let deleted = self.store.delete_document(&self.collection, id).await?;
        if deleted {
            info!(post_id = %id, "post deleted");
        }
        Ok(deleted)
    }
}
