use std::sync::Arc;

use tracing::info;

use crate::data::document::{CategoryDocument, category_fields};
use crate::data::post_repository::MAX_BATCH;
use crate::data::store::{DocumentStore, Query};
use crate::domain::category::Category;
use crate::domain::error::DomainError;

#[derive(Clone)]
pub struct CategoryRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = Vec::new();
        loop {
            let queries = [Query::Limit(MAX_BATCH), Query::Offset(categories.len())];
            let list = self
                .store
                .list_documents(&self.collection, &queries)
                .await?;
            let fetched = list.documents.len();
            for document in list.documents {
                categories.push(CategoryDocument::from_value(document)?.into_category());
            }
            if fetched < MAX_BATCH || categories.len() >= list.total {
                break;
            }
        }
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Category>, DomainError> {
        self.store
            .get_document(&self.collection, id)
            .await?
            .map(|doc| CategoryDocument::from_value(doc).map(CategoryDocument::into_category))
            .transpose()
    }

    pub async fn create(&self, id: &str, name: &str) -> Result<Category, DomainError> {
        let created = self
            .store
            .create_document(&self.collection, id, category_fields(name))
            .await?;
        let category = CategoryDocument::from_value(created)?.into_category();
        info!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn update(&self, id: &str, name: &str) -> Result<Option<Category>, DomainError> {
        let updated = self
            .store
            .update_document(&self.collection, id, category_fields(name))
            .await?
            .map(|doc| CategoryDocument::from_value(doc).map(CategoryDocument::into_category))
            .transpose()?;
        if updated.is_some() {
            info!(category_id = %id, "category updated");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let deleted = self.store.delete_document(&self.collection, id).await?;
        if deleted {
            info!(category_id = %id, "category deleted");
        }
        Ok(deleted)
    }
}
