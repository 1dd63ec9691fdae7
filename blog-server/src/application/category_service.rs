use tracing::instrument;

use crate::data::category_repository::CategoryRepository;
use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::slug::slugify;

/// Longest identifier the backend accepts for a document.
const MAX_ID_LEN: usize = 36;

#[derive(Clone)]
pub struct CategoryService {
    repo: CategoryRepository,
}

/// Category identifiers are the slug of the name, cut to the backend's limit.
pub fn category_id(name: &str) -> String {
    let slug = slugify(name);
    if slug.len() <= MAX_ID_LEN {
        return slug;
    }
    // slugs are ASCII, any byte index is a char boundary
    slug[..MAX_ID_LEN].trim_end_matches('-').to_string()
}

impl CategoryService {
    pub fn new(repo: CategoryRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.repo.list().await?;
        categories.sort_by_key(|c| c.name.to_lowercase());
        Ok(categories)
    }

    pub async fn get(&self, id: &str) -> Result<Category, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<Category, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::missing_field("name"));
        }
        let id = category_id(name);
        if id.is_empty() {
            return Err(DomainError::Validation(
                "name must contain at least one letter or digit".into(),
            ));
        }
        if self.repo.find_by_id(&id).await?.is_some() {
            return Err(DomainError::Validation(format!("category already exists: {id}")));
        }
        self.repo.create(&id, name).await
    }

    /// Renames a category. Its identifier, and so every post reference, stays put.
    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, name: &str) -> Result<Category, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::missing_field("name"));
        }
        self.repo
            .update(id, name)
            .await?
            .ok_or_else(|| DomainError::CategoryNotFound(id.to_string()))
    }

    /// Posts keep their reference to a deleted category; the mapper drops it
    /// when the post is read.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::CategoryNotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::category_id;

    #[test]
    fn ids_are_slugs_within_backend_limit() {
        assert_eq!(category_id("Web & Mobile"), "web-and-mobile");
        let long = category_id("a very long category name that keeps going - and going");
        assert!(long.len() <= 36);
        assert!(!long.ends_with('-'));
    }
}
