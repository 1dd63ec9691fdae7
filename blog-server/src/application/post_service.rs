use futures_util::future::{try_join, try_join3};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::data::category_repository::CategoryRepository;
use crate::data::document::{PostDocument, new_post_fields, patch_fields};
use crate::data::post_repository::{MAX_BATCH, PostRepository};
use crate::data::store::Query;
use crate::domain::error::DomainError;
use crate::domain::pagination::{PAGE_SIZE, Page, offset, paginate, total_pages};
use crate::domain::post::{BlogPost, NewPost, PostPatch, PostStatus};
use crate::domain::slug::slugify;
use crate::domain::tags::{TagSummary, has_tag, summarize_tags};
use crate::infrastructure::analytics::AnalyticsClient;

/// Posts scanned client-side when the backend cannot run substring filters.
pub const SEARCH_FALLBACK_LIMIT: usize = 100;

/// Public path prefix of a post page, as recorded by analytics.
pub const POST_PATH_PREFIX: &str = "/blog/";

const SEARCH_FIELDS: [&str; 3] = ["title", "content", "keywords"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularPost {
    #[serde(flatten)]
    pub post: BlogPost,
    pub views: u64,
}

#[derive(Clone)]
pub struct PostService {
    posts: PostRepository,
    categories: CategoryRepository,
    analytics: Option<AnalyticsClient>,
}

fn published() -> Query {
    Query::equal("status", PostStatus::Published.as_str())
}

fn matches_search(doc: &PostDocument, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&doc.title) || contains(&doc.content) || doc.keywords.as_deref().is_some_and(contains)
}

fn slug_from_path(path: &str) -> Option<&str> {
    let slug = path
        .strip_prefix(POST_PATH_PREFIX)?
        .split(['?', '#'])
        .next()?
        .trim_end_matches('/');
    (!slug.is_empty() && !slug.contains('/')).then_some(slug)
}

impl PostService {
    pub fn new(
        posts: PostRepository,
        categories: CategoryRepository,
        analytics: Option<AnalyticsClient>,
    ) -> Self {
        Self {
            posts,
            categories,
            analytics,
        }
    }

    async fn resolve(&self, documents: Vec<PostDocument>) -> Result<Vec<BlogPost>, DomainError> {
        let categories = self.categories.list().await?;
        Ok(documents
            .into_iter()
            .map(|doc| doc.into_post(&categories))
            .collect())
    }

    /// Every published post, newest first, with categories resolved.
    async fn all_published(&self) -> Result<Vec<BlogPost>, DomainError> {
        let filters = [published()];
        let (documents, categories) =
            try_join(self.posts.list_all(&filters), self.categories.list()).await?;
        Ok(documents
            .into_iter()
            .map(|doc| doc.into_post(&categories))
            .collect())
    }

    pub async fn list_posts(
        &self,
        page: usize,
        include_drafts: bool,
    ) -> Result<Page<BlogPost>, DomainError> {
        let page = page.max(1);
        let mut queries = Vec::with_capacity(4);
        if !include_drafts {
            queries.push(published());
        }
        queries.push(Query::newest_first());
        queries.push(Query::Limit(PAGE_SIZE));
        queries.push(Query::Offset(offset(page, PAGE_SIZE)));

        let ((total, documents), categories) =
            try_join(self.posts.list(&queries), self.categories.list()).await?;

        Ok(Page {
            posts: documents
                .into_iter()
                .map(|doc| doc.into_post(&categories))
                .collect(),
            total,
            page,
            total_pages: total_pages(total, PAGE_SIZE),
        })
    }

    pub async fn get_post(&self, id: &str) -> Result<BlogPost, DomainError> {
        let (document, categories) =
            try_join(self.posts.find_by_id(id), self.categories.list()).await?;
        document
            .map(|doc| doc.into_post(&categories))
            .ok_or_else(|| DomainError::PostNotFound(id.to_string()))
    }

    pub async fn get_post_by_slug(
        &self,
        slug: &str,
        include_drafts: bool,
    ) -> Result<BlogPost, DomainError> {
        let (document, categories) =
            try_join(self.posts.find_by_slug(slug), self.categories.list()).await?;
        document
            .map(|doc| doc.into_post(&categories))
            .filter(|post| include_drafts || post.is_published())
            .ok_or_else(|| DomainError::PostNotFound(slug.to_string()))
    }

    /// Other published posts sharing at least one category with `post`.
    pub async fn related_posts(
        &self,
        post: &BlogPost,
        limit: usize,
    ) -> Result<Vec<BlogPost>, DomainError> {
        if limit == 0 || post.category.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .all_published()
            .await?
            .into_iter()
            .filter(|other| {
                other.id != post.id && post.category.iter().any(|c| other.has_category(&c.id))
            })
            .take(limit)
            .collect())
    }

    pub async fn posts_in_category(
        &self,
        category_id: &str,
        page: usize,
    ) -> Result<Page<BlogPost>, DomainError> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(DomainError::CategoryNotFound(category_id.to_string()));
        }
        let posts: Vec<BlogPost> = self
            .all_published()
            .await?
            .into_iter()
            .filter(|post| post.has_category(category_id))
            .collect();
        Ok(paginate(posts, page, PAGE_SIZE))
    }

    pub async fn tags(&self) -> Result<Vec<TagSummary>, DomainError> {
        Ok(summarize_tags(self.all_published().await?.iter()))
    }

    pub async fn posts_by_tag(
        &self,
        tag: &str,
        page: usize,
        limit: usize,
    ) -> Result<Page<BlogPost>, DomainError> {
        let posts: Vec<BlogPost> = self
            .all_published()
            .await?
            .into_iter()
            .filter(|post| has_tag(post, tag))
            .collect();
        Ok(paginate(posts, page, limit.clamp(1, MAX_BATCH)))
    }

    /// Published posts whose title, content or keywords contain `query`,
    /// newest first.
    ///
    /// Runs one substring filter per field on the backend. If any of them is
    /// rejected (for instance a missing index) it falls back to scanning the
    /// most recent `SEARCH_FALLBACK_LIMIT` published posts, so older matches
    /// can be missed in that mode.
    #[instrument(skip(self))]
    pub async fn search_posts(&self, query: &str) -> Result<Vec<BlogPost>, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::missing_field("q"));
        }

        let searches = SEARCH_FIELDS.map(|field| {
            [
                published(),
                Query::contains(field, query),
                Query::Limit(MAX_BATCH),
            ]
        });
        let primary = try_join3(
            self.posts.list(&searches[0]),
            self.posts.list(&searches[1]),
            self.posts.list(&searches[2]),
        )
        .await;

        let documents = match primary {
            Ok(((_, by_title), (_, by_content), (_, by_keywords))) => {
                let mut merged: Vec<PostDocument> = Vec::new();
                for doc in by_title.into_iter().chain(by_content).chain(by_keywords) {
                    if !merged.iter().any(|seen| seen.id == doc.id) {
                        merged.push(doc);
                    }
                }
                merged
            }
            Err(err) => {
                warn!(error = %err, "filtered search failed, scanning recent posts");
                let needle = query.to_lowercase();
                let (_, recent) = self
                    .posts
                    .list(&[
                        published(),
                        Query::newest_first(),
                        Query::Limit(SEARCH_FALLBACK_LIMIT),
                    ])
                    .await?;
                recent
                    .into_iter()
                    .filter(|doc| matches_search(doc, &needle))
                    .collect()
            }
        };

        let mut posts = self.resolve(documents).await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        info!(count = posts.len(), "search completed");
        Ok(posts)
    }

    /// Most viewed published posts. Without analytics, the newest posts with
    /// zero views.
    pub async fn popular_posts(&self, limit: usize) -> Result<Vec<PopularPost>, DomainError> {
        let limit = limit.clamp(1, MAX_BATCH);
        let Some(analytics) = &self.analytics else {
            let page = self.list_posts(1, false).await?;
            let mut posts = page.posts;
            if limit > posts.len() {
                posts = self.all_published().await?;
            }
            return Ok(posts
                .into_iter()
                .take(limit)
                .map(|post| PopularPost { post, views: 0 })
                .collect());
        };

        let (pages, posts) = try_join(analytics.top_pages(limit * 4), self.all_published()).await?;
        let mut popular: Vec<PopularPost> = Vec::new();
        for page in pages {
            let Some(slug) = slug_from_path(&page.path) else {
                continue;
            };
            if let Some(existing) = popular.iter_mut().find(|p| p.post.slug == slug) {
                existing.views += page.views;
            } else if let Some(post) = posts.iter().find(|p| p.slug == slug) {
                popular.push(PopularPost {
                    post: post.clone(),
                    views: page.views,
                });
            }
        }
        popular.sort_by(|a, b| b.views.cmp(&a.views));
        popular.truncate(limit);
        Ok(popular)
    }

    async fn ensure_categories_exist(&self, ids: &[String]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        let categories = self.categories.list().await?;
        match ids.iter().find(|id| !categories.iter().any(|c| &c.id == *id)) {
            Some(unknown) => Err(DomainError::Validation(format!("unknown category: {unknown}"))),
            None => Ok(()),
        }
    }

    /// First of `base`, `base-2`, `base-3`, ... not used by another post.
    async fn unique_slug(&self, base: &str, own_id: Option<&str>) -> Result<String, DomainError> {
        let mut candidate = base.to_string();
        let mut suffix = 2;
        loop {
            match self.posts.find_by_slug(&candidate).await? {
                Some(existing) if Some(existing.id.as_str()) != own_id => {
                    candidate = format!("{base}-{suffix}");
                    suffix += 1;
                }
                _ => return Ok(candidate),
            }
        }
    }

    #[instrument(skip(self, post), fields(title = %post.title))]
    pub async fn create_post(&self, mut post: NewPost) -> Result<BlogPost, DomainError> {
        post.title = post.title.trim().to_string();
        if post.title.is_empty() {
            return Err(DomainError::missing_field("title"));
        }
        if post.content.trim().is_empty() {
            return Err(DomainError::missing_field("content"));
        }
        let base = slugify(&post.title);
        if base.is_empty() {
            return Err(DomainError::Validation(
                "title must contain at least one letter or digit".into(),
            ));
        }
        self.ensure_categories_exist(&post.category).await?;

        let slug = self.unique_slug(&base, None).await?;
        let id = Uuid::new_v4().simple().to_string();
        let created = self.posts.create(&id, new_post_fields(post, &slug)).await?;
        Ok(self.resolve(vec![created]).await?.remove(0))
    }

    /// Applies `patch`. The slug only changes when the patch carries one; a new
    /// title keeps the existing slug so published links stay valid.
    #[instrument(skip(self, patch))]
    pub async fn update_post(&self, id: &str, mut patch: PostPatch) -> Result<BlogPost, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::Validation("no fields to update".into()));
        }
        if self.posts.find_by_id(id).await?.is_none() {
            return Err(DomainError::PostNotFound(id.to_string()));
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(DomainError::missing_field("title"));
            }
            patch.title = Some(title.trim().to_string());
        }
        if patch
            .content
            .as_deref()
            .is_some_and(|content| content.trim().is_empty())
        {
            return Err(DomainError::missing_field("content"));
        }
        if let Some(requested) = &patch.slug {
            let base = slugify(requested);
            if base.is_empty() {
                return Err(DomainError::missing_field("slug"));
            }
            patch.slug = Some(self.unique_slug(&base, Some(id)).await?);
        }
        if let Some(category) = &patch.category {
            self.ensure_categories_exist(category).await?;
        }

        let updated = self
            .posts
            .update(id, patch_fields(patch))
            .await?
            .ok_or_else(|| DomainError::PostNotFound(id.to_string()))?;
        Ok(self.resolve(vec![updated]).await?.remove(0))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: &str) -> Result<(), DomainError> {
        if self.posts.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::PostNotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_paths_map_to_slugs() {
        assert_eq!(slug_from_path("/blog/hello-world"), Some("hello-world"));
        assert_eq!(slug_from_path("/blog/hello-world/"), Some("hello-world"));
        assert_eq!(slug_from_path("/blog/hello?utm=x"), Some("hello"));
        assert_eq!(slug_from_path("/blog/"), None);
        assert_eq!(slug_from_path("/blog/a/b"), None);
        assert_eq!(slug_from_path("/about"), None);
    }
}
