use serde::{Deserialize, Serialize};

use crate::data::document::{CategoryRef, normalize_category_refs};
use crate::domain::error::DomainError;
use crate::domain::post::{BlogPost, NewPost, PostPatch, PostStatus};

// ======================= POSTS =======================

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
    pub status: Option<String>,
    pub related: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Vec<CategoryRef>>,
    pub status: Option<PostStatus>,
    pub banner_image: Option<String>,
    pub ad_tag: Option<String>,
    pub source_code: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
}

impl From<CreatePostRequest> for NewPost {
    fn from(req: CreatePostRequest) -> Self {
        NewPost {
            title: req.title.unwrap_or_default(),
            content: req.content.unwrap_or_default(),
            category: normalize_category_refs(req.category.unwrap_or_default()),
            status: req.status.unwrap_or_default(),
            banner_image: req.banner_image,
            ad_tag: req.ad_tag,
            source_code: req.source_code,
            keywords: req.keywords,
            meta_description: req.meta_description,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub category: Option<Vec<CategoryRef>>,
    pub status: Option<PostStatus>,
    pub banner_image: Option<String>,
    pub ad_tag: Option<String>,
    pub source_code: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
}

impl UpdatePostRequest {
    pub fn into_parts(self) -> (Option<String>, PostPatch) {
        let patch = PostPatch {
            title: self.title,
            slug: self.slug,
            content: self.content,
            category: self.category.map(normalize_category_refs),
            status: self.status,
            banner_image: self.banner_image,
            ad_tag: self.ad_tag,
            source_code: self.source_code,
            keywords: self.keywords,
            meta_description: self.meta_description,
        };
        (self.id, patch)
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: BlogPost,
    pub related: Vec<BlogPost>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagsQuery {
    pub tag: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

// ======================= CATEGORIES =======================

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub id: Option<String>,
    pub name: Option<String>,
}

// ======================= MEDIA =======================

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeQuery {
    #[serde(rename = "maxResults")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestion: String,
}

// ======================= Utils =======================

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::missing_field(field))
}
