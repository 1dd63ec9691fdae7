use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Published,
    #[default]
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Published => "published",
            PostStatus::Draft => "draft",
        }
    }

    /// Unknown values are read as `Draft` so they never leak onto public pages.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("published") {
            PostStatus::Published
        } else {
            PostStatus::Draft
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn tags(&self) -> Vec<String> {
        crate::domain::tags::extract_tags(self.keywords.as_deref())
    }

    pub fn has_category(&self, category_id: &str) -> bool {
        self.category.iter().any(|c| c.id == category_id)
    }
}

/// Fields accepted when a post is created. The slug is derived by the service.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Vec<String>,
    pub status: PostStatus,
    pub banner_image: Option<String>,
    pub ad_tag: Option<String>,
    pub source_code: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub category: Option<Vec<String>>,
    pub status: Option<PostStatus>,
    pub banner_image: Option<String>,
    pub ad_tag: Option<String>,
    pub source_code: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.banner_image.is_none()
            && self.ad_tag.is_none()
            && self.source_code.is_none()
            && self.keywords.is_none()
            && self.meta_description.is_none()
    }
}
