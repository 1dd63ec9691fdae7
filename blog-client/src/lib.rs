use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

mod error;
mod http_client;

pub use error::BlogClientError;
pub use http_client::{Auth, BlogClientHttp};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub category: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub banner_image: Option<String>,
    pub ad_tag: Option<String>,
    pub source_code: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (/{}), {}, {}",
            self.id,
            self.title,
            self.slug,
            self.status,
            self.created_at.format("%Y-%m-%d %H:%M")
        )?;
        if !self.category.is_empty() {
            let names: Vec<&str> = self.category.iter().map(|c| c.name.as_str()).collect();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub related: Vec<Post>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub name: String,
    pub slug: String,
    pub post_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: u64,
    pub url: String,
}

/// Body for creating a post. Categories are sent as plain ids.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_flattens_post_fields() {
        let detail: PostDetail = serde_json::from_value(json!({
            "id": "p1",
            "title": "Hello",
            "slug": "hello",
            "content": "<p>hi</p>",
            "category": [{ "id": "rust", "name": "Rust" }],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "status": "published",
            "related": []
        }))
        .unwrap();
        assert_eq!(detail.post.slug, "hello");
        assert_eq!(detail.post.category[0].name, "Rust");
        assert!(detail.related.is_empty());
    }

    #[test]
    fn update_only_sends_set_fields() {
        let update = PostUpdate {
            id: "p1".into(),
            title: Some("New".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({ "id": "p1", "title": "New" })
        );
    }

    #[test]
    fn display_lists_category_names() {
        let post: Post = serde_json::from_value(json!({
            "id": "p1",
            "title": "Hello",
            "slug": "hello",
            "content": "",
            "category": [{ "id": "rust", "name": "Rust" }, { "id": "web", "name": "Web" }],
            "createdAt": "2024-01-01T10:30:00Z",
            "status": "draft"
        }))
        .unwrap();
        assert_eq!(
            post.to_string(),
            "[p1] Hello (/hello), draft, 2024-01-01 10:30 [Rust, Web]"
        );
    }
}
