use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::post::{BlogPost, NewPost, PostPatch, PostStatus};

/// One entry of a post's `category` field. The backend returns either bare
/// identifiers or expanded related documents depending on how the collection
/// relationship is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Embedded(EmbeddedCategory),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbeddedCategory {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
}

impl CategoryRef {
    pub fn into_id(self) -> String {
        match self {
            CategoryRef::Id(id) => id,
            CategoryRef::Embedded(doc) => doc.id,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<CategoryRef>),
    One(CategoryRef),
}

/// Flattens the reference list to identifiers, first occurrence wins.
pub fn normalize_category_refs(refs: Vec<CategoryRef>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(refs.len());
    for id in refs.into_iter().map(CategoryRef::into_id) {
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Unset attributes come back as `null`; read them as empty text.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn category_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let refs = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(refs)) => refs,
        Some(OneOrMany::One(single)) => vec![single],
    };
    Ok(normalize_category_refs(refs))
}

/// A post as stored by the backend, with category references normalized.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "category_ids")]
    pub category: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub banner_image: Option<String>,
    pub ad_tag: Option<String>,
    pub source_code: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

impl PostDocument {
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn status(&self) -> PostStatus {
        self.status
            .as_deref()
            .map(PostStatus::parse)
            .unwrap_or_default()
    }

    /// Resolves category references against `categories`; references to
    /// categories that no longer exist are dropped.
    pub fn into_post(self, categories: &[Category]) -> BlogPost {
        let status = self.status();
        let category = self
            .category
            .iter()
            .filter_map(|id| categories.iter().find(|c| &c.id == id).cloned())
            .collect();

        BlogPost {
            id: self.id,
            title: self.title,
            slug: self.slug,
            content: self.content,
            category,
            created_at: self.created_at.unwrap_or_default(),
            status,
            banner_image: self.banner_image,
            ad_tag: self.ad_tag,
            source_code: self.source_code,
            keywords: self.keywords,
            meta_description: self.meta_description,
        }
    }
}

impl CategoryDocument {
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value));
    }
}

pub fn new_post_fields(post: NewPost, slug: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("title".into(), Value::String(post.title));
    map.insert("slug".into(), Value::String(slug.to_string()));
    map.insert("content".into(), Value::String(post.content));
    map.insert(
        "category".into(),
        Value::Array(post.category.into_iter().map(Value::String).collect()),
    );
    map.insert("status".into(), Value::String(post.status.as_str().into()));
    put(&mut map, "bannerImage", post.banner_image);
    put(&mut map, "adTag", post.ad_tag);
    put(&mut map, "sourceCode", post.source_code);
    put(&mut map, "keywords", post.keywords);
    put(&mut map, "metaDescription", post.meta_description);
    map
}

pub fn patch_fields(patch: PostPatch) -> Map<String, Value> {
    let mut map = Map::new();
    put(&mut map, "title", patch.title);
    put(&mut map, "slug", patch.slug);
    put(&mut map, "content", patch.content);
    if let Some(category) = patch.category {
        map.insert(
            "category".into(),
            Value::Array(category.into_iter().map(Value::String).collect()),
        );
    }
    put(&mut map, "status", patch.status.map(|s| s.as_str().to_string()));
    put(&mut map, "bannerImage", patch.banner_image);
    put(&mut map, "adTag", patch.ad_tag);
    put(&mut map, "sourceCode", patch.source_code);
    put(&mut map, "keywords", patch.keywords);
    put(&mut map, "metaDescription", patch.meta_description);
    map
}

pub fn category_fields(name: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("name".into(), Value::String(name.to_string()));
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: "catA".into(),
                name: "Alpha".into(),
            },
            Category {
                id: "catC".into(),
                name: "Gamma".into(),
            },
        ]
    }

    #[test]
    fn unknown_category_references_are_dropped() {
        let doc = PostDocument::from_value(json!({
            "$id": "p1",
            "$createdAt": "2024-03-01T10:00:00.000+00:00",
            "title": "Hello",
            "slug": "hello",
            "content": "<p>hi</p>",
            "category": ["catA", "catB"],
            "status": "published"
        }))
        .unwrap();

        let post = doc.into_post(&categories());
        assert_eq!(post.category.len(), 1);
        assert_eq!(post.category[0].id, "catA");
        assert!(post.is_published());
    }

    #[test]
    fn embedded_and_bare_references_normalize_alike() {
        let doc = PostDocument::from_value(json!({
            "$id": "p2",
            "category": [{ "$id": "catC", "name": "Gamma" }, "catA", { "$id": "catA" }]
        }))
        .unwrap();
        assert_eq!(doc.category, vec!["catC", "catA"]);

        let post = doc.into_post(&categories());
        let ids: Vec<&str> = post.category.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["catC", "catA"]);
    }

    #[test]
    fn single_embedded_reference_is_accepted() {
        let doc = PostDocument::from_value(json!({
            "$id": "p3",
            "category": { "$id": "catC" }
        }))
        .unwrap();
        assert_eq!(doc.category, vec!["catC"]);
    }

    #[test]
    fn missing_fields_stay_absent() {
        let doc = PostDocument::from_value(json!({ "$id": "p4", "category": null })).unwrap();
        assert!(doc.category.is_empty());

        let post = doc.into_post(&categories());
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.banner_image.is_none());
        assert!(post.keywords.is_none());
        assert!(post.meta_description.is_none());
        assert_eq!(post.title, "");
    }

    #[test]
    fn null_attributes_read_as_empty() {
        let doc = PostDocument::from_value(json!({
            "$id": "p5",
            "title": null,
            "slug": null,
            "content": null,
            "status": null,
            "keywords": null,
            "category": ["catA"]
        }))
        .unwrap();
        let post = doc.into_post(&categories());
        assert_eq!(post.slug, "");
        assert_eq!(post.title, "");
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.keywords.is_none());
        assert_eq!(post.category.len(), 1);

        let category =
            CategoryDocument::from_value(json!({ "$id": "catA", "name": null })).unwrap();
        assert_eq!(category.into_category().name, "");
    }

    #[test]
    fn patch_only_writes_present_fields() {
        let fields = patch_fields(PostPatch {
            title: Some("New".into()),
            status: Some(PostStatus::Published),
            ..PostPatch::default()
        });
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["status"], json!("published"));
    }
}
