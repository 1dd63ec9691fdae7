use crate::error::BlogClientError;
use crate::{
    Category, NewPost, Post, PostDetail, PostPage, PostUpdate, StoredFile, TagSummary, Video,
};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_SESSION_COOKIE: &str = "blog-session";

/// How the client proves who it is: the backend session secret sent as the
/// session cookie, or a short-lived JWT sent as a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Session(String),
    Jwt(String),
}

impl Auth {
    /// Reads a token saved by [`Auth::save`]. A bare value is treated as a JWT.
    pub fn load(path: &Path) -> Result<Option<Self>, BlogClientError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Self::parse(raw.trim()))
    }

    pub fn save(&self, path: &Path) -> Result<(), BlogClientError> {
        let line = match self {
            Auth::Session(secret) => format!("session:{secret}"),
            Auth::Jwt(token) => format!("jwt:{token}"),
        };
        fs::write(path, line)?;
        Ok(())
    }

    fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        match raw.split_once(':') {
            Some(("session", secret)) if !secret.is_empty() => Some(Auth::Session(secret.into())),
            Some(("jwt", token)) if !token.is_empty() => Some(Auth::Jwt(token.into())),
            _ => Some(Auth::Jwt(raw.into())),
        }
    }
}

#[derive(Clone)]
pub struct BlogClientHttp {
    client: Arc<Client>,
    base_url: String,
    session_cookie: String,
    auth: Option<Auth>,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    tags: Vec<TagSummary>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    suggestion: String,
}

impl BlogClientHttp {
    pub fn connect(endpoint: &str) -> Result<Self, BlogClientError> {
        Ok(Self {
            client: Arc::new(Client::builder().build()?),
            base_url: endpoint.trim_end_matches('/').to_string(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            auth: None,
        })
    }

    pub fn with_session_cookie(mut self, name: &str) -> Self {
        self.session_cookie = name.to_string();
        self
    }

    pub fn set_auth(&mut self, auth: Option<Auth>) {
        self.auth = auth;
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(Auth::Session(secret)) => {
                req.header(COOKIE, format!("{}={}", self.session_cookie, secret))
            }
            Some(Auth::Jwt(token)) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BlogClientError> {
        let resp = self.authorized(req).send().await?;
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(BlogClientError::from_http_response(resp).await)
        }
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), BlogClientError> {
        let resp = self.authorized(req).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(BlogClientError::from_http_response(resp).await)
        }
    }

    pub async fn health(&self) -> Result<(), BlogClientError> {
        self.send_empty(self.client.get(self.url("/health"))).await
    }

    // ======================= POSTS =======================

    /// One page of posts, newest first. `include_drafts` only has an effect
    /// for admin callers.
    pub async fn list_posts(
        &self,
        page: usize,
        include_drafts: bool,
    ) -> Result<PostPage, BlogClientError> {
        let mut query = vec![("page", page.to_string())];
        if include_drafts {
            query.push(("status", "all".to_string()));
        }
        self.send(self.client.get(self.url("/posts")).query(&query))
            .await
    }

    pub async fn posts_in_category(
        &self,
        category: &str,
        page: usize,
    ) -> Result<PostPage, BlogClientError> {
        let query = [("category", category.to_string()), ("page", page.to_string())];
        self.send(self.client.get(self.url("/posts")).query(&query))
            .await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, BlogClientError> {
        self.send(self.client.get(self.url("/posts")).query(&[("id", id)]))
            .await
    }

    pub async fn get_post_by_slug(
        &self,
        slug: &str,
        related: Option<usize>,
    ) -> Result<PostDetail, BlogClientError> {
        let mut query = vec![("slug", slug.to_string())];
        if let Some(limit) = related {
            query.push(("related", limit.to_string()));
        }
        self.send(self.client.get(self.url("/posts")).query(&query))
            .await
    }

    pub async fn search_posts(&self, q: &str) -> Result<Vec<Post>, BlogClientError> {
        let resp: PostsResponse = self
            .send(self.client.get(self.url("/posts/search")).query(&[("q", q)]))
            .await?;
        Ok(resp.posts)
    }

    pub async fn tags(&self) -> Result<Vec<TagSummary>, BlogClientError> {
        let resp: TagsResponse = self.send(self.client.get(self.url("/posts/tags"))).await?;
        Ok(resp.tags)
    }

    pub async fn posts_by_tag(
        &self,
        tag: &str,
        page: usize,
        limit: Option<usize>,
    ) -> Result<PostPage, BlogClientError> {
        let mut query = vec![("tag", tag.to_string()), ("page", page.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.send(self.client.get(self.url("/posts/tags")).query(&query))
            .await
    }

    pub async fn popular_posts(&self, limit: usize) -> Result<Vec<Post>, BlogClientError> {
        let resp: PostsResponse = self
            .send(
                self.client
                    .get(self.url("/posts/popular"))
                    .query(&[("limit", limit)]),
            )
            .await?;
        Ok(resp.posts)
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, BlogClientError> {
        if post.title.trim().is_empty() {
            return Err(BlogClientError::InvalidRequest("title is required".into()));
        }
        self.send(self.client.post(self.url("/posts")).json(post))
            .await
    }

    pub async fn update_post(&self, update: &PostUpdate) -> Result<Post, BlogClientError> {
        self.send(self.client.put(self.url("/posts")).json(update))
            .await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), BlogClientError> {
        self.send_empty(self.client.delete(self.url("/posts")).query(&[("id", id)]))
            .await
    }

    // ======================= CATEGORIES =======================

    pub async fn list_categories(&self) -> Result<Vec<Category>, BlogClientError> {
        self.send(self.client.get(self.url("/category"))).await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, BlogClientError> {
        self.send(
            self.client
                .post(self.url("/category"))
                .json(&json!({ "name": name })),
        )
        .await
    }

    pub async fn rename_category(&self, id: &str, name: &str) -> Result<Category, BlogClientError> {
        self.send(
            self.client
                .put(self.url("/category"))
                .json(&json!({ "id": id, "name": name })),
        )
        .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), BlogClientError> {
        self.send_empty(self.client.delete(self.url("/category")).query(&[("id", id)]))
            .await
    }

    // ======================= MEDIA =======================

    pub async fn list_files(&self) -> Result<Vec<StoredFile>, BlogClientError> {
        self.send(self.client.get(self.url("/upload"))).await
    }

    pub async fn upload_file(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, BlogClientError> {
        self.send(
            self.client
                .post(self.url("/upload"))
                .query(&[("filename", filename)])
                .header(CONTENT_TYPE, content_type)
                .body(bytes),
        )
        .await
    }

    pub async fn delete_file(&self, id: &str) -> Result<(), BlogClientError> {
        self.send_empty(self.client.delete(self.url("/upload")).query(&[("id", id)]))
            .await
    }

    pub async fn latest_videos(&self, max_results: Option<u32>) -> Result<Vec<Video>, BlogClientError> {
        let mut req = self.client.get(self.url("/youtube"));
        if let Some(max) = max_results {
            req = req.query(&[("maxResults", max)]);
        }
        let resp: VideosResponse = self.send(req).await?;
        Ok(resp.videos)
    }

    /// Asks the server for an AI suggestion. `kind` is one of `title`,
    /// `description`, `keywords` or `evaluate`.
    pub async fn suggest(&self, kind: &str, content: &str) -> Result<String, BlogClientError> {
        let resp: SuggestionResponse = self
            .send(
                self.client
                    .post(self.url(&format!("/ai/{kind}")))
                    .json(&json!({ "content": content })),
            )
            .await?;
        Ok(resp.suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_saved_tokens() {
        assert_eq!(Auth::parse("session:abc"), Some(Auth::Session("abc".into())));
        assert_eq!(Auth::parse("jwt:xyz"), Some(Auth::Jwt("xyz".into())));
        assert_eq!(Auth::parse("eyJhbGciOi"), Some(Auth::Jwt("eyJhbGciOi".into())));
        assert_eq!(Auth::parse(""), None);
    }

    #[test]
    fn builds_api_urls_without_double_slashes() {
        let client = BlogClientHttp::connect("http://localhost:8080/").unwrap();
        assert_eq!(client.url("/posts"), "http://localhost:8080/api/posts");
    }

    #[test]
    fn saved_auth_round_trips_through_the_token_file() {
        let path = std::env::temp_dir().join(format!("blog-token-{}", std::process::id()));
        Auth::Session("secret".into()).save(&path).unwrap();
        assert_eq!(Auth::load(&path).unwrap(), Some(Auth::Session("secret".into())));
        fs::remove_file(&path).unwrap();
        assert_eq!(Auth::load(&path).unwrap(), None);
    }
}
