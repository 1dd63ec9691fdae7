//! Appwrite REST adapter for documents, file storage and sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, multipart};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, error};

use crate::data::store::{DocumentList, DocumentStore, FileStorage, Query, SessionProvider};
use crate::domain::error::DomainError;
use crate::domain::file::StoredFile;
use crate::domain::session::{Credentials, SessionUser};
use crate::infrastructure::config::AppwriteConfig;

const PROJECT_HEADER: &str = "x-appwrite-project";
const KEY_HEADER: &str = "x-appwrite-key";
const SESSION_HEADER: &str = "x-appwrite-session";
const JWT_HEADER: &str = "x-appwrite-jwt";

const MAX_ID_LEN: usize = 36;

#[derive(Clone)]
pub struct AppwriteClient {
    config: AppwriteConfig,
    server: Client,
    user: Client,
}

#[derive(Debug, Deserialize)]
struct AppwriteErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    files: Vec<FileDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDocument {
    #[serde(rename = "$id")]
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    size_original: u64,
    #[serde(rename = "$createdAt")]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    email_verification: bool,
}

#[derive(Debug, Deserialize)]
struct TeamList {
    teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
struct Team {
    #[serde(rename = "$id")]
    id: String,
}

/// Appwrite's JSON query syntax.
pub fn encode_query(query: &Query) -> String {
    let value = match query {
        Query::Equal(field, value) => {
            json!({ "method": "equal", "attribute": field, "values": [value] })
        }
        Query::Contains(field, value) => {
            json!({ "method": "contains", "attribute": field, "values": [value] })
        }
        Query::OrderDesc(field) => json!({ "method": "orderDesc", "attribute": field }),
        Query::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
        Query::Offset(offset) => json!({ "method": "offset", "values": [offset] }),
    };
    value.to_string()
}

/// Appwrite ids: up to 36 of `[A-Za-z0-9._-]`, starting with a letter or digit.
pub fn is_valid_id(id: &str) -> bool {
    id.len() <= MAX_ID_LEN
        && id.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// `base` with `id` appended as one escaped path segment. `None` when `id`
/// cannot name an Appwrite resource, so nothing outside `base` is reachable.
fn item_url(base: &str, id: &str) -> Result<Option<Url>, DomainError> {
    if !is_valid_id(id) {
        return Ok(None);
    }
    let mut url =
        Url::parse(base).map_err(|e| DomainError::Upstream(format!("invalid url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| DomainError::Upstream(format!("{base} cannot take a path")))?
        .push(id);
    Ok(Some(url))
}

fn header(value: &str) -> Result<HeaderValue, DomainError> {
    HeaderValue::from_str(value)
        .map_err(|e| DomainError::Upstream(format!("invalid header value: {e}")))
}

async fn upstream_error(context: &str, response: Response) -> DomainError {
    let status = response.status();
    let message = response
        .json::<AppwriteErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_default();
    error!(status = status.as_u16(), message = %message, "{context} failed");
    DomainError::Upstream(format!("{context}: {status} {message}"))
}

impl AppwriteClient {
    pub fn new(config: AppwriteConfig) -> Result<Self, DomainError> {
        let mut user_headers = HeaderMap::new();
        user_headers.insert(PROJECT_HEADER, header(&config.project_id)?);

        let mut server_headers = user_headers.clone();
        server_headers.insert(KEY_HEADER, header(&config.api_key)?);

        let server = Client::builder().default_headers(server_headers).build()?;
        let user = Client::builder().default_headers(user_headers).build()?;

        Ok(Self {
            config,
            server,
            user,
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint, self.config.database_id, collection
        )
    }

    fn files_url(&self) -> String {
        format!(
            "{}/storage/buckets/{}/files",
            self.config.endpoint, self.config.bucket_id
        )
    }

    pub fn file_view_url(&self, id: &str) -> String {
        format!(
            "{}/{}/view?project={}",
            self.files_url(),
            id,
            self.config.project_id
        )
    }

    fn with_credentials(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> RequestBuilder {
        match credentials {
            Credentials::SessionSecret(secret) => request.header(SESSION_HEADER, secret),
            Credentials::Jwt(token) => request.header(JWT_HEADER, token),
        }
    }

    fn to_stored_file(&self, file: FileDocument) -> StoredFile {
        StoredFile {
            url: self.file_view_url(&file.id),
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            size: file.size_original,
            created_at: file.created_at,
        }
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, DomainError> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", encode_query(q)))
            .collect();
        let response = self
            .server
            .get(self.documents_url(collection))
            .query(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream_error("list documents", response).await);
        }

        let body: Value = response.json().await?;
        let total = body.get("total").and_then(Value::as_u64).unwrap_or(0) as usize;
        let documents = match body.get("documents") {
            Some(Value::Array(documents)) => documents.clone(),
            _ => Vec::new(),
        };
        debug!(collection, total, returned = documents.len(), "listed documents");
        Ok(DocumentList { total, documents })
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, DomainError> {
        let Some(url) = item_url(&self.documents_url(collection), id)? else {
            return Ok(None);
        };
        let response = self
            .server
            .get(url)
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            _ => Err(upstream_error("get document", response).await),
        }
    }

    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Value, DomainError> {
        let response = self
            .server
            .post(self.documents_url(collection))
            .json(&json!({ "documentId": id, "data": data }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream_error("create document", response).await);
        }
        Ok(response.json().await?)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Option<Value>, DomainError> {
        let Some(url) = item_url(&self.documents_url(collection), id)? else {
            return Ok(None);
        };
        let response = self
            .server
            .patch(url)
            .json(&json!({ "data": data }))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            _ => Err(upstream_error("update document", response).await),
        }
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<bool, DomainError> {
        let Some(url) = item_url(&self.documents_url(collection), id)? else {
            return Ok(false);
        };
        let response = self
            .server
            .delete(url)
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(upstream_error("delete document", response).await),
        }
    }
}

#[async_trait]
impl FileStorage for AppwriteClient {
    async fn list_files(&self) -> Result<Vec<StoredFile>, DomainError> {
        let response = self.server.get(self.files_url()).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error("list files", response).await);
        }
        let list: FileList = response.json().await?;
        Ok(list
            .files
            .into_iter()
            .map(|file| self.to_stored_file(file))
            .collect())
    }

    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, DomainError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new()
            .text("fileId", "unique()")
            .part("file", part);

        let response = self
            .server
            .post(self.files_url())
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(upstream_error("upload file", response).await);
        }
        let file: FileDocument = response.json().await?;
        Ok(self.to_stored_file(file))
    }

    async fn delete_file(&self, id: &str) -> Result<bool, DomainError> {
        let Some(url) = item_url(&self.files_url(), id)? else {
            return Ok(false);
        };
        let response = self
            .server
            .delete(url)
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(upstream_error("delete file", response).await),
        }
    }
}

#[async_trait]
impl SessionProvider for AppwriteClient {
    async fn current_user(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<SessionUser>, DomainError> {
        let request = self
            .user
            .get(format!("{}/account", self.config.endpoint));
        let response = self.with_credentials(request, credentials).send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(None),
            status if status.is_success() => {
                let account: Account = response.json().await?;
                Ok(Some(SessionUser {
                    id: account.id,
                    email: account.email,
                    email_verified: account.email_verification,
                }))
            }
            _ => Err(upstream_error("get account", response).await),
        }
    }

    async fn team_ids(&self, credentials: &Credentials) -> Result<Vec<String>, DomainError> {
        let request = self.user.get(format!("{}/teams", self.config.endpoint));
        let response = self.with_credentials(request, credentials).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error("list teams", response).await);
        }
        let list: TeamList = response.json().await?;
        Ok(list.teams.into_iter().map(|team| team.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_use_appwrite_json_syntax() {
        let encoded: Value =
            serde_json::from_str(&encode_query(&Query::equal("slug", "hello"))).unwrap();
        assert_eq!(
            encoded,
            json!({ "method": "equal", "attribute": "slug", "values": ["hello"] })
        );

        let encoded: Value = serde_json::from_str(&encode_query(&Query::Limit(100))).unwrap();
        assert_eq!(encoded, json!({ "method": "limit", "values": [100] }));

        let encoded: Value = serde_json::from_str(&encode_query(&Query::newest_first())).unwrap();
        assert_eq!(
            encoded,
            json!({ "method": "orderDesc", "attribute": "$createdAt" })
        );
    }

    #[test]
    fn ids_cannot_leave_their_collection() {
        let base = "https://cloud.appwrite.io/v1/databases/db/collections/posts/documents";

        for id in ["../../secrets/documents/x", "a/b", "..", ".hidden", "", "a?b", "a%2Fb"] {
            assert!(item_url(base, id).unwrap().is_none(), "{id} should be rejected");
        }
        assert!(!is_valid_id(&"a".repeat(37)));

        let url = item_url(base, "post.1_x-y").unwrap().unwrap();
        assert_eq!(
            url.path(),
            "/v1/databases/db/collections/posts/documents/post.1_x-y"
        );
    }

    #[test]
    fn view_url_carries_project() {
        let client = AppwriteClient::new(AppwriteConfig {
            endpoint: "https://cloud.appwrite.io/v1".into(),
            project_id: "proj".into(),
            api_key: "key".into(),
            database_id: "db".into(),
            bucket_id: "media".into(),
        })
        .unwrap();
        assert_eq!(
            client.file_view_url("f1"),
            "https://cloud.appwrite.io/v1/storage/buckets/media/files/f1/view?project=proj"
        );
    }
}
