use anyhow::{Context, bail};
use crate::domain::access::AccessPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Appwrite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub bucket_id: String,
}

#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    pub api_key: String,
    pub channel_id: String,
}

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub property_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub backend: BackendKind,
    pub appwrite: Option<AppwriteConfig>,
    pub posts_collection: String,
    pub categories_collection: String,
    pub admin_team_id: String,
    pub session_cookie: String,
    pub policy: AccessPolicy,
    pub youtube: Option<YoutubeConfig>,
    pub analytics: Option<AnalyticsConfig>,
    pub ai: Option<AiConfig>,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &str) -> anyhow::Result<String> {
    var(name).with_context(|| format!("{name} must be set"))
}

impl AppConfig {
    /// Defaults for the in-memory backend with every optional integration off.
    pub fn in_memory() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            cors_origins: Vec::new(),
            backend: BackendKind::Memory,
            appwrite: None,
            posts_collection: "posts".into(),
            categories_collection: "categories".into(),
            admin_team_id: "admins".into(),
            session_cookie: "blog-session".into(),
            policy: AccessPolicy::default(),
            youtube: None,
            analytics: None,
            ai: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = var("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let backend = match var("BACKEND").as_deref() {
            None | Some("appwrite") => BackendKind::Appwrite,
            Some("memory") => BackendKind::Memory,
            Some(other) => bail!("unknown BACKEND {other:?}, expected appwrite or memory"),
        };

        let appwrite = match backend {
            BackendKind::Memory => None,
            BackendKind::Appwrite => Some(AppwriteConfig {
                endpoint: required("APPWRITE_ENDPOINT")?
                    .trim_end_matches('/')
                    .to_string(),
                project_id: required("APPWRITE_PROJECT_ID")?,
                api_key: required("APPWRITE_API_KEY")?,
                database_id: required("APPWRITE_DATABASE_ID")?,
                bucket_id: required("APPWRITE_BUCKET_ID")?,
            }),
        };

        let (posts_collection, categories_collection, admin_team_id) = match backend {
            BackendKind::Appwrite => (
                required("APPWRITE_POSTS_COLLECTION_ID")?,
                required("APPWRITE_CATEGORIES_COLLECTION_ID")?,
                required("ADMIN_TEAM_ID")?,
            ),
            BackendKind::Memory => (
                var("APPWRITE_POSTS_COLLECTION_ID").unwrap_or_else(|| "posts".into()),
                var("APPWRITE_CATEGORIES_COLLECTION_ID").unwrap_or_else(|| "categories".into()),
                var("ADMIN_TEAM_ID").unwrap_or_else(|| "admins".into()),
            ),
        };

        let youtube = match (var("YOUTUBE_API_KEY"), var("YOUTUBE_CHANNEL_ID")) {
            (Some(api_key), Some(channel_id)) => Some(YoutubeConfig {
                api_key,
                channel_id,
            }),
            _ => None,
        };

        let analytics = match (var("ANALYTICS_PROPERTY_ID"), var("ANALYTICS_ACCESS_TOKEN")) {
            (Some(property_id), Some(access_token)) => Some(AnalyticsConfig {
                property_id,
                access_token,
            }),
            _ => None,
        };

        let ai = match (var("AI_API_URL"), var("AI_API_KEY")) {
            (Some(api_url), Some(api_key)) => Some(AiConfig {
                api_url: api_url.trim_end_matches('/').to_string(),
                api_key,
                model: var("AI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
            }),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            backend,
            appwrite,
            posts_collection,
            categories_collection,
            admin_team_id,
            session_cookie: var("SESSION_COOKIE").unwrap_or_else(|| "blog-session".into()),
            policy: AccessPolicy::default(),
            youtube,
            analytics,
            ai,
        })
    }
}
