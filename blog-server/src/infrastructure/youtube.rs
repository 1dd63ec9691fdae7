use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::error::DomainError;
use crate::infrastructure::config::YoutubeConfig;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
    pub view_count: u64,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
struct VideoStatistics {
    id: String,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}

#[derive(Clone)]
pub struct YoutubeClient {
    client: Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    pub fn new(config: YoutubeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DomainError> {
        let response = self
            .client
            .get(format!("{API_BASE}/{path}"))
            .query(query)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), response = %text, "youtube {path} failed");
            return Err(DomainError::Upstream(format!("youtube {path}: {status}")));
        }
        Ok(response.json().await?)
    }

    /// Latest uploads of the configured channel with their view counts.
    pub async fn latest_videos(&self, max_results: u32) -> Result<Vec<Video>, DomainError> {
        let search: SearchResponse = self
            .get(
                "search",
                &[
                    ("part", "snippet".into()),
                    ("channelId", self.config.channel_id.clone()),
                    ("order", "date".into()),
                    ("type", "video".into()),
                    ("maxResults", max_results.clamp(1, 50).to_string()),
                ],
            )
            .await?;

        let mut videos: Vec<Video> = search
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                let thumbnails = item.snippet.thumbnails;
                let thumbnail = thumbnails
                    .high
                    .or(thumbnails.medium)
                    .or(thumbnails.default)
                    .map(|t| t.url);
                Some(Video {
                    url: format!("https://www.youtube.com/watch?v={id}"),
                    id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    published_at: item.snippet.published_at,
                    thumbnail,
                    view_count: 0,
                })
            })
            .collect();

        if videos.is_empty() {
            return Ok(videos);
        }

        let ids = videos
            .iter()
            .map(|v| v.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let stats: VideosResponse = self
            .get("videos", &[("part", "statistics".into()), ("id", ids)])
            .await?;

        for video in &mut videos {
            if let Some(entry) = stats.items.iter().find(|s| s.id == video.id) {
                video.view_count = entry
                    .statistics
                    .view_count
                    .as_deref()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
            }
        }

        info!(count = videos.len(), "youtube videos fetched");
        Ok(videos)
    }
}
