use crate::domain::error::DomainError;
use crate::infrastructure::youtube::{Video, YoutubeClient};

pub const DEFAULT_VIDEO_COUNT: u32 = 6;

#[derive(Clone)]
pub struct VideoService {
    client: Option<YoutubeClient>,
}

impl VideoService {
    pub fn new(client: Option<YoutubeClient>) -> Self {
        Self { client }
    }

    pub async fn latest(&self, max_results: Option<u32>) -> Result<Vec<Video>, DomainError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| DomainError::Upstream("youtube integration is not configured".into()))?;
        client
            .latest_videos(max_results.unwrap_or(DEFAULT_VIDEO_COUNT))
            .await
    }
}
