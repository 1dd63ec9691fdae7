use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::infrastructure::ai::AiClient;
use crate::infrastructure::config::AiConfig;

/// Input longer than this is cut before it is sent.
const MAX_PROMPT_CHARS: usize = 12_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Title,
    Description,
    Keywords,
    Evaluate,
}

impl SuggestionKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(SuggestionKind::Title),
            "description" => Some(SuggestionKind::Description),
            "keywords" => Some(SuggestionKind::Keywords),
            "evaluate" => Some(SuggestionKind::Evaluate),
            _ => None,
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            SuggestionKind::Title => {
                "Suggest one concise, engaging blog post title for the article below. \
                 Reply with the title only."
            }
            SuggestionKind::Description => {
                "Write a meta description of at most 160 characters for the article below. \
                 Reply with the description only."
            }
            SuggestionKind::Keywords => {
                "List up to 8 SEO keywords for the article below as a single comma-separated line."
            }
            SuggestionKind::Evaluate => {
                "Review the article below for clarity, structure and technical accuracy. \
                 Reply with a short list of concrete improvements."
            }
        }
    }
}

/// Writing assistant. The HTTP client is built on first use and shared by
/// every clone of the service.
#[derive(Clone)]
pub struct AiService {
    config: Option<AiConfig>,
    client: Arc<OnceCell<AiClient>>,
}

impl AiService {
    pub fn new(config: Option<AiConfig>) -> Self {
        Self {
            config,
            client: Arc::new(OnceCell::new()),
        }
    }

    async fn client(&self) -> Result<&AiClient, DomainError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| DomainError::Upstream("AI integration is not configured".into()))?;
        self.client
            .get_or_try_init(|| async { AiClient::new(config) })
            .await
    }

    #[instrument(skip(self, content))]
    pub async fn suggest(&self, kind: SuggestionKind, content: &str) -> Result<String, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::missing_field("content"));
        }
        let prompt: String = content.chars().take(MAX_PROMPT_CHARS).collect();

        let suggestion = self.client().await?.complete(kind.instructions(), prompt).await?;
        info!(chars = suggestion.len(), "suggestion generated");
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_only() {
        assert_eq!(SuggestionKind::parse("title"), Some(SuggestionKind::Title));
        assert_eq!(SuggestionKind::parse("evaluate"), Some(SuggestionKind::Evaluate));
        assert_eq!(SuggestionKind::parse("Title"), None);
        assert_eq!(SuggestionKind::parse("poem"), None);
    }

    #[tokio::test]
    async fn unconfigured_service_reports_upstream_error() {
        let service = AiService::new(None);
        let err = service
            .suggest(SuggestionKind::Title, "some article")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Upstream(_)));
    }

    #[tokio::test]
    async fn blank_content_is_rejected_first() {
        let service = AiService::new(None);
        let err = service.suggest(SuggestionKind::Keywords, "  ").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
