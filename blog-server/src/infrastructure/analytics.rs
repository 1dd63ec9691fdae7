use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::domain::error::DomainError;
use crate::infrastructure::config::AnalyticsConfig;

const API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageViews {
    pub path: String,
    pub views: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportResponse {
    #[serde(default)]
    rows: Vec<ReportRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRow {
    dimension_values: Vec<ReportValue>,
    metric_values: Vec<ReportValue>,
}

#[derive(Debug, Deserialize)]
struct ReportValue {
    value: String,
}

/// Page-view report over the GA4 Data API.
#[derive(Clone)]
pub struct AnalyticsClient {
    client: Client,
    config: AnalyticsConfig,
}

impl AnalyticsClient {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Most viewed page paths over the last 30 days.
    pub async fn top_pages(&self, limit: usize) -> Result<Vec<PageViews>, DomainError> {
        let body = json!({
            "dateRanges": [{ "startDate": "30daysAgo", "endDate": "today" }],
            "dimensions": [{ "name": "pagePath" }],
            "metrics": [{ "name": "screenPageViews" }],
            "orderBys": [{ "metric": { "metricName": "screenPageViews" }, "desc": true }],
            "limit": limit,
        });

        let response = self
            .client
            .post(format!(
                "{API_BASE}/properties/{}:runReport",
                self.config.property_id
            ))
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), response = %text, "analytics report failed");
            return Err(DomainError::Upstream(format!("analytics report: {status}")));
        }

        let report: ReportResponse = response.json().await?;
        Ok(report
            .rows
            .into_iter()
            .filter_map(|row| {
                let path = row.dimension_values.into_iter().next()?.value;
                let views = row.metric_values.into_iter().next()?.value.parse().ok()?;
                Some(PageViews { path, views })
            })
            .collect())
    }
}
