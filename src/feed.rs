use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// One freight load as returned by the remote listing API.
#[derive(Debug, Clone, Deserialize)]
pub struct Load {
    pub load_id: String,
    pub total_distance: f64,
    pub load_start_date_str: String,
    pub load_end_date_str: String,
    pub origin_location_state: String,
    pub stops: Vec<Stop>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stop {
    pub address: String,
}

/// Polls the load listing endpoint.
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Fetch the current listings. The endpoint nests the array two levels
    /// deep (`data.data`); a missing, non-array or empty field means nothing
    /// to report and yields an empty batch rather than an error. A present
    /// array that fails to deserialize is an error.
    pub async fn fetch(&self) -> Result<Vec<Load>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Failed to reach load feed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Load feed error ({}): {}", status, body);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse load feed response")?;

        let listings = match body.pointer("/data/data") {
            Some(serde_json::Value::Array(items)) if !items.is_empty() => items.clone(),
            _ => {
                debug!("Load feed returned no listing array");
                return Ok(Vec::new());
            }
        };

        serde_json::from_value(serde_json::Value::Array(listings))
            .context("Load feed returned malformed listings")
    }
}
