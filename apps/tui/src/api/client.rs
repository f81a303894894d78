use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::api::models::{ChatQuery, ChatResponse};
use crate::config::AppConfig;
use crate::domain::Outlet;
use crate::error::ApiError;

const USER_AGENT: &str = concat!("outlet-map/", env!("CARGO_PKG_VERSION"));

/// Client for the outlet backend (`/outlets` and `/chatbot/query`).
///
/// No retries: every failure is terminal for that attempt and the caller
/// degrades (empty listing, fallback chat answer).
#[derive(Debug, Clone)]
pub struct OutletApi {
    client: Client,
    base_url: String,
}

impl OutletApi {
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Fetches the outlet listing.
    ///
    /// A payload whose `outlets` field is missing or not an array is an empty
    /// listing. Records that fail to decode are skipped.
    pub async fn fetch_outlets(&self) -> Result<Vec<Outlet>, ApiError> {
        let url = self.endpoint("outlets");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body).map_err(|source| ApiError::Deserialize {
            context: url.clone(),
            source,
        })?;

        let Some(records) = payload.get("outlets").and_then(Value::as_array) else {
            tracing::warn!(%url, "outlet listing has no outlets array, treating as empty");
            return Ok(Vec::new());
        };

        let outlets = records
            .iter()
            .filter_map(|record| match serde_json::from_value::<Outlet>(record.clone()) {
                Ok(outlet) => Some(outlet),
                Err(error) => {
                    tracing::warn!(%error, "skipping malformed outlet record");
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(count = outlets.len(), "fetched outlets");
        Ok(outlets)
    }

    pub async fn query_chatbot(&self, query: &ChatQuery) -> Result<ChatResponse, ApiError> {
        let url = self.endpoint("chatbot/query");
        let response = self.client.post(&url).json(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let answer: ChatResponse =
            serde_json::from_str(&body).map_err(|source| ApiError::Deserialize {
                context: url.clone(),
                source,
            })?;

        tracing::debug!(related = ?answer.related_ids, "chatbot answered");
        Ok(answer)
    }
}
