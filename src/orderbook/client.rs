//! HTTP client for the matching engine's matched-order endpoint

use super::{MatchedOrderResponse, MatchedOrderResult, MatchedOrders};
use crate::config::MatchedOrdersConfig;
use crate::error::MatchedOrderError;

use async_trait::async_trait;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct OrderbookClient {
    base_url: String,
    client: reqwest::Client,
}

impl OrderbookClient {
    pub fn new(config: &MatchedOrdersConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn matched_url(&self, create_id: &str) -> String {
        format!("{}/id/{}/matched", self.base_url, create_id)
    }

    async fn fetch(&self, create_id: &str) -> Result<MatchedOrderResult, MatchedOrderError> {
        let http_error = |error| MatchedOrderError::Http {
            create_id: create_id.to_string(),
            error,
        };

        let url = self.matched_url(create_id);
        debug!("Fetching matched order from {}", url);

        let response = self.client.get(&url).send().await.map_err(http_error)?;

        if !response.status().is_success() {
            return Err(MatchedOrderError::Status {
                create_id: create_id.to_string(),
                status: response.status().as_u16(),
            });
        }

        let raw = response.text().await.map_err(http_error)?;
        let decoded: MatchedOrderResponse =
            serde_json::from_str(&raw).map_err(|error| MatchedOrderError::Decode {
                create_id: create_id.to_string(),
                error,
            })?;

        Ok(MatchedOrderResult::from_response(decoded, raw))
    }
}

#[async_trait]
impl MatchedOrders for OrderbookClient {
    async fn fetch_matched_order(&self, create_id: &str) -> MatchedOrderResult {
        match self.fetch(create_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Matched order lookup failed: {}", e);
                MatchedOrderResult::Failed(e)
            }
        }
    }
}
