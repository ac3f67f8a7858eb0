//! Matching-engine settlement lookups
//!
//! Unlike the store and log clients, this client never fails: every error is
//! carried in-band as `MatchedOrderResult::Failed` so the already confirmed
//! creation survives into the report.

mod client;

pub use client::OrderbookClient;

use crate::error::MatchedOrderError;

use async_trait::async_trait;
use serde::Deserialize;

/// Matching-engine status that marks a usable response
pub const STATUS_OK: &str = "Ok";

/// One leg of a swap
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SwapLeg {
    #[serde(default)]
    pub initiate_tx_hash: Option<String>,
    #[serde(default)]
    pub redeem_tx_hash: Option<String>,
    #[serde(default)]
    pub current_confirmations: Option<u64>,
    #[serde(default)]
    pub required_confirmations: Option<u64>,
    /// Fields not modelled here (swap id, chain, amounts, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SwapLeg {
    pub fn current_confirmations(&self) -> u64 {
        self.current_confirmations.unwrap_or(0)
    }

    pub fn required_confirmations(&self) -> u64 {
        self.required_confirmations.unwrap_or(1)
    }

    /// Initiate transaction seen with enough confirmations
    pub fn is_initiated(&self) -> bool {
        has_hash(&self.initiate_tx_hash)
            && self.current_confirmations() >= self.required_confirmations()
    }

    pub fn is_redeemed(&self) -> bool {
        has_hash(&self.redeem_tx_hash)
    }

    /// `{}` on the wire
    pub fn is_empty(&self) -> bool {
        self.initiate_tx_hash.is_none()
            && self.redeem_tx_hash.is_none()
            && self.current_confirmations.is_none()
            && self.required_confirmations.is_none()
            && self.extra.is_empty()
    }
}

fn has_hash(hash: &Option<String>) -> bool {
    hash.as_deref().is_some_and(|h| !h.is_empty())
}

/// Both legs of a matched order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MatchedOrder {
    #[serde(default)]
    pub source_swap: Option<SwapLeg>,
    #[serde(default)]
    pub destination_swap: Option<SwapLeg>,
}

impl MatchedOrder {
    /// An empty leg object counts as absent
    pub fn has_any_leg(&self) -> bool {
        [&self.source_swap, &self.destination_swap]
            .into_iter()
            .flatten()
            .any(|leg| !leg.is_empty())
    }
}

/// Outcome of a matched-order lookup
#[derive(Debug)]
pub enum MatchedOrderResult {
    /// Status `Ok` with a result body
    Matched {
        status: String,
        order: MatchedOrder,
        raw: String,
    },
    /// Any other status, or `Ok` without a result
    Unmatched { status: String, raw: String },
    /// Transport, HTTP status or decode failure
    Failed(MatchedOrderError),
}

impl MatchedOrderResult {
    /// Classify a decoded response body
    pub fn from_response(response: MatchedOrderResponse, raw: String) -> Self {
        match response.result {
            Some(order) if response.status == STATUS_OK => MatchedOrderResult::Matched {
                status: response.status,
                order,
                raw,
            },
            _ => MatchedOrderResult::Unmatched {
                status: response.status,
                raw,
            },
        }
    }

    /// Matched order body, only for `Ok` responses
    pub fn order(&self) -> Option<&MatchedOrder> {
        match self {
            MatchedOrderResult::Matched { order, .. } => Some(order),
            _ => None,
        }
    }
}

/// Wire shape of `GET /id/{create_id}/matched`
#[derive(Debug, Clone, Deserialize)]
pub struct MatchedOrderResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Option<MatchedOrder>,
}

/// Matching-engine backend
#[async_trait]
pub trait MatchedOrders: Send + Sync {
    async fn fetch_matched_order(&self, create_id: &str) -> MatchedOrderResult;
}
