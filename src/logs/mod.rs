//! Relay log search
//!
//! The relay does not write anywhere queryable except its log stream, so an
//! order counts as created once its id shows up in the relay container logs
//! near the order's `created_at`.

mod client;

pub use client::LokiClient;

use crate::error::LogQueryResult;

use async_trait::async_trait;

/// Raw log message bodies in provider order
pub type LogBatch = Vec<String>;

/// Closed interval of epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// `center ± half_width`
    pub fn around(center: i64, half_width: i64) -> Self {
        Self {
            start: center.saturating_sub(half_width),
            end: center.saturating_add(half_width),
        }
    }

    /// Ordered so `start <= end`, then narrowed so `end - start <= max_lookback`
    /// by pulling `start` forward
    pub fn clamped(self, max_lookback: i64) -> Self {
        let (mut start, end) = if self.start > self.end {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        };

        if end.saturating_sub(start) > max_lookback {
            start = end.saturating_sub(max_lookback);
        }

        Self { start, end }
    }

    pub fn len_secs(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}

/// Log-aggregation backend
#[async_trait]
pub trait LogSearch: Send + Sync {
    /// Name of the log source queried, as shown in reports
    fn source_name(&self) -> &str;

    /// Messages from the configured source within `window`, at most `limit`
    async fn search_logs(&self, window: TimeWindow, limit: u32) -> LogQueryResult<LogBatch>;
}

/// Exact, case-sensitive substring containment of `create_id` in any message
pub fn contains_create_id(batch: &[String], create_id: &str) -> bool {
    batch.iter().any(|message| message.contains(create_id))
}
