//! Error types for the swap status pipeline
//!
//! One enum per external collaborator. Only the store and log search errors
//! can end a reconciliation run early; timestamp and matched-order failures
//! are folded into the report.

use thiserror::Error;

/// Order store failures (connection, query or timeout)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database query timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// A `created_at` value that could not be turned into epoch seconds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised timestamp format: {value:?}")]
pub struct TimestampParseError {
    pub value: String,
}

/// Log search failures
#[derive(Error, Debug)]
pub enum LogQueryError {
    #[error("Request failed for container '{source_name}': {error}")]
    Http {
        source_name: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("Request failed for container '{source_name}': status {status}: {body}")]
    Status {
        source_name: String,
        status: u16,
        body: String,
    },
}

/// Matching-engine failures. Never propagated past the client.
#[derive(Error, Debug)]
pub enum MatchedOrderError {
    #[error("Matched order API request failed for create_id '{create_id}': {error}")]
    Http {
        create_id: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("Matched order API request failed for create_id '{create_id}': status {status}")]
    Status { create_id: String, status: u16 },

    #[error("Matched order API returned an unreadable body for create_id '{create_id}': {error}")]
    Decode {
        create_id: String,
        #[source]
        error: serde_json::Error,
    },
}

impl StoreError {
    /// Label used for the external failure counter
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "database",
            StoreError::Timeout { .. } => "timeout",
        }
    }
}

impl LogQueryError {
    pub fn kind(&self) -> &'static str {
        match self {
            LogQueryError::Http { error, .. } if error.is_timeout() => "timeout",
            LogQueryError::Http { error, .. } if error.is_decode() => "decode",
            LogQueryError::Http { .. } => "transport",
            LogQueryError::Status { .. } => "status",
        }
    }
}

impl MatchedOrderError {
    pub fn kind(&self) -> &'static str {
        match self {
            MatchedOrderError::Http { error, .. } if error.is_timeout() => "timeout",
            MatchedOrderError::Http { .. } => "transport",
            MatchedOrderError::Status { .. } => "status",
            MatchedOrderError::Decode { .. } => "decode",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type LogQueryResult<T> = Result<T, LogQueryError>;
