//! Loki-compatible log search client

use super::{LogBatch, LogSearch, TimeWindow};
use crate::config::LogSearchConfig;
use crate::error::{LogQueryError, LogQueryResult};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// HTTP client for the log-search `query_range` endpoint
#[derive(Debug)]
pub struct LokiClient {
    base_url: String,
    bearer: String,
    source: String,
    max_lookback_secs: i64,
    client: reqwest::Client,
}

impl LokiClient {
    pub fn new(config: &LogSearchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            bearer: format!("Bearer {}", config.token),
            source: config.source.clone(),
            max_lookback_secs: config.max_lookback_secs,
            client,
        })
    }

    fn label_selector(&self) -> String {
        format!("{{container=\"{}\"}}", self.source)
    }

    fn http_error(&self, error: reqwest::Error) -> LogQueryError {
        LogQueryError::Http {
            source_name: self.source.clone(),
            error,
        }
    }
}

#[async_trait]
impl LogSearch for LokiClient {
    fn source_name(&self) -> &str {
        &self.source
    }

    async fn search_logs(&self, window: TimeWindow, limit: u32) -> LogQueryResult<LogBatch> {
        let window = window.clamped(self.max_lookback_secs);
        debug!(
            "Searching {} logs from {} to {} (limit {})",
            self.source, window.start, window.end, limit
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", self.label_selector()),
                ("start", window.start.to_string()),
                ("end", window.end.to_string()),
                ("limit", limit.to_string()),
            ])
            .header(reqwest::header::AUTHORIZATION, &self.bearer)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| self.http_error(e))?;

        if !response.status().is_success() {
            return Err(LogQueryError::Status {
                source_name: self.source.clone(),
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: QueryResponse = response.json().await.map_err(|e| self.http_error(e))?;
        let batch = body.into_messages();
        debug!("Log search returned {} messages", batch.len());

        Ok(batch)
    }
}

// Response types

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: QueryData,
}

#[derive(Debug, Default, Deserialize)]
struct QueryData {
    #[serde(default)]
    result: Vec<LogStream>,
}

#[derive(Debug, Deserialize)]
struct LogStream {
    #[serde(default)]
    values: Vec<(serde_json::Value, String)>,
}

impl QueryResponse {
    /// Message bodies of every stream, flattened in the order given
    fn into_messages(self) -> LogBatch {
        self.data
            .result
            .into_iter()
            .flat_map(|stream| stream.values.into_iter().map(|(_, message)| message))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn config(base_url: String) -> LogSearchConfig {
        LogSearchConfig {
            base_url,
            token: "t0ken".to_string(),
            source: "/staging-evm-relay".to_string(),
            limit: 100,
            timeout_secs: 5,
            window_secs: 300,
            max_lookback_secs: 30 * 24 * 3600,
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/loki/api/v1/query_range", addr)
    }

    #[test]
    fn test_messages_flattened_in_order() {
        let body: QueryResponse = serde_json::from_str(
            r#"{"data":{"result":[
                {"stream":{"container":"/staging-evm-relay"},"values":[["2","second"],["1","first"]]},
                {"values":[["3","third"]]}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(body.into_messages(), vec!["second", "first", "third"]);
    }

    #[test]
    fn test_missing_keys_mean_empty() {
        let body: QueryResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(body.into_messages().is_empty());

        let body: QueryResponse = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert!(body.into_messages().is_empty());
    }

    #[tokio::test]
    async fn test_request_shape() {
        let seen: Arc<Mutex<Option<(HashMap<String, String>, Option<String>)>>> =
            Arc::new(Mutex::new(None));
        let captured = seen.clone();

        let app = Router::new().route(
            "/loki/api/v1/query_range",
            get(move |Query(params): Query<HashMap<String, String>>, headers: HeaderMap| {
                let captured = captured.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *captured.lock().unwrap() = Some((params, auth));
                    Json(serde_json::json!({
                        "data": {"result": [{"values": [["1", "create_id=abc123 relayed"]]}]}
                    }))
                }
            }),
        );
        let client = LokiClient::new(&config(serve(app).await)).unwrap();

        let batch = client
            .search_logs(TimeWindow::new(1_000_300, 999_700), 100)
            .await
            .unwrap();
        assert_eq!(batch, vec!["create_id=abc123 relayed"]);

        let (params, auth) = seen.lock().unwrap().take().unwrap();
        assert_eq!(params["query"], "{container=\"/staging-evm-relay\"}");
        assert_eq!(params["start"], "999700");
        assert_eq!(params["end"], "1000300");
        assert_eq!(params["limit"], "100");
        assert_eq!(auth.as_deref(), Some("Bearer t0ken"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let app = Router::new().route(
            "/loki/api/v1/query_range",
            get(|| async { (StatusCode::UNAUTHORIZED, "no token") }),
        );
        let client = LokiClient::new(&config(serve(app).await)).unwrap();

        let err = client
            .search_logs(TimeWindow::new(0, 600), 100)
            .await
            .unwrap_err();
        match err {
            LogQueryError::Status { status, body, .. } => {
                assert_eq!(status, 401);
                assert_eq!(body, "no token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let client = LokiClient::new(&config("http://127.0.0.1:1/query_range".to_string())).unwrap();
        let err = client
            .search_logs(TimeWindow::new(0, 600), 100)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/staging-evm-relay"));
    }
}
