//! Stdio tool server
//!
//! Line-delimited JSON-RPC 2.0 exposing a single tool,
//! `check_transaction_status`, to agent runtimes. Stdout carries protocol
//! frames only; logging goes to stderr.

use crate::metrics;
use crate::status::StatusReconciler;

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

pub const TOOL_NAME: &str = "check_transaction_status";
pub const ADDRESS_ARG: &str = "initiator_source_address";

const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

// JSON-RPC error codes
const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: serde_json::Map<String, Value>,
}

struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Tool descriptor advertised by `tools/list`
pub fn tool_descriptor() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Check the status of a transaction by initiator source address.",
        "inputSchema": {
            "type": "object",
            "properties": {
                ADDRESS_ARG: {
                    "type": "string",
                    "description": "Address that initiated the swap on the source chain"
                }
            },
            "required": [ADDRESS_ARG]
        }
    })
}

pub struct ToolServer {
    reconciler: Arc<StatusReconciler>,
}

impl ToolServer {
    pub fn new(reconciler: Arc<StatusReconciler>) -> Self {
        Self { reconciler }
    }

    /// Serve requests until the reader reaches EOF
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Tool server listening on stdio");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.to_string().as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("Tool server input closed");
        Ok(())
    }

    /// Handle one frame. `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable frame: {}", e);
                return Some(error_response(Value::Null, RpcError::new(PARSE_ERROR, e.to_string())));
            }
        };

        let request: Request = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(error_response(
                    Value::Null,
                    RpcError::new(INVALID_REQUEST, e.to_string()),
                ))
            }
        };

        debug!("Tool request: {}", request.method);
        metrics::record_tool_call(&request.method);

        let Some(id) = request.id else {
            // notifications/initialized and friends
            return None;
        };

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(e) => error_response(id, e),
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => {
                let version = params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                Ok(json!({
                    "protocolVersion": version,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": [tool_descriptor()] })),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            )),
        }
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcError> {
        let params: CallParams = serde_json::from_value(params)
            .map_err(|e| RpcError::new(INVALID_PARAMS, e.to_string()))?;

        if params.name != TOOL_NAME {
            return Err(RpcError::new(
                INVALID_PARAMS,
                format!("Unknown tool: {}", params.name),
            ));
        }

        let address = params
            .arguments
            .get(ADDRESS_ARG)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RpcError::new(
                    INVALID_PARAMS,
                    format!("Missing required string argument '{}'", ADDRESS_ARG),
                )
            })?;

        let text = self.reconciler.transaction_status(address).await;

        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false
        }))
    }
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": error.code, "message": error.message }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogQueryResult;
    use crate::logs::{LogBatch, LogSearch, TimeWindow};
    use crate::orderbook::{MatchedOrderResult, MatchedOrders};
    use crate::status::ReconcilerSettings;
    use crate::store::MockOrderStore;

    use async_trait::async_trait;

    struct NoLogs;

    #[async_trait]
    impl LogSearch for NoLogs {
        fn source_name(&self) -> &str {
            "/staging-evm-relay"
        }

        async fn search_logs(&self, _window: TimeWindow, _limit: u32) -> LogQueryResult<LogBatch> {
            Ok(Vec::new())
        }
    }

    struct NoOrderbook;

    #[async_trait]
    impl MatchedOrders for NoOrderbook {
        async fn fetch_matched_order(&self, _create_id: &str) -> MatchedOrderResult {
            unreachable!("no order is ever confirmed in these tests")
        }
    }

    fn server() -> ToolServer {
        let mut store = MockOrderStore::new();
        store.expect_fetch_earliest_order().returning(|_| Ok(None));

        ToolServer::new(Arc::new(StatusReconciler::new(
            Arc::new(store),
            Arc::new(NoLogs),
            Arc::new(NoOrderbook),
            ReconcilerSettings::default(),
        )))
    }

    #[tokio::test]
    async fn test_tools_list_advertises_single_tool() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
            .await
            .unwrap();

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], TOOL_NAME);
        assert_eq!(tools[0]["inputSchema"]["required"], json!([ADDRESS_ARG]));
    }

    #[tokio::test]
    async fn test_call_returns_report_text() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"name":"check_transaction_status","arguments":{"initiator_source_address":"0xfeed"}}}"#,
            )
            .await
            .unwrap();

        assert_eq!(response["id"], "a");
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Transaction status for initiator_source_address '0xfeed':\n\
             No data found for initiator_source_address '0xfeed' in create_orders.\n"
        );
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_params() {
        let response = server()
            .handle_line(
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"check_transaction_status","arguments":{}}}"#,
            )
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method_and_garbage() {
        let server = server();

        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let response = server()
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_run_over_stream() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n"
        );
        let mut output = Vec::new();

        server().run(input.as_bytes(), &mut output).await.unwrap();

        let frames: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(frames[0]["result"]["serverInfo"]["name"], "swap-status");
        assert_eq!(frames[1]["id"], 2);
    }
}
