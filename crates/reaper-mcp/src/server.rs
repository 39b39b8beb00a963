//! MCP Server
//!
//! Handles the MCP protocol over stdio, processing JSON-RPC 2.0 messages one
//! at a time. Tool calls block on REAPER, so they run under `block_in_place`.

use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::client::CommandClient;
use crate::handler::ToolFacade;
use crate::protocol::{
    parse_params, to_result, CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListResourcesResult, ListToolsResult, ReadResourceParams, ReadResourceResult, Resource,
    ResourcesCapability, RpcError, ServerCapabilities, ServerInfo, TextResourceContents,
    ToolsCapability, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::tools::all_tools;

/// Snapshot of the open project
pub const PROJECT_RESOURCE: &str = "reaper://project";

const INSTRUCTIONS: &str = "Controls a running REAPER session. Timeline positions and lengths \
     are in beats (quarter notes); track, item, FX and parameter indices are zero-based.";

/// MCP Server that communicates over stdio
pub struct McpServer<C> {
    name: String,
    facade: ToolFacade<C>,
}

impl<C: CommandClient> McpServer<C> {
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self {
            name: name.into(),
            facade: ToolFacade::new(client),
        }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve line-delimited JSON-RPC until `reader` reaches EOF
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                // EOF - client disconnected
                info!("Client disconnected");
                break;
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            debug!("Received: {}", message);

            if let Some(resp) = self.handle_message(message).await {
                let resp_str = serde_json::to_string(&resp)?;
                debug!("Sending: {}", resp_str);
                writer.write_all(resp_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC message
    async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        // Notifications carry no id and get no response
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        let result = self.handle_request(&request.method, request.params).await;
        Some(JsonRpcResponse::from_result(Some(id), result))
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                debug!("Request cancelled");
            }
            _ => {
                debug!("Unknown notification: {}", method);
            }
        }
    }

    async fn handle_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, RpcError> {
        match method {
            "initialize" => self.handle_initialize(),
            "tools/list" => to_result(ListToolsResult { tools: all_tools() }),
            "tools/call" => self.handle_call_tool(params),
            "resources/list" => self.handle_list_resources(),
            "resources/read" => self.handle_read_resource(params),
            "ping" => Ok(json!({})),
            _ => {
                warn!("Unknown method: {}", method);
                Err((METHOD_NOT_FOUND, format!("Method not found: {}", method)))
            }
        }
    }

    fn handle_initialize(&mut self) -> Result<Value, RpcError> {
        info!("Initializing MCP server");

        to_result(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
                resources: Some(ResourcesCapability { subscribe: false }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        })
    }

    fn handle_call_tool(&mut self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: CallToolParams = parse_params(params)?;

        info!("Calling tool: {}", params.name);
        let facade = &mut self.facade;
        let result =
            tokio::task::block_in_place(|| facade.call_tool(&params.name, params.arguments));

        to_result(result)
    }

    fn handle_list_resources(&self) -> Result<Value, RpcError> {
        let resources = vec![Resource {
            uri: PROJECT_RESOURCE.to_string(),
            name: "REAPER Project".to_string(),
            description: Some(
                "Tempo, time signature, track count, play state and cursor of the open project."
                    .to_string(),
            ),
            mime_type: Some("application/json".to_string()),
        }];

        to_result(ListResourcesResult { resources })
    }

    fn handle_read_resource(&mut self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: ReadResourceParams = parse_params(params)?;

        if params.uri != PROJECT_RESOURCE {
            return Err((INVALID_PARAMS, format!("Unknown resource: {}", params.uri)));
        }

        let facade = &mut self.facade;
        let text = tokio::task::block_in_place(|| facade.call("get_project_info", Map::new()));

        to_result(ReadResourceResult {
            contents: vec![TextResourceContents {
                uri: params.uri,
                mime_type: "application/json".to_string(),
                text,
            }],
        })
    }
}
