mod blog;

use hatena_core::{ErrorKind, HatenaError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool, INTERNAL_ERROR, INVALID_PARAMS};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "hatena".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let result = ToolsList {
        tools: blog::tools(),
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {e}")))?;

    if global.verbose {
        anstream::eprintln!("Calling {} with {:?}", params.name, params.arguments);
    }

    match params.name.as_str() {
        "hatena_list_blogs" => blog::handle_list_blogs(global),
        name if blog::is_entry_tool(name) => {
            let selected = params
                .arguments
                .as_ref()
                .and_then(|args| args.get("blog"))
                .and_then(|blog| blog.as_str())
                .map(str::to_string);

            let client = crate::blog::create_client_for(global, selected).map_err(tool_error)?;
            blog::call_entry_tool(name, params.arguments, &client).await
        }
        _ => Err(JsonRpcError::invalid_params(format!(
            "Unknown tool: {}",
            params.name
        ))),
    }
}

/// Deserialize tool arguments, treating a missing object as empty
pub fn parse_args<A: DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<A, JsonRpcError> {
    let arguments = match arguments {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(arguments) => arguments,
    };

    serde_json::from_value(arguments)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {e}")))
}

/// Wrap tool output as pretty JSON text content
pub fn text_result<S: Serialize>(data: &S) -> Result<serde_json::Value, JsonRpcError> {
    let json_string = serde_json::to_string_pretty(data)
        .map_err(|e| JsonRpcError::internal(format!("Serialization error: {e}")))?;

    let result = CallToolResult {
        content: vec![Content::Text { text: json_string }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}

/// Convert a failed tool call into a JSON-RPC error.
///
/// Hatena errors keep their kind and status in `data` so clients can react
/// to authentication or not-found failures without parsing the message.
pub fn tool_error(err: color_eyre::eyre::Report) -> JsonRpcError {
    let message = format!("Tool execution error: {err:#}");

    let Some(hatena) = err.downcast_ref::<HatenaError>() else {
        return JsonRpcError::internal(message);
    };

    let rejected_locally = hatena.status().is_none()
        && matches!(hatena.kind(), ErrorKind::Validation | ErrorKind::Configuration);

    JsonRpcError {
        code: if rejected_locally {
            INVALID_PARAMS
        } else {
            INTERNAL_ERROR
        },
        message,
        data: Some(serde_json::json!({
            "kind": hatena.kind(),
            "status": hatena.status(),
            "operation": hatena.operation(),
            "retryable": hatena.is_retryable(),
        })),
    }
}
