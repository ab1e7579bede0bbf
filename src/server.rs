//! MCP server implementation using rmcp

use crate::config::ServerConfig;
use crate::convert::{
    ConversionInvoker, ConversionRequest, Converter, DocumentKind, LibreOfficeConverter,
    OutputFormat,
};
use crate::error::Error;
use crate::source::{ensure_dir, resolve_path};
use anyhow::Result;
use rmcp::{model::*, service::RequestContext, RoleServer, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Request/Response types for the conversion tools
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConvertToolParams {
    /// Relative path to the file to convert, resolved against the server's working directory
    pub input_path: String,
    /// Output format (currently only PDF is supported)
    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ConvertToolResult {
    pub success: bool,
    /// Converted file, relative to the server's working directory
    pub output_path: String,
    pub message: String,
}

/// Decode raw tool arguments. Missing arguments decode as an empty object.
fn parse_params(arguments: Option<JsonObject>) -> crate::error::Result<ConvertToolParams> {
    let value = serde_json::Value::Object(arguments.unwrap_or_default());
    let params: ConvertToolParams =
        serde_json::from_value(value).map_err(|e| Error::InvalidParams {
            reason: e.to_string(),
        })?;

    if params.input_path.is_empty() {
        return Err(Error::InvalidParams {
            reason: "input_path must contain at least 1 character".to_string(),
        });
    }

    Ok(params)
}

/// JSON schema shared by every conversion tool
fn input_schema() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(ConvertToolParams);
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(map)) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

// ============================================================================
// Server
// ============================================================================

/// Conversion MCP server
#[derive(Clone)]
pub struct ConvertServer {
    config: Arc<ServerConfig>,
    invoker: ConversionInvoker,
}

impl ConvertServer {
    /// Create a server that converts with LibreOffice
    pub fn with_config(config: ServerConfig) -> Self {
        let converter = LibreOfficeConverter::new(config.soffice_binary.clone());
        Self::with_converter(config, Arc::new(converter))
    }

    /// Create a server with a custom converter backend
    pub fn with_converter(config: ServerConfig, converter: Arc<dyn Converter>) -> Self {
        Self {
            config: Arc::new(config),
            invoker: ConversionInvoker::new(converter),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Tool definitions, one per document kind
    pub fn tools(&self) -> Vec<Tool> {
        let schema = input_schema();
        DocumentKind::ALL
            .into_iter()
            .map(|kind| Tool::new(kind.tool_name(), kind.description(), schema.clone()))
            .collect()
    }

    /// Route a tool call by name.
    ///
    /// Failures are scoped to the call and returned as protocol errors.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let kind = DocumentKind::from_tool_name(name).ok_or_else(|| {
            ErrorData::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", name),
                None,
            )
        })?;

        let outcome = match parse_params(arguments) {
            Ok(params) => self.process_convert(kind, &params).await,
            Err(e) => Err(e),
        };

        let result = outcome.map_err(|e| {
            tracing::warn!(tool = kind.tool_name(), error = %e, "conversion tool failed");
            e.to_mcp_error(kind.label())
        })?;

        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| Error::from(e).to_mcp_error(kind.label()))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    async fn process_convert(
        &self,
        kind: DocumentKind,
        params: &ConvertToolParams,
    ) -> crate::error::Result<ConvertToolResult> {
        let temp_dir = ensure_dir(&self.config.temp_dir).await;
        let resolved = resolve_path(&self.config.project_root, &params.input_path)?;

        let outcome = ConversionRequest::from_path(kind, resolved, params.input_path.clone(), temp_dir)
            .execute(&self.invoker)
            .await?;

        let relative = outcome
            .output_path
            .strip_prefix(&self.config.project_root)
            .unwrap_or(&outcome.output_path);

        Ok(ConvertToolResult {
            success: true,
            output_path: relative.display().to_string(),
            message: outcome.message,
        })
    }
}

impl ServerHandler for ConvertServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Converts Excel (.xls, .xlsx) and Apple Numbers (.numbers) files to PDF. \
                 Input paths are relative to the server's working directory; converted files \
                 are written to its temp/ directory."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.dispatch(&request.name, request.arguments).await
    }
}

/// Run the MCP server on stdio with LibreOffice conversion
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    serve_stdio(ConvertServer::with_config(config)).await
}

/// Run an already configured MCP server on stdio
pub async fn serve_stdio(server: ConvertServer) -> Result<()> {
    tracing::info!(
        project_root = %server.config().project_root.display(),
        "Excel to PDF MCP server running on stdio"
    );

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
