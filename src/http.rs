//! HTTP conversion API
//!
//! `POST /convert/excel-to-pdf` and `POST /convert/numbers-to-pdf` accept a
//! multipart `file` field. `GET /mcp` publishes the resource manifest.

use crate::config::{HttpConfig, ServerConfig};
use crate::convert::{ConversionInvoker, ConversionRequest, Converter, DocumentKind};
use crate::error::Error;
use crate::source::{ensure_dir, stage_upload, StagedUpload};
use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    invoker: ConversionInvoker,
    base_url: Arc<str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub file_path: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorBody,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn conversion_failed(kind: DocumentKind, details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiErrorBody {
                error: format!("Error converting {} to PDF", kind.label()),
                details: Some(details.into()),
            },
        }
    }

    /// Map a lifecycle error: caller mistakes are 400, everything else 500
    pub fn from_error(kind: DocumentKind, err: &Error) -> Self {
        match err {
            Error::InvalidFormat { .. }
            | Error::InvalidParams { .. }
            | Error::InvalidArgument { .. }
            | Error::AccessDenied { .. }
            | Error::NotFound { .. } => Self::bad_request(err.client_message()),
            Error::ConversionFailed { .. }
            | Error::DependencyMissing { .. }
            | Error::Io(_)
            | Error::Serialization(_) => Self::conversion_failed(kind, err.client_message()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build the router. Requests share `config` and `converter`.
pub fn router(config: ServerConfig, base_url: &str, converter: Arc<dyn Converter>) -> Router {
    let body_limit = config.max_upload_bytes;
    let state = AppState {
        config: Arc::new(config),
        invoker: ConversionInvoker::new(converter),
        base_url: Arc::from(base_url.trim_end_matches('/')),
    };

    Router::new()
        .route(DocumentKind::Excel.route(), post(convert_excel))
        .route(DocumentKind::Numbers.route(), post(convert_numbers))
        .route("/mcp", get(manifest))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn convert_excel(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    convert_upload(state, DocumentKind::Excel, multipart).await
}

async fn convert_numbers(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    convert_upload(state, DocumentKind::Numbers, multipart).await
}

async fn convert_upload(
    state: AppState,
    kind: DocumentKind,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let upload_dir = ensure_dir(&state.config.upload_dir).await;
    let staged = receive_file(&mut multipart, &upload_dir, kind).await?;

    let outcome = ConversionRequest::from_upload(kind, staged, state.config.output_dir.clone())
        .execute(&state.invoker)
        .await
        .map_err(|e| {
            tracing::warn!(route = kind.route(), error = %e, "upload conversion failed");
            ApiError::from_error(kind, &e)
        })?;

    Ok(Json(ConvertResponse {
        success: true,
        file_path: outcome.output_path.display().to_string(),
        message: outcome.message,
    }))
}

/// Stream the `file` field into a staged upload.
///
/// Other fields are skipped. A partially written upload is deleted when an
/// error drops it.
async fn receive_file(
    multipart: &mut Multipart,
    upload_dir: &Path,
    kind: DocumentKind,
) -> Result<StagedUpload, ApiError> {
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::bad_request("No file provided")),
            Err(err) => return Err(multipart_error(err)),
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = match field.file_name().filter(|name| !name.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => return Err(ApiError::bad_request("No file provided")),
        };

        let staged = stage_upload(upload_dir, &filename).map_err(|e| {
            tracing::warn!(dir = %upload_dir.display(), error = %e, "failed to stage upload");
            ApiError::conversion_failed(kind, e.client_message())
        })?;
        let mut writer = staged
            .writer()
            .map_err(|e| ApiError::conversion_failed(kind, e.client_message()))?;

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => writer.write_all(&chunk).await.map_err(|e| {
                    tracing::warn!(path = %staged.path().display(), error = %e, "failed to write upload");
                    ApiError::conversion_failed(kind, Error::Io(e).client_message())
                })?,
                Ok(None) => break,
                Err(err) => return Err(multipart_error(err)),
            }
        }
        writer
            .flush()
            .await
            .map_err(|e| ApiError::conversion_failed(kind, Error::Io(e).client_message()))?;

        return Ok(staged);
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    let status = err.status();
    tracing::warn!(status = status.as_u16(), error = %err, "failed to read multipart payload");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError {
            status,
            body: ApiErrorBody {
                error: "Uploaded file is too large".to_string(),
                details: None,
            },
        }
    } else {
        ApiError::bad_request("Invalid multipart payload")
    }
}

/// Resource manifest for MCP clients discovering the HTTP endpoints
async fn manifest(State(state): State<AppState>) -> Json<serde_json::Value> {
    let resources: Vec<serde_json::Value> = DocumentKind::ALL
        .into_iter()
        .map(|kind| {
            serde_json::json!({
                "name": kind.resource_name(),
                "description": kind.description(),
                "endpoint": format!("{}{}", state.base_url, kind.route()),
                "method": "POST",
                "inputs": {
                    "file": {
                        "type": "file",
                        "required": true,
                        "accept": kind.accepted_extensions(),
                        "description": format!("The {} file to convert", kind.label()),
                    }
                },
                "outputs": {
                    "pdf": {
                        "type": "file",
                        "description": "The converted PDF file",
                    }
                },
            })
        })
        .collect();

    Json(serde_json::json!({
        "title": "Excel to PDF Converter",
        "description": "Converts Excel (.xls/.xlsx) and Apple Numbers (.numbers) files to PDF",
        "version": env!("CARGO_PKG_VERSION"),
        "baseUrl": &*state.base_url,
        "resources": resources,
    }))
}

/// Bind the listener and serve until the process ends
pub async fn serve(
    config: ServerConfig,
    http: HttpConfig,
    converter: Arc<dyn Converter>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((http.host.as_str(), http.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", http.host, http.port))?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Excel to PDF server running on http://{}:{}", http.host, http.port);
    tracing::info!("MCP documentation available at {}/mcp", http.base_url.trim_end_matches('/'));

    axum::serve(listener, router(config, &http.base_url, converter)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_format_is_bad_request() {
        let err = Error::InvalidFormat {
            extension: ".txt".to_string(),
            expected: DocumentKind::Excel.accepted_extensions(),
        };
        let api = ApiError::from_error(DocumentKind::Excel, &err);
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            api.body.error,
            "Invalid file format. Only .xlsx and .xls files are supported."
        );
        assert!(api.body.details.is_none());
    }

    #[test]
    fn test_conversion_failure_is_server_error() {
        let err = Error::ConversionFailed {
            detail: "LibreOffice exited with status 77".to_string(),
        };
        let api = ApiError::from_error(DocumentKind::Numbers, &err);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.error, "Error converting Numbers to PDF");
        assert_eq!(
            api.body.details.as_deref(),
            Some("LibreOffice exited with status 77")
        );
    }

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = serde_json::to_value(ApiErrorBody {
            error: "No file provided".to_string(),
            details: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "error": "No file provided" }));
    }

    #[test]
    fn test_success_body_is_camel_case() {
        let body = serde_json::to_value(ConvertResponse {
            success: true,
            file_path: "/srv/output/book.pdf".to_string(),
            message: "Excel file successfully converted to PDF".to_string(),
        })
        .unwrap();
        assert_eq!(body["filePath"], "/srv/output/book.pdf");
        assert_eq!(body["success"], true);
    }
}
