//! Error types for the Excel to PDF MCP server

use rmcp::ErrorData;
use thiserror::Error;

/// Result type alias for the conversion server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the conversion server
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied a path that cannot be used (empty, absolute)
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Tool arguments failed schema validation
    #[error("Invalid arguments: {reason}")]
    InvalidParams { reason: String },

    /// File extension is not accepted by the requested conversion
    #[error("Invalid file format {extension:?}, expected one of {expected:?}")]
    InvalidFormat {
        extension: String,
        expected: &'static [&'static str],
    },

    /// Path escapes the project root
    #[error("Path access denied: {path}")]
    AccessDenied { path: String },

    /// Referenced input file does not exist
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// External converter failed
    #[error("Conversion failed: {detail}")]
    ConversionFailed { detail: String },

    /// Converter executable could not be found
    #[error("Converter executable not found: {binary}")]
    DependencyMissing { binary: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Return a sanitized error message safe to send to clients.
    /// Converter output and absolute paths are omitted.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidArgument { reason } => reason.clone(),
            Error::InvalidParams { reason } => format!("Invalid arguments: {}", reason),
            Error::InvalidFormat { expected, .. } => format!(
                "Invalid file format. Only {} files are supported.",
                expected.join(" and ")
            ),
            Error::AccessDenied { .. } => "Path traversal detected. Access denied.".to_string(),
            Error::NotFound { path } => format!("File not found: {}", path),
            Error::ConversionFailed { detail } => detail.clone(),
            Error::DependencyMissing { .. } => "LibreOffice is not installed or not found in PATH. \
                 Please install LibreOffice to use this tool."
                .to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
        }
    }

    /// Map to an MCP protocol error. `label` names the document kind
    /// ("Excel", "Numbers") in conversion failure messages.
    pub fn to_mcp_error(&self, label: &str) -> ErrorData {
        match self {
            Error::InvalidArgument { .. }
            | Error::InvalidParams { .. }
            | Error::InvalidFormat { .. }
            | Error::NotFound { .. } => ErrorData::invalid_params(self.client_message(), None),
            Error::AccessDenied { .. } | Error::DependencyMissing { .. } => {
                ErrorData::invalid_request(self.client_message(), None)
            }
            Error::ConversionFailed { .. } | Error::Io(_) | Error::Serialization(_) => {
                ErrorData::invalid_request(
                    format!(
                        "Error converting {} to PDF: {}",
                        label,
                        self.client_message()
                    ),
                    None,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_invalid_format_message_lists_extensions() {
        let err = Error::InvalidFormat {
            extension: ".txt".to_string(),
            expected: &[".xlsx", ".xls"],
        };
        assert_eq!(
            err.client_message(),
            "Invalid file format. Only .xlsx and .xls files are supported."
        );
    }

    #[test]
    fn test_access_denied_hides_path() {
        let err = Error::AccessDenied {
            path: "/etc/passwd".to_string(),
        };
        assert!(!err.client_message().contains("/etc"));
        assert_eq!(err.to_mcp_error("Numbers").code, ErrorCode::INVALID_REQUEST);
    }

    #[test]
    fn test_conversion_failure_maps_to_invalid_request() {
        let err = Error::ConversionFailed {
            detail: "LibreOffice exited with status 1".to_string(),
        };
        let mcp = err.to_mcp_error("Numbers");
        assert_eq!(mcp.code, ErrorCode::INVALID_REQUEST);
        assert_eq!(
            mcp.message,
            "Error converting Numbers to PDF: LibreOffice exited with status 1"
        );
    }

    #[test]
    fn test_validation_errors_map_to_invalid_params() {
        let not_found = Error::NotFound {
            path: "report.numbers".to_string(),
        };
        assert_eq!(
            not_found.to_mcp_error("Numbers").code,
            ErrorCode::INVALID_PARAMS
        );

        let absolute = Error::InvalidArgument {
            reason: "Absolute paths are not allowed.".to_string(),
        };
        assert_eq!(
            absolute.to_mcp_error("Excel").code,
            ErrorCode::INVALID_PARAMS
        );
    }

    #[test]
    fn test_dependency_missing_mentions_libreoffice() {
        let err = Error::DependencyMissing {
            binary: "libreoffice".to_string(),
        };
        let mcp = err.to_mcp_error("Excel");
        assert_eq!(mcp.code, ErrorCode::INVALID_REQUEST);
        assert!(mcp.message.contains("LibreOffice is not installed"));
    }

    #[test]
    fn test_dependency_missing_message_has_no_label_prefix() {
        let err = Error::DependencyMissing {
            binary: "soffice".to_string(),
        };
        let mcp = err.to_mcp_error("Numbers");
        assert_eq!(
            mcp.message,
            "LibreOffice is not installed or not found in PATH. \
             Please install LibreOffice to use this tool."
        );
        assert!(!mcp.message.starts_with("Error converting"));
    }
}
