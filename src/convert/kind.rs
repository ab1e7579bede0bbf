//! Supported source document kinds and output formats

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A convertible source document family.
///
/// Each variant backs one MCP tool and one HTTP route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Microsoft Excel workbooks
    Excel,
    /// Apple Numbers spreadsheets
    Numbers,
}

impl DocumentKind {
    /// All kinds, in tool registration order
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Excel, DocumentKind::Numbers];

    pub fn accepted_extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Excel => &[".xlsx", ".xls"],
            DocumentKind::Numbers => &[".numbers"],
        }
    }

    pub fn tool_name(self) -> &'static str {
        match self {
            DocumentKind::Excel => "convert_excel_to_pdf",
            DocumentKind::Numbers => "convert_numbers_to_pdf",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tool_name() == name)
    }

    /// Resource name in the HTTP manifest
    pub fn resource_name(self) -> &'static str {
        match self {
            DocumentKind::Excel => "excel-to-pdf",
            DocumentKind::Numbers => "numbers-to-pdf",
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            DocumentKind::Excel => "/convert/excel-to-pdf",
            DocumentKind::Numbers => "/convert/numbers-to-pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Excel => "Excel",
            DocumentKind::Numbers => "Numbers",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DocumentKind::Excel => "Converts Excel files (.xls, .xlsx) to PDF format",
            DocumentKind::Numbers => "Converts Apple Numbers files (.numbers) to PDF format",
        }
    }

    pub fn success_message(self) -> String {
        format!("{} file successfully converted to PDF", self.label())
    }

    /// Case-insensitive check of `extension` (".xlsx" style) against the
    /// accepted set
    pub fn check_extension(self, extension: &str) -> Result<()> {
        let extension = extension.to_ascii_lowercase();
        if self.accepted_extensions().contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(Error::InvalidFormat {
                extension,
                expected: self.accepted_extensions(),
            })
        }
    }
}

/// Lowercase extension of `name` including the dot, or an empty string
pub fn source_extension<P: AsRef<Path>>(name: P) -> String {
    name.as_ref()
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Conversion target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
}

impl OutputFormat {
    /// Extension without the dot, as LibreOffice's `--convert-to` expects
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
        }
    }
}
