//! Process configuration
//!
//! Built once at startup and shared read-only with every handler.

use crate::error::Result;
use crate::source::resolver::normalize_lexically;
use std::path::{Path, PathBuf};

/// Default LibreOffice executable looked up on the search path
#[cfg(windows)]
pub const DEFAULT_SOFFICE_BINARY: &str = "soffice.exe";
/// Default LibreOffice executable looked up on the search path
#[cfg(not(windows))]
pub const DEFAULT_SOFFICE_BINARY: &str = "libreoffice";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Filesystem layout and converter settings shared by both front ends
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root every caller-supplied path is confined to
    pub project_root: PathBuf,
    /// Output directory for tool-call conversions (`<root>/temp`)
    pub temp_dir: PathBuf,
    /// Staging directory for HTTP uploads (`<root>/tmp`)
    pub upload_dir: PathBuf,
    /// Output directory for HTTP conversions (`<root>/output`)
    pub output_dir: PathBuf,
    /// LibreOffice executable name or path
    pub soffice_binary: String,
    /// Maximum HTTP request body size in bytes (default: 100MB)
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Lay out the working directories under `root`.
    ///
    /// A relative root is taken relative to the current working directory,
    /// which fails if that directory cannot be read.
    pub fn from_root<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let root = if root.is_absolute() {
            normalize_lexically(root)
        } else {
            normalize_lexically(&std::env::current_dir()?.join(root))
        };

        Ok(Self {
            temp_dir: root.join("temp"),
            upload_dir: root.join("tmp"),
            output_dir: root.join("output"),
            project_root: root,
            soffice_binary: DEFAULT_SOFFICE_BINARY.to_string(),
            max_upload_bytes: 100 * 1024 * 1024, // 100MB
        })
    }

    /// Capture the process working directory as the project root
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        tracing::info!(project_root = %cwd.display(), "project root determined from working directory");
        Self::from_root(cwd)
    }

    /// Override the converter executable
    pub fn with_soffice_binary(mut self, binary: impl Into<String>) -> Self {
        self.soffice_binary = binary.into();
        self
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Public base URL advertised in the resource manifest
    pub base_url: String,
}

impl HttpConfig {
    /// Build listener settings, deriving the base URL from host and port
    /// when none is given.
    pub fn new(host: impl Into<String>, port: u16, base_url: Option<String>) -> Self {
        let host = host.into();
        let base_url = base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| format!("http://{}:{}", host, port));
        Self {
            host,
            port,
            base_url,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let root = std::env::temp_dir().join("excel-to-pdf-layout");
        let config = ServerConfig::from_root(&root).unwrap();
        assert_eq!(config.temp_dir, root.join("temp"));
        assert_eq!(config.upload_dir, root.join("tmp"));
        assert_eq!(config.output_dir, root.join("output"));
        assert_eq!(config.soffice_binary, DEFAULT_SOFFICE_BINARY);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_root_is_normalized() {
        let base = std::env::temp_dir();
        let config = ServerConfig::from_root(base.join("a").join("..").join("b")).unwrap();
        assert_eq!(config.project_root, normalize_lexically(&base.join("b")));
    }

    #[test]
    fn test_relative_root_is_absolute() {
        let config = ServerConfig::from_root("workspace").unwrap();
        assert!(config.project_root.is_absolute());
    }

    #[test]
    fn test_http_default_base_url() {
        let config = HttpConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_http_explicit_base_url() {
        let config = HttpConfig::new("0.0.0.0", 8080, Some("https://convert.example.com".into()));
        assert_eq!(config.base_url, "https://convert.example.com");

        let blank = HttpConfig::new("0.0.0.0", 8080, Some("  ".into()));
        assert_eq!(blank.base_url, "http://0.0.0.0:8080");
    }
}
