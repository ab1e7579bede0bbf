//! Startup check for the converter executable

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Installation hints printed when LibreOffice is missing
pub const INSTALL_GUIDANCE: &str = "Please install LibreOffice:
  - macOS: brew install libreoffice
  - Ubuntu/Debian: apt-get install libreoffice
  - Windows: Download from https://www.libreoffice.org/download/download/";

#[cfg(windows)]
const LOOKUP_COMMAND: &str = "where";
#[cfg(not(windows))]
const LOOKUP_COMMAND: &str = "which";

/// Locate `name` on the search path with `which` (`where` on Windows).
///
/// Returns the first reported location.
pub async fn locate_executable(name: &str) -> Option<PathBuf> {
    let output = Command::new(LOOKUP_COMMAND)
        .arg(name)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
}

/// Fail with `DependencyMissing` when the converter cannot be located
pub async fn check_converter(binary: &str) -> Result<PathBuf> {
    match locate_executable(binary).await {
        Some(path) => {
            tracing::info!(binary, path = %path.display(), "found LibreOffice");
            Ok(path)
        }
        None => Err(Error::DependencyMissing {
            binary: binary.to_string(),
        }),
    }
}
