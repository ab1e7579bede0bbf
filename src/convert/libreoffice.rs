//! LibreOffice headless conversion backend

use super::invoker::Converter;
use super::kind::OutputFormat;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Base name of the source file inside the work directory
const SOURCE_STEM: &str = "source";

/// Runs `soffice --headless --convert-to` in a private work directory per
/// call.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    binary: String,
}

impl LibreOfficeConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

/// `file://` URL for a LibreOffice user profile directory.
///
/// Each call gets its own profile so simultaneous conversions do not
/// contend for the shared profile lock.
fn profile_url(dir: &Path) -> Result<String> {
    url::Url::from_directory_path(dir)
        .map(|url| url.to_string())
        .map_err(|_| Error::ConversionFailed {
            detail: format!("cannot build profile URL for {}", dir.display()),
        })
}

#[async_trait]
impl Converter for LibreOfficeConverter {
    async fn convert(
        &self,
        input: &[u8],
        source_ext: &str,
        target: OutputFormat,
    ) -> Result<Vec<u8>> {
        let workdir = tempfile::Builder::new().prefix("soffice-").tempdir()?;
        let source_path = workdir
            .path()
            .join(format!("{}{}", SOURCE_STEM, source_ext));
        tokio::fs::write(&source_path, input).await?;

        let profile = profile_url(&workdir.path().join("profile"))?;

        let output = Command::new(&self.binary)
            .arg(format!("-env:UserInstallation={}", profile))
            .arg("--headless")
            .arg("--convert-to")
            .arg(target.extension())
            .arg("--outdir")
            .arg(workdir.path())
            .arg(&source_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                tracing::warn!(binary = %self.binary, error = %e, "failed to spawn LibreOffice");
                if e.kind() == ErrorKind::NotFound {
                    Error::DependencyMissing {
                        binary: self.binary.clone(),
                    }
                } else {
                    Error::ConversionFailed {
                        detail: format!("failed to start LibreOffice: {}", e),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                binary = %self.binary,
                exit_code = output.status.code().unwrap_or(-1),
                stderr = %stderr,
                "LibreOffice conversion failed"
            );
            return Err(Error::ConversionFailed {
                detail: match output.status.code() {
                    Some(code) => format!("LibreOffice exited with status {}", code),
                    None => "LibreOffice was terminated by a signal".to_string(),
                },
            });
        }

        let produced = workdir
            .path()
            .join(format!("{}.{}", SOURCE_STEM, target.extension()));
        match tokio::fs::read(&produced).await {
            Ok(data) => Ok(data),
            Err(e) => {
                // soffice exits 0 when no import filter matched
                tracing::warn!(
                    binary = %self.binary,
                    stdout = %String::from_utf8_lossy(&output.stdout),
                    error = %e,
                    "LibreOffice produced no output"
                );
                Err(Error::ConversionFailed {
                    detail: format!(
                        "LibreOffice did not produce a {} file",
                        target.extension().to_uppercase()
                    ),
                })
            }
        }
    }
}
