//! Conversion invocation boundary

use super::kind::{DocumentKind, OutputFormat};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// External document converter.
///
/// Takes the source bytes and their extension (".xlsx" style), returns the
/// converted document.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, input: &[u8], source_ext: &str, target: OutputFormat)
        -> Result<Vec<u8>>;
}

/// Validates requests and translates converter failures into
/// [`Error::ConversionFailed`] / [`Error::DependencyMissing`].
#[derive(Clone)]
pub struct ConversionInvoker {
    backend: Arc<dyn Converter>,
}

impl ConversionInvoker {
    pub fn new(backend: Arc<dyn Converter>) -> Self {
        Self { backend }
    }

    /// Convert `input` to PDF.
    ///
    /// `source_ext` is checked against `kind` before the backend is called.
    /// No retry is attempted.
    pub async fn convert(
        &self,
        kind: DocumentKind,
        input: &[u8],
        source_ext: &str,
    ) -> Result<Vec<u8>> {
        kind.check_extension(source_ext)?;

        let started_at = std::time::Instant::now();
        match self
            .backend
            .convert(input, &source_ext.to_ascii_lowercase(), OutputFormat::Pdf)
            .await
        {
            Ok(output) => {
                tracing::info!(
                    kind = kind.label(),
                    input_bytes = input.len(),
                    output_bytes = output.len(),
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "conversion succeeded"
                );
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(
                    kind = kind.label(),
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    error = %e,
                    "conversion failed"
                );
                Err(match e {
                    Error::DependencyMissing { .. } | Error::ConversionFailed { .. } => e,
                    other => Error::ConversionFailed {
                        detail: other.to_string(),
                    },
                })
            }
        }
    }
}
