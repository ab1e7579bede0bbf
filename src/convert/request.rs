//! Per-request conversion lifecycle shared by the MCP and HTTP surfaces

use super::invoker::ConversionInvoker;
use super::kind::{source_extension, DocumentKind};
use crate::error::Result;
use crate::source::{ensure_dir, make_output_name, read_resolved, ResolvedPath, StagedUpload};
use std::path::{Path, PathBuf};

/// Where the request's source bytes live
#[derive(Debug)]
pub enum RequestInput {
    /// Upload staged by the HTTP surface; deleted when the request ends
    Upload(StagedUpload),
    /// Caller file inside the project root; read in place, never copied
    Path(ResolvedPath),
}

/// One conversion call, owned by the handler processing it
#[derive(Debug)]
pub struct ConversionRequest {
    input: RequestInput,
    /// Caller's spelling of the source, used in error messages
    declared_filename: String,
    kind: DocumentKind,
    output_dir: PathBuf,
}

/// Successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub output_path: PathBuf,
    pub message: String,
}

impl ConversionRequest {
    pub fn from_upload(kind: DocumentKind, upload: StagedUpload, output_dir: PathBuf) -> Self {
        Self {
            declared_filename: upload.original_name().to_string(),
            input: RequestInput::Upload(upload),
            kind,
            output_dir,
        }
    }

    pub fn from_path(
        kind: DocumentKind,
        path: ResolvedPath,
        declared_filename: impl Into<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            input: RequestInput::Path(path),
            declared_filename: declared_filename.into(),
            kind,
            output_dir,
        }
    }

    /// Run validate → read → convert → write, then delete any staged upload
    /// whatever the outcome.
    pub async fn execute(self, invoker: &ConversionInvoker) -> Result<ConversionOutcome> {
        let result = self.run(invoker).await;

        if let RequestInput::Upload(staged) = self.input {
            let path = staged.path().to_path_buf();
            match staged.close() {
                Ok(()) => tracing::debug!(path = %path.display(), "removed staged upload"),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove staged upload")
                }
            }
        }

        result
    }

    fn source_name(&self) -> &Path {
        match &self.input {
            RequestInput::Upload(staged) => Path::new(staged.original_name()),
            RequestInput::Path(resolved) => resolved.as_path(),
        }
    }

    async fn run(&self, invoker: &ConversionInvoker) -> Result<ConversionOutcome> {
        let extension = source_extension(self.source_name());
        self.kind.check_extension(&extension)?;

        let input = match &self.input {
            RequestInput::Upload(staged) => tokio::fs::read(staged.path()).await?,
            RequestInput::Path(resolved) => read_resolved(resolved, &self.declared_filename).await?,
        };
        tracing::debug!(
            source = %self.declared_filename,
            bytes = input.len(),
            "read conversion input"
        );

        let output_dir = ensure_dir(&self.output_dir).await;
        let output = invoker.convert(self.kind, &input, &extension).await?;

        let output_path = output_dir.join(make_output_name(&self.source_name().to_string_lossy()));
        tokio::fs::write(&output_path, &output).await?;
        tracing::info!(
            source = %self.declared_filename,
            output = %output_path.display(),
            "wrote converted document"
        );

        Ok(ConversionOutcome {
            output_path,
            message: self.kind.success_message(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{Converter, OutputFormat};
    use crate::error::Error;
    use crate::source::{resolve_path, stage_upload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct EchoConverter {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Converter for EchoConverter {
        async fn convert(
            &self,
            input: &[u8],
            _source_ext: &str,
            _target: OutputFormat,
        ) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::ConversionFailed {
                    detail: "LibreOffice exited with status 1".to_string(),
                });
            }
            let mut pdf = b"%PDF-".to_vec();
            pdf.extend_from_slice(input);
            Ok(pdf)
        }
    }

    fn invoker(fail: bool) -> (Arc<EchoConverter>, ConversionInvoker) {
        let backend = Arc::new(EchoConverter {
            fail,
            ..Default::default()
        });
        (backend.clone(), ConversionInvoker::new(backend))
    }

    fn staged_with(dir: &Path, name: &str, data: &[u8]) -> StagedUpload {
        let staged = stage_upload(dir, name).unwrap();
        std::fs::write(staged.path(), data).unwrap();
        staged
    }

    #[tokio::test]
    async fn test_upload_success_removes_staged_file() {
        let root = tempfile::tempdir().unwrap();
        let (backend, invoker) = invoker(false);
        let staged = staged_with(root.path(), "Budget.xlsx", b"cells");
        let staged_path = staged.path().to_path_buf();

        let output_dir = root.path().join("output");
        let outcome = ConversionRequest::from_upload(DocumentKind::Excel, staged, output_dir.clone())
            .execute(&invoker)
            .await
            .unwrap();

        assert!(outcome.output_path.starts_with(&output_dir));
        assert!(outcome.output_path.to_string_lossy().ends_with(".pdf"));
        assert_eq!(std::fs::read(&outcome.output_path).unwrap(), b"%PDF-cells");
        assert_eq!(outcome.message, "Excel file successfully converted to PDF");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(!staged_path.exists());
    }

    #[tokio::test]
    async fn test_upload_failure_removes_staged_file() {
        let root = tempfile::tempdir().unwrap();
        let (_, invoker) = invoker(true);
        let staged = staged_with(root.path(), "sheet.numbers", b"cells");
        let staged_path = staged.path().to_path_buf();

        let result = ConversionRequest::from_upload(
            DocumentKind::Numbers,
            staged,
            root.path().join("output"),
        )
        .execute(&invoker)
        .await;

        assert!(matches!(result, Err(Error::ConversionFailed { .. })));
        assert!(!staged_path.exists());
    }

    #[tokio::test]
    async fn test_wrong_extension_skips_converter_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let (backend, invoker) = invoker(false);
        let staged = staged_with(root.path(), "notes.txt", b"hello");
        let staged_path = staged.path().to_path_buf();

        let result =
            ConversionRequest::from_upload(DocumentKind::Excel, staged, root.path().join("output"))
                .execute(&invoker)
                .await;

        assert!(matches!(result, Err(Error::InvalidFormat { .. })));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(!staged_path.exists());
    }

    #[tokio::test]
    async fn test_path_input_is_not_removed() {
        let root = tempfile::tempdir().unwrap();
        let (_, invoker) = invoker(false);
        std::fs::write(root.path().join("report.numbers"), b"numbers").unwrap();
        let resolved = resolve_path(root.path(), "report.numbers").unwrap();

        let outcome = ConversionRequest::from_path(
            DocumentKind::Numbers,
            resolved,
            "report.numbers",
            root.path().join("temp"),
        )
        .execute(&invoker)
        .await
        .unwrap();

        let name = outcome.output_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("report-"));
        assert!(root.path().join("report.numbers").exists());
    }

    #[tokio::test]
    async fn test_path_input_not_found() {
        let root = tempfile::tempdir().unwrap();
        let (backend, invoker) = invoker(false);
        let resolved = resolve_path(root.path(), "missing.xlsx").unwrap();

        let result = ConversionRequest::from_path(
            DocumentKind::Excel,
            resolved,
            "missing.xlsx",
            root.path().join("temp"),
        )
        .execute(&invoker)
        .await;

        match result {
            Err(Error::NotFound { path }) => assert_eq!(path, "missing.xlsx"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}
