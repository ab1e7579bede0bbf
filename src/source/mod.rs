//! Path resolution and transient file staging

pub mod resolver;
pub mod staging;

pub use resolver::{normalize_lexically, read_resolved, resolve_path, ResolvedPath};
pub use staging::{ensure_dir, make_output_name, stage_upload, StagedUpload};
