//! Resolution of caller-supplied paths against the project root

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Absolute path confined to the project root.
///
/// Only [`resolve_path`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    /// Path relative to the project root it was resolved against
    pub fn relative_to_root(&self) -> &Path {
        &self.relative
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.absolute
    }
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// Leading `..` segments of a relative path are kept; `..` directly under a
/// root is dropped.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Resolve a relative `user_path` against `root`.
///
/// Fails with `InvalidArgument` for empty or absolute input and with
/// `AccessDenied` when the normalized result is not inside `root`.
/// Containment is lexical: symlinks below the root are not followed.
pub fn resolve_path(root: &Path, user_path: &str) -> Result<ResolvedPath> {
    if user_path.is_empty() {
        return Err(Error::InvalidArgument {
            reason: "Path must be a non-empty string.".to_string(),
        });
    }

    let normalized = normalize_lexically(Path::new(user_path));
    let has_prefix = matches!(normalized.components().next(), Some(Component::Prefix(_)));
    if normalized.is_absolute() || normalized.has_root() || has_prefix {
        return Err(Error::InvalidArgument {
            reason: "Absolute paths are not allowed.".to_string(),
        });
    }

    let root = normalize_lexically(root);
    let candidate = normalize_lexically(&root.join(&normalized));

    // Component-wise: "<root>-other" is not inside "<root>"
    let relative = match candidate.strip_prefix(&root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            return Err(Error::AccessDenied {
                path: user_path.to_string(),
            })
        }
    };

    Ok(ResolvedPath {
        absolute: candidate,
        relative,
    })
}

/// Read the file behind a resolved path.
///
/// A missing file is reported as `NotFound` under the caller's own spelling
/// of the path.
pub async fn read_resolved(path: &ResolvedPath, display: &str) -> Result<Vec<u8>> {
    tokio::fs::read(path.as_path()).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::NotFound {
                path: display.to_string(),
            }
        } else {
            Error::Io(e)
        }
    })
}
