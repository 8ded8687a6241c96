//! Filename sanitization and traversal-safe path resolution, shared by
//! upload handling and asset retrieval (spec.md §4.4).

use std::path::{Path, PathBuf};

use autosage_core::{Error, Result};

/// Keep only `[A-Za-z0-9._-]`, collapse runs of separators, reject an
/// empty result.
pub fn sanitize_filename(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_separator = false;
    for c in raw.chars() {
        let keep = c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-';
        if keep {
            out.push(c);
            last_was_separator = c == '.' || c == '_' || c == '-';
        } else if !last_was_separator && !out.is_empty() {
            out.push('_');
            last_was_separator = true;
        }
    }
    let trimmed = out.trim_matches(|c| c == '.' || c == '_' || c == '-');
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("sanitized filename is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Resolve `relative` against `root`, rejecting any path that would
/// escape it (`..` segments, absolute paths, symlink targets outside
/// `root`). Used for both job artifacts and session assets.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            std::path::Component::Normal(part) => resolved.push(part),
            std::path::Component::CurDir => {}
            _ => return Err(Error::Forbidden(relative.to_string())),
        }
    }
    if !resolved.starts_with(root) {
        return Err(Error::Forbidden(relative.to_string()));
    }
    // Defend against symlinks resolving outside the workspace: if the
    // file exists, its canonical form must still be rooted under `root`.
    if let Ok(canonical_root) = root.canonicalize() {
        if let Ok(canonical_target) = resolved.canonicalize() {
            if !canonical_target.starts_with(&canonical_root) {
                return Err(Error::Forbidden(relative.to_string()));
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("cube.obj").unwrap(), "cube.obj");
        assert_eq!(sanitize_filename("my model (final).STL").unwrap(), "my_model_final_.STL");
    }

    #[test]
    fn sanitize_rejects_all_unsafe_input() {
        assert!(sanitize_filename("???").is_err());
        assert!(sanitize_filename("").is_err());
    }

    #[test]
    fn resolve_rejects_parent_segments() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_within(dir.path(), "../escape.json");
        assert!(err.is_err());
    }

    #[test]
    fn resolve_accepts_nested_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_within(dir.path(), "geometry/primitives.json").unwrap();
        assert_eq!(resolved, dir.path().join("geometry/primitives.json"));
    }
}
