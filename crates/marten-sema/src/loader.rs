// loader.rs
//! Source tree loader.
//!
//! Walks `<root>/src` recursively; every regular file is a module. A
//! module's logical path is its path relative to `src/` with the extension
//! removed and separators normalized to `::`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source directory not found: {0}")]
    SrcDirNotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to walk source tree: {0}")]
    WalkFailed(#[from] walkdir::Error),
}

/// One discovered module: logical path plus its source text.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    /// Logical path, e.g. `core::mem` for `src/core/mem.mar`
    pub path: String,
    /// Filesystem path, kept for diagnostics
    pub file: PathBuf,
    pub source: String,
}

/// Load every module under `<root>/src`, sorted by file name so module ids
/// are deterministic across runs.
pub fn load_tree(root: &Path) -> Result<Vec<ModuleSource>, LoadError> {
    let src = root.join("src");
    if !src.is_dir() {
        return Err(LoadError::SrcDirNotFound(src));
    }

    let mut modules = Vec::new();
    let walker = WalkDir::new(&src).sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file = entry.path().to_path_buf();
        let source = std::fs::read_to_string(&file).map_err(|e| LoadError::ReadFailed {
            path: file.clone(),
            source: e,
        })?;

        let path = logical_path(&src, &file);
        tracing::debug!(module = %path, file = %file.display(), "discovered module");
        modules.push(ModuleSource { path, file, source });
    }

    Ok(modules)
}

/// `src/a/b.mar` → `a::b`
fn logical_path(src: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(src).unwrap_or(file);
    let without_ext = relative.with_extension("");
    let segments: Vec<String> = without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments.join("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_path_strips_extension_and_joins() {
        let src = Path::new("/proj/src");
        assert_eq!(logical_path(src, Path::new("/proj/src/main.mar")), "main");
        assert_eq!(
            logical_path(src, Path::new("/proj/src/core/mem.mar")),
            "core::mem"
        );
        assert_eq!(
            logical_path(src, Path::new("/proj/src/a/b/c.txt")),
            "a::b::c"
        );
    }

    #[test]
    fn missing_src_dir_is_an_error() {
        let err = load_tree(Path::new("/nonexistent-project-root")).unwrap_err();
        assert!(matches!(err, LoadError::SrcDirNotFound(_)));
    }
}
