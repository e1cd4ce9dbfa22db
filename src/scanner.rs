use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names that are never descended into.
pub const SKIP_DIRS: &[&str] = &[".git", "node_modules", "vendor"];

/// File extensions treated as text. The empty string stands for files
/// without any extension (`Makefile`, `LICENSE`, ...).
pub const TEXT_EXTENSIONS: &[&str] = &[
    "", ".go", ".txt", ".md", ".json", ".yaml", ".yml", ".xml", ".html", ".css", ".js", ".ts",
    ".jsx", ".tsx", ".py", ".rb", ".java", ".c", ".cpp", ".h", ".hpp", ".rs", ".sh", ".bash",
    ".zsh", ".sql", ".graphql", ".proto", ".toml", ".ini", ".conf", ".cfg", ".env",
    ".gitignore", ".dockerfile",
];

/// Returns the extension of a path's file name, including the leading dot.
///
/// The extension starts at the last `.` of the file name, so dotfiles such as
/// `.gitignore` are their own extension and names without a dot yield `""`.
fn dotted_extension(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}

/// Decides whether a file should be processed, based on its extension alone.
///
/// The lookup is case-sensitive: `notes.TXT` is not eligible.
pub fn is_eligible(path: &Path) -> bool {
    TEXT_EXTENSIONS.contains(&dotted_extension(path).as_str())
}

/// `true` for directories below the root whose name is in [`SKIP_DIRS`].
fn is_pruned(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIP_DIRS.contains(&name))
            .unwrap_or(false)
}

/// Collects the files a run should process.
///
/// An explicit file target is returned as-is, without checking its extension.
/// A directory is walked depth-first in lexical order; skipped directories are
/// pruned, symlinks are not followed, and only eligible regular files are kept.
///
/// Any traversal error aborts the scan: a partial file list is never returned.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let metadata = match root.metadata() {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_eligible(entry.path()) {
            files.push(entry.into_path());
        }
    }

    log::debug!("Collected {} eligible files under {}", files.len(), root.display());
    Ok(files)
}
