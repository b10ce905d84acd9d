// src/cli/paths.rs
//
// Shared path expansion utilities for CLI commands.

use std::path::{Path, PathBuf};

use glob::glob;
use rustc_hash::FxHashSet;

/// Source file extension
pub const SOURCE_EXTENSION: &str = "wr";

/// Errors that can occur during path expansion
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Glob pattern syntax error
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    /// IO error (permissions, etc.)
    #[error("error reading '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Expand a list of path patterns into concrete .wr file paths.
///
/// Each pattern can be:
/// - A direct file path (e.g., "foo.wr")
/// - A directory (expands to **/*.wr recursively)
/// - A glob pattern (e.g., "src/**/*.wr")
///
/// Explicit file paths keep their input order. Glob and directory expansions
/// are sorted and appended after them. Duplicates are removed.
///
/// Empty result is valid (not an error).
pub fn expand_paths(patterns: &[String]) -> Result<Vec<PathBuf>, PathError> {
    let mut explicit_files = Vec::new();
    let mut glob_files = Vec::new();
    let mut seen: FxHashSet<PathBuf> = FxHashSet::default();

    for pattern in patterns {
        let path = PathBuf::from(pattern);
        if path.is_file() {
            // Non-.wr files named explicitly are skipped
            if has_source_extension(&path) {
                add_unique(path, &mut explicit_files, &mut seen);
            }
        } else if path.is_dir() {
            let glob_pattern = format!("{}/**/*.{}", pattern, SOURCE_EXTENSION);
            expand_glob(&glob_pattern, &mut glob_files, &mut seen)?;
        } else {
            expand_glob(pattern, &mut glob_files, &mut seen)?;
        }
    }

    glob_files.sort();
    explicit_files.extend(glob_files);
    Ok(explicit_files)
}

/// Expand a glob pattern and add matching .wr files
fn expand_glob(pattern: &str, files: &mut Vec<PathBuf>, seen: &mut FxHashSet<PathBuf>) -> Result<(), PathError> {
    let entries = glob(pattern).map_err(|e| PathError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;

    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() && has_source_extension(&path) {
                    add_unique(path, files, seen);
                }
            }
            Err(e) => {
                return Err(PathError::IoError {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                });
            }
        }
    }

    Ok(())
}

/// Add a path if not already seen (uses canonical path for deduplication)
fn add_unique(path: PathBuf, files: &mut Vec<PathBuf>, seen: &mut FxHashSet<PathBuf>) {
    let key = path.canonicalize().unwrap_or_else(|_| path.clone());
    if seen.insert(key) {
        files.push(path);
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "// test").unwrap();
        path
    }

    fn expand_dir(dir: &TempDir) -> Vec<PathBuf> {
        expand_paths(&[dir.path().to_string_lossy().to_string()]).unwrap()
    }

    #[test]
    fn test_expand_single_file() {
        let dir = TempDir::new().unwrap();
        let file = create_file(dir.path(), "test.wr");

        let files = expand_paths(&[file.to_string_lossy().to_string()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_expand_nested_directory() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "root.wr");
        create_file(dir.path(), "sub/nested.wr");
        create_file(dir.path(), "sub/deep/file.wr");
        create_file(dir.path(), "sub/notes.txt");

        assert_eq!(expand_dir(&dir).len(), 3);
    }

    #[test]
    fn test_explicit_files_come_first() {
        let dir = TempDir::new().unwrap();
        let a = create_file(dir.path(), "lib/a.wr");
        create_file(dir.path(), "lib/b.wr");
        let z = create_file(dir.path(), "z.wr");

        let files = expand_paths(&[
            z.to_string_lossy().to_string(),
            dir.path().join("lib").to_string_lossy().to_string(),
            a.to_string_lossy().to_string(),
        ])
        .unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["z.wr", "a.wr", "b.wr"]);
    }

    #[test]
    fn test_deduplication() {
        let dir = TempDir::new().unwrap();
        let file = create_file(dir.path(), "test.wr");
        let file_str = file.to_string_lossy().to_string();

        let files = expand_paths(&[file_str.clone(), file_str]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_sorted_output() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "z.wr");
        create_file(dir.path(), "a.wr");
        create_file(dir.path(), "m.wr");

        let files = expand_dir(&dir);
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap()).collect();
        assert_eq!(names, vec!["a.wr", "m.wr", "z.wr"]);
    }

    #[test]
    fn test_empty_result_is_ok() {
        let dir = TempDir::new().unwrap();
        create_file(dir.path(), "test.txt");
        assert!(expand_dir(&dir).is_empty());
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let result = expand_paths(&["[invalid".to_string()]);
        assert!(matches!(result, Err(PathError::InvalidPattern { .. })));
    }
}
