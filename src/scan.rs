//
//  scan.rs
//  Anchor
//
//  Created by hak (tharun)
//

//! Source input provider: walks directories and loads controller sources.
//!
//! Lives outside the extraction core, which only ever sees [`SourceUnit`]s.

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, RouteError};
use crate::source::SourceUnit;

/// Directories that should never be scanned, even without .gitignore.
const BUILTIN_IGNORE: &[&str] = &[
    "node_modules",
    "vendor",
    "dist",
    "build",
    "out",
    ".git",
    ".svn",
    ".hg",
    ".gradle",
    ".idea",
    "target",
    "coverage",
    ".cache",
    "bin",
];

/// File extensions handed to the extractor.
const SOURCE_EXTENSIONS: &[&str] = &["java"];

/// Check if a path contains any built-in ignored directory.
fn is_builtin_ignored(path: &Path) -> bool {
    path.components().any(|c| {
        if let std::path::Component::Normal(name) = c {
            BUILTIN_IGNORE.contains(&name.to_str().unwrap_or(""))
        } else {
            false
        }
    })
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}

/// List source files under the given roots, sorted.
///
/// Respects .gitignore and `.anchorignore`. A root that is itself a file is
/// returned as-is when it has a source extension.
pub fn find_sources(roots: &[&Path]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = roots
        .iter()
        .flat_map(|root| {
            WalkBuilder::new(root)
                .hidden(true)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .add_custom_ignore_filename(".anchorignore")
                .build()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
                .filter(|entry| !is_builtin_ignored(entry.path()))
                .filter(|entry| is_source_file(entry.path()))
                .map(|entry| entry.into_path())
        })
        .collect();
    files.sort();
    files.dedup();
    files
}

/// Read one file into a source unit identified by its path.
pub fn read_source(path: &Path) -> Result<SourceUnit> {
    let text = fs::read_to_string(path).map_err(|e| RouteError::SourceRead(path.to_path_buf(), e))?;
    Ok(SourceUnit::new(path.display().to_string(), text))
}

/// Find and read all sources under the given roots.
///
/// Unreadable files (permissions, invalid UTF-8) are logged and skipped.
pub fn collect_sources(roots: &[&Path]) -> Vec<SourceUnit> {
    let files = find_sources(roots);
    debug!(files = files.len(), "collected source files");

    files
        .par_iter()
        .filter_map(|path| match read_source(path) {
            Ok(unit) => Some(unit),
            Err(e) => {
                warn!(error = %e, "skipping unreadable source");
                None
            }
        })
        .collect()
}
