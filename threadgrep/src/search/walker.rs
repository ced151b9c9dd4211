use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ScanError, ScanResult};

/// Lists every regular file below `root`.
///
/// No ignore rules apply: hidden files, `.gitignore`d files and everything
/// else is included. Symlinks are not followed and are not listed. Entries are
/// visited in file name order within each directory, so two calls on an
/// unchanged tree return the same list.
pub fn collect_files(root: &Path) -> ScanResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ScanError::directory_not_found(root));
    }

    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let files: Vec<PathBuf> = walker
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .collect();

    debug!("Found {} files under {}", files.len(), root.display());
    Ok(files)
}
