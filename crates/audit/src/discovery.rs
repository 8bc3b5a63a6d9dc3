//! Dependency directory discovery and local manifest reading

use std::fs;
use std::path::{Path, PathBuf};
use tawata_config::constants::MANIFEST_FILE;
use tawata_errors::ScanError;

/// List dependency directories under `root`, sorted by name.
///
/// Plain files and dot-directories (`.bin`, `.cache`) are ignored. `@scope` directories are replaced by their
/// child directories; a scope that cannot be listed is returned as-is so
/// the failure surfaces when its manifest is read.
///
/// # Errors
///
/// Returns `ScanError::RootUnreadable` if `root` cannot be listed.
pub fn discover_dependencies(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut dependencies = Vec::new();

    for dir in list_directories(root).map_err(|e| ScanError::RootUnreadable {
        path: root.display().to_string(),
        message: e.to_string(),
    })? {
        let is_scope = dir
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('@'));

        if is_scope {
            match list_directories(&dir) {
                Ok(scoped) => dependencies.extend(scoped),
                Err(_) => dependencies.push(dir),
            }
        } else {
            dependencies.push(dir);
        }
    }

    Ok(dependencies)
}

fn list_directories(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        // Follows symlinks; entries that cannot be stat'ed are kept so the
        // manifest read reports why
        if fs::metadata(&path).map_or(true, |meta| meta.is_dir()) {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Read `<dir>/package.json` as text.
///
/// # Errors
///
/// Returns `ScanError::ManifestUnreadable` if the file is missing, unreadable
/// or not UTF-8.
pub fn read_local_manifest(dir: &Path) -> Result<String, ScanError> {
    let path = dir.join(MANIFEST_FILE);
    fs::read_to_string(&path).map_err(|e| ScanError::ManifestUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
