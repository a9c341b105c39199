//! File discovery module for finding video files to inventory.
//!
//! This module walks a directory tree and collects every file whose
//! extension is one of the accepted containers (case-insensitive). Other
//! files are never handed to the probe.

use crate::error::{CoreError, CoreResult};

use walkdir::WalkDir;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

fn extension_matches(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Finds video files under `input_dir`, recursively.
///
/// # Arguments
///
/// * `input_dir` - The directory to search
/// * `extensions` - Accepted extensions, without the leading dot
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - De-duplicated paths, sorted
/// * `Err(CoreError::Walkdir)` - If `input_dir` itself cannot be read
///
/// Broken entries below the root (dangling symlinks, unreadable
/// subdirectories, link loops) are logged and skipped.
/// * `Err(CoreError::NoFilesFound)` - If no matching file exists
///
/// # Examples
///
/// ```rust,no_run
/// use qs02_core::discovery::find_video_files;
/// use std::path::Path;
///
/// let extensions = vec!["mkv".to_string(), "mp4".to_string()];
/// match find_video_files(Path::new("/path/to/films"), &extensions) {
///     Ok(files) => println!("Found {} video files", files.len()),
///     Err(e) => println!("Error finding video files: {}", e),
/// }
/// ```
pub fn find_video_files(input_dir: &Path, extensions: &[String]) -> CoreResult<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for entry in WalkDir::new(input_dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", input_dir.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && extension_matches(entry.path(), extensions) {
            files.insert(entry.into_path());
        }
    }

    log::debug!("Found {} video files under {}", files.len(), input_dir.display());

    if files.is_empty() {
        Err(CoreError::NoFilesFound)
    } else {
        Ok(files.into_iter().collect())
    }
}

/// Rejects files whose extension is not an accepted container.
pub fn ensure_supported_extension(path: &Path, extensions: &[String]) -> CoreResult<()> {
    if extension_matches(path, extensions) {
        Ok(())
    } else {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Err(CoreError::UnsupportedContainerExtension(if ext.is_empty() {
            path.display().to_string()
        } else {
            format!(".{ext}")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["mkv".to_string(), ".mp4".to_string()]
    }

    #[test]
    fn test_ensure_supported_extension() {
        assert!(ensure_supported_extension(Path::new("a.MKV"), &exts()).is_ok());
        assert!(ensure_supported_extension(Path::new("a.mp4"), &exts()).is_ok());

        match ensure_supported_extension(Path::new("a.avi"), &exts()) {
            Err(CoreError::UnsupportedContainerExtension(ext)) => assert_eq!(ext, ".avi"),
            other => panic!("Unexpected result: {other:?}"),
        }
        assert!(matches!(
            ensure_supported_extension(Path::new("README"), &exts()),
            Err(CoreError::UnsupportedContainerExtension(_))
        ));
    }
}
