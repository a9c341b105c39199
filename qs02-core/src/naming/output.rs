// ============================================================================
// qs02-core/src/naming/output.rs
// ============================================================================
//
// OUTPUT NAMING: Normalized File Names and Collision Avoidance
//
// Normalized files are named `Title[.Year][.RES].HDR|SDR.<marker>.<ext>`.
// When that name is already taken, a counter is inserted before the
// extension (`stem.1.mkv`, `stem.2.mkv`, ...) so existing files are never
// overwritten unless the caller asks for it. The comparison report shares
// the stem, so a leftover report also reserves its name.
//
// Path disambiguation assumes a single writer: two processes racing on the
// same output directory can pick the same name.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::naming::title::MovieIdentity;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Resolution tag for a frame height, e.g. `"1080p"`. Empty when unknown.
#[must_use]
pub fn resolution_tag(height: u32) -> String {
    if height > 0 {
        format!("{height}p")
    } else {
        String::new()
    }
}

/// Builds the output name without extension.
#[must_use]
pub fn build_output_stem(
    identity: &MovieIdentity,
    resolution: &str,
    dynamic_range_label: &str,
    marker: &str,
) -> String {
    let mut parts: Vec<&str> = vec![identity.title.as_str()];
    if let Some(year) = identity.year.as_deref().filter(|y| !y.is_empty()) {
        parts.push(year);
    }
    if !resolution.is_empty() {
        parts.push(resolution);
    }
    parts.push(dynamic_range_label);
    parts.push(marker);
    parts.join(".")
}

/// First `stem[.N]extension` under `dir` that is free. A name counts as
/// taken when the file itself or any `stem[.N].<companion>` exists.
fn first_free_path(
    dir: &Path,
    stem: &str,
    extension: &str,
    companions: &[&str],
) -> CoreResult<PathBuf> {
    let taken = |name: &str| {
        dir.join(format!("{name}{extension}")).exists()
            || companions
                .iter()
                .any(|c| dir.join(format!("{name}.{}", c.trim_start_matches('.'))).exists())
    };

    if !taken(stem) {
        return Ok(dir.join(format!("{stem}{extension}")));
    }

    let mut counter: u32 = 1;
    loop {
        let name = format!("{stem}.{counter}");
        if !taken(&name) {
            let candidate = dir.join(format!("{name}{extension}"));
            log::debug!("{stem}{extension} is taken; using {}", candidate.display());
            return Ok(candidate);
        }
        counter = counter.checked_add(1).ok_or_else(|| {
            CoreError::PathError(format!("No free name for {stem}{extension}"))
        })?;
    }
}

/// Returns `base` if nothing exists there, otherwise the first free
/// `stem.N.ext` with N starting at 1.
pub fn find_available_path(base: &Path) -> CoreResult<PathBuf> {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| CoreError::PathError(format!("No file name in {}", base.display())))?;
    let extension = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = base.parent().unwrap_or_else(|| Path::new(""));
    first_free_path(parent, &stem, &extension, &[])
}

/// Joins `dir`, `stem` and `extension`. Unless `overwrite` is set, the
/// counter is bumped until neither the file nor any of its `companions`
/// (sibling files sharing the stem, such as the report) exists.
pub fn resolve_output_path(
    dir: &Path,
    stem: &str,
    extension: &str,
    companions: &[&str],
    overwrite: bool,
) -> CoreResult<PathBuf> {
    let extension = extension.trim_start_matches('.');
    let extension = if extension.is_empty() {
        String::new()
    } else {
        format!(".{extension}")
    };
    if overwrite {
        Ok(dir.join(format!("{stem}{extension}")))
    } else {
        first_free_path(dir, stem, &extension, companions)
    }
}

/// True when the file stem already carries `.marker` (case-insensitive).
#[must_use]
pub fn has_compatibility_marker(path: &Path, marker: &str) -> bool {
    let Some(stem) = path.file_stem() else {
        return false;
    };
    let needle = format!(".{}", marker.to_lowercase());
    stem.to_string_lossy().to_lowercase().contains(&needle)
}
