//! Inventory workflow: probe, classify and evaluate a batch of files.
//!
//! Files are handled one at a time. Whatever goes wrong with one file is
//! recorded in the report's error list and the batch moves on.

use crate::config::PolicyConfig;
use crate::discovery::ensure_supported_extension;
use crate::error::{CoreError, CoreResult, RequiredStream};
use crate::media::MetadataProbe;
use crate::naming::{has_compatibility_marker, resolution_tag};
use crate::processing::color::classify_color;
use crate::processing::compatibility::evaluate_with_color;
use crate::reporting::{InventoryEntry, InventoryReport};

use std::path::{Path, PathBuf};

/// Analyzes one file for the inventory.
///
/// # Errors
///
/// `UnsupportedContainerExtension` before probing, `ProbeUnavailable` from
/// the probe, and `MissingRequiredStream` when there is no video stream.
pub fn analyze_file(
    path: &Path,
    probe: &dyn MetadataProbe,
    policy: &PolicyConfig,
) -> CoreResult<InventoryEntry> {
    ensure_supported_extension(path, &policy.video_extensions)?;

    let metadata = probe.probe(path)?;
    let video = metadata
        .video_stream()
        .ok_or(CoreError::MissingRequiredStream {
            kind: RequiredStream::Video,
        })?;

    let color = classify_color(video);
    let verdict = evaluate_with_color(&metadata, video, &color, &policy.compatibility);

    Ok(InventoryEntry {
        path: path.to_path_buf(),
        resolution: resolution_tag(video.height),
        is_hdr: color.is_hdr,
        transfer_tag: color.transfer_tag,
        video_codec: video.codec_name.clone(),
        bitrate_mb: metadata.format.total_bit_rate / 1_000_000,
        audio_codecs: metadata.audio_codecs(),
        verdict,
        has_marker: has_compatibility_marker(path, &policy.naming.marker),
    })
}

/// Analyzes every file and partitions the results.
///
/// `on_file` is called after each file with its 1-based position, the batch
/// size, the path and the outcome.
pub fn run_inventory<F>(
    files: &[PathBuf],
    probe: &dyn MetadataProbe,
    policy: &PolicyConfig,
    mut on_file: F,
) -> InventoryReport
where
    F: FnMut(usize, usize, &Path, Result<&InventoryEntry, &CoreError>),
{
    let total = files.len();
    let mut report = InventoryReport::new();

    for (i, path) in files.iter().enumerate() {
        match analyze_file(path, probe, policy) {
            Ok(entry) => {
                log::debug!(
                    "{}: compatible={} ({} issue(s))",
                    path.display(),
                    entry.verdict.compatible,
                    entry.verdict.issues.len()
                );
                on_file(i + 1, total, path, Ok(&entry));
                report.push_entry(entry);
            }
            Err(e) => {
                if e.is_per_file() {
                    log::warn!("Skipping {}: {e}", path.display());
                } else {
                    log::error!("Unexpected failure on {}: {e}", path.display());
                }
                on_file(i + 1, total, path, Err(&e));
                report.push_error(path.clone(), e.to_string());
            }
        }
    }

    report.sort();
    log::info!(
        "Inventory done: {} compatible, {} to normalize, {} error(s)",
        report.compatible.len(),
        report.needs_normalization.len(),
        report.errors.len()
    );
    report
}
