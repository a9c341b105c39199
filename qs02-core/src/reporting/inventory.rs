// ============================================================================
// qs02-core/src/reporting/inventory.rs
// ============================================================================
//
// INVENTORY REPORT: Per-file Verdicts and the TSV Export
//
// An inventory run produces one InventoryEntry per analyzed file and one
// InventoryError per file that could not be analyzed. The report partitions
// analyzed files into compatible and needs-normalization; failed files only
// ever appear in the error list.
//
// TSV layout (one row per analyzed file, compatible files first, each group
// sorted by file name):
//   Status  Path  Resolution  HDR  TRC  Codec  Bitrate_MB  Audio_Tracks
//   Audio_Codecs  Issues

// ---- Internal crate imports ----
use crate::error::CoreResult;
use crate::processing::compatibility::CompatibilityVerdict;

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default name of the inventory TSV file.
pub const DEFAULT_TSV_FILENAME: &str = "films_qs02_inventaire.tsv";

const TSV_HEADER: &str =
    "Status\tPath\tResolution\tHDR\tTRC\tCodec\tBitrate_MB\tAudio_Tracks\tAudio_Codecs\tIssues";

/// Analysis result for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryEntry {
    pub path: PathBuf,
    /// e.g. "1080p", empty when the height is unknown
    pub resolution: String,
    pub is_hdr: bool,
    pub transfer_tag: String,
    pub video_codec: String,
    /// Container bitrate in whole megabits
    pub bitrate_mb: u64,
    pub audio_codecs: Vec<String>,
    pub verdict: CompatibilityVerdict,
    /// Name already carries the compatibility marker (informational)
    pub has_marker: bool,
}

impl InventoryEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn audio_track_count(&self) -> usize {
        self.audio_codecs.len()
    }
}

/// A file that could not be analyzed, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryError {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of an inventory run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryReport {
    pub compatible: Vec<InventoryEntry>,
    pub needs_normalization: Vec<InventoryEntry>,
    pub errors: Vec<InventoryError>,
}

impl InventoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files the report knows about, analyzed or not.
    pub fn total(&self) -> usize {
        self.compatible.len() + self.needs_normalization.len() + self.errors.len()
    }

    /// Files entry into the partition matching its verdict.
    pub fn push_entry(&mut self, entry: InventoryEntry) {
        if entry.verdict.compatible {
            self.compatible.push(entry);
        } else {
            self.needs_normalization.push(entry);
        }
    }

    pub fn push_error(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.errors.push(InventoryError {
            path,
            reason: reason.into(),
        });
    }

    /// Orders both partitions by file name.
    pub fn sort(&mut self) {
        self.compatible.sort_by_key(InventoryEntry::file_name);
        self.needs_normalization.sort_by_key(InventoryEntry::file_name);
    }

    /// Writes the TSV export to `writer`.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> CoreResult<()> {
        writeln!(writer, "{TSV_HEADER}")?;
        for entry in self.compatible.iter().chain(&self.needs_normalization) {
            writeln!(writer, "{}", tsv_row(entry))?;
        }
        Ok(())
    }

    /// Writes the TSV export to a file, replacing it.
    pub fn write_tsv_file(&self, path: &Path) -> CoreResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_tsv(&mut writer)?;
        writer.flush()?;
        log::info!("Inventory written to {}", path.display());
        Ok(())
    }
}

/// Replaces characters that would break the TSV layout.
fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn tsv_row(entry: &InventoryEntry) -> String {
    let status = if entry.verdict.compatible { "OK" } else { "NON OK" };
    let fields = [
        status.to_string(),
        entry.path.display().to_string(),
        entry.resolution.clone(),
        entry.is_hdr.to_string(),
        entry.transfer_tag.clone(),
        entry.video_codec.clone(),
        entry.bitrate_mb.to_string(),
        entry.audio_track_count().to_string(),
        entry.audio_codecs.join(", "),
        entry.verdict.issues.join(" | "),
    ];
    fields
        .iter()
        .map(|f| tsv_field(f))
        .collect::<Vec<_>>()
        .join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, issues: &[&str]) -> InventoryEntry {
        let issues: Vec<String> = issues.iter().map(|s| (*s).to_string()).collect();
        InventoryEntry {
            path: PathBuf::from(format!("/films/{name}")),
            resolution: "1080p".to_string(),
            is_hdr: false,
            transfer_tag: "bt709".to_string(),
            video_codec: "h264".to_string(),
            bitrate_mb: 8,
            audio_codecs: vec!["ac3".to_string(), "aac".to_string()],
            verdict: CompatibilityVerdict {
                compatible: issues.is_empty(),
                issues,
            },
            has_marker: false,
        }
    }

    #[test]
    fn test_partitions_and_sorting() {
        let mut report = InventoryReport::new();
        report.push_entry(entry("b.mkv", &[]));
        report.push_entry(entry("c.mkv", &["Video codec: mpeg4 (expected: h264, h265, hevc)"]));
        report.push_entry(entry("a.mkv", &[]));
        report.push_error(PathBuf::from("/films/broken.mkv"), "probe failed");
        report.sort();

        assert_eq!(report.total(), 4);
        assert_eq!(report.compatible[0].file_name(), "a.mkv");
        assert_eq!(report.compatible[1].file_name(), "b.mkv");
        assert_eq!(report.needs_normalization.len(), 1);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_tsv_output() {
        let mut report = InventoryReport::new();
        report.push_entry(entry("weird\tname.mkv", &["first", "second\nline"]));
        report.push_entry(entry("ok.mkv", &[]));

        let mut out = Vec::new();
        report.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TSV_HEADER);
        assert_eq!(
            lines[1],
            "OK\t/films/ok.mkv\t1080p\tfalse\tbt709\th264\t8\t2\tac3, aac\t"
        );
        let fields: Vec<&str> = lines[2].split('\t').collect();
        assert_eq!(fields.len(), 10);
        assert_eq!(fields[0], "NON OK");
        assert_eq!(fields[1], "/films/weird name.mkv");
        assert_eq!(fields[9], "first | second line");
    }
}
