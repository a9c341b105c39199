//! Source/target comparison report.
//!
//! Written next to every normalized file as Markdown. Before the encode the
//! target side is unknown and every target cell shows "-"; once the output has
//! been probed the report is rendered again with both sides.

use crate::error::CoreResult;
use crate::media::metadata::UNKNOWN_CODEC;
use crate::media::{MediaMetadata, StreamDescriptor};
use crate::processing::plan::TranscodePlan;
use crate::utils::{format_bitrate, format_duration, format_size};

use std::fmt::Write as _;
use std::path::Path;

const MISSING: &str = "-";

/// Both sides of a comparison.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonInput<'a> {
    pub source_name: &'a str,
    pub source: &'a MediaMetadata,
    pub target_name: &'a str,
    /// `None` until the output exists and has been probed
    pub target: Option<&'a MediaMetadata>,
    pub plan: &'a TranscodePlan,
}

fn text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() && v != UNKNOWN_CODEC => v.to_string(),
        _ => MISSING.to_string(),
    }
}

fn number(value: u64, render: impl Fn(u64) -> String) -> String {
    if value == 0 { MISSING.to_string() } else { render(value) }
}

struct Table {
    out: String,
}

impl Table {
    fn section(&mut self, title: &str) {
        let _ = writeln!(self.out, "### {title}");
        self.out.push('\n');
        self.out.push_str("| Property | Source | Target | Changed |\n");
        self.out.push_str("|----------|--------|--------|---------|\n");
    }

    fn row(&mut self, property: &str, source: String, target: String) {
        let changed = if source != target && target != MISSING { "Y" } else { "N" };
        let _ = writeln!(self.out, "| {property} | {source} | {target} | {changed} |");
    }

    fn end(&mut self) {
        self.out.push('\n');
    }
}

fn container_rows(table: &mut Table, source: &MediaMetadata, target: Option<&MediaMetadata>) {
    let t = |f: fn(&MediaMetadata) -> String| target.map_or_else(|| MISSING.to_string(), f);

    table.section("Container");
    table.row(
        "Format",
        text(Some(source.format.format_name.as_str())),
        t(|m| text(Some(m.format.format_name.as_str()))),
    );
    table.row(
        "Size",
        number(source.format.size_bytes, format_size),
        t(|m| number(m.format.size_bytes, format_size)),
    );
    table.row(
        "Bitrate",
        number(source.format.total_bit_rate, format_bitrate),
        t(|m| number(m.format.total_bit_rate, format_bitrate)),
    );
    table.row(
        "Duration",
        duration(source),
        t(duration),
    );
    table.row(
        "Streams",
        source.streams.len().to_string(),
        t(|m| m.streams.len().to_string()),
    );
    table.end();
}

fn duration(metadata: &MediaMetadata) -> String {
    if metadata.format.duration_seconds > 0.0 {
        format_duration(metadata.format.duration_seconds)
    } else {
        MISSING.to_string()
    }
}

fn resolution(stream: &StreamDescriptor) -> String {
    if stream.width == 0 && stream.height == 0 {
        MISSING.to_string()
    } else {
        format!("{}x{}", stream.width, stream.height)
    }
}

fn video_rows(table: &mut Table, source: Option<&StreamDescriptor>, target: Option<&StreamDescriptor>) {
    let side = |stream: Option<&StreamDescriptor>, f: fn(&StreamDescriptor) -> String| {
        stream.map_or_else(|| MISSING.to_string(), f)
    };

    table.section("Video");
    let rows: [(&str, fn(&StreamDescriptor) -> String); 7] = [
        ("Codec", |s| text(Some(s.codec_name.as_str()))),
        ("Resolution", resolution),
        ("Pixel format", |s| text(s.pixel_format.as_deref())),
        ("Color space", |s| text(s.color_space.as_deref())),
        ("Color primaries", |s| text(s.color_primaries.as_deref())),
        ("Color transfer", |s| text(s.color_transfer.as_deref())),
        ("Frame rate", |s| text(s.frame_rate.as_deref())),
    ];
    for (property, render) in rows {
        table.row(property, side(source, render), side(target, render));
    }
    table.end();
}

fn audio_rows(
    table: &mut Table,
    title: &str,
    source: Option<&StreamDescriptor>,
    target: Option<&StreamDescriptor>,
) {
    let side = |stream: Option<&StreamDescriptor>, f: fn(&StreamDescriptor) -> String| {
        stream.map_or_else(|| MISSING.to_string(), f)
    };

    table.section(title);
    let rows: [(&str, fn(&StreamDescriptor) -> String); 5] = [
        ("Codec", |s| text(Some(s.codec_name.as_str()))),
        ("Channels", |s| number(u64::from(s.channels), |c| c.to_string())),
        ("Channel layout", |s| text(s.channel_layout.as_deref())),
        ("Sample rate", |s| {
            number(u64::from(s.sample_rate.unwrap_or(0)), |r| r.to_string())
        }),
        ("Bitrate", |s| number(s.bit_rate, format_bitrate)),
    ];
    for (property, render) in rows {
        table.row(property, side(source, render), side(target, render));
    }
    table.end();
}

/// Renders the Markdown comparison.
///
/// One audio section is emitted per planned output track. Every track is fed
/// by the same source stream, so the source column repeats it.
pub fn render_comparison(input: &ComparisonInput<'_>) -> String {
    let mut table = Table { out: String::new() };
    let _ = writeln!(table.out, "# Source / Target Comparison");
    table.out.push('\n');
    let _ = writeln!(table.out, "**Source:** `{}`", input.source_name);
    let _ = writeln!(table.out, "**Target:** `{}`", input.target_name);
    let _ = writeln!(
        table.out,
        "**Generated:** {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        table.out,
        "**Plan:** {} ({}), {} audio track(s)",
        input.plan.dynamic_range_label(),
        input.plan.transfer_tag,
        input.plan.audio_tracks.len()
    );
    table.out.push('\n');
    table.out.push_str("## Comparison\n\n");

    container_rows(&mut table, input.source, input.target);
    video_rows(
        &mut table,
        input.source.video_stream(),
        input.target.and_then(MediaMetadata::video_stream),
    );

    let target_audio: Vec<&StreamDescriptor> =
        input.target.map(MediaMetadata::audio_streams).unwrap_or_default();
    for (position, track) in input.plan.audio_tracks.iter().enumerate() {
        let source = input
            .source
            .streams
            .iter()
            .find(|s| s.index == track.source_stream_index);
        let title = format!(
            "Audio - Track {position} ({} {})",
            track.target_codec.to_uppercase(),
            track.slot_name
        );
        audio_rows(&mut table, &title, source, target_audio.get(position).copied());
    }

    table.out
}

/// Renders the comparison and writes it to `path`.
pub fn write_comparison(path: &Path, input: &ComparisonInput<'_>) -> CoreResult<()> {
    std::fs::write(path, render_comparison(input))?;
    log::debug!("Comparison report written to {}", path.display());
    Ok(())
}
