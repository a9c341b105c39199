// ============================================================================
// qs02-cli/src/output.rs
// ============================================================================
//
// TERMINAL OUTPUT: Headings, Status Lines and Progress Bars
//
// Everything the binary prints for humans goes through here so the two
// commands share one visual language. Logs go to stderr; these helpers write
// to stdout.

// ---- External crate imports ----
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qs02_core::{CompatibilityVerdict, TranscodePlan};

// ---- Standard library imports ----
use std::fmt::Display;

const SUCCESS_SYMBOL: &str = "✓";
const FAILURE_SYMBOL: &str = "✗";
const SKIP_SYMBOL: &str = "!";

/// Prints a main heading.
pub fn print_heading(text: &str) {
    let line = "=".repeat(50);
    println!("\n{}", style(&line).blue());
    println!("{}", style(format!(" {text} ")).bold().white());
    println!("{}\n", style(&line).blue());
}

/// Prints a section heading.
pub fn print_section(text: &str) {
    println!("\n{}", style(format!("----- {text} -----")).cyan().bold());
}

/// Prints a "label: value" line.
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("  {}: {}", style(label).cyan(), value);
}

pub fn print_success(text: &str) {
    println!("{} {}", style(SUCCESS_SYMBOL).green().bold(), text);
}

pub fn print_failure(text: &str) {
    println!("{} {}", style(FAILURE_SYMBOL).red().bold(), text);
}

pub fn print_skip(text: &str) {
    println!("{} {}", style(SKIP_SYMBOL).yellow().bold(), style(text).yellow());
}

/// Prints a verdict with its issues indented below.
pub fn print_verdict(verdict: &CompatibilityVerdict) {
    if verdict.compatible {
        println!("  {}", style("QS02 compatible").green());
    } else {
        println!("  {}", style("Needs normalization").yellow());
        for issue in &verdict.issues {
            println!("    - {issue}");
        }
    }
}

/// Prints a transcode plan.
pub fn print_plan(plan: &TranscodePlan) {
    print_section("Plan");
    print_info("Output", &plan.output_stem);
    print_info(
        "Video",
        format!(
            "{} {} cq {} ({}, {}, {})",
            plan.video.encoder,
            plan.video.preset,
            plan.video.quality,
            plan.dynamic_range_label(),
            plan.video.pixel_format,
            plan.video.color_transfer
        ),
    );
    if plan.audio_tracks.is_empty() {
        print_info("Audio", "none");
    }
    for (i, track) in plan.audio_tracks.iter().enumerate() {
        let action = if track.can_copy {
            format!("copy {}", track.target_codec)
        } else {
            format!(
                "{} {}k {}ch",
                track.target_codec, track.target_bitrate, track.target_channels
            )
        };
        print_info(
            &format!("Audio {i} ({})", track.slot_name),
            format!("stream #{} -> {action}", track.source_stream_index),
        );
    }
}

/// Bar for per-file progress through a batch.
pub fn batch_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(bar_style) =
        ProgressStyle::with_template("{spinner} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
    {
        bar.set_style(bar_style.progress_chars("#>."));
    }
    bar
}

/// Bar for encode progress, in percent.
pub fn encode_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(bar_style) = ProgressStyle::with_template(
        "Encoding [{bar:40.green/white}] {pos:>3}% {msg} (eta {eta})",
    ) {
        bar.set_style(bar_style.progress_chars("#>."));
    }
    bar
}
