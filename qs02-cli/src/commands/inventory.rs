//! Implementation of the 'inventory' subcommand.
//!
//! Scans a directory, classifies every film and writes the TSV inventory.

use crate::cli::InventoryArgs;
use crate::output;

use anyhow::{Context, Result};
use qs02_core::{
    FfprobeProbe, InventoryReport, PolicyConfig, check_dependency, find_video_files,
    run_inventory,
};

/// Runs the inventory and returns the report.
pub fn run_inventory_command(args: &InventoryArgs, policy: &PolicyConfig) -> Result<InventoryReport> {
    let files = find_video_files(&args.input_dir, &policy.video_extensions)
        .with_context(|| format!("Could not scan {}", args.input_dir.display()))?;
    check_dependency("ffprobe")?;

    if !args.json {
        output::print_heading("QS02 Inventory");
        output::print_info("Directory", args.input_dir.display());
        output::print_info("Files", files.len());
    }
    log::info!("Analyzing {} file(s) in {}", files.len(), args.input_dir.display());

    let bar = output::batch_progress_bar(files.len() as u64);
    let probe = FfprobeProbe::new();
    let report = run_inventory(&files, &probe, policy, |_, _, path, outcome| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Err(e) = outcome {
            bar.println(format!("skipped {name}: {e}"));
        }
        bar.set_message(name);
        bar.inc(1);
    });
    bar.finish_and_clear();

    report
        .write_tsv_file(&args.tsv)
        .with_context(|| format!("Could not write {}", args.tsv.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
        output::print_info("Inventory", args.tsv.display());
    }
    Ok(report)
}

fn print_summary(report: &InventoryReport) {
    output::print_section("Needs normalization");
    if report.needs_normalization.is_empty() {
        println!("  none");
    }
    for entry in &report.needs_normalization {
        output::print_failure(&format!(
            "{} [{} {} {}]",
            entry.file_name(),
            entry.resolution,
            if entry.is_hdr { "HDR" } else { "SDR" },
            entry.video_codec
        ));
        output::print_verdict(&entry.verdict);
    }

    if !report.errors.is_empty() {
        output::print_section("Errors");
        for error in &report.errors {
            output::print_skip(&format!("{}: {}", error.path.display(), error.reason));
        }
    }

    output::print_section("Summary");
    output::print_success(&format!("{} compatible", report.compatible.len()));
    output::print_info("To normalize", report.needs_normalization.len());
    output::print_info("Errors", report.errors.len());
    output::print_info("Total", report.total());
}
