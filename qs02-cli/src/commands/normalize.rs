//! Implementation of the 'normalize' subcommand.
//!
//! Plans the re-encode of one film, runs it through ffmpeg and leaves a
//! comparison report next to the output.

use crate::cli::NormalizeArgs;
use crate::config::apply_normalize_overrides;
use crate::output;

use anyhow::{Context, Result, bail};
use qs02_core::external::{display_command, ensure_encoder};
use qs02_core::{
    EncodeProgress, FfprobeProbe, NormalizationJob, PolicyConfig, SidecarEncoder,
    check_dependency, ensure_supported_extension, format_size, prepare_normalization,
    run_normalization,
};

use std::path::{Path, PathBuf};
use std::time::Instant;

fn output_dir_for(args: &NormalizeArgs) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Prepares and, unless `--dry-run` is set, runs the normalization.
pub fn run_normalize_command(args: &NormalizeArgs, base: PolicyConfig) -> Result<NormalizationJob> {
    if !args.input.is_file() {
        bail!("Input file '{}' does not exist", args.input.display());
    }
    let policy = apply_normalize_overrides(base, args)?;
    ensure_supported_extension(&args.input, &policy.video_extensions)?;
    check_dependency("ffprobe")?;

    let output_dir = output_dir_for(args);
    let probe = FfprobeProbe::new();
    let job = prepare_normalization(&args.input, &output_dir, &probe, &policy, args.overwrite)
        .with_context(|| format!("Could not plan {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&job.plan)?);
    } else {
        output::print_heading("QS02 Normalize");
        output::print_info("Input", args.input.display());
        output::print_info("Output", job.output_path.display());
        output::print_info("Report", job.report_path.display());
        output::print_section("Source");
        output::print_verdict(&job.verdict);
        output::print_plan(&job.plan);
    }
    if job.verdict.compatible {
        log::info!("{} is already QS02 compatible", args.input.display());
    }

    if args.dry_run {
        if !args.json {
            output::print_section("ffmpeg command (dry run)");
            println!("{}", display_command("ffmpeg", &job.args));
        }
        return Ok(job);
    }

    check_dependency("ffmpeg")?;
    ensure_encoder(&policy.encoder.video_encoder)?;

    let bar = output::encode_progress_bar();
    let started = Instant::now();
    let mut on_progress = |progress: &EncodeProgress| {
        if let Some(percent) = progress.percent() {
            bar.set_position(percent as u64);
        }
        bar.set_message(format!("{:.1}x", progress.speed));
    };
    let outcome = run_normalization(&job, &SidecarEncoder::new(), &probe, &mut on_progress);
    bar.finish_and_clear();
    let outcome = outcome.with_context(|| format!("Encoding {} failed", args.input.display()))?;

    if !args.json {
        output::print_section("Result");
        output::print_success(&format!(
            "Encoded in {}",
            qs02_core::format_duration(started.elapsed().as_secs_f64())
        ));
        output::print_info("Source size", format_size(job.source.format.size_bytes));
        match &outcome.target {
            Some(target) => {
                output::print_info("Output size", format_size(target.format.size_bytes))
            }
            None => output::print_skip("Output could not be probed; report is partial"),
        }
        output::print_info("Report", outcome.report_path.display());
    }
    Ok(job)
}
