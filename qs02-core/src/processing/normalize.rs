// ============================================================================
// qs02-core/src/processing/normalize.rs
// ============================================================================
//
// NORMALIZATION WORKFLOW: One File from Probe to Report
//
// prepare_normalization does everything that does not touch the output:
// probe, plan, pick a collision-free output path and render the encoder
// arguments. run_normalization then writes a placeholder comparison report,
// runs the encoder, probes the result and rewrites the report with both
// sides.
//
// Splitting the two lets callers show the plan (dry run) without creating
// anything on disk.

// ---- Internal crate imports ----
use crate::config::{PolicyConfig, TitleVocabulary};
use crate::discovery::ensure_supported_extension;
use crate::error::CoreResult;
use crate::external::{EncodeProgress, EncoderRunner, build_encoder_args};
use crate::media::{MediaMetadata, MetadataProbe};
use crate::naming::{TitleExtractor, default_extractor, resolve_output_path};
use crate::processing::compatibility::{CompatibilityVerdict, evaluate_metadata};
use crate::processing::plan::{PlanInputs, TranscodePlan, build_plan};
use crate::reporting::{ComparisonInput, write_comparison};
use crate::utils::get_filename_safe;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Everything needed to normalize one file.
#[derive(Debug, Clone)]
pub struct NormalizationJob {
    pub input_path: PathBuf,
    /// Probe result for the input
    pub source: MediaMetadata,
    /// Compatibility of the input as it is today
    pub verdict: CompatibilityVerdict,
    pub plan: TranscodePlan,
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    /// ffmpeg arguments, without the program name
    pub args: Vec<String>,
}

/// Result of a completed normalization.
#[derive(Debug, Clone)]
pub struct NormalizationOutcome {
    pub output_path: PathBuf,
    pub report_path: PathBuf,
    /// Probe result for the output, `None` if it could not be probed
    pub target: Option<MediaMetadata>,
}

impl NormalizationJob {
    fn file_name(path: &Path) -> String {
        get_filename_safe(path).unwrap_or_else(|_| path.display().to_string())
    }

    /// Renders and writes the comparison report.
    pub fn write_report(&self, target: Option<&MediaMetadata>) -> CoreResult<()> {
        let source_name = Self::file_name(&self.input_path);
        let target_name = Self::file_name(&self.output_path);
        write_comparison(
            &self.report_path,
            &ComparisonInput {
                source_name: &source_name,
                source: &self.source,
                target_name: &target_name,
                target,
                plan: &self.plan,
            },
        )
    }
}

/// Probes `input` and prepares its normalization into `output_dir`.
///
/// # Errors
///
/// `UnsupportedContainerExtension`, `ProbeUnavailable` and
/// `MissingRequiredStream` for the file itself; `Config` when the policy's
/// title vocabulary does not compile.
pub fn prepare_normalization(
    input: &Path,
    output_dir: &Path,
    probe: &dyn MetadataProbe,
    policy: &PolicyConfig,
    overwrite: bool,
) -> CoreResult<NormalizationJob> {
    ensure_supported_extension(input, &policy.video_extensions)?;
    let source = probe.probe(input)?;
    let verdict = evaluate_metadata(&source, &policy.compatibility)?;

    let owned_extractor;
    let extractor: &TitleExtractor = if policy.vocabulary == TitleVocabulary::default() {
        default_extractor()?
    } else {
        owned_extractor = TitleExtractor::new(&policy.vocabulary)?;
        &owned_extractor
    };
    let identity = extractor.extract(&get_filename_safe(input)?);
    log::debug!("Identity for {}: {:?}", input.display(), identity);

    let plan = build_plan(&PlanInputs::new(&source, &identity), policy)?;
    let output_path = resolve_output_path(
        output_dir,
        &plan.output_stem,
        &policy.naming.output_extension,
        &[policy.naming.report_extension.as_str()],
        overwrite,
    )?;
    let report_path =
        output_path.with_extension(policy.naming.report_extension.trim_start_matches('.'));
    let args = build_encoder_args(&plan, input, &output_path, policy, overwrite);

    log::info!("{} -> {}", input.display(), output_path.display());

    Ok(NormalizationJob {
        input_path: input.to_path_buf(),
        source,
        verdict,
        plan,
        output_path,
        report_path,
        args,
    })
}

/// Runs a prepared job: placeholder report, encode, output probe, final report.
///
/// A failed output probe is logged and leaves the placeholder report in
/// place; it does not fail the job.
pub fn run_normalization(
    job: &NormalizationJob,
    runner: &dyn EncoderRunner,
    probe: &dyn MetadataProbe,
    on_progress: &mut dyn FnMut(&EncodeProgress),
) -> CoreResult<NormalizationOutcome> {
    if let Some(parent) = job.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    job.write_report(None)?;
    runner.run(&job.args, job.source.format.duration_seconds, on_progress)?;

    let target = match probe.probe(&job.output_path) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            log::warn!("Could not probe {}: {e}", job.output_path.display());
            None
        }
    };
    if target.is_some() {
        job.write_report(target.as_ref())?;
    }

    Ok(NormalizationOutcome {
        output_path: job.output_path.clone(),
        report_path: job.report_path.clone(),
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::media::{FormatInfo, LanguageTag, StreamDescriptor, StreamKind};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs::File;
    use tempfile::tempdir;

    /// Serves canned metadata per path.
    struct StubProbe {
        files: HashMap<PathBuf, MediaMetadata>,
    }

    impl MetadataProbe for StubProbe {
        fn probe(&self, path: &Path) -> CoreResult<MediaMetadata> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| CoreError::ProbeUnavailable {
                    path: path.to_path_buf(),
                    reason: "not stubbed".to_string(),
                })
        }
    }

    /// Records the arguments and reports one progress tick.
    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<Vec<String>>>,
        fail: bool,
    }

    impl EncoderRunner for RecordingRunner {
        fn run(
            &self,
            args: &[String],
            duration_seconds: f64,
            on_progress: &mut dyn FnMut(&EncodeProgress),
        ) -> CoreResult<()> {
            self.calls.borrow_mut().push(args.to_vec());
            on_progress(&EncodeProgress {
                elapsed_seconds: duration_seconds / 2.0,
                total_seconds: duration_seconds,
                speed: 1.5,
            });
            if self.fail {
                return Err(CoreError::CommandFailed(
                    "ffmpeg".to_string(),
                    std::process::ExitStatus::default(),
                    "boom".to_string(),
                ));
            }
            Ok(())
        }
    }

    fn sdr_source() -> MediaMetadata {
        let mut video = StreamDescriptor::new(0, StreamKind::Video, "mpeg4");
        video.width = 1920;
        video.height = 1080;
        video.pixel_format = Some("yuv420p".to_string());
        let mut en = StreamDescriptor::new(1, StreamKind::Audio, "dts");
        en.channels = 6;
        en.language = LanguageTag::En;
        let mut fr = StreamDescriptor::new(2, StreamKind::Audio, "ac3");
        fr.channels = 6;
        fr.language = LanguageTag::Fr;
        MediaMetadata::new(
            FormatInfo {
                format_name: "matroska,webm".to_string(),
                total_bit_rate: 12_000_000,
                duration_seconds: 600.0,
                size_bytes: 900_000_000,
            },
            vec![video, en, fr],
        )
    }

    fn probe_for(input: &Path) -> StubProbe {
        let mut files = HashMap::new();
        files.insert(input.to_path_buf(), sdr_source());
        StubProbe { files }
    }

    #[test]
    fn test_prepare_builds_plan_paths_and_args() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("The.Movie.1999.1080p.BluRay.x264.mkv");
        let out_dir = dir.path().join("out");
        let probe = probe_for(&input);

        let job = prepare_normalization(&input, &out_dir, &probe, &PolicyConfig::default(), false)
            .unwrap();

        assert!(!job.verdict.compatible);
        assert_eq!(job.plan.output_stem, "The.Movie.1999.1080p.SDR.qs02");
        assert_eq!(job.output_path, out_dir.join("The.Movie.1999.1080p.SDR.qs02.mkv"));
        assert_eq!(job.report_path, out_dir.join("The.Movie.1999.1080p.SDR.qs02.md"));
        // French track is ordinal 1 among the audio streams
        assert!(job.args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a:1"));
        let output = out_dir.join("The.Movie.1999.1080p.SDR.qs02.mkv");
        assert_eq!(job.args.last().map(String::as_str), output.to_str());
        // Nothing is written while preparing
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_prepare_avoids_existing_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Film.2005.mkv");
        let probe = probe_for(&input);
        File::create(dir.path().join("Film.2005.1080p.SDR.qs02.mkv")).unwrap();

        let job = prepare_normalization(&input, dir.path(), &probe, &PolicyConfig::default(), false)
            .unwrap();
        assert_eq!(job.output_path, dir.path().join("Film.2005.1080p.SDR.qs02.1.mkv"));
        assert_eq!(job.report_path, dir.path().join("Film.2005.1080p.SDR.qs02.1.md"));

        let job = prepare_normalization(&input, dir.path(), &probe, &PolicyConfig::default(), true)
            .unwrap();
        assert_eq!(job.output_path, dir.path().join("Film.2005.1080p.SDR.qs02.mkv"));
    }

    #[test]
    fn test_prepare_keeps_leftover_report() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Film.2005.mkv");
        let probe = probe_for(&input);
        std::fs::write(dir.path().join("Film.2005.1080p.SDR.qs02.md"), "old report").unwrap();

        let job = prepare_normalization(&input, dir.path(), &probe, &PolicyConfig::default(), false)
            .unwrap();
        assert_eq!(job.output_path, dir.path().join("Film.2005.1080p.SDR.qs02.1.mkv"));
        assert_eq!(job.report_path, dir.path().join("Film.2005.1080p.SDR.qs02.1.md"));
    }

    #[test]
    fn test_prepare_rejects_unsupported_extension() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("clip.avi");
        let probe = probe_for(&input);
        let result = prepare_normalization(&input, dir.path(), &probe, &PolicyConfig::default(), false);
        assert!(matches!(result, Err(CoreError::UnsupportedContainerExtension(_))));
    }

    #[test]
    fn test_run_writes_reports_and_reprobes() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Film.2005.mkv");
        let out_dir = dir.path().join("nested").join("out");
        let mut probe = probe_for(&input);

        let job = prepare_normalization(&input, &out_dir, &probe, &PolicyConfig::default(), false)
            .unwrap();
        probe.files.insert(job.output_path.clone(), sdr_source());

        let runner = RecordingRunner::default();
        let mut ticks = Vec::new();
        let mut on_progress = |p: &EncodeProgress| ticks.push(p.percent());
        let outcome = run_normalization(&job, &runner, &probe, &mut on_progress).unwrap();

        assert_eq!(runner.calls.borrow().len(), 1);
        assert_eq!(runner.calls.borrow()[0], job.args);
        assert_eq!(ticks, vec![Some(50.0)]);
        assert!(outcome.target.is_some());

        let report = std::fs::read_to_string(&outcome.report_path).unwrap();
        assert!(report.contains("| Codec | mpeg4 | mpeg4 | N |"));
    }

    #[test]
    fn test_unprobeable_output_keeps_placeholder_report() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Film.2005.mkv");
        let probe = probe_for(&input);
        let job = prepare_normalization(&input, dir.path(), &probe, &PolicyConfig::default(), false)
            .unwrap();

        let runner = RecordingRunner::default();
        let outcome = run_normalization(&job, &runner, &probe, &mut |_: &EncodeProgress| {}).unwrap();

        assert!(outcome.target.is_none());
        let report = std::fs::read_to_string(&outcome.report_path).unwrap();
        assert!(report.contains("| Codec | mpeg4 | - | N |"));
    }

    #[test]
    fn test_encoder_failure_is_returned() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("Film.2005.mkv");
        let probe = probe_for(&input);
        let job = prepare_normalization(&input, dir.path(), &probe, &PolicyConfig::default(), false)
            .unwrap();
        let runner = RecordingRunner {
            fail: true,
            ..RecordingRunner::default()
        };

        let result = run_normalization(&job, &runner, &probe, &mut |_: &EncodeProgress| {});
        assert!(matches!(result, Err(CoreError::CommandFailed(..))));
        // Placeholder report was written before the encode
        assert!(job.report_path.exists());
    }
}
