// qs02-cli/src/config.rs
//
// Resolves the policy handed to qs02-core: built-in defaults, then the
// optional policy file, then command-line overrides.

use crate::cli::NormalizeArgs;

use anyhow::{Context, Result};
use qs02_core::{PolicyConfig, PolicyConfigBuilder};

use std::path::Path;

/// Defaults, overridden by the policy file when one is given.
pub fn load_policy(config_path: Option<&Path>) -> Result<PolicyConfig> {
    match config_path {
        Some(path) => {
            let policy = PolicyConfig::load(path)
                .with_context(|| format!("Could not use policy file {}", path.display()))?;
            log::info!("Using policy file {}", path.display());
            Ok(policy)
        }
        None => Ok(PolicyConfig::default()),
    }
}

/// Applies the normalize flags on top of `base`.
pub fn apply_normalize_overrides(base: PolicyConfig, args: &NormalizeArgs) -> Result<PolicyConfig> {
    let mut builder = PolicyConfigBuilder::from_config(base);
    if let Some(cq) = args.cq {
        builder = builder.encoder_quality(cq);
    }
    if let Some(preset) = &args.preset {
        builder = builder.encoder_preset(preset.clone());
    }
    if let Some(gpu) = args.gpu {
        builder = builder.gpu_index(gpu);
    }
    if args.keep_subs {
        builder = builder.keep_subtitles(true);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn normalize_args(extra: &[&str]) -> NormalizeArgs {
        let mut argv = vec!["qs02", "normalize", "film.mkv"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Normalize(args) => args,
            Commands::Inventory(_) => panic!("Expected Normalize command"),
        }
    }

    #[test]
    fn test_defaults_without_file() {
        assert_eq!(load_policy(None).unwrap(), PolicyConfig::default());
    }

    #[test]
    fn test_file_then_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        fs::write(
            &path,
            "[encoder]\npreset = \"p5\"\nquality = 24\n\n[naming]\nmarker = \"plex\"\n",
        )
        .unwrap();

        let from_file = load_policy(Some(&path)).unwrap();
        assert_eq!(from_file.encoder.preset, "p5");
        assert_eq!(from_file.naming.marker, "plex");

        let policy =
            apply_normalize_overrides(from_file, &normalize_args(&["--cq", "19", "--keep-subs"]))
                .unwrap();
        assert_eq!(policy.encoder.quality, 19);
        assert_eq!(policy.encoder.preset, "p5");
        assert_eq!(policy.naming.marker, "plex");
        assert!(policy.keep_subtitles);
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_policy(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
