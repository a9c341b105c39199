// qs02-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "QS02: Media classification and normalization tool",
    long_about = "Classifies films against the QS02 playback profile and re-encodes \
                  incompatible ones with ffmpeg via qs02-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Policy file (TOML) overriding the built-in QS02 defaults
    #[arg(long, global = true, value_name = "PATH", env = "QS02_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Also write logs to a timestamped file in this directory
    #[arg(long, global = true, value_name = "LOG_DIR", env = "QS02_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scans a directory and classifies every film against QS02
    Inventory(InventoryArgs),

    /// Re-encodes one film into a QS02-compatible output
    Normalize(NormalizeArgs),
}

#[derive(Parser, Debug)]
pub struct InventoryArgs {
    /// Directory to scan recursively
    #[arg(required = true, value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Where to write the TSV inventory
    #[arg(long, value_name = "PATH", default_value = qs02_core::reporting::DEFAULT_TSV_FILENAME)]
    pub tsv: PathBuf,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Film to normalize
    #[arg(required = true, value_name = "FILE")]
    pub input: PathBuf,

    /// Output directory (defaults to the input's directory)
    #[arg(short = 'o', long = "output-dir", value_name = "OUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Replace an existing output instead of picking a free name
    #[arg(long)]
    pub overwrite: bool,

    /// Print the plan and the ffmpeg command without encoding
    #[arg(long)]
    pub dry_run: bool,

    /// Print the plan as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Copy subtitle streams into the output
    #[arg(long)]
    pub keep_subs: bool,

    // --- Encoder Overrides ---
    /// Constant quality level (0-51, lower is better)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=51), env = "QS02_CQ")]
    pub cq: Option<u8>,

    /// Encoder preset (e.g. slow, p7)
    #[arg(long, value_name = "PRESET", env = "QS02_PRESET")]
    pub preset: Option<String>,

    /// GPU index used by the hardware encoder
    #[arg(long, value_name = "N", env = "QS02_GPU")]
    pub gpu: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inventory_defaults() {
        let cli = Cli::parse_from(["qs02", "inventory", "/films"]);
        match cli.command {
            Commands::Inventory(args) => {
                assert_eq!(args.input_dir, PathBuf::from("/films"));
                assert_eq!(args.tsv, PathBuf::from("films_qs02_inventaire.tsv"));
                assert!(!args.json);
            }
            Commands::Normalize(_) => panic!("Expected Inventory command"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_normalize_overrides() {
        let cli = Cli::parse_from([
            "qs02",
            "--verbose",
            "normalize",
            "film.mkv",
            "-o",
            "out",
            "--overwrite",
            "--dry-run",
            "--keep-subs",
            "--cq",
            "22",
            "--preset",
            "p7",
            "--gpu",
            "1",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Normalize(args) => {
                assert_eq!(args.input, PathBuf::from("film.mkv"));
                assert_eq!(args.output_dir, Some(PathBuf::from("out")));
                assert!(args.overwrite);
                assert!(args.dry_run);
                assert!(args.keep_subs);
                assert_eq!(args.cq, Some(22));
                assert_eq!(args.preset.as_deref(), Some("p7"));
                assert_eq!(args.gpu, Some(1));
            }
            Commands::Inventory(_) => panic!("Expected Normalize command"),
        }
    }

    #[test]
    fn test_quality_out_of_range_is_rejected() {
        let result = Cli::try_parse_from(["qs02", "normalize", "film.mkv", "--cq", "60"]);
        assert!(result.is_err());
    }
}
