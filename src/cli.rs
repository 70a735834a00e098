//! Command-line interface for signtype
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Fingerspelling to text from hand landmarks
#[derive(Parser, Debug)]
#[command(
    name = "signtype",
    version,
    about = "Fingerspelling to text from hand landmarks"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress everything but the recognized text
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-symbol, -vv: per-frame diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a gate timeout into a duration.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`
/// (`500ms`, `2s`, `1m`). `0` disables reclamation.
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a recorded landmark stream into text
    Run {
        /// JSON-lines landmark recording
        #[arg(long, value_name = "FILE")]
        frames: PathBuf,

        /// Label table (default: from config)
        #[arg(long, value_name = "FILE")]
        labels: Option<PathBuf>,

        /// Centroid model (default: from config)
        #[arg(long, value_name = "FILE")]
        model: Option<PathBuf>,

        /// Camera frame rate to simulate; 0 waits for each frame instead of dropping
        #[arg(long, value_name = "N", default_value_t = crate::defaults::REPLAY_FPS)]
        fps: u32,

        /// Gate timeout (default: from config). Examples: 500, 500ms, 2s
        #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
        gate_timeout: Option<Duration>,

        /// Minimum hand detection confidence (default: from config)
        #[arg(long, value_name = "SCORE")]
        min_confidence: Option<f32>,
    },

    /// Print the normalized feature vector of every frame as JSON lines
    Normalize {
        /// JSON-lines landmark recording
        #[arg(long, value_name = "FILE")]
        frames: PathBuf,
    },

    /// Build a centroid model and label table from a labeled recording
    Train {
        /// JSON-lines recording whose frames carry a "label"
        #[arg(long, value_name = "FILE")]
        dataset: PathBuf,

        /// Where to write the model
        #[arg(long, value_name = "FILE")]
        model_out: PathBuf,

        /// Where to write the label table
        #[arg(long, value_name = "FILE")]
        labels_out: PathBuf,
    },

    /// List the label table
    Labels {
        /// Label table (default: from config)
        #[arg(long, value_name = "FILE")]
        labels: Option<PathBuf>,
    },

    /// View and initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (file + environment)
    Show,
    /// Print the configuration file path
    Path,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_requires_frames() {
        assert!(Cli::try_parse_from(["signtype", "run"]).is_err());
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["signtype", "run", "--frames", "hand.jsonl"]).unwrap();
        match cli.command {
            Commands::Run {
                frames,
                labels,
                model,
                fps,
                gate_timeout,
                min_confidence,
            } => {
                assert_eq!(frames, PathBuf::from("hand.jsonl"));
                assert!(labels.is_none());
                assert!(model.is_none());
                assert_eq!(fps, 30);
                assert!(gate_timeout.is_none());
                assert!(min_confidence.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "signtype",
            "run",
            "--frames",
            "a.jsonl",
            "--labels",
            "l.txt",
            "--model",
            "m.json",
            "--fps",
            "0",
            "--gate-timeout",
            "1s",
            "--min-confidence",
            "0.5",
        ])
        .unwrap();
        let Commands::Run {
            fps,
            gate_timeout,
            min_confidence,
            labels,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(fps, 0);
        assert_eq!(gate_timeout, Some(Duration::from_secs(1)));
        assert_eq!(min_confidence, Some(0.5));
        assert_eq!(labels, Some(PathBuf::from("l.txt")));
    }

    #[test]
    fn test_parse_timeout_formats() {
        assert_eq!(parse_timeout("250"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_timeout("0"), Ok(Duration::ZERO));
        assert_eq!(parse_timeout("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_timeout(" 2s "), Ok(Duration::from_secs(2)));
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["signtype", "-vv", "labels"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["signtype", "labels", "-q", "--config", "/tmp/c.toml"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from([
            "signtype",
            "train",
            "--dataset",
            "d.jsonl",
            "--model-out",
            "m.json",
            "--labels-out",
            "l.txt",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Train { .. }));
    }

    #[test]
    fn test_parse_config_init_force() {
        let cli = Cli::try_parse_from(["signtype", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["signtype", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
