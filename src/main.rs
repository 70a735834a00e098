use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use signtype::app::{
    RunOptions, init_config, run_labels_command, run_normalize_command, run_replay_command,
    run_train_command,
};
use signtype::cli::{Cli, Commands, ConfigAction};
use signtype::config::Config;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose >= 2 && !cli.quiet {
        eprintln!("signtype {}", signtype::version_string());
    }

    match cli.command {
        Commands::Run {
            frames,
            labels,
            model,
            fps,
            gate_timeout,
            min_confidence,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let options = RunOptions {
                frames,
                labels,
                model,
                fps,
                gate_timeout,
                min_confidence,
                quiet: cli.quiet,
                verbosity: cli.verbose,
            };
            run_replay_command(config, options).await?;
        }
        Commands::Normalize { frames } => {
            run_normalize_command(&frames, cli.quiet)?;
        }
        Commands::Train {
            dataset,
            model_out,
            labels_out,
        } => {
            run_train_command(&dataset, &model_out, &labels_out, cli.quiet)?;
        }
        Commands::Labels { labels } => {
            let path = match labels {
                Some(path) => path,
                None => load_config(cli.config.as_deref())?.model.labels,
            };
            run_labels_command(&path)
                .with_context(|| format!("failed to list labels from {}", path.display()))?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "signtype",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration with environment overrides.
///
/// An explicit `--config` path must exist; the default path may be missing.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides()?)
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            let marker = if config_path.exists() {
                "exists".green().to_string()
            } else {
                "not created".dimmed().to_string()
            };
            println!("{} ({marker})", config_path.display());
        }
        ConfigAction::Init { force } => {
            init_config(&config_path, force)?;
            println!("Wrote {}", config_path.display());
        }
    }

    Ok(())
}
