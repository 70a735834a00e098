//! Command implementations.
//!
//! Composes the library pieces for each subcommand:
//! recording → gate → extractor → translator → sink.

use crate::classifier::{CentroidClassifier, Classifier};
use crate::config::Config;
use crate::error::{Result, SigntypeError};
use crate::labels::LabelTable;
use crate::landmarks::{FeatureVector, ReplayExtractor, ReplayItem, ReplaySource, normalize};
use crate::pipeline::{Pipeline, PipelineConfig, StdoutSink, Submission, TextSink};
use crate::session::{Session, SessionConfig};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Options of the `run` command; `None` fields fall back to the config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frames: PathBuf,
    pub labels: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub fps: u32,
    pub gate_timeout: Option<Duration>,
    pub min_confidence: Option<f32>,
    pub quiet: bool,
    pub verbosity: u8,
}

/// What a replay did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Final accumulated text.
    pub text: String,
    pub frames: u64,
    pub admitted: u64,
    pub dropped: u64,
    pub resets: u64,
    /// Lines that could not be parsed.
    pub skipped: u64,
    /// The replay was interrupted before the end of the recording.
    pub interrupted: bool,
}

/// Run the replay command: recording → pipeline → stdout.
pub async fn run_replay_command(config: Config, options: RunOptions) -> Result<()> {
    let quiet = options.quiet;
    let report = replay(&config, &options, Box::new(StdoutSink::new())).await?;

    if !quiet {
        let status = if report.interrupted {
            "interrupted".yellow().to_string()
        } else {
            "done".green().to_string()
        };
        eprintln!(
            "signtype: {status}: {} frame(s), {} admitted, {} dropped, {} reset(s)",
            report.frames, report.admitted, report.dropped, report.resets
        );
        if report.skipped > 0 {
            eprintln!(
                "{}",
                format!("signtype: {} malformed record(s) skipped", report.skipped).yellow()
            );
        }
        eprintln!("signtype: text: \"{}\"", report.text.bold());
    }
    Ok(())
}

/// Replays a recording through a fresh session and pipeline.
///
/// Frames are offered at `options.fps`; frames arriving while another is in
/// flight are dropped, as a live camera would. With `fps == 0` each frame
/// waits for the previous one instead, so every frame is analyzed.
///
/// Ctrl-C stops the replay early; the pipeline is still shut down and the
/// text so far is reported.
pub async fn replay(
    config: &Config,
    options: &RunOptions,
    sink: Box<dyn TextSink>,
) -> Result<ReplayReport> {
    let interrupt = Arc::new(AtomicBool::new(false));
    let watcher = {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.store(true, Ordering::SeqCst);
            }
        })
    };
    // Let the watcher install the handler before the first frame.
    tokio::task::yield_now().await;

    let result = replay_until(config, options, sink, &interrupt).await;
    watcher.abort();
    result
}

/// Warning for a model whose output count differs from the label table.
pub fn label_mismatch_warning(classifier: &dyn Classifier, labels: &LabelTable) -> Option<String> {
    (classifier.label_count() != labels.len()).then(|| {
        format!(
            "signtype: model '{}' has {} outputs but the label table has {} labels",
            classifier.name(),
            classifier.label_count(),
            labels.len()
        )
    })
}

/// Replays a recording until it ends or `interrupt` is set.
pub async fn replay_until(
    config: &Config,
    options: &RunOptions,
    sink: Box<dyn TextSink>,
    interrupt: &AtomicBool,
) -> Result<ReplayReport> {
    let labels_path = options.labels.as_ref().unwrap_or(&config.model.labels);
    let model_path = options.model.as_ref().unwrap_or(&config.model.centroids);
    let labels = LabelTable::load(labels_path)?;
    let classifier: Arc<dyn Classifier> = Arc::new(CentroidClassifier::load(model_path)?);

    if options.verbosity >= 1 && !options.quiet {
        eprintln!(
            "signtype: model '{}' ({} outputs), {} labels",
            classifier.name(),
            classifier.label_count(),
            labels.len()
        );
    }
    if !options.quiet
        && let Some(warning) = label_mismatch_warning(classifier.as_ref(), &labels)
    {
        eprintln!("{}", warning.yellow());
    }

    let session_config = SessionConfig {
        gate_timeout: options.gate_timeout.unwrap_or(config.gate.timeout()),
        verbosity: options.verbosity,
    };
    let session = Arc::new(Session::start_with(session_config, classifier, labels)?);

    let min_confidence = options
        .min_confidence
        .unwrap_or(config.detection.min_confidence);
    let extractor = ReplayExtractor::new().with_min_confidence(min_confidence);

    let pipeline_config = PipelineConfig {
        verbosity: options.verbosity,
        quiet: options.quiet,
        ..Default::default()
    };
    let handle = Pipeline::new(pipeline_config).start(session.clone(), extractor, sink)?;

    let mut report = ReplayReport::default();
    let source = ReplaySource::open(&options.frames)?;
    let mut ticker = (options.fps > 0).then(|| {
        let mut interval =
            tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(options.fps)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval
    });

    'replay: for item in source {
        if interrupt.load(Ordering::SeqCst) {
            report.interrupted = true;
            break;
        }
        let item = match item {
            Ok(item) => item,
            Err(e @ SigntypeError::LandmarkRecord { .. }) => {
                report.skipped += 1;
                if options.verbosity >= 1 {
                    eprintln!("signtype: {e}");
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        let frame = match item {
            ReplayItem::Control(_) => {
                handle.reset();
                report.resets += 1;
                continue;
            }
            ReplayItem::Frame { frame, .. } => frame,
        };

        if let Some(ref mut ticker) = ticker {
            ticker.tick().await;
            if interrupt.load(Ordering::SeqCst) {
                report.interrupted = true;
                break;
            }
        }

        report.frames += 1;
        loop {
            match handle.submit(frame.clone()) {
                Submission::Admitted => {
                    report.admitted += 1;
                    break;
                }
                Submission::Dropped if ticker.is_none() => {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    if interrupt.load(Ordering::SeqCst) {
                        report.interrupted = true;
                        break 'replay;
                    }
                }
                Submission::Dropped => {
                    report.dropped += 1;
                    break;
                }
                Submission::Stopped => break 'replay,
            }
        }
    }

    handle.stop();
    report.text = session.text();

    if let Some(error) = session.last_error()
        && error.is_fatal()
    {
        return Err(error.into());
    }
    Ok(report)
}

/// One line of `normalize` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub features: Vec<f32>,
}

/// Normalizes every frame of a recording.
///
/// Frames with the wrong landmark count are skipped; control records are
/// ignored. Returns the records and the number of skipped frames.
pub fn normalize_recording(path: &Path) -> Result<(Vec<FeatureRecord>, usize)> {
    let mut records = Vec::new();
    let mut skipped = 0;
    for item in ReplaySource::open(path)? {
        let ReplayItem::Frame { frame, label } = item? else {
            continue;
        };
        match normalize(&frame) {
            Ok(features) => records.push(FeatureRecord {
                label,
                features: features.as_slice().to_vec(),
            }),
            Err(_) => skipped += 1,
        }
    }
    Ok((records, skipped))
}

/// Run the normalize command: print one JSON line per frame.
pub fn run_normalize_command(frames: &Path, quiet: bool) -> Result<()> {
    let (records, skipped) = normalize_recording(frames)?;
    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    if !quiet && skipped > 0 {
        eprintln!(
            "{}",
            format!("signtype: {skipped} frame(s) without 21 landmarks skipped").yellow()
        );
    }
    Ok(())
}

/// Collects `(label, features)` training pairs from a labeled recording.
pub fn training_samples(path: &Path) -> Result<Vec<(String, FeatureVector)>> {
    let mut samples = Vec::new();
    for item in ReplaySource::open(path)? {
        if let ReplayItem::Frame {
            frame,
            label: Some(label),
        } = item?
            && let Ok(features) = normalize(&frame)
        {
            samples.push((label, features));
        }
    }
    Ok(samples)
}

/// Run the train command: dataset → centroid model + label table.
pub fn run_train_command(
    dataset: &Path,
    model_out: &Path,
    labels_out: &Path,
    quiet: bool,
) -> Result<()> {
    let samples = training_samples(dataset)?;
    let (labels, classifier) = CentroidClassifier::train(&samples)?;
    classifier.save(model_out)?;
    labels.save(labels_out)?;

    if !quiet {
        eprintln!(
            "signtype: trained {} label(s) from {} sample(s)",
            labels.len().green(),
            samples.len()
        );
        eprintln!("  model:  {}", model_out.display());
        eprintln!("  labels: {}", labels_out.display());
    }
    Ok(())
}

/// Run the labels command: list the label table with output positions.
pub fn run_labels_command(path: &Path) -> Result<()> {
    let labels = LabelTable::load(path)?;
    for (index, label) in labels.labels().iter().enumerate() {
        if label.trim().is_empty() {
            println!("{index:>3}  {}", "(blank)".dimmed());
        } else {
            println!("{index:>3}  {label}");
        }
    }
    Ok(())
}

/// Writes a default configuration file.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(SigntypeError::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
