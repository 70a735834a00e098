//! Recognition pipeline that runs from startup until shutdown.

use crate::defaults;
use crate::error::Result;
use crate::landmarks::PoseExtractor;
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::extractor_station::ExtractorStation;
use crate::pipeline::sink::{SinkStation, TextSink};
use crate::pipeline::station::{StationRunner, StationStats};
use crate::pipeline::translator_station::TranslatorStation;
use crate::pipeline::types::StageJob;
use crate::session::Session;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Verbosity level (0=results only, 1=per-symbol, 2=per-frame diagnostics)
    pub verbosity: u8,
    /// Suppress status messages
    pub quiet: bool,
    /// Channel buffer sizes
    pub frame_buffer: usize,
    pub landmark_buffer: usize,
    pub symbol_buffer: usize,
    /// How long `stop()` waits for the sink's result
    pub result_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            quiet: false,
            frame_buffer: defaults::STATION_BUFFER,
            landmark_buffer: defaults::STATION_BUFFER,
            symbol_buffer: 64,
            result_timeout: Duration::from_secs(5),
        }
    }
}

/// What happened to a frame handed to [`PipelineHandle::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The frame passed the gate and is being processed.
    Admitted,
    /// Another frame was in flight; this one was dropped.
    Dropped,
    /// The pipeline has stopped or the session is closed.
    Stopped,
}

/// Handle to a running pipeline.
///
/// The owner is the frame producer: it calls [`PipelineHandle::submit`] for
/// every camera frame, from a single thread.
pub struct PipelineHandle<I: Send + 'static> {
    session: Arc<Session>,
    job_tx: Option<Sender<StageJob<I>>>,
    /// Flag cleared on shutdown or when the translator dies
    running: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    result_rx: Option<Receiver<Option<String>>>,
    result_timeout: Duration,
}

impl<I: Send + 'static> PipelineHandle<I> {
    /// Offers one camera frame. Never blocks.
    pub fn submit(&self, image: I) -> Submission {
        if !self.is_running() {
            return Submission::Stopped;
        }
        let Some(ref job_tx) = self.job_tx else {
            return Submission::Stopped;
        };

        let admission = match self.session.admit() {
            Ok(Some(admission)) => admission,
            Ok(None) => return Submission::Dropped,
            Err(_) => return Submission::Stopped,
        };

        match job_tx.try_send(StageJob::frame(admission, image)) {
            Ok(()) => Submission::Admitted,
            Err(TrySendError::Full(job)) => {
                if let StageJob::Frame { admission, .. } = job {
                    self.session.abandon(admission);
                }
                Submission::Dropped
            }
            Err(TrySendError::Disconnected(job)) => {
                if let StageJob::Frame { admission, .. } = job {
                    self.session.abandon(admission);
                }
                self.running.store(false, Ordering::SeqCst);
                Submission::Stopped
            }
        }
    }

    /// Clears the accumulated text now and tells the sink once every frame
    /// submitted before the reset has drained.
    pub fn reset(&self) {
        self.session.reset();
        if let Some(ref job_tx) = self.job_tx
            && job_tx.try_send(StageJob::Reset).is_err()
        {
            eprintln!("signtype: reset not delivered to the sink (pipeline busy or stopped)");
        }
    }

    /// The session driven by this pipeline.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Returns true if the pipeline is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the pipeline, tears the session down and returns the sink's
    /// accumulated result.
    ///
    /// Closing the frame channel lets every station drain and exit in order.
    /// Waits up to `result_timeout` for the result, then 1s for threads to
    /// finish. After the deadline, remaining threads are detached.
    pub fn stop(mut self) -> Option<String> {
        self.running.store(false, Ordering::SeqCst);
        drop(self.job_tx.take());

        let result = self
            .result_rx
            .as_ref()
            .and_then(|rx| rx.recv_timeout(self.result_timeout).ok().flatten());

        let deadline = Instant::now() + Duration::from_secs(1);
        let poll_interval = Duration::from_millis(20);

        loop {
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("signtype: pipeline thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= deadline {
                eprintln!(
                    "signtype: shutdown timeout, {} thread(s) still running, detaching",
                    self.threads.len()
                );
                break;
            }

            thread::sleep(poll_interval);
        }

        // Threads still stuck in classification see a closed session and
        // their results are discarded.
        self.session.teardown();
        result
    }
}

/// Recognition pipeline: producer → gate → extractor → translator → TextSink.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl Pipeline {
    /// Creates a new pipeline with default error reporter.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Starts the station threads.
    ///
    /// # Arguments
    /// * `session` - Session owning the gate, classifier and text
    /// * `extractor` - Pose extractor for camera frames
    /// * `sink` - Output handler for accepted symbols
    pub fn start<E: PoseExtractor>(
        self,
        session: Arc<Session>,
        extractor: E,
        sink: Box<dyn TextSink>,
    ) -> Result<PipelineHandle<E::Image>> {
        let running = Arc::new(AtomicBool::new(true));
        let verbosity = self.config.verbosity;

        let (job_tx, job_rx) = bounded(self.config.frame_buffer);
        let (landmark_tx, landmark_rx) = bounded(self.config.landmark_buffer);
        let (symbol_tx, symbol_rx) = bounded(self.config.symbol_buffer);
        let (result_tx, result_rx) = bounded(1);
        // The sink station never produces output
        let (sink_out_tx, _sink_out_rx) = bounded::<()>(1);

        let extractor_station =
            ExtractorStation::new(extractor, session.clone()).with_verbosity(verbosity);
        let translator_station =
            TranslatorStation::new(session.clone(), running.clone()).with_verbosity(verbosity);
        let sink_station = SinkStation::new(sink, self.config.quiet, verbosity, result_tx);

        let extractor_runner = StationRunner::spawn(
            extractor_station,
            job_rx,
            landmark_tx,
            self.error_reporter.clone(),
        );
        let translator_runner = StationRunner::spawn(
            translator_station,
            landmark_rx,
            symbol_tx,
            self.error_reporter.clone(),
        );
        let sink_runner = StationRunner::spawn(
            sink_station,
            symbol_rx,
            sink_out_tx,
            self.error_reporter.clone(),
        );

        let threads = vec![
            join_in_background(extractor_runner, verbosity),
            join_in_background(translator_runner, verbosity),
            join_in_background(sink_runner, verbosity),
        ];

        Ok(PipelineHandle {
            session,
            job_tx: Some(job_tx),
            running,
            threads,
            result_rx: Some(result_rx),
            result_timeout: self.config.result_timeout,
        })
    }
}

fn join_in_background<S: crate::pipeline::station::Station>(
    runner: StationRunner<S>,
    verbosity: u8,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let name = runner.name();
        match runner.join() {
            Ok(stats) => log_stats(name, &stats, verbosity),
            Err(msg) => eprintln!("signtype: {msg}"),
        }
    })
}

fn log_stats(name: &str, stats: &StationStats, verbosity: u8) {
    if verbosity >= 2 {
        eprintln!(
            "signtype: [{name}] forwarded={} filtered={} errors={}",
            stats.forwarded, stats.filtered, stats.errors
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierError, MockClassifier};
    use crate::labels::LabelTable;
    use crate::landmarks::{Landmark, LandmarkFrame, ReplayExtractor};
    use crate::pipeline::error::StationError;
    use crate::pipeline::sink::CollectorSink;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        errors: Mutex<Vec<String>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, station: &str, error: &StationError) {
            self.errors
                .lock()
                .unwrap()
                .push(format!("{station}: {error}"));
        }
    }

    fn hand(shift: f32) -> LandmarkFrame {
        let points = (0..21)
            .map(|i| Landmark::new(0.2 + shift + 0.01 * i as f32, 0.4, 0.0))
            .collect();
        LandmarkFrame::new(points)
    }

    fn session(mock: MockClassifier) -> Arc<Session> {
        Arc::new(Session::start(Arc::new(mock), LabelTable::parse("H\nI\n")).unwrap())
    }

    fn quiet() -> PipelineConfig {
        PipelineConfig {
            quiet: true,
            ..Default::default()
        }
    }

    /// Submits a frame, retrying while the previous one is still in flight.
    fn submit_blocking(handle: &PipelineHandle<LandmarkFrame>, frame: LandmarkFrame) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.submit(frame.clone()) == Submission::Dropped {
            assert!(Instant::now() < deadline, "gate never reopened");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.frame_buffer, defaults::STATION_BUFFER);
        assert_eq!(config.landmark_buffer, defaults::STATION_BUFFER);
        assert_eq!(config.verbosity, 0);
        assert!(!config.quiet);
    }

    #[test]
    fn test_pipeline_collects_text() {
        let session = session(MockClassifier::new(2).with_predictions(&[0, 0, 1]));
        let handle = Pipeline::new(quiet())
            .start(session.clone(), ReplayExtractor::new(), Box::new(CollectorSink::new()))
            .unwrap();

        for shift in [0.0, 0.01, 0.02] {
            submit_blocking(&handle, hand(shift));
        }
        let result = handle.stop();

        assert_eq!(result, Some("HI".to_string()));
        assert_eq!(session.text(), "HI");
        assert!(session.is_closed());
    }

    #[test]
    fn test_reset_reaches_sink_in_order() {
        let session = session(MockClassifier::new(2).with_predictions(&[0, 1]));
        let handle = Pipeline::new(quiet())
            .start(session.clone(), ReplayExtractor::new(), Box::new(CollectorSink::new()))
            .unwrap();

        submit_blocking(&handle, hand(0.0));
        handle.reset();
        submit_blocking(&handle, hand(0.0));
        let result = handle.stop();

        assert_eq!(result, Some("I".to_string()));
        assert_eq!(session.text(), "I");
    }

    #[test]
    fn test_frames_without_hand_release_gate() {
        let session = session(MockClassifier::new(2));
        let handle = Pipeline::new(quiet())
            .start(session.clone(), ReplayExtractor::new(), Box::new(CollectorSink::new()))
            .unwrap();

        for _ in 0..3 {
            submit_blocking(&handle, LandmarkFrame::new(Vec::new()));
        }
        submit_blocking(&handle, hand(0.0));
        assert_eq!(handle.stop(), Some("H".to_string()));
        assert_eq!(session.gate_stats().admitted, 4);
    }

    #[test]
    fn test_fatal_error_stops_pipeline() {
        let session = session(MockClassifier::new(2).with_fallback(Err(
            ClassifierError::InvalidInputLength {
                expected: 42,
                actual: 7,
            },
        )));
        let reporter = Arc::new(RecordingReporter::default());
        let handle = Pipeline::new(quiet())
            .with_error_reporter(reporter.clone())
            .start(session.clone(), ReplayExtractor::new(), Box::new(CollectorSink::new()))
            .unwrap();

        submit_blocking(&handle, hand(0.0));
        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.is_running() {
            assert!(Instant::now() < deadline, "translator never stopped");
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(handle.submit(hand(0.0)), Submission::Stopped);
        assert!(session.last_error().is_some_and(|e| e.is_fatal()));
        assert_eq!(handle.stop(), None);

        let errors = reporter.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("translator: Fatal error"));
    }

    #[test]
    fn test_submit_after_session_teardown_is_stopped() {
        let session = session(MockClassifier::new(2));
        let handle = Pipeline::new(quiet())
            .start(session.clone(), ReplayExtractor::new(), Box::new(CollectorSink::new()))
            .unwrap();
        session.teardown();
        assert_eq!(handle.submit(hand(0.0)), Submission::Stopped);
        assert_eq!(handle.stop(), None);
    }

    #[test]
    fn test_handle_reports_running_until_stopped() {
        let handle = Pipeline::new(quiet())
            .start(
                session(MockClassifier::new(2)),
                ReplayExtractor::new(),
                Box::new(CollectorSink::new()),
            )
            .unwrap();
        assert!(handle.is_running());
        assert_eq!(handle.stop(), None);
    }
}
