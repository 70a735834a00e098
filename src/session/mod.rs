//! Translation session: owns the accumulated text and the classifier.
//!
//! A step runs gate → normalizer → classifier → label table → accumulator.
//! Classification happens outside the state lock, so `reset()` and
//! `teardown()` never wait for an in-flight frame. Instead every admission
//! records the generation it was admitted under; `reset()` and `teardown()`
//! bump the generation, and a result from an older generation is discarded
//! when it comes back.

pub mod error;
pub mod events;

pub use error::SessionError;
pub use events::{SessionEvent, SessionSnapshot, StepOutcome};

use crate::accumulator::{Observation, SymbolAccumulator};
use crate::classifier::{ClassificationOutcome, Classifier, ClassifierError};
use crate::clock::Clock;
use crate::defaults;
use crate::gate::{FrameGate, GateStats, Ticket};
use crate::labels::{LabelTable, Symbol};
use crate::landmarks::{LandmarkFrame, normalize};
use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a frame may stay in flight before its gate slot is reclaimed.
    pub gate_timeout: Duration,
    /// Verbosity level (0=quiet, 1=per-symbol, 2=per-frame diagnostics)
    pub verbosity: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gate_timeout: Duration::from_millis(defaults::GATE_TIMEOUT_MS),
            verbosity: 0,
        }
    }
}

/// A frame that passed the gate, tagged with the generation it belongs to.
///
/// Must be handed back through [`Session::complete`] or
/// [`Session::abandon`] so the gate slot is freed.
#[derive(Debug)]
pub struct Admission {
    ticket: Ticket,
    generation: u64,
}

impl Admission {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct SessionState {
    accumulator: SymbolAccumulator,
    last_error: Option<SessionError>,
    generation: u64,
    closed: bool,
}

pub struct Session {
    state: Mutex<SessionState>,
    classifier: Mutex<Option<Arc<dyn Classifier>>>,
    labels: LabelTable,
    gate: FrameGate,
    event_tx: Option<Sender<SessionEvent>>,
    verbosity: u8,
    /// Runs between gate admission and generation tagging.
    #[cfg(test)]
    admit_hook: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Session {
    /// Starts a session with default settings.
    pub fn start(
        classifier: Arc<dyn Classifier>,
        labels: LabelTable,
    ) -> Result<Self, SessionError> {
        Self::start_with(SessionConfig::default(), classifier, labels)
    }

    /// Starts a session, taking ownership of the classifier resource.
    ///
    /// Fails with [`SessionError::ClassifierUnavailable`] when the classifier
    /// is not ready.
    pub fn start_with(
        config: SessionConfig,
        classifier: Arc<dyn Classifier>,
        labels: LabelTable,
    ) -> Result<Self, SessionError> {
        if !classifier.is_ready() {
            return Err(SessionError::ClassifierUnavailable);
        }
        Ok(Self {
            state: Mutex::new(SessionState::default()),
            classifier: Mutex::new(Some(classifier)),
            labels,
            gate: FrameGate::new(config.gate_timeout),
            event_tx: None,
            verbosity: config.verbosity,
            #[cfg(test)]
            admit_hook: Mutex::new(None),
        })
    }

    /// Sets a custom clock for the frame gate (for deterministic testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.gate = FrameGate::with_clock(self.gate.timeout(), clock);
        self
    }

    /// Subscribes a channel to session events.
    pub fn with_event_sender(mut self, tx: Sender<SessionEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(ref tx) = self.event_tx {
            // Subscriber is slow or gone; polling still sees the state.
            tx.try_send(event).ok();
        }
    }

    /// Runs one landmark frame through the whole pipeline.
    ///
    /// Returns [`StepOutcome::Dropped`] without touching the frame when
    /// another frame is in flight.
    pub fn pipeline_step(&self, frame: LandmarkFrame) -> Result<StepOutcome, SessionError> {
        match self.admit()? {
            Some(admission) => self.complete(admission, frame),
            None => Ok(StepOutcome::Dropped),
        }
    }

    /// Asks the gate for a slot.
    ///
    /// `Ok(None)` means the frame must be dropped. The state lock is held
    /// from the gate check until the generation is recorded, so a concurrent
    /// `reset()` lands either before the admission or after it, never in
    /// between.
    pub fn admit(&self) -> Result<Option<Admission>, SessionError> {
        let state = self.lock_state();
        if state.closed {
            return Err(SessionError::SessionClosed);
        }
        let Some(ticket) = self.gate.try_admit() else {
            return Ok(None);
        };
        #[cfg(test)]
        self.run_admit_hook();
        Ok(Some(Admission {
            ticket,
            generation: state.generation,
        }))
    }

    #[cfg(test)]
    fn run_admit_hook(&self) {
        let hook = self
            .admit_hook
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Releases an admission that produced no landmarks (no hand detected).
    pub fn abandon(&self, admission: Admission) {
        self.gate.release(admission.ticket);
    }

    /// Normalizes, classifies, resolves and accumulates an admitted frame,
    /// then frees its gate slot whatever the outcome.
    pub fn complete(
        &self,
        admission: Admission,
        frame: LandmarkFrame,
    ) -> Result<StepOutcome, SessionError> {
        let Admission { ticket, generation } = admission;
        let result = self.run_stages(&ticket, generation, frame);
        self.gate.release(ticket);
        result
    }

    fn run_stages(
        &self,
        ticket: &Ticket,
        generation: u64,
        frame: LandmarkFrame,
    ) -> Result<StepOutcome, SessionError> {
        let features = normalize(&frame).inspect_err(|e| {
            if self.verbosity >= 2 {
                eprintln!("signtype: frame dropped: {e}");
            }
        })?;

        let classifier = self
            .classifier
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let scores = match classifier {
            Some(classifier) => classifier.classify(features.as_slice()),
            None => Err(ClassifierError::Closed),
        };

        self.apply(ticket, generation, scores)
    }

    /// Applies a classification result to the session state.
    fn apply(
        &self,
        ticket: &Ticket,
        generation: u64,
        scores: Result<Vec<f32>, ClassifierError>,
    ) -> Result<StepOutcome, SessionError> {
        let mut state = self.lock_state();

        if state.closed || state.generation != generation || !self.gate.is_current(ticket) {
            if self.verbosity >= 2 {
                eprintln!("signtype: {}", SessionError::StaleResult);
            }
            return Ok(StepOutcome::Discarded);
        }

        let outcome = match scores {
            Ok(scores) => ClassificationOutcome::from_scores(scores),
            Err(ClassifierError::InvalidInputLength { expected, actual }) => {
                return Err(self.surface(
                    &mut state,
                    SessionError::InvalidInputLength { expected, actual },
                ));
            }
            Err(ClassifierError::Closed) => {
                return Err(self.surface(&mut state, SessionError::ClassifierUnavailable));
            }
            Err(ClassifierError::Inference(message)) => {
                return Err(self.surface(&mut state, SessionError::ClassifierFailed(message)));
            }
        };

        let ClassificationOutcome::Valid { index, .. } = outcome else {
            return Err(self.surface(
                &mut state,
                SessionError::ClassifierFailed("classifier returned no usable scores".to_string()),
            ));
        };

        // A valid classification clears a previously surfaced error.
        state.last_error = None;

        let index = i64::try_from(index).unwrap_or(i64::MAX);
        let symbol = self.labels.resolve(index);
        if symbol.is_none() && self.verbosity >= 2 {
            eprintln!("signtype: {}", SessionError::ResolutionFailed { index });
        }

        match state.accumulator.observe(symbol) {
            Observation::Absent => Ok(StepOutcome::Absent),
            Observation::Repeated(symbol) => Ok(StepOutcome::Repeated(symbol)),
            Observation::Accepted(symbol) => {
                let text = state.accumulator.text();
                // Emitted under the lock so a concurrent reset cannot overtake it.
                self.emit(SessionEvent::SymbolAccepted {
                    symbol: symbol.clone(),
                    text: text.clone(),
                });
                drop(state);
                if self.verbosity >= 1 {
                    eprintln!("signtype: accepted '{symbol}'");
                }
                Ok(StepOutcome::Accepted { symbol, text })
            }
        }
    }

    fn surface(&self, state: &mut SessionState, error: SessionError) -> SessionError {
        if error.is_surfaced() {
            state.last_error = Some(error.clone());
            self.emit(SessionEvent::ErrorRaised(error.clone()));
        }
        error
    }

    /// Records an error raised outside the step stages (e.g. by the extractor
    /// driver). Kinds that are not surfaced are only returned.
    pub fn report_error(&self, error: SessionError) -> SessionError {
        let mut state = self.lock_state();
        if state.closed {
            return error;
        }
        self.surface(&mut state, error)
    }

    /// Clears the text, the last accepted symbol and the last error.
    ///
    /// Frames admitted before the reset may still be in flight; their
    /// results are discarded when they arrive.
    pub fn reset(&self) {
        {
            let mut state = self.lock_state();
            state.accumulator.clear();
            state.last_error = None;
            state.generation += 1;
            self.emit(SessionEvent::Reset);
        }
        if self.verbosity >= 1 {
            eprintln!("signtype: session reset");
        }
    }

    /// Releases the classifier. Later steps are rejected with
    /// [`SessionError::SessionClosed`].
    ///
    /// Does not wait for an in-flight classification; its result is
    /// discarded. Returns `true` only for the call that actually released
    /// the classifier.
    pub fn teardown(&self) -> bool {
        {
            let mut state = self.lock_state();
            state.closed = true;
            state.generation += 1;
        }
        let classifier = self
            .classifier
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match classifier {
            Some(classifier) => {
                classifier.close();
                self.emit(SessionEvent::Closed);
                true
            }
            None => false,
        }
    }

    /// Accumulated text.
    pub fn text(&self) -> String {
        self.lock_state().accumulator.text()
    }

    /// Accumulated symbols in acceptance order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.lock_state().accumulator.symbols().to_vec()
    }

    pub fn last_accepted(&self) -> Option<Symbol> {
        self.lock_state().accumulator.last_accepted().cloned()
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.lock_state().last_error.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock_state().generation
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn gate_stats(&self) -> GateStats {
        self.gate.stats()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        SessionSnapshot {
            symbols: state.accumulator.symbols().to_vec(),
            text: state.accumulator.text(),
            last_error: state.last_error.clone(),
            generation: state.generation,
            closed: state.closed,
            gate: self.gate.stats(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
