//! Observable session output: events for subscribers, snapshots for polling.

use crate::gate::GateStats;
use crate::labels::Symbol;
use crate::session::SessionError;

/// Notification sent to subscribers (non-blocking; dropped when the channel
/// is full).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A novel symbol was appended; `text` is the full text after appending.
    SymbolAccepted { symbol: Symbol, text: String },
    /// An error was surfaced as the session's last error.
    ErrorRaised(SessionError),
    /// Text and error were cleared.
    Reset,
    /// The classifier was released; no further steps will run.
    Closed,
}

/// Point-in-time copy of the observable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub symbols: Vec<Symbol>,
    pub text: String,
    pub last_error: Option<SessionError>,
    pub generation: u64,
    pub closed: bool,
    pub gate: GateStats,
}

/// Result of one successfully processed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A novel symbol was appended; `text` is the full text right after it.
    Accepted { symbol: Symbol, text: String },
    /// The symbol matched the last accepted one and was suppressed.
    Repeated(Symbol),
    /// Nothing usable was recognized.
    Absent,
    /// Another frame was in flight; this one was dropped by the gate.
    Dropped,
    /// The result arrived after a reset or teardown and was thrown away.
    Discarded,
}

impl StepOutcome {
    pub fn accepted(&self) -> Option<&Symbol> {
        match self {
            StepOutcome::Accepted { symbol, .. } => Some(symbol),
            _ => None,
        }
    }
}
