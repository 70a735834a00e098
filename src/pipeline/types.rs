//! Messages passed between pipeline stations.

use crate::labels::Symbol;
use crate::session::Admission;

/// Work item travelling from the producer through extraction and
/// translation.
///
/// `Reset` markers travel in the same channel as frames so every station
/// sees the reset at the same position in the stream.
#[derive(Debug)]
pub enum StageJob<T> {
    /// A frame that passed the gate.
    Frame { admission: Admission, payload: T },
    /// The accumulated text was cleared.
    Reset,
}

impl<T> StageJob<T> {
    pub fn frame(admission: Admission, payload: T) -> Self {
        StageJob::Frame { admission, payload }
    }
}

/// What the sink is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// A novel symbol was accepted; `text` is the full text after it.
    Symbol { symbol: Symbol, text: String },
    /// The text was cleared.
    Reset,
}
