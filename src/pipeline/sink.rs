use crate::error::Result;
use crate::labels::Symbol;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::SinkEvent;
use std::io::Write;

/// Pluggable output handler for recognized symbols.
/// Pairs with PoseExtractor for input - this handles the translated text.
pub trait TextSink: Send + 'static {
    /// Handle a newly accepted symbol.
    fn handle(&mut self, symbol: &Symbol) -> Result<()>;

    /// Called when the accumulated text was cleared.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called on pipeline shutdown. Return accumulated text if applicable.
    fn finish(&mut self) -> Option<String> {
        None
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Station wrapper for any TextSink implementation.
pub(crate) struct SinkStation {
    sink: Box<dyn TextSink>,
    quiet: bool,
    verbosity: u8,
    result_tx: Option<crossbeam_channel::Sender<Option<String>>>,
    accepted: usize,
}

impl SinkStation {
    pub(crate) fn new(
        sink: Box<dyn TextSink>,
        quiet: bool,
        verbosity: u8,
        result_tx: crossbeam_channel::Sender<Option<String>>,
    ) -> Self {
        Self {
            sink,
            quiet,
            verbosity,
            result_tx: Some(result_tx),
            accepted: 0,
        }
    }
}

impl Station for SinkStation {
    type Input = SinkEvent;
    type Output = ();

    fn name(&self) -> &'static str {
        self.sink.name()
    }

    fn process(&mut self, event: SinkEvent) -> std::result::Result<Option<()>, StationError> {
        let result = match event {
            SinkEvent::Symbol { symbol, text } => {
                self.accepted += 1;
                if !self.quiet && self.verbosity >= 1 {
                    eprintln!("signtype: text so far: \"{text}\"");
                }
                self.sink.handle(&symbol)
            }
            SinkEvent::Reset => self.sink.reset(),
        };

        // Terminal station: nothing flows further. Output errors never stop
        // recognition.
        result
            .map(|()| None)
            .map_err(|e| StationError::Recoverable(e.to_string()))
    }

    fn shutdown(&mut self) {
        if !self.quiet && self.verbosity >= 1 {
            eprintln!("signtype: {} symbol(s) accepted", self.accepted);
        }

        let result = self.sink.finish();
        if let Some(tx) = self.result_tx.take()
            && tx.send(result).is_err()
        {
            eprintln!("signtype: sink shutdown: result receiver already dropped");
        }
    }
}

/// Collects accepted symbols for batch runs and library use.
/// Returns the accumulated text on finish().
#[derive(Debug, Default)]
pub struct CollectorSink {
    collected: Vec<Symbol>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextSink for CollectorSink {
    fn handle(&mut self, symbol: &Symbol) -> Result<()> {
        self.collected.push(symbol.clone());
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.collected.clear();
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        if self.collected.is_empty() {
            None
        } else {
            Some(self.collected.iter().map(Symbol::as_str).collect())
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Types symbols to stdout as they are accepted.
///
/// A reset ends the current line; the next symbol starts a fresh one.
#[derive(Debug, Default)]
pub struct StdoutSink {
    line_open: bool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextSink for StdoutSink {
    fn handle(&mut self, symbol: &Symbol) -> Result<()> {
        let mut out = std::io::stdout().lock();
        write!(out, "{symbol}")?;
        out.flush()?;
        self.line_open = true;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        if self.line_open {
            println!();
            self.line_open = false;
        }
        Ok(())
    }

    fn finish(&mut self) -> Option<String> {
        if self.line_open {
            println!();
            self.line_open = false;
        }
        None
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
