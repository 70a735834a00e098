//! Recorded landmark streams in JSON-lines form.
//!
//! Each non-empty line is one record:
//!
//! ```text
//! {"landmarks": [[0.51, 0.62, 0.0], ...], "confidence": 0.97}
//! {"landmarks": [[0.51, 0.62, 0.0], ...], "label": "A"}
//! {"control": "reset"}
//! ```
//!
//! Lines starting with `#` are comments. Points may carry two or three
//! coordinates; a missing depth is read as `0.0`.

use crate::error::{Result, SigntypeError};
use crate::landmarks::{Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Out-of-band instruction embedded in a replay stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    /// Clear the accumulated text, like pressing the restart button.
    Reset,
}

/// One line of a landmark recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LandmarkRecord {
    Frame {
        landmarks: Vec<Vec<f32>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    Control {
        control: ControlCommand,
    },
}

impl LandmarkRecord {
    /// Converts a frame record into a [`LandmarkFrame`].
    ///
    /// Returns `None` for control records. Points with other than two or
    /// three coordinates are rejected; the point count itself is left for
    /// the normalizer to judge.
    pub fn to_frame(&self) -> Option<std::result::Result<LandmarkFrame, String>> {
        let LandmarkRecord::Frame {
            landmarks,
            confidence,
            ..
        } = self
        else {
            return None;
        };

        let mut points = Vec::with_capacity(landmarks.len());
        for (i, coords) in landmarks.iter().enumerate() {
            let point = match coords.as_slice() {
                [x, y] => Landmark::new(*x, *y, 0.0),
                [x, y, z] => Landmark::new(*x, *y, *z),
                other => {
                    return Some(Err(format!(
                        "point {} has {} coordinates, expected 2 or 3",
                        i,
                        other.len()
                    )));
                }
            };
            points.push(point);
        }

        let mut frame = LandmarkFrame::new(points);
        frame.confidence = *confidence;
        Some(Ok(frame))
    }

    /// Label attached to a training record.
    pub fn label(&self) -> Option<&str> {
        match self {
            LandmarkRecord::Frame { label, .. } => label.as_deref(),
            LandmarkRecord::Control { .. } => None,
        }
    }
}

/// A parsed replay item: either a frame ready for the pipeline or a control
/// command.
#[derive(Debug, Clone)]
pub enum ReplayItem {
    Frame {
        frame: LandmarkFrame,
        label: Option<String>,
    },
    Control(ControlCommand),
}

/// Streaming reader over a JSON-lines landmark recording.
pub struct ReplaySource {
    lines: Box<dyn Iterator<Item = std::io::Result<String>> + Send>,
    line_number: usize,
}

impl ReplaySource {
    /// Opens a recording on disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Reads a recording from any buffered reader.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            lines: Box::new(reader.lines()),
            line_number: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Result<ReplayItem> {
        let record: LandmarkRecord =
            serde_json::from_str(line).map_err(|e| SigntypeError::LandmarkRecord {
                line: self.line_number,
                message: e.to_string(),
            })?;

        if let LandmarkRecord::Control { control } = record {
            return Ok(ReplayItem::Control(control));
        }

        let label = record.label().map(str::to_string);
        match record.to_frame() {
            Some(Ok(frame)) => Ok(ReplayItem::Frame { frame, label }),
            Some(Err(message)) => Err(SigntypeError::LandmarkRecord {
                line: self.line_number,
                message,
            }),
            None => Err(SigntypeError::LandmarkRecord {
                line: self.line_number,
                message: "record is neither a frame nor a control".to_string(),
            }),
        }
    }
}

impl Iterator for ReplaySource {
    type Item = Result<ReplayItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some(self.parse_line(trimmed));
        }
    }
}

/// Reads every record of a recording into memory.
pub fn read_records(path: &Path) -> Result<Vec<ReplayItem>> {
    ReplaySource::open(path)?.collect()
}
