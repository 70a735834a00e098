//! Label table: classifier output position → symbol.
//!
//! The table is a plain text file with one label per line; line `i` names
//! classifier output `i`. It is loaded once at startup and never changes.

use crate::error::{Result, SigntypeError};
use std::fmt;
use std::fs;
use std::path::Path;

/// A recognized symbol (usually a single letter). Never empty or blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from label text, trimming surrounding whitespace.
    ///
    /// Returns `None` for empty or whitespace-only text.
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, immutable label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Builds a table from labels in classifier output order.
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parses line-oriented label text.
    ///
    /// Every line keeps its position, blank ones included, so the line index
    /// always matches the classifier output index. Blank lines resolve to
    /// nothing.
    pub fn parse(text: &str) -> Self {
        let labels = text
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        Self { labels }
    }

    /// Loads the label table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let table = Self::parse(&text);
        if table.labels.iter().all(|l| l.trim().is_empty()) {
            return Err(SigntypeError::LabelTableEmpty {
                path: path.display().to_string(),
            });
        }
        Ok(table)
    }

    /// Writes the table, one label per line.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut text = self.labels.join("\n");
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }

    /// Resolves a classifier output index to a symbol.
    ///
    /// Returns `None` for negative or out-of-range indices and for blank
    /// labels.
    pub fn resolve(&self, index: i64) -> Option<Symbol> {
        let index = usize::try_from(index).ok()?;
        self.labels.get(index).and_then(Symbol::new)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
