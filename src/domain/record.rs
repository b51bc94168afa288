// ============================================================
// Layer 3 — Record Domain Types
// ============================================================
// A RawRecord is created per input row and discarded once it
// has been normalized. A CanonicalRecord carries the normalized
// sentence together with the row it came from, so the corpus
// can be traced back to the input file.

use serde::{Deserialize, Serialize};

/// One raw input text blob.
///
/// `text` is `None` when the row had no value for the text column;
/// the normalizer treats that exactly like the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based data row number in the input (header excluded)
    pub row: usize,

    /// The raw text, if the row had one
    pub text: Option<String>,
}

impl RawRecord {
    /// Create a record for a given row.
    pub fn new(row: usize, text: Option<String>) -> Self {
        Self { row, text }
    }

    /// Convenience constructor for a row that has text.
    pub fn with_text(row: usize, text: impl Into<String>) -> Self {
        Self { row, text: Some(text.into()) }
    }

    /// The raw text, with a missing value read as `""`.
    #[cfg(test)]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// The canonical form of one input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Row number of the RawRecord this came from
    pub row: usize,

    /// Lowercase, single-line canonical text (possibly empty)
    pub sentence: String,
}

impl CanonicalRecord {
    pub fn new(row: usize, sentence: impl Into<String>) -> Self {
        Self { row, sentence: sentence.into() }
    }

    /// True when nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.sentence.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_text_reads_as_empty() {
        let r = RawRecord::new(3, None);
        assert_eq!(r.text_or_empty(), "");
    }

    #[test]
    fn whitespace_sentence_counts_as_empty() {
        assert!(CanonicalRecord::new(1, "  ").is_empty());
        assert!(!CanonicalRecord::new(1, "ok").is_empty());
    }
}
