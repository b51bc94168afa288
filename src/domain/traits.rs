// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer drives a corpus build through these
// two seams and never names a concrete file format:
//
//   RecordSource — yields RawRecords one at a time
//   CorpusSink   — receives the surviving canonical sentences
//
// Implementations:
//   - CsvRecordSource  (data::loader)  → rows of a CSV text column
//   - LineSource       (data::loader)  → lines of any reader (stdin)
//   - CsvCorpusWriter  (infra::corpus_writer) → `sentence` CSV

use anyhow::Result;

use crate::domain::record::RawRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// A single-pass stream of raw input records.
///
/// Row-level failures are absorbed by the source (logged and
/// counted) so that iteration itself never fails.
pub trait RecordSource: Iterator<Item = RawRecord> {
    /// Number of rows that could not be parsed and were skipped so far.
    fn skipped_rows(&self) -> usize;
}

// ─── CorpusSink ───────────────────────────────────────────────────────────────
/// Any destination for canonical sentences, in corpus order.
pub trait CorpusSink {
    /// Append one sentence.
    fn write_sentence(&mut self, sentence: &str) -> Result<()>;

    /// Flush anything buffered. Called once after the last sentence.
    fn finish(&mut self) -> Result<()>;
}
